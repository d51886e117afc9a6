//! Module resolution (spec §4.K): turning an import statement's path into
//! a concrete module URI, and extracting a parsed module's exported
//! surface. Resolution failures never abort a caller -- they accumulate
//! in [`ModuleResolver::errors`] alongside whatever did resolve.

mod error;
mod export;
mod resolver;

pub use error::ResolutionError;
pub use export::{ExportKind, ExportedSymbol, extract_exports};
pub use resolver::{ModuleResolver, resolve_import};
