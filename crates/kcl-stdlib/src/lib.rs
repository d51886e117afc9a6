//! Static table of built-in operation signatures and constants (spec §4.E).
//!
//! The registry is read-only, effectively-immutable data: [`registry`]
//! builds a fresh table on every call rather than caching behind a lazy
//! static, since construction is cheap and side-effect-free and this keeps
//! the crate free of extra init-order machinery.

use rustc_hash::FxHashMap;

/// The coarse type category the checker works with. Not the same thing as
/// a `TypeAnnotation` -- Kind is the checker's own small closed lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Shape,
    Sketch,
    Scalar,
    Void,
    Point,
    Plane,
    Object,
    Tag,
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSig {
    pub name: &'static str,
    pub kind: Kind,
    pub optional: bool,
}

impl ParamSig {
    const fn required(name: &'static str, kind: Kind) -> Self {
        Self { name, kind, optional: false }
    }

    const fn optional(name: &'static str, kind: Kind) -> Self {
        Self { name, kind, optional: true }
    }
}

/// A registered operation's signature. `variadic` marks operations like
/// `fuse` that the checker validates with bespoke arity rules rather than
/// this fixed parameter list (the list is left empty for those).
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub params: &'static [ParamSig],
    pub return_kind: Kind,
    pub variadic: bool,
}

macro_rules! sig {
    ($($param:expr),* $(,)? => $ret:expr) => {{
        const PARAMS: &[ParamSig] = &[$($param),*];
        Signature { params: PARAMS, return_kind: $ret, variadic: false }
    }};
}

/// Build the stdlib signature table. Qualified names (`vector::add`) are
/// plain string keys, same as unqualified ones -- the checker does no
/// namespace-aware lookup, just an exact-string match.
pub fn registry() -> FxHashMap<&'static str, Signature> {
    use Kind::*;
    let mut m = FxHashMap::default();

    m.insert(
        "box",
        sig!(
            ParamSig::required("width", Scalar),
            ParamSig::required("height", Scalar),
            ParamSig::required("depth", Scalar),
            => Shape
        ),
    );
    m.insert(
        "cylinder",
        sig!(
            ParamSig::required("radius", Scalar),
            ParamSig::required("height", Scalar),
            => Shape
        ),
    );
    m.insert(
        "sphere",
        sig!(ParamSig::required("radius", Scalar) => Shape),
    );
    m.insert(
        "fuse",
        Signature { params: &[], return_kind: Shape, variadic: true },
    );
    m.insert(
        "extrude",
        sig!(
            ParamSig::required("sketch", Sketch),
            ParamSig::required("distance", Scalar),
            => Shape
        ),
    );
    m.insert(
        "startSketchOn",
        sig!(ParamSig::required("plane", Plane) => Sketch),
    );
    m.insert(
        "startProfile",
        sig!(
            ParamSig::required("sketch", Sketch),
            ParamSig::required("at", Point),
            => Sketch
        ),
    );
    m.insert(
        "line",
        sig!(
            ParamSig::required("sketch", Sketch),
            ParamSig::required("to", Point),
            ParamSig::optional("tag", Tag),
            => Sketch
        ),
    );
    m.insert(
        "close",
        sig!(ParamSig::required("sketch", Sketch) => Sketch),
    );
    m.insert(
        "vector::add",
        sig!(ParamSig::required("a", Scalar), ParamSig::required("b", Scalar) => Scalar),
    );
    m.insert(
        "vector::sub",
        sig!(ParamSig::required("a", Scalar), ParamSig::required("b", Scalar) => Scalar),
    );
    m.insert(
        "math::sqrt",
        sig!(ParamSig::required("x", Scalar) => Scalar),
    );

    m
}

/// The three named construction planes. Resolve as `Kind::Plane`.
pub const PLANES: &[&str] = &["XY", "XZ", "YZ"];

/// Math constants. Resolve as `Kind::Scalar`.
pub const MATH_CONSTANTS: &[(&str, f64)] =
    &[("PI", std::f64::consts::PI), ("E", std::f64::consts::E), ("TAU", std::f64::consts::TAU)];

/// Bare unit-name identifiers usable as values (e.g. `@settings(defaultLengthUnit = mm)`).
/// Resolve as `Kind::Scalar`.
pub const UNIT_SYMBOLS: &[&str] = &["mm", "cm", "m", "in", "ft", "yd", "deg", "rad"];

/// Tag sentinel constants. Resolve as `Kind::Tag`.
pub const TAG_SENTINELS: &[&str] = &["START", "END"];

pub fn is_plane_constant(name: &str) -> bool {
    PLANES.contains(&name)
}

pub fn is_math_constant(name: &str) -> bool {
    MATH_CONSTANTS.iter().any(|(n, _)| *n == name)
}

pub fn is_unit_symbol(name: &str) -> bool {
    UNIT_SYMBOLS.contains(&name)
}

pub fn is_tag_sentinel(name: &str) -> bool {
    TAG_SENTINELS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_signature_has_three_required_scalar_params() {
        let reg = registry();
        let sig = reg.get("box").unwrap();
        assert_eq!(sig.params.len(), 3);
        assert!(sig.params.iter().all(|p| !p.optional && p.kind == Kind::Scalar));
        assert_eq!(sig.return_kind, Kind::Shape);
    }

    #[test]
    fn fuse_is_variadic_with_no_fixed_params() {
        let reg = registry();
        let sig = reg.get("fuse").unwrap();
        assert!(sig.variadic);
        assert!(sig.params.is_empty());
    }

    #[test]
    fn qualified_names_are_looked_up_verbatim() {
        let reg = registry();
        assert!(reg.contains_key("vector::add"));
    }

    #[test]
    fn unknown_operation_is_absent_from_registry() {
        let reg = registry();
        assert!(!reg.contains_key("unknownOp"));
    }

    #[test]
    fn planes_and_constants_classify_correctly() {
        assert!(is_plane_constant("XY"));
        assert!(is_math_constant("PI"));
        assert!(is_unit_symbol("mm"));
        assert!(is_tag_sentinel("START"));
        assert!(!is_plane_constant("mm"));
    }
}
