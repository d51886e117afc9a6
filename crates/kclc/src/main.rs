//! The `kclc` command-line tool (spec §6): `fmt`, `check`, and an `lsp`
//! dispatcher subcommand. Formatting and checking delegate to `kcl-parser`/
//! `kcl-fmt`/`kcl-analysis`; file discovery goes through `kcl-fs`'s glob
//! expansion so the CLI never walks the filesystem itself.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use kcl_fs::{FileSystem, HostFileSystem};

#[derive(Parser)]
#[command(name = "kclc", version, about = "The kcl language toolchain driver", disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format files in place, or verify they're already formatted
    Fmt {
        /// Glob patterns to expand
        patterns: Vec<String>,

        /// Verify formatting instead of writing; exit 1 if any file needs reformatting
        #[arg(short, long)]
        check: bool,

        /// Print the formatted output instead of writing it back
        #[arg(long = "no-write")]
        no_write: bool,
    },
    /// Type-check files and report diagnostics
    Check {
        /// Glob patterns to expand
        patterns: Vec<String>,

        /// Print a plain-text report (default; accepted for parity with `--json`)
        #[arg(short, long)]
        format: bool,

        /// Emit a JSON array of per-file diagnostics instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Print usage information
    Help,
    /// Run the language server over stdio
    Lsp,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Fmt { patterns, check, no_write } => run_fmt(&patterns, check, no_write),
        Commands::Check { patterns, format, json } => run_check(&patterns, format, json),
        Commands::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Commands::Lsp => run_lsp(),
    }
}

fn print_help() {
    println!("kclc -- the kcl language toolchain driver");
    println!();
    println!("USAGE:");
    println!("    kclc <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    fmt [--check] [--no-write] <pattern>...   format or verify files");
    println!("    check [--json] <pattern>...               type-check files");
    println!("    lsp                                       run the language server over stdio");
    println!("    help                                      print this message");
}

fn expand_patterns(fs: &HostFileSystem, patterns: &[String]) -> Result<Vec<String>, ExitCode> {
    let mut files = Vec::new();
    for pattern in patterns {
        match fs.expand_glob(pattern) {
            Ok(matches) => files.extend(matches),
            Err(err) => {
                eprintln!("error: {err}");
                return Err(ExitCode::FAILURE);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn run_fmt(patterns: &[String], check: bool, no_write: bool) -> ExitCode {
    let mut fs = HostFileSystem::new();
    let files = match expand_patterns(&fs, patterns) {
        Ok(files) => files,
        Err(code) => return code,
    };

    let mut failed = false;
    for path in &files {
        let source = match fs.read_file(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error: {err}");
                failed = true;
                continue;
            }
        };

        let program = match kcl_parser::parse(&source) {
            Ok(program) => program,
            Err(err) => {
                eprintln!("{path}: {}", err.message);
                failed = true;
                continue;
            }
        };

        let formatted = kcl_fmt::format_program(&program);
        let needs_formatting = formatted != source;

        if check {
            if needs_formatting {
                println!("{path}: needs formatting");
                failed = true;
            }
            continue;
        }

        if no_write {
            print!("{formatted}");
            continue;
        }

        if needs_formatting {
            if let Err(err) = fs.write_file(path, &formatted) {
                eprintln!("error: {err}");
                failed = true;
            }
        }
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

#[derive(Serialize)]
struct JsonDiagnostic {
    line: u32,
    column: u32,
    severity: &'static str,
    message: String,
    source: &'static str,
    code: Option<&'static str>,
}

#[derive(Serialize)]
struct FileReport {
    file: String,
    diagnostics: Vec<JsonDiagnostic>,
}

fn severity_name(severity: kcl_common::Severity) -> &'static str {
    match severity {
        kcl_common::Severity::Error => "error",
        kcl_common::Severity::Warning => "warning",
    }
}

fn run_check(patterns: &[String], _format: bool, json: bool) -> ExitCode {
    let fs = HostFileSystem::new();
    let files = match expand_patterns(&fs, patterns) {
        Ok(files) => files,
        Err(code) => return code,
    };

    let mut reports = Vec::new();
    let mut has_error = false;

    for path in &files {
        let source = match fs.read_file(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error: {err}");
                has_error = true;
                continue;
            }
        };

        let mut store = kcl_docstore::DocumentStore::new();
        let doc = store.open(path.clone(), source, 1);
        let diagnostics = kcl_analysis::diagnostics::diagnostics(&doc);

        has_error |= diagnostics.iter().any(|d| d.severity == kcl_common::Severity::Error);

        if json {
            let json_diagnostics = diagnostics
                .iter()
                .map(|d| {
                    let (line, column) = doc.line_index.line_col_1based(d.range.start);
                    JsonDiagnostic {
                        line,
                        column,
                        severity: severity_name(d.severity),
                        message: d.message.clone(),
                        source: d.source,
                        code: d.code,
                    }
                })
                .collect();
            reports.push(FileReport { file: path.clone(), diagnostics: json_diagnostics });
        } else {
            for d in &diagnostics {
                let (line, column) = doc.line_index.line_col_1based(d.range.start);
                println!(
                    "{path}:{line}:{column}: {} [{}] {}",
                    severity_name(d.severity),
                    d.source,
                    d.message
                );
            }
        }
    }

    if json {
        match serde_json::to_string_pretty(&reports) {
            Ok(body) => println!("{body}"),
            Err(err) => {
                eprintln!("error: failed to serialize diagnostics: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    if has_error { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn run_lsp() -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(kcl_lsp::run_server());
    ExitCode::SUCCESS
}
