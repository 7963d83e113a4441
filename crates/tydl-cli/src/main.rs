//! Command-line driver for the tydl compiler front end.
//!
//! `tydl check` parses and resolves a set of source files and reports
//! diagnostics. Log output is controlled with `RUST_LOG` (e.g.
//! `RUST_LOG=tydl_binder=debug`).

#![allow(clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tydl_binder::{Program, Resolver, SymbolId, symbol_flags};
use tydl_common::diagnostics::{Diagnostic, DiagnosticCategory};

#[derive(Parser)]
#[command(name = "tydl", version, about = "tydl data-modeling language compiler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and resolve source files, reporting diagnostics.
    Check {
        /// Source files to check, in merge order.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Emit diagnostics as JSON.
        #[arg(long)]
        json: bool,
        /// Print the resolved global namespace tree.
        #[arg(long)]
        dump_symbols: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(had_errors) => {
            if had_errors {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    match cli.command {
        Command::Check {
            files,
            json,
            dump_symbols,
        } => check(files, json, dump_symbols),
    }
}

fn check(files: Vec<PathBuf>, json: bool, dump_symbols: bool) -> Result<bool> {
    let mut program = Program::new();
    for path in &files {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        program.add_source(&path.display().to_string(), &source);
    }

    let mut resolver = Resolver::resolve_program(&program);

    let mut diagnostics = program.diagnostics.clone();
    diagnostics.extend(resolver.take_diagnostics());

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    } else {
        for diagnostic in &diagnostics {
            print_diagnostic(diagnostic);
        }
    }

    if dump_symbols {
        dump_namespace(&program, &resolver, resolver.global_namespace_symbol(), 0);
    }

    let had_errors = diagnostics
        .iter()
        .any(|d| d.category == DiagnosticCategory::Error);
    if !json && !diagnostics.is_empty() {
        eprintln!("{} diagnostic(s)", diagnostics.len());
    }
    Ok(had_errors)
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let severity = match diagnostic.category {
        DiagnosticCategory::Error => "error",
        DiagnosticCategory::Warning => "warning",
    };
    eprintln!(
        "{}:{}: {severity} [{}] {}",
        diagnostic.file, diagnostic.span.start, diagnostic.code, diagnostic.message
    );
}

fn dump_namespace(program: &Program, resolver: &Resolver, sym: SymbolId, depth: usize) {
    let indent = "  ".repeat(depth);
    let symbol = resolver.symbol(sym);
    let name = if symbol.name.is_none() {
        "<global>"
    } else {
        program.interner().resolve(symbol.name)
    };
    println!("{indent}{name} ({})", describe_flags(symbol.flags));

    if let Some(exports) = symbol.exports {
        for (_, export) in resolver.table(exports).iter() {
            let export = resolver.merged_symbol(export);
            if resolver.symbol(export).flags & symbol_flags::NAMESPACE != 0 {
                dump_namespace(program, resolver, export, depth + 1);
            } else {
                let child = resolver.symbol(export);
                println!(
                    "{indent}  {} ({})",
                    program.interner().resolve(child.name),
                    describe_flags(child.flags)
                );
            }
        }
    }
}

fn describe_flags(flags: u32) -> String {
    let mut parts = Vec::new();
    for (bit, name) in [
        (symbol_flags::NAMESPACE, "namespace"),
        (symbol_flags::MODEL, "model"),
        (symbol_flags::ALIAS, "alias"),
        (symbol_flags::MEMBER, "member"),
        (symbol_flags::TEMPLATE_PARAMETER, "template-parameter"),
        (symbol_flags::DECORATOR, "decorator"),
        (symbol_flags::FUNCTION, "function"),
        (symbol_flags::DECLARATION, "declaration"),
        (symbol_flags::IMPLEMENTATION, "implementation"),
        (symbol_flags::USING, "using"),
    ] {
        if flags & bit != 0 {
            parts.push(name);
        }
    }
    parts.join("+")
}
