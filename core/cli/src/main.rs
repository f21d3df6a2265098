#![warn(clippy::pedantic)]

//! # Cairn Compiler CLI
//!
//! Command line interface for the Cairn front end.
//!
//! 1. Parse (`--parse`) – read the source and print the syntax tree.
//! 2. Check (`--check`) – type-check and report diagnostics.
//! 3. Types (`--types`) – print the type of every node.
//! 4. JSON  (`--json`)  – print node types and diagnostics as JSON.
//!
//! At least one flag must be supplied; the requested outputs are produced in the
//! order above regardless of the order on the command line.
//!
//! Logging goes through `env_logger` and is controlled by `RUST_LOG`, e.g.
//! `RUST_LOG=debug cairnc main.crn --check`.
//!
//! ## Exit codes
//! * 0 – success.
//! * 1 – usage / IO / parse / type errors.
//!
//! ## Example
//! ```bash
//! cairnc demos/hello.crn --check
//! ```

mod parser;
use anyhow::Context;
use cairn::{diagnostics, export_json, parse, type_check};
use cairn_ast::{arena::Arena, errors::ParseError, printer::print_tree};
use clap::Parser;
use log::info;
use parser::Cli;
use std::{fs, path::Path, process};

/// Entry point for the CLI executable.
///
/// Responsibilities:
/// * Parse flags.
/// * Validate that the input path exists and at least one output is selected.
/// * Read the source, then type-check it when a flag needs types.
///
/// On any failure a diagnostic is printed to stderr and the process exits with code `1`.
fn main() {
    env_logger::init();
    let args = Cli::parse();
    if !args.path.exists() {
        eprintln!("Error: path not found");
        process::exit(1);
    }

    let need_check = args.check || args.types || args.json;
    if !(args.parse || need_check) {
        eprintln!("Error: at least one of --parse, --check, --types, or --json must be specified");
        process::exit(1);
    }

    let source = match read_source(&args.path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    let arena = match parse(&source) {
        Ok(arena) => arena,
        Err(e) => {
            match e.downcast_ref::<ParseError>() {
                Some(parse_error) => {
                    eprint!("{}", diagnostics::render_parse_error(&source, parse_error));
                }
                None => eprintln!("Parse error: {e}"),
            }
            process::exit(1);
        }
    };
    info!("parsed {}", args.path.display());
    if args.parse {
        print!("{}", print_tree(&arena, &source));
    }
    if !need_check {
        process::exit(0);
    }

    let typed_context = match type_check(arena, &source) {
        Ok(typed_context) => typed_context,
        Err(e) => {
            eprintln!("Type checking failed: {e}");
            process::exit(1);
        }
    };
    if args.types {
        print!("{}", node_types(typed_context.arena(), &source, |index| {
            typed_context.render_node_type(index)
        }));
    }
    if args.json {
        match export_json(&typed_context, &source) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("JSON export failed: {e}");
                process::exit(1);
            }
        }
    }
    if !typed_context.is_success() {
        if args.check {
            for rendered in diagnostics::render_all(&typed_context, &source) {
                eprintln!("{rendered}");
            }
        }
        eprintln!(
            "Error: {} type error(s) in {}",
            typed_context.diagnostics().len(),
            args.path.display()
        );
        process::exit(1);
    }
    if args.check {
        println!("Checked: {}", args.path.display());
    }
    process::exit(0);
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// One line per node in arena order: kind, span, leaf text and type.
fn node_types<F>(arena: &Arena, source: &str, render: F) -> String
where
    F: Fn(cairn_ast::nodes::NodeIndex) -> String,
{
    let mut out = String::new();
    for index in arena.indices() {
        let node = arena.node(index);
        if node.kind.is_leaf() {
            out.push_str(&format!(
                "{} {} `{}`: {}\n",
                node.kind,
                node.span,
                node.span.text(source),
                render(index)
            ));
        } else {
            out.push_str(&format!("{} {}: {}\n", node.kind, node.span, render(index)));
        }
    }
    out
}
