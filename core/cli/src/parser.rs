//! Command line argument parsing for the Cairn compiler.
//!
//! This module defines the CLI interface using `clap`. The `Cli` struct captures
//! all command line flags and arguments passed to the `cairnc` binary.

use clap::Parser;

/// Command line interface definition for the Cairn compiler.
///
/// Users request what to print via flags. The source is always read first; the
/// type checker runs when any of `--check`, `--types` or `--json` is given.
///
/// ## Examples
///
/// Print the syntax tree:
/// ```bash
/// cairnc example.crn --parse
/// ```
///
/// Check and print each node's type:
/// ```bash
/// cairnc example.crn --check --types
/// ```
#[derive(Parser)]
#[command(
    name = "cairnc",
    author,
    version,
    about = "Cairn compiler CLI (cairnc)",
    long_about = "The 'cairnc' command reads a single Cairn source file and runs the front end over it. \
Parse prints the syntax tree; check reports type errors; types and json print the typed tree."
)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct Cli {
    /// Path to the source file.
    pub(crate) path: std::path::PathBuf,

    /// Read the source and print the syntax tree.
    ///
    /// Reader errors are reported to stderr and the process exits with code 1.
    #[clap(long = "parse", action = clap::ArgAction::SetTrue)]
    pub(crate) parse: bool,

    /// Type-check the program and report every diagnostic to stderr.
    ///
    /// The process exits with code 1 if any diagnostic was found.
    #[clap(long = "check", action = clap::ArgAction::SetTrue)]
    pub(crate) check: bool,

    /// Print the type of every node after checking.
    #[clap(long = "types", action = clap::ArgAction::SetTrue)]
    pub(crate) types: bool,

    /// Print node types and diagnostics as JSON.
    #[clap(long = "json", action = clap::ArgAction::SetTrue)]
    pub(crate) json: bool,
}
