//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// sqlsense - MySQL code completion at a caret position
#[derive(Parser, Debug)]
#[command(name = "sqlsense")]
#[command(about = "Compute code completion proposals for SQL text", long_about = None)]
#[command(version)]
pub struct Args {
    /// SQL file to complete (reads from stdin if omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Caret line, 0-based (defaults to the last line)
    #[arg(short, long)]
    pub line: Option<usize>,

    /// Caret column, 0-based character offset (defaults to end of line)
    #[arg(short, long)]
    pub column: Option<usize>,

    /// Default schema for unqualified object names
    #[arg(short, long, default_value = "")]
    pub schema: String,

    /// Render keyword proposals in upper case
    #[arg(short = 'u', long)]
    pub uppercase_keywords: bool,

    /// Metadata cache contents as JSON
    #[arg(short, long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Whitespace-delimited runtime function names (overrides built-ins)
    #[arg(long, value_name = "FILE")]
    pub functions: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
