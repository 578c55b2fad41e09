//! sqlsense CLI - MySQL code completion at a caret position.

mod cli;
mod output;

use std::fs;
use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sqlsense_core::{get_code_completion_list, MemoryCache, MetadataDocument, ParserSession};

use cli::{Args, OutputFormat};

/// Runtime functions a stock server ships; used when no list is supplied.
const BUILTIN_FUNCTIONS: &str = "abs avg bin ceiling char_length coalesce concat concat_ws \
    count curdate curtime database date_add date_format date_sub datediff dayname dayofmonth \
    dayofweek dayofyear floor format from_unixtime greatest group_concat hex hour ifnull \
    instr last_insert_id lcase least left length locate lower lpad ltrim max md5 min minute \
    mod month monthname now nullif pow power quarter rand repeat replace reverse right round \
    rpad rtrim second sha1 sign sqrt substring substring_index sum timestampdiff trim truncate \
    ucase unix_timestamp upper uuid version week weekday year";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("sqlsense: error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let sql = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading SQL from {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading SQL from stdin")?;
            buffer
        }
    };

    let cache = match &args.metadata {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading metadata from {}", path.display()))?;
            let document: MetadataDocument =
                serde_json::from_str(&raw).context("parsing metadata document")?;
            MemoryCache::from_document(document)
        }
        None => MemoryCache::with_defaults(),
    };

    let functions = match &args.functions {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading function names from {}", path.display()))?,
        None => BUILTIN_FUNCTIONS.to_string(),
    };

    let (line, column) = caret_position(&sql, args.line, args.column);

    let session = ParserSession::new(&sql);
    let proposals = get_code_completion_list(
        line,
        column,
        &args.schema,
        args.uppercase_keywords,
        &session,
        &functions,
        &cache,
    );
    debug!(count = proposals.len(), line, column, "completion finished");

    let rendered = match args.format {
        OutputFormat::Table => output::format_table(&proposals),
        OutputFormat::Json => output::format_json(&proposals)?,
    };
    print!("{rendered}");
    if args.format == OutputFormat::Json {
        println!();
    }

    Ok(())
}

/// Fills in caret defaults: the end of the buffer, or the end of the
/// requested line.
fn caret_position(sql: &str, line: Option<usize>, column: Option<usize>) -> (usize, usize) {
    let lines: Vec<&str> = sql.split('\n').collect();
    let line = line.unwrap_or(lines.len().saturating_sub(1));
    let column = column.unwrap_or_else(|| {
        lines
            .get(line)
            .map(|text| text.chars().count())
            .unwrap_or(0)
    });
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_defaults_to_end_of_buffer() {
        assert_eq!(caret_position("SELECT 1", None, None), (0, 8));
        assert_eq!(caret_position("SELECT 1\nFROM t", None, None), (1, 6));
    }

    #[test]
    fn explicit_line_defaults_to_its_end() {
        assert_eq!(caret_position("SELECT 1\nFROM t", Some(0), None), (0, 8));
        assert_eq!(caret_position("SELECT 1\nFROM t", Some(0), Some(3)), (0, 3));
    }

    #[test]
    fn builtin_function_list_is_whitespace_delimited() {
        assert!(BUILTIN_FUNCTIONS.split_whitespace().count() > 50);
        assert!(BUILTIN_FUNCTIONS.split_whitespace().all(|f| !f.is_empty()));
    }
}
