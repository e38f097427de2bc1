//! sluice-extract: pull anchored key values out of nested JSON
//!
//! Usage:
//!   # Everything under any "development" anchor
//!   sluice-extract config.json --path development --key env
//!
//!   # Read from stdin
//!   echo '{"a":{"x":"v"}}' | sluice-extract --path a --key x
//!
//!   # Narrow with a chain of anchor keys, pick one array element
//!   sluice-extract config.json --chain a,a1 --key x --index 0
//!
//!   # Parse a string field as an embedded JSON document first
//!   sluice-extract events.json --string-field payload --path a --key x
//!
//!   # Process NDJSON, one document per line
//!   sluice-extract --ndjson events.jsonl --path a --key x

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Result};
use clap::Parser;
use serde_json::Value;
use sluice::{
    extract_all_values, extract_all_values_with_index, extract_from_string_field,
    extract_from_string_field_with_path_chain, extract_with_path_chain,
    extract_with_path_chain_and_index, ValueSet,
};
use std::fs::File;
use std::io::{BufReader, Read};

#[derive(Parser, Debug)]
#[command(name = "sluice-extract")]
#[command(about = "Extract anchored key values from nested JSON", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Anchor key to search for at any depth
    #[arg(long, conflicts_with = "chain")]
    path: Option<String>,

    /// Comma-separated chain of anchor keys, consumed in order
    #[arg(long)]
    chain: Option<String>,

    /// Target key whose values are collected
    #[arg(long, short = 'k')]
    key: String,

    /// Visit only the n-th element of every array during traversal
    #[arg(long, conflicts_with = "string_field")]
    index: Option<usize>,

    /// Parse this field's string value as an embedded JSON document and
    /// extract from the parsed result
    #[arg(long)]
    string_field: Option<String>,

    /// Process newline-delimited JSON (one document per line)
    #[arg(long)]
    ndjson: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let reader: Box<dyn Read> = if let Some(file_path) = &args.input {
        Box::new(BufReader::new(File::open(file_path)?))
    } else {
        Box::new(std::io::stdin())
    };

    let mut content = Vec::new();
    let mut buf_reader = BufReader::new(reader);
    buf_reader.read_to_end(&mut content)?;

    let results = if args.ndjson {
        extract_lines(&content, &args)?
    } else {
        let doc = parse_content(content)?;
        run_extraction(&doc, &args)?
    };

    println!("{}", serde_json::to_string(&results)?);
    Ok(())
}

/// Parse a whole document, trying SIMD first for large inputs
fn parse_content(mut content: Vec<u8>) -> Result<Value> {
    // Try SIMD parsing first (faster), round-tripping into serde_json::Value
    match simd_json::to_owned_value(&mut content) {
        Ok(parsed) => {
            let json_str = simd_json::to_string(&parsed)?;
            Ok(serde_json::from_str(&json_str)?)
        }
        Err(_) => {
            // Fallback to serde_json for input simd-json rejects
            let content_str = String::from_utf8_lossy(&content);
            Ok(serde_json::from_str(content_str.trim())?)
        }
    }
}

/// Extract from each NDJSON line and union the results in order
fn extract_lines(content: &[u8], args: &Args) -> Result<ValueSet> {
    let content_str = String::from_utf8_lossy(content);
    let mut results = ValueSet::new();

    for line in content_str.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let doc: Value = serde_json::from_str(line)?;
        results.extend(run_extraction(&doc, args)?);
    }

    Ok(results)
}

/// Dispatch to the extraction operation the flags select
fn run_extraction(doc: &Value, args: &Args) -> Result<ValueSet> {
    let results = match (&args.path, &args.chain) {
        (Some(path_key), None) => match (&args.string_field, args.index) {
            (Some(field), _) => extract_from_string_field(doc, field, path_key, &args.key)?,
            (None, Some(index)) => {
                extract_all_values_with_index(doc, path_key, &args.key, index)?
            }
            (None, None) => extract_all_values(doc, path_key, &args.key)?,
        },
        (None, Some(chain)) => {
            let keys: Vec<&str> = chain.split(',').map(str::trim).collect();
            match (&args.string_field, args.index) {
                (Some(field), _) => {
                    extract_from_string_field_with_path_chain(doc, field, &keys, &args.key)?
                }
                (None, Some(index)) => {
                    extract_with_path_chain_and_index(doc, &keys, &args.key, index)?
                }
                (None, None) => extract_with_path_chain(doc, &keys, &args.key)?,
            }
        }
        _ => bail!("exactly one of --path or --chain is required"),
    };

    Ok(results)
}
