use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use tmploc::keys;

/// Compute resource hash keys for source strings, compatible with the
/// keys produced by every extractor in the localization pipeline.
#[derive(Parser)]
#[command(name = "hashkey", version, about)]
struct Arguments {
    /// Source strings to hash
    #[arg(required = true)]
    strings: Vec<String>,

    /// String-literal grammar to unescape before hashing
    #[arg(long, value_enum, default_value_t = Grammar::Java)]
    grammar: Grammar,

    /// Emit the results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Grammar {
    /// Java string literals
    Java,
    /// Ruby double-quoted string literals
    Ruby,
    /// Ruby single-quoted string literals (no unescaping)
    RubySingle,
}

#[derive(Serialize)]
struct KeyedString<'a> {
    source: &'a str,
    key: Option<String>,
}

fn main() -> ExitCode {
    let args = Arguments::parse();

    let keyed: Vec<KeyedString> = args
        .strings
        .iter()
        .map(|source| {
            let key = match args.grammar {
                Grammar::Java => keys::java_key(source),
                Grammar::Ruby => keys::ruby_key(source),
                Grammar::RubySingle => keys::ruby_key_unescaped(source),
            };
            KeyedString { source, key }
        })
        .collect();

    if args.json {
        match serde_json::to_string_pretty(&keyed) {
            Ok(text) => println!("{}", text),
            Err(err) => {
                eprintln!("Error: {}", err);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for keyed in &keyed {
            println!("{}\t{}", keyed.key.as_deref().unwrap_or("-"), keyed.source);
        }
    }
    ExitCode::SUCCESS
}
