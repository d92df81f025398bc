//! Command-line interface for offside
//! Transforms indentation-sensitive text into marker form and inspects the result.
//!
//! Usage:
//!   offside transform `<path>` [--profile `<yaml>`] [options]  - Print the marked text
//!   offside tokens `<path>` [--format `<format>`]              - Print the marked token stream
//!   offside tree `<path>` [--format `<format>`]                - Print the block tree
//!   offside expand `<path>` [--unit `<ws>`]                    - Re-indent already-marked text

use clap::{Arg, ArgAction, Command};
use std::io::Read;

use offside::blocks::{parse_marked, render_outline};
use offside::profile::Profile;
use offside::reindent::reindent;
use offside::tokens::{tokenize, tokenize_with_spans};
use offside::{OffsideStream, Source, TextSource};

fn main() {
    let matches = Command::new("offside")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Streaming indent/dedent marker transform for off-side-rule text")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("transform")
                .about("Transform a file and print the marked text")
                .arg(
                    Arg::new("path")
                        .help("Input file, or - for stdin")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("profile")
                        .long("profile")
                        .short('p')
                        .help("YAML configuration profile"),
                )
                .arg(
                    Arg::new("keep-whitespace")
                        .long("keep-whitespace")
                        .help("Replay the original whitespace after each marker")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .help("Indent marker character"),
                )
                .arg(
                    Arg::new("dedent")
                        .long("dedent")
                        .help("Dedent marker character"),
                )
                .arg(
                    Arg::new("escape")
                        .long("escape")
                        .help("Escape rule 'open:close', or a single open character for end-of-line")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Transform a file and print the marked token stream")
                .arg(
                    Arg::new("path")
                        .help("Input file, or - for stdin")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format ('text' or 'json')")
                        .default_value("text"),
                ),
        )
        .subcommand(
            Command::new("tree")
                .about("Transform a file and print the block tree the markers encode")
                .arg(
                    Arg::new("path")
                        .help("Input file, or - for stdin")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format ('text' or 'json')")
                        .default_value("text"),
                ),
        )
        .subcommand(
            Command::new("expand")
                .about("Re-indent already-marked text")
                .arg(
                    Arg::new("path")
                        .help("Input file, or - for stdin")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("unit")
                        .long("unit")
                        .help("Indentation unit")
                        .default_value("    "),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("transform", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            let escapes: Vec<String> = sub
                .get_many::<String>("escape")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            handle_transform_command(
                path,
                sub.get_one::<String>("profile"),
                sub.get_flag("keep-whitespace"),
                sub.get_one::<String>("indent"),
                sub.get_one::<String>("dedent"),
                &escapes,
            );
        }
        Some(("tokens", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            let format = sub.get_one::<String>("format").unwrap();
            handle_tokens_command(path, format);
        }
        Some(("tree", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            let format = sub.get_one::<String>("format").unwrap();
            handle_tree_command(path, format);
        }
        Some(("expand", sub)) => {
            let path = sub.get_one::<String>("path").unwrap();
            let unit = sub.get_one::<String>("unit").unwrap();
            handle_expand_command(path, unit);
        }
        _ => unreachable!(),
    }
}

/// Handle the transform command
fn handle_transform_command(
    path: &str,
    profile_path: Option<&String>,
    keep_whitespace: bool,
    indent: Option<&String>,
    dedent: Option<&String>,
    escapes: &[String],
) {
    let source = read_input(path);
    let mut stream = OffsideStream::new(TextSource::new(source));

    if let Some(profile_path) = profile_path {
        let profile = Profile::from_yaml_file(profile_path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        profile.apply(&mut stream);
    }
    if keep_whitespace {
        stream.set_keep_whitespace(true);
    }
    if let Some(marker) = indent {
        stream.set_indent_marker(single_char(marker, "--indent"));
    }
    if let Some(marker) = dedent {
        stream.set_dedent_marker(single_char(marker, "--dedent"));
    }
    for rule in escapes {
        apply_escape_argument(&mut stream, rule);
    }

    let marked = stream.read_to_end().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    print!("{}", marked);
}

/// Handle the tokens command
fn handle_tokens_command(path: &str, format: &str) {
    let source = read_input(path);
    let marked = offside::transform(&source).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    match format {
        "json" => {
            let tokens = tokenize_with_spans(&marked);
            let json = serde_json::to_string_pretty(&tokens).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
            println!("{}", json);
        }
        "text" => {
            for (token, span) in tokenize_with_spans(&marked) {
                println!("{:?}\t{:?}", span, token);
            }
        }
        other => {
            eprintln!("Error: unknown format '{}'", other);
            std::process::exit(1);
        }
    }
}

/// Handle the tree command
fn handle_tree_command(path: &str, format: &str) {
    let source = read_input(path);
    let marked = offside::transform(&source).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let blocks = parse_marked(&marked).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&blocks).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
            println!("{}", json);
        }
        "text" => {
            print!("{}", render_outline(&blocks, "  "));
        }
        other => {
            eprintln!("Error: unknown format '{}'", other);
            std::process::exit(1);
        }
    }
}

/// Handle the expand command
fn handle_expand_command(path: &str, unit: &str) {
    let marked = read_input(path);
    print!("{}", reindent(&tokenize(&marked), unit));
}

/// Read the input file, or stdin when the path is `-`.
fn read_input(path: &str) -> String {
    let result = if path == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        std::fs::read_to_string(path)
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error reading input: {}", e);
        std::process::exit(1);
    })
}

/// Parse a one-character argument value.
fn single_char(value: &str, flag: &str) -> char {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            eprintln!("Error: {} takes exactly one character, got {:?}", flag, value);
            std::process::exit(1);
        }
    }
}

/// Apply an `open:close` escape argument; `open` alone escapes to end of line.
fn apply_escape_argument<S: Source>(stream: &mut OffsideStream<S>, rule: &str) {
    let chars: Vec<char> = rule.chars().collect();
    match chars.as_slice() {
        [open] => stream.add_single_line_escape(*open),
        [open, ':', close] => stream.add_char_escape(*open, *close),
        _ => {
            eprintln!(
                "Error: --escape takes 'open:close' or a single open character, got {:?}",
                rule
            );
            std::process::exit(1);
        }
    }
}
