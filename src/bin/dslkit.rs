//! Command-line interface for dslkit
//! This binary loads declarative grammar files and runs them against input text.
//!
//! Usage:
//!   dslkit tokens `<grammar>` `<input>` [--text]                  - Tokenize only
//!   dslkit parse `<grammar>` `<input>` [--text] [--format `<fmt>`]  - Parse and print the result
//!   dslkit inspect `<grammar>` [--format `<fmt>`]                  - Show tokens, rules and actions
//!   dslkit convert `<grammar>` `<output>`                          - Rewrite a grammar as YAML or JSON
//!
//! Grammar files carry no action code, so parsing runs with the default action for every
//! action name that is not builtin. Set `RUST_LOG` (e.g. `RUST_LOG=dslkit=debug`) for logs.

use clap::{Arg, ArgAction, ArgMatches, Command};
use dslkit::dsl::{Dsl, GrammarConfig, GrammarLoader, ParseError, ParserConfig};
use serde::Serialize;

fn main() {
    let mut logger = pretty_env_logger::formatted_builder();
    logger.filter_level(log::LevelFilter::Warn);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    let matches = Command::new("dslkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run declarative grammars against text")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokens")
                .about("Tokenize input without parsing")
                .arg(grammar_arg())
                .arg(input_arg())
                .arg(text_arg()),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse input and print the resulting value")
                .arg(grammar_arg())
                .arg(input_arg())
                .arg(text_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["json", "yaml"])
                        .default_value("json"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show the tokens, rules and actions of a grammar")
                .arg(grammar_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["text", "json", "yaml"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Rewrite a grammar file; the output extension picks YAML or JSON")
                .arg(grammar_arg())
                .arg(
                    Arg::new("output")
                        .help("Path of the grammar file to write")
                        .required(true)
                        .index(2),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("tokens", tokens_matches)) => handle_tokens_command(tokens_matches),
        Some(("parse", parse_matches)) => handle_parse_command(parse_matches),
        Some(("inspect", inspect_matches)) => {
            let grammar = inspect_matches.get_one::<String>("grammar").unwrap();
            let format = inspect_matches.get_one::<String>("format").unwrap();
            handle_inspect_command(grammar, format);
        }
        Some(("convert", convert_matches)) => {
            let grammar = convert_matches.get_one::<String>("grammar").unwrap();
            let output = convert_matches.get_one::<String>("output").unwrap();
            handle_convert_command(grammar, output);
        }
        _ => unreachable!(),
    }
}

fn grammar_arg() -> Arg {
    Arg::new("grammar")
        .help("Path to the grammar file (.yaml, .yml or .json)")
        .required(true)
        .index(1)
}

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Path to the input file, or the input itself with --text")
        .required(true)
        .index(2)
}

fn text_arg() -> Arg {
    Arg::new("text")
        .long("text")
        .short('t')
        .help("Treat the input argument as literal text")
        .action(ArgAction::SetTrue)
}

/// Handle the tokens command
fn handle_tokens_command(matches: &ArgMatches) {
    let dsl = load_grammar(matches.get_one::<String>("grammar").unwrap());
    let input = read_input(matches);

    let tokens = dsl.tokenize(&input).unwrap_or_else(|e| fail_parse(&e));
    for token in &tokens {
        println!("{}", token);
    }
}

/// Handle the parse command
fn handle_parse_command(matches: &ArgMatches) {
    let mut dsl = load_grammar(matches.get_one::<String>("grammar").unwrap());
    let input = read_input(matches);
    let format = matches.get_one::<String>("format").unwrap();

    let result = dsl.parse(&input).unwrap_or_else(|e| fail_parse(&e));
    print!("{}", serialize(&result.value, format));
}

/// Handle the inspect command
fn handle_inspect_command(grammar: &str, format: &str) {
    let snapshot = load_grammar(grammar).snapshot();
    match format {
        "text" => print!("{}", snapshot),
        _ => print!("{}", serialize(&snapshot, format)),
    }
}

/// Handle the convert command
fn handle_convert_command(grammar: &str, output: &str) {
    let dsl = load_grammar(grammar);
    GrammarConfig::from_dsl(&dsl)
        .save(output)
        .unwrap_or_else(|e| {
            eprintln!("Error writing {}: {}", output, e);
            std::process::exit(1);
        });
    log::info!("wrote {}", output);
}

fn load_grammar(path: &str) -> Dsl {
    GrammarLoader::with_config(ParserConfig::lenient())
        .from_path(path)
        .unwrap_or_else(|e| {
            eprintln!("Error loading grammar: {}", e);
            std::process::exit(1);
        })
}

fn read_input(matches: &ArgMatches) -> String {
    let input = matches.get_one::<String>("input").unwrap();
    if matches.get_flag("text") {
        return input.clone();
    }
    std::fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    })
}

fn serialize<T: Serialize>(value: &T, format: &str) -> String {
    let output = match format {
        "yaml" => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        _ => serde_json::to_string_pretty(value)
            .map(|json| json + "\n")
            .map_err(|e| e.to_string()),
    };
    output.unwrap_or_else(|e| {
        eprintln!("Serialization error: {}", e);
        std::process::exit(1);
    })
}

fn fail_parse(err: &ParseError) -> ! {
    eprint!("{}", err.detailed());
    std::process::exit(1);
}
