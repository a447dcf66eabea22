// SPDX-FileCopyrightText: 2025 Daniel Vrátil <me@dvratil.cz>
//
// SPDX-License-Identifier: MIT

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as _;
use pest::Parser;
use pest::iterators::Pair;
use tacgen::ir::InvariantPolicy;
use tacgen::parser::{Rule, TacParser};
use tacgen::{TacGenBuilder, default_output_handler};

#[derive(clap::Parser)]
#[command(name = "tacgen")]
#[command(version, about = "Three-address code generator", long_about = None)]
struct Cli {
    /// Source file to compile, stdin when omitted
    input: Option<PathBuf>,

    /// Abort on the first invariant violation instead of emitting an `error` line
    #[arg(long)]
    strict: bool,

    /// Print the program, parse tree and AST before the generated code
    #[arg(long)]
    stages: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn print_pair(pair: &Pair<Rule>, indent: usize) {
    let indent_str = " ".repeat(indent);
    println!(
        "{}Rule::{:?} -> {:?}",
        indent_str,
        pair.as_rule(),
        pair.as_str()
    );
    for inner_pair in pair.clone().into_inner() {
        print_pair(&inner_pair, indent + 2);
    }
}

fn read_source(input: Option<&PathBuf>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn print_stages(source: &str) -> Result<(), tacgen::Error> {
    println!("=== PROGRAM ====");
    println!("{}", source);

    println!("\n=== PARSER ===");
    let pairs = TacParser::parse(Rule::program, source).map_err(Box::new)?;
    for pair in pairs {
        print_pair(&pair, 0);
    }

    println!("\n=== AST ===");
    println!("{:#?}", tacgen::parse(source)?);

    println!("\n=== TAC ===");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let source = match read_source(cli.input.as_ref()) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: failed to read input: {err}");
            return ExitCode::FAILURE;
        }
    };

    if cli.stages {
        if let Err(err) = print_stages(&source) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    let policy = if cli.strict {
        InvariantPolicy::Fail
    } else {
        InvariantPolicy::EmitMarker
    };
    let mut tacgen = TacGenBuilder::default()
        .invariant_policy(policy)
        .output_handler(default_output_handler)
        .build();

    match tacgen.compile(&source) {
        Ok(report) => {
            log::info!(
                "Generated {} lines with {} violations",
                report.emitted,
                report.violations.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
