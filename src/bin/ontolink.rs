//! ontolink - link annotated mentions to ontology concepts
//!
//! # Usage
//!
//! ```bash
//! # Link BRAT annotations against FoodOn
//! ontolink link --ontology foodon.obo --brat annotations/ --output report.csv
//!
//! # NER output, n-gram similarity, stricter threshold, cached index
//! ontolink link --ontology foodon.obo --ner ner.json -s e -t 0.6 --cache-dir .ontolink-cache
//!
//! # Sense-path similarity needs a lexicon
//! ontolink link --ontology foodon.obo --taisti recipes.csv -s w --lexicon senses.json
//!
//! # Drop cached indexes
//! ontolink cache clear --cache-dir .ontolink-cache
//! ```
//!
//! Logging goes to stderr; `RUST_LOG` overrides `--verbose` / `--quiet`.

use std::process::ExitCode;

use clap::Parser;

use ontolink::cli::commands::{cmd_cache, cmd_link};
use ontolink::cli::output::color;
use ontolink::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();

    let result: Result<(), String> = match cli.command {
        Commands::Link(args) => cmd_link(args, cli.quiet),
        Commands::Cache(args) => cmd_cache(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", color("31", "error:"), e);
            ExitCode::FAILURE
        }
    }
}
