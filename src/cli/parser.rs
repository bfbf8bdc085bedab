//! CLI argument parsing and structure definitions

use clap::{Parser, Subcommand};

use super::commands::{CacheArgs, LinkArgs};

/// Ontology entity linker
#[derive(Parser, Debug)]
#[command(name = "ontolink")]
#[command(
    author,
    version,
    about = "Link annotated mentions to ontology concepts",
    long_about = r#"
ontolink - link entity mentions to ontology concepts

Mentions are normalized (stopwords, stemming) and matched against the
labels of every concept below each category's taxonomy root: exact
normalized matches first, then the best similarity score above the
threshold.

SIMILARITY:
  j  - token-set Jaccard (default)
  e  - every-n-gram Jaccard
  w  - lexical sense path similarity (needs --lexicon)

EXAMPLES:
  ontolink link --ontology foodon.obo --brat annotations/ --output report.csv
  ontolink link --ontology foodon.obo --ner ner.json --similarity e --threshold 0.6
  ontolink cache clear --cache-dir .ontolink-cache
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Log level implied by `--verbose` / `--quiet`.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Link every mention of an annotation set and write a CSV report
    #[command(visible_alias = "l")]
    Link(LinkArgs),

    /// Manage the label index cache
    Cache(CacheArgs),
}
