//! Link command: annotations in, CSV report out.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{ArgGroup, Parser};

use super::super::output::{color, log_info, percent};
use crate::cache::{CacheKey, IndexCache};
use crate::config::LinkerConfig;
use crate::index::{IndexBuilder, LabelIndex};
use crate::ingest::AnnotationInput;
use crate::linker::Linker;
use crate::normalize::{Normalizer, TextNormalizer};
use crate::ontology::Ontology;
use crate::report::ReportWriter;
use crate::sense::{SenseInventory, SenseLexicon};
use crate::similarity::StrategyKind;

/// Link every mention of an annotation set
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["brat", "ner", "taisti"])))]
pub struct LinkArgs {
    /// Ontology file (.obo, or JSON concept list)
    #[arg(long, value_name = "PATH")]
    pub ontology: PathBuf,

    /// Folder of BRAT <n>.txt / <n>.ann pairs
    #[arg(long, value_name = "DIR")]
    pub brat: Option<PathBuf>,

    /// NER output JSON
    #[arg(long, value_name = "PATH")]
    pub ner: Option<PathBuf>,

    /// TAISTI dataset CSV
    #[arg(long, value_name = "PATH")]
    pub taisti: Option<PathBuf>,

    /// Report file
    #[arg(short, long, default_value = "./report.csv", value_name = "PATH")]
    pub output: String,

    /// Similarity: j (jaccard), e (every n-gram), w (sense path)
    #[arg(short, long, value_name = "CODE")]
    pub similarity: Option<String>,

    /// Minimum similarity (exclusive) for a match
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Sense lexicon JSON, required for `--similarity w`
    #[arg(long, value_name = "PATH")]
    pub lexicon: Option<PathBuf>,

    /// Linker configuration JSON
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Reuse label indexes cached in this directory
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Leave unlinked mentions out of the report
    #[arg(long)]
    pub ignore_unlinked: bool,

    /// Warn about labels that normalize to the same key
    #[arg(long)]
    pub warn_collisions: bool,
}

impl LinkArgs {
    /// The annotation source selected on the command line.
    pub fn input(&self) -> Result<AnnotationInput, String> {
        match (&self.brat, &self.ner, &self.taisti) {
            (Some(dir), None, None) => Ok(AnnotationInput::Brat(dir.clone())),
            (None, Some(file), None) => Ok(AnnotationInput::Ner(file.clone())),
            (None, None, Some(file)) => Ok(AnnotationInput::TaistiCsv(file.clone())),
            _ => Err("exactly one of --brat, --ner, --taisti is required".to_string()),
        }
    }

    /// File configuration with command-line overrides applied.
    pub fn linker_config(&self) -> Result<LinkerConfig, String> {
        let mut config = match &self.config {
            Some(path) => LinkerConfig::from_path(path)
                .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?,
            None => LinkerConfig::default(),
        };
        if let Some(code) = &self.similarity {
            let strategy = code
                .parse::<StrategyKind>()
                .unwrap_or_else(|_| StrategyKind::from_short_code(code));
            config = config.with_strategy(strategy);
        }
        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }
        if self.warn_collisions {
            config = config.with_collision_warnings(true);
        }
        config
            .validate()
            .map_err(|e| format!("Failed to validate config: {}", e))?;
        Ok(config)
    }
}

/// Load the ontology, build (or reuse) the index, link, and report.
pub fn cmd_link(args: LinkArgs, quiet: bool) -> Result<(), String> {
    let config = args.linker_config()?;
    let input = args.input()?;
    let normalizer = Arc::new(TextNormalizer::new());

    let senses: Option<Arc<dyn SenseInventory>> = match (config.strategy, &args.lexicon) {
        (StrategyKind::WordnetPath, None) => {
            return Err("--similarity w requires --lexicon".to_string());
        }
        (StrategyKind::WordnetPath, Some(path)) => {
            let lexicon = SenseLexicon::from_path(path, normalizer.as_ref())
                .map_err(|e| format!("Failed to load lexicon {}: {}", path.display(), e))?;
            Some(Arc::new(lexicon))
        }
        _ => None,
    };

    let start = Instant::now();
    let ontology = Ontology::from_path(&args.ontology)
        .map_err(|e| format!("Failed to load ontology {}: {}", args.ontology.display(), e))?;
    log_info(
        &format!("Loaded {} concepts from {}", ontology.len(), args.ontology.display()),
        quiet,
    );

    let build = || -> crate::Result<LabelIndex> {
        let (index, stats) = IndexBuilder::new(normalizer.as_ref(), &config.roots)
            .warn_on_collisions(config.warn_on_collisions)
            .build_with_stats(&ontology);
        if stats.collisions > 0 && !config.warn_on_collisions {
            log::info!(
                "{} labels collided after normalization (use --warn-collisions for details)",
                stats.collisions
            );
        }
        Ok(index)
    };
    let index = match &args.cache_dir {
        Some(dir) => {
            let key = CacheKey::for_inputs(&ontology, normalizer.as_ref(), &config.roots);
            IndexCache::new(dir)
                .load_or_build(&key, build)
                .map_err(|e| format!("Failed to use index cache {}: {}", dir.display(), e))?
        }
        None => build().map_err(|e| format!("Failed to build label index: {}", e))?,
    };
    drop(ontology);

    let normalizer: Arc<dyn Normalizer> = normalizer;
    let linker = Linker::from_config(&config, Arc::new(index), normalizer, senses)
        .map_err(|e| format!("Failed to create linker: {}", e))?;

    let docs = input
        .read()
        .map_err(|e| format!("Failed to read annotations {}: {}", input.path().display(), e))?;

    log_info(&format!("Writing output to: {}", args.output), quiet);
    let mut report = ReportWriter::create(&args.output)
        .map_err(|e| format!("Failed to create {}: {}", args.output, e))?;
    let stats = crate::link_documents(&linker, &docs, &mut report, args.ignore_unlinked)
        .map_err(|e| format!("Failed to write report {}: {}", args.output, e))?;

    log_info(
        &format!(
            "{} linked {}/{} mentions ({:.1}%): {} exact, {} similarity, {} unlinked [{} strategy, {:.2}s]",
            color("32", "✓"),
            stats.linked(),
            stats.mentions,
            percent(stats.linked(), stats.mentions),
            stats.exact,
            stats.similarity,
            stats.unlinked,
            linker.strategy().name(),
            start.elapsed().as_secs_f64()
        ),
        quiet,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> LinkArgs {
        let mut argv = vec!["link", "--ontology", "o.obo", "--ner", "n.json"];
        argv.extend_from_slice(extra);
        LinkArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_similarity_codes() {
        let kind = |code: &str| args(&["--similarity", code]).linker_config().unwrap().strategy;
        assert_eq!(kind("j"), StrategyKind::Jaccard);
        assert_eq!(kind("E"), StrategyKind::Ngram);
        assert_eq!(kind("w"), StrategyKind::WordnetPath);
        assert_eq!(kind("ngram"), StrategyKind::Ngram);
        assert_eq!(kind("x"), StrategyKind::Jaccard);
    }

    #[test]
    fn test_threshold_override_validated() {
        assert_eq!(args(&["-t", "0.7"]).linker_config().unwrap().threshold, 0.7);
        assert!(args(&["-t", "1.5"]).linker_config().is_err());
    }

    #[test]
    fn test_input_selection() {
        assert_eq!(
            args(&[]).input().unwrap(),
            AnnotationInput::Ner(PathBuf::from("n.json"))
        );
    }

    #[test]
    fn test_wordnet_needs_lexicon() {
        let err = cmd_link(args(&["--similarity", "w"]), true).unwrap_err();
        assert!(err.contains("--lexicon"));
    }
}
