//! Cache command: inspect and drop cached label indexes.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use super::super::output::{color, format_size};
use crate::cache::{CacheKey, IndexCache};
use crate::config::LinkerConfig;
use crate::normalize::TextNormalizer;
use crate::ontology::Ontology;

/// Manage the label index cache
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// What to do with the cache.
    #[command(subcommand)]
    pub action: CacheAction,

    /// Cache directory
    #[arg(long, global = true, default_value = ".ontolink-cache", value_name = "DIR")]
    pub cache_dir: PathBuf,
}

/// Cache subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached indexes
    List,
    /// Remove every cached index
    Clear,
    /// Remove the index cached for one ontology and configuration
    Invalidate {
        /// Ontology file the index was built from
        #[arg(long, value_name = "PATH")]
        ontology: PathBuf,

        /// Linker configuration the index was built with
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

/// Run a cache subcommand.
pub fn cmd_cache(args: CacheArgs) -> Result<(), String> {
    let cache = IndexCache::new(&args.cache_dir);

    match args.action {
        CacheAction::List => {
            let keys = cache
                .entries()
                .map_err(|e| format!("Failed to read cache directory: {}", e))?;
            println!("Cached label indexes ({}):", keys.len());
            for key in keys {
                let size = fs::metadata(cache.path_for(&key))
                    .map(|m| m.len())
                    .unwrap_or(0);
                println!("  {} ({})", key, format_size(size));
            }
        }
        CacheAction::Clear => {
            let removed = cache
                .clear()
                .map_err(|e| format!("Failed to clear cache: {}", e))?;
            println!("{} Removed {} cached index(es)", color("32", "✓"), removed);
        }
        CacheAction::Invalidate { ontology, config } => {
            let config = match config {
                Some(path) => LinkerConfig::from_path(&path)
                    .map_err(|e| format!("Failed to load config {}: {}", path.display(), e))?,
                None => LinkerConfig::default(),
            };
            let loaded = Ontology::from_path(&ontology)
                .map_err(|e| format!("Failed to load ontology {}: {}", ontology.display(), e))?;
            let key = CacheKey::for_inputs(&loaded, &TextNormalizer::new(), &config.roots);
            let removed = cache
                .invalidate(&key)
                .map_err(|e| format!("Failed to invalidate {}: {}", key, e))?;
            if removed {
                println!("{} Invalidated {}", color("32", "✓"), key);
            } else {
                println!("No cached index for {}", ontology.display());
            }
        }
    }
    Ok(())
}
