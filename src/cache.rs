//! On-disk cache of built label indexes.
//!
//! Building an index walks the whole ontology, so results are stored as
//! JSON under an explicit [`CacheKey`]. The key covers every input that
//! changes the index (ontology source, normalizer, taxonomy roots); when
//! any of them changes the old file is simply never read again.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::config::TaxonomyRoots;
use crate::error::{Error, Result};
use crate::index::LabelIndex;
use crate::normalize::Normalizer;
use crate::ontology::OntologyView;

const FILE_PREFIX: &str = "label-index-";
const FILE_SUFFIX: &str = ".json";

/// Content key of a cached index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for an index built from these inputs.
    #[must_use]
    pub fn new(ontology_fingerprint: &str, normalizer_version: &str, roots: &TaxonomyRoots) -> Self {
        let roots = roots.fingerprint_material();
        let mut hasher = Sha256::new();
        for part in [ontology_fingerprint, normalizer_version, roots.as_str()] {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Key for indexing `ontology` with `normalizer` under `roots`.
    #[must_use]
    pub fn for_inputs(
        ontology: &dyn OntologyView,
        normalizer: &dyn Normalizer,
        roots: &TaxonomyRoots,
    ) -> Self {
        Self::new(ontology.source_fingerprint(), normalizer.version(), roots)
    }

    /// Hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn file_name(&self) -> String {
        format!("{}{}{}", FILE_PREFIX, self.0, FILE_SUFFIX)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory of cached label indexes.
#[derive(Debug, Clone)]
pub struct IndexCache {
    dir: PathBuf,
}

impl IndexCache {
    /// Cache rooted at `dir`. The directory is created on first store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for `key`.
    #[must_use]
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Load the index stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// I/O failures other than "not found", and entries that do not parse.
    pub fn load(&self, key: &CacheKey) -> Result<Option<LabelIndex>> {
        let path = self.path_for(key);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("label index cache miss ({})", key);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let index = serde_json::from_str(&json).map_err(|e| {
            Error::cache(format!("corrupt cache entry {}: {}", path.display(), e))
        })?;
        log::info!("label index cache hit ({})", key);
        Ok(Some(index))
    }

    /// Store `index` under `key`, replacing any previous entry.
    pub fn store(&self, key: &CacheKey, index: &LabelIndex) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // write-then-rename so readers never see a partial file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(index)?)?;
        fs::rename(&tmp, &path)?;
        log::debug!("stored label index at {}", path.display());
        Ok(())
    }

    /// Remove the entry for `key`. Returns whether one existed.
    pub fn invalidate(&self, key: &CacheKey) -> Result<bool> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Keys of every stored entry.
    pub fn entries(&self) -> Result<Vec<CacheKey>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(hex) = name
                .strip_prefix(FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
            {
                keys.push(CacheKey(hex.to_string()));
            }
        }
        keys.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(keys)
    }

    /// Remove every cached index. Other files in the directory are left
    /// alone. Returns the number of entries removed.
    pub fn clear(&self) -> Result<usize> {
        let keys = self.entries()?;
        for key in &keys {
            self.invalidate(key)?;
        }
        Ok(keys.len())
    }

    /// Load the entry for `key`, or build and store it.
    ///
    /// A corrupt entry is rebuilt and overwritten.
    pub fn load_or_build<F>(&self, key: &CacheKey, build: F) -> Result<LabelIndex>
    where
        F: FnOnce() -> Result<LabelIndex>,
    {
        match self.load(key) {
            Ok(Some(index)) => return Ok(index),
            Ok(None) => {}
            Err(Error::Cache(msg)) => log::warn!("{}; rebuilding", msg),
            Err(e) => return Err(e),
        }
        let index = build()?;
        self.store(key, &index)?;
        Ok(index)
    }
}
