//! Process-wide search resources: embedding model, vector index, metadata.
//!
//! Loading happens at most once per [`ResourceLoader`]. Every failure is
//! absorbed into an empty bundle so the engine can route to the fallback
//! path instead of surfacing an error.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::Record;
use crate::error::{FfError, Result};
use crate::search::embeddings::{Embedder, FlatIndex, build_embedder};
use crate::search::persistence::{read_index, read_metadata};

/// Model, index and metadata loaded together.
///
/// Read-only after construction. `metadata[i]` describes index row `i`.
pub struct ResourceBundle {
    pub embedder: Option<Arc<dyn Embedder>>,
    pub index: Option<FlatIndex>,
    pub metadata: Vec<Record>,
    /// Directory the artifacts were read from.
    pub source: Option<PathBuf>,
}

impl std::fmt::Debug for ResourceBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceBundle")
            .field("embedder", &self.embedder.as_ref().map(|e| e.name().to_string()))
            .field("index_rows", &self.index.as_ref().map(FlatIndex::len))
            .field("metadata", &self.metadata.len())
            .field("source", &self.source)
            .finish()
    }
}

impl ResourceBundle {
    /// The explicit "nothing loaded" state.
    pub const fn empty() -> Self {
        Self {
            embedder: None,
            index: None,
            metadata: Vec::new(),
            source: None,
        }
    }

    /// Assemble a bundle, checking that the three parts line up.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: FlatIndex,
        metadata: Vec<Record>,
    ) -> Result<Self> {
        if index.len() != metadata.len() {
            return Err(FfError::Index(format!(
                "index has {} rows but metadata has {} records",
                index.len(),
                metadata.len()
            )));
        }
        if index.dims() != embedder.dims() {
            return Err(FfError::Index(format!(
                "index dimension {} does not match {} embedder dimension {}",
                index.dims(),
                embedder.name(),
                embedder.dims()
            )));
        }
        Ok(Self {
            embedder: Some(embedder),
            index: Some(index),
            metadata,
            source: None,
        })
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// True when the semantic path can run.
    pub fn is_available(&self) -> bool {
        self.embedder.is_some() && self.index.is_some() && !self.metadata.is_empty()
    }
}

/// Lazily loads a [`ResourceBundle`] exactly once.
pub struct ResourceLoader {
    config: Config,
    cell: OnceLock<Arc<ResourceBundle>>,
    loads: AtomicUsize,
}

impl std::fmt::Debug for ResourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("loaded", &self.cell.get().is_some())
            .field("loads", &self.load_count())
            .finish_non_exhaustive()
    }
}

impl ResourceLoader {
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            cell: OnceLock::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// A loader whose bundle is already in place; nothing is read from disk.
    pub fn preloaded(bundle: ResourceBundle) -> Self {
        let loader = Self::new(Config::default());
        let _ = loader.cell.set(Arc::new(bundle));
        loader
    }

    /// Return the bundle, loading it on first use.
    pub fn ensure_loaded(&self) -> Arc<ResourceBundle> {
        Arc::clone(self.cell.get_or_init(|| {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Arc::new(self.load())
        }))
    }

    /// Number of load sequences that have run. Never exceeds 1.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Whether `ensure_loaded` has produced a bundle yet.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    fn load(&self) -> ResourceBundle {
        let Some(dir) = self.locate() else {
            warn!("no search artifacts found; semantic search unavailable");
            return ResourceBundle::empty();
        };

        match self.load_from(&dir) {
            Ok(bundle) => {
                info!(
                    source = %dir.display(),
                    records = bundle.metadata.len(),
                    "loaded search resources"
                );
                bundle
            }
            Err(err) => {
                warn!(source = %dir.display(), error = %err, "failed to load search resources");
                ResourceBundle::empty()
            }
        }
    }

    /// First candidate directory holding both artifacts.
    pub fn locate(&self) -> Option<PathBuf> {
        let resources = &self.config.resources;
        resources.candidate_dirs().into_iter().find(|dir| {
            let found = dir.join(&resources.index_file).is_file()
                && dir.join(&resources.metadata_file).is_file();
            debug!(dir = %dir.display(), found, "checked artifact location");
            found
        })
    }

    fn load_from(&self, dir: &Path) -> Result<ResourceBundle> {
        let resources = &self.config.resources;
        let embedder: Arc<dyn Embedder> = Arc::from(build_embedder(&self.config.search)?);
        let index = read_index(&dir.join(&resources.index_file))?;
        let metadata = read_metadata(&dir.join(&resources.metadata_file))?;
        Ok(ResourceBundle::new(embedder, index, metadata)?.with_source(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::embeddings::HashEmbedder;
    use crate::search::persistence::{write_index, write_metadata};
    use tempfile::tempdir;

    fn config_for(dir: &Path) -> Config {
        let mut config = Config::default();
        config.resources.data_dirs = vec![dir.display().to_string()];
        config.search.embedding_dims = 16;
        config
    }

    fn write_artifacts(dir: &Path, dims: usize, records: &[Record]) {
        let embedder = HashEmbedder::new(dims);
        let index = FlatIndex::from_rows(
            dims,
            records
                .iter()
                .map(|r| embedder.embed(r.name.as_deref().unwrap_or_default())),
        )
        .unwrap();
        write_index(&dir.join("faculty.index"), &index).unwrap();
        write_metadata(&dir.join("metadata.json"), records).unwrap();
    }

    #[test]
    fn empty_bundle_is_unavailable() {
        let bundle = ResourceBundle::empty();
        assert!(!bundle.is_available());
        assert!(bundle.index.is_none());
        assert!(bundle.metadata.is_empty());
    }

    #[test]
    fn bundle_rejects_misaligned_parts() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(2));
        let index = FlatIndex::from_rows(2, [vec![1.0, 0.0]]).unwrap();
        let err = ResourceBundle::new(Arc::clone(&embedder), index, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("rows"));

        let index = FlatIndex::from_rows(3, [vec![1.0, 0.0, 0.0]]).unwrap();
        let err = ResourceBundle::new(embedder, index, vec![Record::new(1, "A")]).unwrap_err();
        assert!(err.to_string().contains("dimension"));
    }

    #[test]
    fn loads_once_from_configured_dir() {
        let dir = tempdir().unwrap();
        write_artifacts(dir.path(), 16, &[Record::new(1, "Asha Rao")]);
        let loader = ResourceLoader::new(config_for(dir.path()));

        assert!(!loader.is_loaded());
        let first = loader.ensure_loaded();
        let second = loader.ensure_loaded();

        assert!(first.is_available());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.load_count(), 1);
        assert_eq!(first.source.as_deref(), Some(dir.path()));
    }

    #[test]
    fn dimension_mismatch_yields_empty_bundle() {
        let dir = tempdir().unwrap();
        write_artifacts(dir.path(), 8, &[Record::new(1, "Asha Rao")]);
        let loader = ResourceLoader::new(config_for(dir.path()));

        let bundle = loader.ensure_loaded();
        assert!(!bundle.is_available());
        assert_eq!(loader.load_count(), 1);
    }

    #[test]
    fn corrupt_metadata_yields_empty_bundle() {
        let dir = tempdir().unwrap();
        write_artifacts(dir.path(), 16, &[Record::new(1, "Asha Rao")]);
        std::fs::write(dir.path().join("metadata.json"), "[{").unwrap();
        let loader = ResourceLoader::new(config_for(dir.path()));

        assert!(!loader.ensure_loaded().is_available());
    }

    #[test]
    fn preloaded_never_counts_a_load() {
        let loader = ResourceLoader::preloaded(ResourceBundle::empty());
        assert!(loader.is_loaded());
        let _ = loader.ensure_loaded();
        assert_eq!(loader.load_count(), 0);
    }

    #[test]
    fn concurrent_first_use_loads_once() {
        let dir = tempdir().unwrap();
        write_artifacts(dir.path(), 16, &[Record::new(1, "Asha Rao")]);
        let loader = Arc::new(ResourceLoader::new(config_for(dir.path())));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                std::thread::spawn(move || loader.ensure_loaded().metadata.len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
        assert_eq!(loader.load_count(), 1);
    }
}
