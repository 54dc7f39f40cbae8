//! Corpus and index directory layout.
//!
//! All on-disk state lives under a single data root (default `./data`,
//! overridable with `VITAE_DATA_DIR`), mirroring the layout the offline
//! ingestion job and the serving pipeline agree on:
//!
//! - `data/cv/` — CV sources (`.pdf`, `.md`)
//! - `data/skills_md/` — skills documentation tree (`.md`, nested freely)
//! - `data/vectorstore/` — the persisted vector index

use std::path::{Path, PathBuf};

use crate::error::{CorpusError, CorpusResult};

/// Resolved corpus directories.
#[derive(Debug, Clone)]
pub struct CorpusPaths {
    /// The data root everything else hangs off.
    pub root: PathBuf,
    /// `root/cv/` — CV PDFs and Markdown.
    pub cv_dir: PathBuf,
    /// `root/skills_md/` — skills documents, arbitrarily nested.
    pub skills_dir: PathBuf,
    /// `root/vectorstore/` — persisted vector index.
    pub index_dir: PathBuf,
}

impl CorpusPaths {
    /// Resolve the layout under an explicit root, or fall back to
    /// `VITAE_DATA_DIR`, or `./data`.
    pub fn resolve(root: Option<&Path>) -> Self {
        let root = root
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("VITAE_DATA_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("data"));
        Self::under(&root)
    }

    /// Derive the layout under a given root without consulting the environment.
    pub fn under(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            cv_dir: root.join("cv"),
            skills_dir: root.join("skills_md"),
            index_dir: root.join("vectorstore"),
        }
    }

    /// Create all corpus directories. Idempotent.
    pub fn ensure_dirs(&self) -> CorpusResult<()> {
        for dir in [&self.root, &self.cv_dir, &self.skills_dir, &self.index_dir] {
            std::fs::create_dir_all(dir).map_err(|e| CorpusError::Io {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}
