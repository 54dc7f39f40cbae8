//! Persistent nearest-neighbor index over chunk embeddings.
//!
//! Build-once, read-many: the offline ingestion job embeds every chunk in a
//! single batch call, inserts the vectors into an HNSW graph (cosine
//! distance), and persists a bincode snapshot of `(dim, chunks,
//! embeddings)`. The serving process reloads the snapshot and rebuilds the
//! graph from the stored vectors, which reproduces search results exactly.
//! After construction nothing mutates, so concurrent readers are safe.

use std::path::Path;
use std::sync::RwLock;

use anndists::dist::DistCosine;
use hnsw_rs::hnsw::Hnsw;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus::Document;
use crate::error::{IndexError, IndexResult};
use crate::remote::TextEmbedder;

/// Snapshot file name inside the index directory.
pub const INDEX_FILE: &str = "index.bin";

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 7;

/// A retrieved chunk with its similarity score (higher is better).
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Document,
    pub score: f32,
}

/// On-disk form of the index: everything needed for an exact reload.
#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    dim: usize,
    chunks: Vec<Document>,
    embeddings: Vec<Vec<f32>>,
}

/// Immutable-after-build vector index over document chunks.
pub struct VectorIndex {
    chunks: Vec<Document>,
    embeddings: Vec<Vec<f32>>,
    dim: usize,
    hnsw: RwLock<Hnsw<'static, f32, DistCosine>>,
}

// Safety: Hnsw uses internal synchronization via atomics/locks.
// The RwLock wrapper provides the outer synchronization needed.
unsafe impl Send for VectorIndex {}
unsafe impl Sync for VectorIndex {}

impl VectorIndex {
    /// Embed all chunks in one batch and build the index.
    ///
    /// Fails loudly on an empty chunk set: an empty index would silently
    /// answer every question with "no context".
    pub fn build(chunks: Vec<Document>, embedder: &dyn TextEmbedder) -> IndexResult<Self> {
        if chunks.is_empty() {
            return Err(IndexError::EmptyBuild);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed_documents(&texts)?;
        info!(chunks = chunks.len(), "embedded corpus chunks");

        Self::from_parts(chunks, embeddings)
    }

    /// Assemble an index from chunks and their precomputed embeddings.
    fn from_parts(chunks: Vec<Document>, embeddings: Vec<Vec<f32>>) -> IndexResult<Self> {
        let dim = embeddings.first().map(Vec::len).unwrap_or(0);
        if dim == 0 {
            return Err(IndexError::EmptyBuild);
        }
        for vector in &embeddings {
            if vector.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
        }

        // HNSW parameters follow the usual moderate-dimension defaults:
        // 16 connections, ef_construction 200, layer count from capacity.
        let max_elements = chunks.len().max(1024);
        let max_layer = (max_elements as f64).log2().ceil() as usize;
        let max_layer = max_layer.clamp(4, 16);
        let hnsw = Hnsw::new(max_layer, max_elements, 16, 200, DistCosine {});

        for (id, vector) in embeddings.iter().enumerate() {
            hnsw.insert((vector, id));
        }

        Ok(Self {
            chunks,
            embeddings,
            dim,
            hnsw: RwLock::new(hnsw),
        })
    }

    /// Persist the snapshot into `dir`, fully overwriting a previous one.
    pub fn save(&self, dir: &Path) -> IndexResult<()> {
        std::fs::create_dir_all(dir).map_err(|e| IndexError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let snapshot = IndexSnapshot {
            dim: self.dim,
            chunks: self.chunks.clone(),
            embeddings: self.embeddings.clone(),
        };
        let bytes = bincode::serialize(&snapshot).map_err(|e| IndexError::Corrupt {
            message: e.to_string(),
        })?;

        let path = dir.join(INDEX_FILE);
        std::fs::write(&path, bytes).map_err(|e| IndexError::Io {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), entries = self.chunks.len(), "persisted vector index");
        Ok(())
    }

    /// Reload a persisted index, rebuilding the HNSW graph from the stored
    /// vectors.
    ///
    /// Precondition: queries must come from the same embedding model the
    /// index was built with; only the dimension can be checked here.
    pub fn load(dir: &Path) -> IndexResult<Self> {
        let path = dir.join(INDEX_FILE);
        if !path.is_file() {
            return Err(IndexError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let bytes = std::fs::read(&path).map_err(|e| IndexError::Io {
            path: path.clone(),
            source: e,
        })?;
        let snapshot: IndexSnapshot =
            bincode::deserialize(&bytes).map_err(|e| IndexError::Corrupt {
                message: e.to_string(),
            })?;

        if snapshot.chunks.is_empty() || snapshot.chunks.len() != snapshot.embeddings.len() {
            return Err(IndexError::Corrupt {
                message: format!(
                    "snapshot has {} chunks and {} embeddings",
                    snapshot.chunks.len(),
                    snapshot.embeddings.len()
                ),
            });
        }

        info!(path = %path.display(), entries = snapshot.chunks.len(), "loaded vector index");
        Self::from_parts(snapshot.chunks, snapshot.embeddings)
    }

    /// Top-`k` chunks by cosine similarity, highest first.
    ///
    /// A `k` larger than the index returns every entry.
    pub fn search(&self, query: &[f32], k: usize) -> IndexResult<Vec<ScoredChunk>> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let k = k.min(self.chunks.len());
        let ef_search = (k * 2).max(32);

        let query_vec = query.to_vec();
        let hnsw = self.hnsw.read().map_err(|_| IndexError::Search {
            message: "HNSW lock poisoned".into(),
        })?;
        let neighbours = hnsw.search(&query_vec, k, ef_search);
        drop(hnsw);

        let mut results: Vec<ScoredChunk> = neighbours
            .into_iter()
            .filter_map(|n| {
                self.chunks.get(n.d_id).map(|chunk| ScoredChunk {
                    chunk: chunk.clone(),
                    // DistCosine yields 1 - cos(q, v); invert back to a
                    // similarity where higher is better.
                    score: 1.0 - n.distance,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        Ok(results)
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimensionality.
    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("entries", &self.chunks.len())
            .field("dim", &self.dim)
            .finish()
    }
}
