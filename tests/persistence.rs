//! Persistence tests: index round-trips, search ordering, and ingestion
//! idempotency.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use vitae::config::PipelineConfig;
use vitae::corpus::{Document, FileType};
use vitae::error::{IndexError, RemoteResult, VitaeError};
use vitae::index::VectorIndex;
use vitae::paths::CorpusPaths;
use vitae::pipeline::ingest;
use vitae::remote::TextEmbedder;

/// Deterministic bag-of-words hash embedding, normalized to unit length.
struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    fn new() -> Self {
        Self { dim: 64 }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        for word in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            v[(hasher.finish() as usize) % self.dim] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl TextEmbedder for HashEmbedder {
    fn embed_documents(&self, texts: &[String]) -> RemoteResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn embed_query(&self, text: &str) -> RemoteResult<Vec<f32>> {
        Ok(self.embed_one(text))
    }
}

fn chunk(text: &str) -> Document {
    Document::new(text, "skills/test.md", "skills", FileType::Markdown)
}

fn sample_chunks() -> Vec<Document> {
    vec![
        chunk("Kubernetes cluster operations and Helm releases in production."),
        chunk("Terraform modules for multi-account AWS infrastructure."),
        chunk("Incident response runbooks and on-call rotations."),
        chunk("CI/CD pipelines with GitOps promotion between environments."),
        chunk("PostgreSQL performance tuning and migration tooling."),
    ]
}

#[test]
fn index_round_trip_preserves_search_results() {
    let dir = tempfile::TempDir::new().unwrap();
    let embedder = HashEmbedder::new();

    let built = VectorIndex::build(sample_chunks(), &embedder).unwrap();
    built.save(dir.path()).unwrap();
    let loaded = VectorIndex::load(dir.path()).unwrap();

    assert_eq!(loaded.len(), built.len());
    assert_eq!(loaded.dim(), built.dim());

    let query = embedder.embed_query("kubernetes production operations").unwrap();
    let before = built.search(&query, 3).unwrap();
    let after = loaded.search(&query, 3).unwrap();

    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.chunk.content, a.chunk.content);
        assert!((b.score - a.score).abs() < 1e-6);
    }
}

#[test]
fn search_scores_are_non_increasing() {
    let embedder = HashEmbedder::new();
    let index = VectorIndex::build(sample_chunks(), &embedder).unwrap();

    let query = embedder.embed_query("terraform aws infrastructure").unwrap();
    let results = index.search(&query, 5).unwrap();
    assert!(!results.is_empty());
    for pair in results.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "scores out of order: {} then {}",
            pair[0].score,
            pair[1].score
        );
    }
    assert!(results[0].chunk.content.contains("Terraform"));
}

#[test]
fn oversized_k_returns_exactly_all_entries() {
    let embedder = HashEmbedder::new();
    let index = VectorIndex::build(sample_chunks(), &embedder).unwrap();

    let query = embedder.embed_query("anything at all").unwrap();
    let results = index.search(&query, 50).unwrap();
    assert_eq!(results.len(), index.len());
}

#[test]
fn build_with_zero_chunks_fails_loudly() {
    let embedder = HashEmbedder::new();
    let result = VectorIndex::build(Vec::new(), &embedder);
    assert!(matches!(result, Err(IndexError::EmptyBuild)));
}

#[test]
fn reingestion_overwrites_the_previous_index() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = CorpusPaths::under(dir.path());
    paths.ensure_dirs().unwrap();
    let config = PipelineConfig::default();
    let embedder = HashEmbedder::new();

    std::fs::write(
        paths.skills_dir.join("one.md"),
        "# One\nFirst corpus revision.\n",
    )
    .unwrap();
    let first = ingest(&config, &paths, &embedder).unwrap();

    std::fs::write(
        paths.skills_dir.join("two.md"),
        "# Two\nSecond corpus revision with more material.\n",
    )
    .unwrap();
    let second = ingest(&config, &paths, &embedder).unwrap();

    assert!(second.chunks > first.chunks);
    let loaded = VectorIndex::load(&paths.index_dir).unwrap();
    assert_eq!(loaded.len(), second.chunks);
}

#[test]
fn ingesting_an_empty_corpus_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let paths = CorpusPaths::under(dir.path());
    paths.ensure_dirs().unwrap();
    let config = PipelineConfig::default();

    let err = ingest(&config, &paths, &HashEmbedder::new()).unwrap_err();
    assert!(matches!(
        err,
        VitaeError::Index(IndexError::EmptyBuild)
    ));
}
