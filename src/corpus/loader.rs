//! Corpus loader.
//!
//! Reads the two corpus directories into `Document`s:
//!
//! - CV directory: every `.pdf` (one document per page) and every `.md`
//!   (whole file), tagged `category="cv"`.
//! - Skills directory: every `.md` anywhere in the tree, tagged with its
//!   immediate parent directory name as category.
//!
//! Missing directories and unreadable files are tolerated (skipped with a
//! warning); an empty corpus is an empty list, not an error.

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::corpus::{Document, FileType, KEY_PAGE};
use crate::paths::CorpusPaths;

/// Load every document from the CV and skills directories.
pub fn load_corpus(paths: &CorpusPaths) -> Vec<Document> {
    let mut documents = load_cv_dir(&paths.cv_dir);
    documents.extend(load_skills_dir(&paths.skills_dir));

    if documents.is_empty() {
        warn!(
            cv_dir = %paths.cv_dir.display(),
            skills_dir = %paths.skills_dir.display(),
            "no documents found in CV or skills directories"
        );
    } else {
        debug!(count = documents.len(), "loaded corpus documents");
    }
    documents
}

/// Load the CV directory: PDFs page by page, Markdown whole-file.
fn load_cv_dir(dir: &Path) -> Vec<Document> {
    let Some(mut entries) = list_files(dir) else {
        warn!(dir = %dir.display(), "CV directory missing, skipping");
        return Vec::new();
    };
    entries.sort();

    let mut documents = Vec::new();
    for path in entries {
        let source = relative_name(&path, dir);
        match extension(&path) {
            Some("pdf") => match super::pdf::extract_pages(&path) {
                Ok(pages) => {
                    for (i, page) in pages.into_iter().enumerate() {
                        let mut doc = Document::new(page, source.clone(), "cv", FileType::Pdf);
                        doc.metadata.insert(KEY_PAGE.into(), (i + 1).to_string());
                        documents.push(doc);
                    }
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable PDF"),
            },
            Some("md") => match std::fs::read_to_string(&path) {
                Ok(text) => {
                    documents.push(Document::new(text, source, "cv", FileType::Markdown));
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable file"),
            },
            _ => {}
        }
    }
    documents
}

/// Load the skills tree recursively; the immediate parent directory names
/// the category, top-level files fall back to "skills".
fn load_skills_dir(dir: &Path) -> Vec<Document> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "skills directory missing, skipping");
        return Vec::new();
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if extension(path) != Some("md") {
            continue;
        }
        let category = path
            .parent()
            .filter(|p| *p != dir)
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("skills")
            .to_string();

        match std::fs::read_to_string(path) {
            Ok(text) => {
                let source = relative_name(path, dir);
                documents.push(Document::new(text, source, category, FileType::Markdown));
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable file"),
        }
    }
    documents
}

fn list_files(dir: &Path) -> Option<Vec<std::path::PathBuf>> {
    let entries = std::fs::read_dir(dir).ok()?;
    Some(
        entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .collect(),
    )
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

/// Path relative to the corpus directory, for the `source` metadata field.
fn relative_name(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}
