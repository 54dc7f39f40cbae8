//! Direct CV lookup: section and entry extraction from the CV's Markdown
//! source.
//!
//! Parsed on demand, never indexed. The canonical CV uses `##` for major
//! sections ("Summary", "Professional Experience", …) and `###` for the
//! individual entries inside "Professional Experience".

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CorpusError, CorpusResult};

/// The section holding `###`-delimited entries.
pub const EXPERIENCE_SECTION: &str = "Professional Experience";

/// The raw CV Markdown source.
#[derive(Debug, Clone)]
pub struct CvSource {
    text: String,
}

impl CvSource {
    /// Locate and read the CV's Markdown file: the first `.md` file (by
    /// name) in the CV directory. Its absence is the named "CV file not
    /// found" condition.
    pub fn locate(cv_dir: &Path) -> CorpusResult<Self> {
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(cv_dir)
            .map_err(|_| CorpusError::CvNotFound {
                dir: cv_dir.to_path_buf(),
            })?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("md"))
            .collect();
        candidates.sort();

        let path = candidates.into_iter().next().ok_or(CorpusError::CvNotFound {
            dir: cv_dir.to_path_buf(),
        })?;
        debug!(path = %path.display(), "located CV source");

        let text = std::fs::read_to_string(&path).map_err(|e| CorpusError::Io {
            path,
            source: e,
        })?;
        Ok(Self { text })
    }

    /// Wrap CV Markdown held in memory.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The entire CV source, unmodified.
    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// The body of the `## {name}` section (case-insensitive), up to the
    /// next `#` or `##` heading, trimmed. `###` subheadings stay inside the
    /// section. `None` when the section does not exist.
    pub fn extract_section(&self, name: &str) -> Option<String> {
        let wanted = name.trim().to_lowercase();
        let mut found = false;
        let mut body = String::new();

        for line in self.text.lines() {
            if found {
                if is_section_boundary(line) {
                    break;
                }
                body.push_str(line);
                body.push('\n');
            } else if let Some(title) = line.strip_prefix("## ") {
                if title.trim().to_lowercase() == wanted {
                    found = true;
                }
            }
        }

        found.then(|| body.trim().to_string())
    }

    /// The "Professional Experience" section split into its `###`-delimited
    /// entries, each starting with its own `###` header, in document order.
    ///
    /// A section without `###` subheaders comes back as a single entry (the
    /// whole section verbatim) so partial CVs still produce output.
    pub fn experience_entries(&self) -> Option<Vec<String>> {
        let section = self.extract_section(EXPERIENCE_SECTION)?;

        // Lines before the first `###` (intro prose) are dropped; the
        // whole-section fallback below covers CVs with no entries at all.
        let mut entries: Vec<String> = Vec::new();
        for line in section.lines() {
            if line.starts_with("### ") {
                entries.push(format!("{line}\n"));
            } else if let Some(current) = entries.last_mut() {
                current.push_str(line);
                current.push('\n');
            }
        }

        if entries.is_empty() {
            return Some(vec![section]);
        }
        Some(entries.into_iter().map(|e| e.trim().to_string()).collect())
    }
}

/// A line that terminates a `##` section: the next `#` or `##` heading.
/// `###` does not terminate.
fn is_section_boundary(line: &str) -> bool {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    (1..=2).contains(&hashes) && line[hashes..].starts_with(' ')
}
