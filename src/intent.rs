//! Intent routing: decide whether a question is a direct CV request, a
//! named-section request, or a general question for semantic retrieval.
//!
//! Detection is word-boundary pattern matching over the lowercased question
//! — an explicit, enumerated rule set, each rule testable on its own. The
//! tiers are checked in fixed precedence order and the first match wins:
//! FullCv > AllExperience > Section > Retrieval. A CV/resume request
//! therefore always beats a section keyword embedded in the same question.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// How a question should be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    /// Return the whole CV verbatim.
    FullCv,
    /// Return every entry of the "Professional Experience" section.
    AllExperience,
    /// Return one named CV section.
    Section(&'static str),
    /// Default path: embed, search the index, generate.
    Retrieval,
}

/// CV-referencing patterns. Word boundaries keep unrelated words containing
/// "cv" from matching.
static RE_FULL_CV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:cv|curriculum\s+vitae|resum[eé])\b|\b(?:show|see|send|view|download|get)\b[^.?!]*\b(?:cv|resum[eé])\b",
    )
    .unwrap()
});

/// "All experience" phrasings that route to the entry-by-entry extractor.
static RE_ALL_EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:all|entire|every|complete|list)\b[^.?!]*\bexperiences?\b|\bprofessional\s+experience\b|\bwork\s+history\b",
    )
    .unwrap()
});

/// Section keyword vocabulary, mapped to canonical CV section titles.
static SECTION_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (
            r"\bcore\s+competencies\b|\btechnical\s+skills\b",
            "Core Competencies & Technical Skills",
        ),
        (r"\bsummary\b|\bprofile\b", "Summary"),
        (r"\bvolunteering\b|\bvolunteer\s+work\b", "Volunteering"),
        (r"\blanguages\b", "Languages"),
        (r"\binterests\b|\bhobbies\b", "Interests"),
    ]
    .into_iter()
    .map(|(pattern, section)| (Regex::new(pattern).unwrap(), section))
    .collect()
});

/// Classify a question. Matching is over the lowercased text.
pub fn classify(question: &str) -> QueryIntent {
    let q = question.to_lowercase();

    let intent = if RE_FULL_CV.is_match(&q) {
        QueryIntent::FullCv
    } else if RE_ALL_EXPERIENCE.is_match(&q) {
        QueryIntent::AllExperience
    } else if let Some(section) = SECTION_RULES
        .iter()
        .find_map(|(re, section)| re.is_match(&q).then_some(*section))
    {
        QueryIntent::Section(section)
    } else {
        QueryIntent::Retrieval
    };

    debug!(?intent, "classified question");
    intent
}
