//! Prompt assembly: retrieved context plus the question, under fixed
//! grounding instructions.
//!
//! The instruction template is the contract with the generation model:
//! answer only from the supplied context, keep proper nouns and dates
//! verbatim, refuse with a fixed line when the context does not contain
//! the answer, and end every answer with a short usage tip.

use crate::index::ScoredChunk;

/// Substituted for the context when retrieval returned nothing. An empty
/// substitution must never reach the model.
pub const NO_CONTEXT_SENTINEL: &str = "No relevant context found.";

/// The fixed refusal line the model must use for unanswerable questions.
pub const REFUSAL_LINE: &str =
    "I don't have enough information about that in the CV or skills documentation.";

/// Instruction template with two substitution points: `{context}` and
/// `{question}`.
const ANSWER_TEMPLATE: &str = "\
You are a helpful assistant answering questions about the candidate's professional \
experience, skills, and technical knowledge. Format your responses using Markdown \
for readability.

When answering:
1. Answer only from the context below; never invent facts that are not in it.
2. Keep proper nouns, dates, and job titles exactly as they appear in the context.
3. Combine information from multiple context fragments when they are relevant.
4. Prefer CV passages for work history and the skills documentation for technical depth.

If the answer cannot be derived from the context, reply with exactly:
> \"I don't have enough information about that in the CV or skills documentation.\"

End every answer with this tip on its own line:
_Tip: ask about a specific area (e.g. \"cloud platforms\") or request a CV section (e.g. \"show me the summary\")._

Context:
{context}

Question: {question}

Answer:";

/// Join retrieved chunk texts with blank lines; zero chunks yields the
/// literal [`NO_CONTEXT_SENTINEL`].
pub fn format_context(chunks: &[ScoredChunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT_SENTINEL.to_string();
    }
    chunks
        .iter()
        .map(|c| c.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fill the instruction template with retrieved context and the question.
pub fn assemble_prompt(chunks: &[ScoredChunk], question: &str) -> String {
    ANSWER_TEMPLATE
        .replace("{context}", &format_context(chunks))
        .replace("{question}", question)
}
