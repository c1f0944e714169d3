//! Quiz prompt construction and response splitting.

/// System instruction sent with every question-generation request.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant.";

const PROMPT_HEADER: &str =
    "Based on the following summarized content, generate a list of quiz questions:";

const PROMPT_FOOTER: &str =
    "Please make the questions varied and engaging, and ensure they are suitable for a quiz.";

/// What to do with blank lines in a generated-questions response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlankLinePolicy {
    /// Pass blank lines through as empty entries.
    #[default]
    Keep,
    /// Drop lines that are empty or whitespace only.
    Drop,
}

/// Build the user prompt from all slide summaries.
///
/// Summaries are joined by a single space, in order.
pub fn build_quiz_prompt<S: AsRef<str>>(summaries: &[S]) -> String {
    let combined = summaries
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");

    format!("{}\n\n{}\n\n{}", PROMPT_HEADER, combined, PROMPT_FOOTER)
}

/// Split a model response into one entry per line.
pub fn split_questions(response: &str, policy: BlankLinePolicy) -> Vec<String> {
    response
        .split('\n')
        .filter(|line| policy == BlankLinePolicy::Keep || !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
