//! Greeting gate — keeps social chatter away from the LLM and the database.

/// Fixed reply for social/greeting input. Returned without consulting the
/// completion service or the database.
pub const GREETING_REPLY: &str = "Hi! I'm your **Database Assistant**. \
Ask me a question about your data — for example: \"how many users are there?\"";

/// Phrases answered with [`GREETING_REPLY`]. Matched exactly after
/// normalization — no fuzzy or substring matching.
const GREETING_PHRASES: &[&str] = &["hi", "hello", "hey", "help", "who are you", "what can you do"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    DataQuestion,
}

/// Classify a user utterance. Input is trimmed and lowercased before the
/// membership test.
pub fn classify(input: &str) -> Intent {
    let normalized = input.trim().to_lowercase();
    if GREETING_PHRASES.contains(&normalized.as_str()) {
        Intent::Greeting
    } else {
        Intent::DataQuestion
    }
}
