/// Leading keywords that mark an utterance as SQL to run verbatim.
const SQL_KEYWORDS: [&str; 6] = ["select", "update", "delete", "insert", "create", "drop"];

/// Topical keywords that mark a natural-language utterance as a question
/// about the database rather than general chat.
const QUESTION_KEYWORDS: [&str; 9] = [
    "show", "list", "count", "total", "number", "how many", "which", "average", "sum",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// The utterance is already SQL; execute it as-is.
    DirectSql,
    /// The utterance is plain English and may need translation.
    NaturalLanguage,
}

/// Cheap, model-free classification: an utterance whose first token is a SQL
/// keyword (case-insensitive, whitespace-trimmed) goes straight to the
/// executor, everything else is natural language.
pub fn classify(utterance: &str) -> Intent {
    let lowered = utterance.trim().to_lowercase();
    if SQL_KEYWORDS.iter().any(|k| starts_with_keyword(&lowered, k)) {
        Intent::DirectSql
    } else {
        Intent::NaturalLanguage
    }
}

fn starts_with_keyword(lowered: &str, keyword: &str) -> bool {
    match lowered.strip_prefix(keyword) {
        // "select" alone or "select ..." but not "selection criteria?"
        Some(rest) => rest.is_empty() || rest.starts_with(|c: char| !c.is_alphanumeric()),
        None => false,
    }
}

/// Keyword heuristic deciding whether a natural-language utterance is about
/// the database at all. Table names from the live catalog count as topical
/// keywords, so "how old are the users?" routes to translation when a
/// `users` table exists.
pub fn is_database_question(utterance: &str, tables: &[String]) -> bool {
    let lowered = utterance.to_lowercase();
    QUESTION_KEYWORDS.iter().any(|k| lowered.contains(k))
        || tables.iter().any(|t| lowered.contains(&t.to_lowercase()))
}
