use std::fmt::Write;

/// Builds the schema-constrained translation prompt. The table list pins the
/// model to names that actually exist; the rules keep the completion to one
/// bare SQLite statement.
pub fn build_prompt(tables: &[String], question: &str) -> String {
    let mut prompt = String::with_capacity(256 + question.len());
    prompt.push_str("You are a SQLite expert.\n\nDatabase tables:\n");
    for table in tables {
        let _ = writeln!(prompt, "- {table}");
    }
    prompt.push_str(
        "\nRules:\n\
         - Use ONLY existing tables and columns\n\
         - NO markdown\n\
         - NO explanations\n\
         - Return exactly ONE valid SQLite statement\n\n\
         User question:\n",
    );
    prompt.push_str(question);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_name_appears() {
        let tables = vec![
            "users".to_string(),
            "albums".to_string(),
            "invoice_items".to_string(),
        ];
        let prompt = build_prompt(&tables, "how many albums are there?");
        for table in &tables {
            assert!(prompt.contains(table.as_str()), "missing {table}");
        }
    }

    #[test]
    fn question_is_embedded_verbatim() {
        let question = "Which users are from New York?";
        let prompt = build_prompt(&["users".to_string()], question);
        assert!(prompt.ends_with(question));
    }
}
