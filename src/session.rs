use crate::classifier::{self, Intent};
use crate::db::Database;
use crate::llm::LlmClient;
use crate::memory::{ConversationLog, SessionContext, Turn};
use crate::translator::Translate;
use anyhow::Result;
use tracing::info;

#[derive(Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Reply(String),
    /// Blank input: re-prompt, no turn recorded.
    Ignored,
    /// The exit sentinel: end the session, no turn recorded.
    Exit,
}

/// One interactive session: the database connection, the catalog snapshot
/// taken at startup, the translator, the model context, and the durable log.
/// Processes exactly one utterance at a time; the answer is persisted before
/// the caller reads the next line.
pub struct Session {
    db: Database,
    tables: Vec<String>,
    translator: Box<dyn Translate>,
    llm: LlmClient,
    context: SessionContext,
    log: ConversationLog,
}

impl Session {
    pub fn new(
        db: Database,
        tables: Vec<String>,
        translator: Box<dyn Translate>,
        llm: LlmClient,
        log: ConversationLog,
    ) -> Self {
        info!("Available tables: {:?}", tables);
        let context = SessionContext::from_log(&log);

        Self {
            db,
            tables,
            translator,
            llm,
            context,
            log,
        }
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub async fn handle(&mut self, input: &str) -> Result<TurnOutcome> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(TurnOutcome::Ignored);
        }
        if input.eq_ignore_ascii_case("exit") {
            return Ok(TurnOutcome::Exit);
        }

        let answer = match classifier::classify(input) {
            Intent::DirectSql => self.db.execute(input),
            Intent::NaturalLanguage => {
                if classifier::is_database_question(input, &self.tables) {
                    self.answer_database_question(input).await
                } else {
                    self.answer_chat(input).await
                }
            }
        };

        // One Turn per completed exchange, flushed before the next prompt.
        self.log.append(Turn::now(input, &answer)).await?;
        self.context.push_exchange(input, &answer);

        Ok(TurnOutcome::Reply(answer))
    }

    /// Translation failures become the turn's answer; the session continues.
    async fn answer_database_question(&mut self, input: &str) -> String {
        match self.translator.translate(input, &mut self.context).await {
            Ok(sql) => self.db.execute(&sql),
            Err(e) => format!("Error: {e}"),
        }
    }

    async fn answer_chat(&mut self, input: &str) -> String {
        match self.llm.chat(self.context.messages(), input).await {
            Ok(text) => text,
            Err(e) => format!("Error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTranslator {
        sql: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Translate for FixedTranslator {
        async fn translate(&self, _question: &str, _ctx: &mut SessionContext) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.sql.clone())
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translate for FailingTranslator {
        async fn translate(&self, _question: &str, _ctx: &mut SessionContext) -> Result<String> {
            anyhow::bail!("model unavailable")
        }
    }

    async fn build_session(dir: &tempfile::TempDir, translator: Box<dyn Translate>) -> Session {
        let db = Database::open_in_memory().unwrap();
        setup::bootstrap(&db).unwrap();
        // Points at a closed port so any chat call fails fast.
        let llm = LlmClient::new("http://127.0.0.1:1", "test", 1).unwrap();
        let log = ConversationLog::load(dir.path().join("chat_history.json")).await;
        let tables = db.list_tables().unwrap();
        Session::new(db, tables, translator, llm, log)
    }

    fn counting(sql: &str) -> (Box<dyn Translate>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let translator = FixedTranslator {
            sql: sql.to_string(),
            calls: calls.clone(),
        };
        (Box::new(translator), calls)
    }

    #[tokio::test]
    async fn direct_sql_skips_translation() {
        let dir = tempfile::tempdir().unwrap();
        let (translator, calls) = counting("SELECT 1");
        let mut session = build_session(&dir, translator).await;

        let outcome = session.handle("SELECT * FROM users").await.unwrap();
        let TurnOutcome::Reply(answer) = outcome else {
            panic!("expected a reply");
        };
        assert!(answer.contains("id | name"));
        assert!(answer.contains("Alice"));
        assert!(answer.contains("Bob"));
        assert!(answer.contains("Charlie"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn database_questions_run_the_translated_query() {
        let dir = tempfile::tempdir().unwrap();
        let (translator, calls) = counting("SELECT name FROM users ORDER BY age DESC LIMIT 1");
        let mut session = build_session(&dir, translator).await;

        let outcome = session.handle("who is the oldest? show me").await.unwrap();
        let TurnOutcome::Reply(answer) = outcome else {
            panic!("expected a reply");
        };
        assert!(answer.contains("name"));
        assert!(answer.contains("Bob"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn translation_failure_is_a_recorded_answer() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = build_session(&dir, Box::new(FailingTranslator)).await;

        let outcome = session.handle("list all tables").await.unwrap();
        assert_eq!(
            outcome,
            TurnOutcome::Reply("Error: model unavailable".to_string())
        );
        assert_eq!(session.log().turns().len(), 1);
        assert_eq!(session.log().turns()[0].ai, "Error: model unavailable");
    }

    #[tokio::test]
    async fn chat_failure_is_a_recorded_answer() {
        let dir = tempfile::tempdir().unwrap();
        let (translator, calls) = counting("SELECT 1");
        let mut session = build_session(&dir, translator).await;

        // Not a database question: routed to general chat, whose client is
        // unreachable here. The failure stays turn-local.
        let TurnOutcome::Reply(answer) = session.handle("tell me a joke").await.unwrap() else {
            panic!("expected a reply");
        };
        assert!(answer.starts_with("Error:"), "got: {answer}");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let turns = session.log().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].user, "tell me a joke");
        assert!(turns[0].ai.starts_with("Error:"));
    }

    #[tokio::test]
    async fn exit_and_blank_record_no_turn() {
        let dir = tempfile::tempdir().unwrap();
        let (translator, _) = counting("SELECT 1");
        let mut session = build_session(&dir, translator).await;

        assert_eq!(session.handle("").await.unwrap(), TurnOutcome::Ignored);
        assert_eq!(session.handle("   ").await.unwrap(), TurnOutcome::Ignored);
        assert_eq!(session.handle("EXIT").await.unwrap(), TurnOutcome::Exit);
        assert!(session.log().turns().is_empty());
    }

    #[tokio::test]
    async fn each_reply_appends_exactly_one_turn() {
        let dir = tempfile::tempdir().unwrap();
        let (translator, _) = counting("SELECT name FROM users");
        let mut session = build_session(&dir, translator).await;

        session.handle("SELECT * FROM users").await.unwrap();
        session.handle("list the users").await.unwrap();

        let turns = session.log().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].user, "SELECT * FROM users");
        assert_eq!(turns[1].user, "list the users");

        // Durable copy matches the in-memory sequence.
        let reloaded = ConversationLog::load(dir.path().join("chat_history.json")).await;
        assert_eq!(reloaded.turns(), turns);
    }

    #[tokio::test]
    async fn bad_translated_sql_fails_only_its_own_turn() {
        let dir = tempfile::tempdir().unwrap();
        let (translator, _) = counting("SELECT * FROM nonexistent");
        let mut session = build_session(&dir, translator).await;

        let TurnOutcome::Reply(answer) = session.handle("show the data").await.unwrap() else {
            panic!("expected a reply");
        };
        assert!(answer.starts_with("Error executing SQL:"));

        // The session keeps going.
        let TurnOutcome::Reply(answer) = session.handle("SELECT 1").await.unwrap() else {
            panic!("expected a reply");
        };
        assert!(answer.contains('1'));
    }
}
