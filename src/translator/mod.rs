use crate::llm::LlmClient;
use crate::memory::SessionContext;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

mod prompt;

pub use prompt::build_prompt;

/// Capability boundary for English-to-SQL translation. The session context is
/// passed explicitly so an implementation may condition on prior turns; the
/// default implementation is stateless per call and ignores it.
#[async_trait]
pub trait Translate: Send + Sync {
    async fn translate(&self, question: &str, ctx: &mut SessionContext) -> Result<String>;
}

/// Stateless translator: one schema-constrained prompt, one completion, fence
/// stripping. Performs no SQL validation; a wrong statement is the executor's
/// problem.
pub struct SchemaTranslator {
    llm: LlmClient,
    tables: Vec<String>,
}

impl SchemaTranslator {
    pub fn new(llm: LlmClient, tables: Vec<String>) -> Self {
        Self { llm, tables }
    }
}

#[async_trait]
impl Translate for SchemaTranslator {
    async fn translate(&self, question: &str, _ctx: &mut SessionContext) -> Result<String> {
        let prompt = build_prompt(&self.tables, question);
        let completion = self.llm.complete(&prompt).await?;
        let sql = strip_fences(&completion);
        debug!(%sql, "translated query");
        Ok(sql)
    }
}

/// Models ignore the no-markdown rule often enough that fence stripping is
/// mandatory: trim, drop a "```sql" marker, drop any remaining "```" markers
/// wherever they sit, trim again.
pub fn strip_fences(raw: &str) -> String {
    raw.trim()
        .replace("```sql", "")
        .replace("```", "")
        .trim()
        .to_string()
}
