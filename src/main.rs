mod classifier;
mod config;
mod db;
mod llm;
mod memory;
mod session;
mod translator;

use anyhow::Result;
use session::TurnOutcome;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::load()?;

    // Startup resource acquisition is the only fatal failure path.
    let database = db::Database::open(&config.db_path)?;
    if let Some(csv_dir) = &config.csv_dir {
        let loaded = db::setup::load_csv_dir(&database, csv_dir)?;
        info!("Loaded {} CSV table(s) from {}", loaded, csv_dir.display());
    }
    db::setup::ensure_seeded(&database)?;

    let llm = llm::LlmClient::new(&config.api_url, &config.api_model, config.api_timeout)?;

    let log = memory::ConversationLog::load(&config.history_path).await;
    // Catalog snapshot: taken once at startup, read-only for the session.
    let tables = database.list_tables()?;
    let translator = Box::new(translator::SchemaTranslator::new(
        llm.clone(),
        tables.clone(),
    ));

    let mut session = session::Session::new(database, tables, translator, llm, log);

    println!("AI Learning Assistant (type 'exit' to quit)\n");
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match session.handle(&line).await {
            Ok(TurnOutcome::Reply(answer)) => println!("AI: {answer}\n"),
            Ok(TurnOutcome::Ignored) => {}
            Ok(TurnOutcome::Exit) => break,
            // A failed history flush loses that turn's record but not the
            // session.
            Err(e) => error!("Turn failed: {e:#}"),
        }
        prompt()?;
    }

    info!(
        "Chat history saved to {}",
        session.log().path().display()
    );
    Ok(())
}

fn prompt() -> Result<()> {
    print!("You: ");
    std::io::stdout().flush()?;
    Ok(())
}
