//! One-shot interpretation command for smoke-testing the pipeline

use anyhow::{Context, Result};

use catat_core::{Financial, Interpreter, PreciousMetal};

pub async fn cmd_interpret(text: &str, domain: &str) -> Result<()> {
    let interpreter = Interpreter::from_env()
        .context("No model backend configured (set GEMINI_API_KEY)")?;
    let today = chrono::Local::now().date_naive();

    match domain {
        "financial" => {
            let record = interpreter.interpret_text::<Financial>(text, today).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        "metal" => {
            let record = interpreter
                .interpret_text::<PreciousMetal>(text, today)
                .await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        other => {
            anyhow::bail!("Unknown domain: {} (expected financial or metal)", other);
        }
    }

    Ok(())
}
