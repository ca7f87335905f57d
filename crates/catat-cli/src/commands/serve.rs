//! Server command implementation

use anyhow::Result;

use catat_core::{Interpreter, ModelBackend};

pub async fn cmd_serve(host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting Catat API server...");
    println!("   Listening: http://{}:{}", host, port);

    let interpreter = Interpreter::from_env();
    match interpreter {
        Some(ref client) => {
            println!(
                "   Model backend: {} ({})",
                client.model().host(),
                client.model().model()
            );
        }
        None => {
            println!("   ⚠️  GEMINI_API_KEY not set - interpretation routes will return errors");
        }
    }

    // Comma-separated list of allowed CORS origins
    let allowed_origins: Vec<String> = std::env::var("CATAT_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !allowed_origins.is_empty() {
        println!(
            "   CORS origins: {} (CATAT_ALLOWED_ORIGINS)",
            allowed_origins.join(", ")
        );
    }

    println!();
    println!("   Press Ctrl+C to stop");

    let config = catat_server::ServerConfig { allowed_origins };
    catat_server::serve(interpreter, host, port, config).await
}
