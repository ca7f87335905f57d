//! CLI argument definitions

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "catat", version, about = "AI transaction-capture service")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },

    /// Run the pipeline once on a text input and print the record
    Interpret {
        /// Input text, e.g. "beli kopi 15rb"
        #[arg(long)]
        text: String,

        /// Record domain: financial or metal
        #[arg(long, default_value = "financial")]
        domain: String,
    },

    /// Inspect the prompt library
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List prompts and their override status
    List,
    /// Print a prompt template
    Show { prompt_id: String },
    /// Print the override directory path
    Path,
}
