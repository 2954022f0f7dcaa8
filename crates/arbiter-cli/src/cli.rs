//! Command-line argument definitions.

use clap::{Parser, Subcommand};

/// Multi-provider AI assistant gateway.
#[derive(Parser)]
#[command(name = "arbiter")]
#[command(about = "Route tasks to the right AI model, with conversation memory", long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Send one task to a model.
    #[command(about = "Send a task to a model")]
    Ask {
        /// The question, request, or task description.
        #[arg(help = "The prompt to send")]
        prompt: String,

        /// Files or directories to include in the prompt.
        #[arg(help = "Files or directories to include")]
        files: Vec<String>,

        /// Task mode influencing prompt framing and model choice.
        #[arg(short, long, default_value = "chat", help = "Task mode")]
        mode: String,

        /// Model to use; `auto` lets the selector decide.
        #[arg(long, default_value = "auto", help = "Model name or 'auto'")]
        model: String,

        /// Continuation id of an earlier conversation.
        #[arg(long, help = "Continue an earlier conversation")]
        thread: Option<String>,

        /// Sampling temperature override.
        #[arg(short, long, help = "Sampling temperature (0.0-1.0)")]
        temperature: Option<f32>,

        /// Write the response to this file instead of stdout.
        #[arg(short, long, help = "Write the response to a file")]
        output: Option<String>,

        /// How file content is embedded: embedded, summary, reference.
        #[arg(long, default_value = "embedded", help = "File handling mode")]
        file_mode: String,

        /// Emit the full outcome as JSON.
        #[arg(long, help = "Print the outcome as JSON")]
        json: bool,
    },

    /// List the model catalog with restriction status.
    #[command(about = "List available models")]
    Models,

    /// Serve line-delimited JSON requests over stdio.
    #[command(about = "Run the stdio JSON server")]
    Serve,
}
