//! Command-line interface for medrelay
//!
//! Provides argument parsing and subcommand handling for the medrelay binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Image used by `medrelay image` when `--path` is omitted
pub const DEFAULT_IMAGE_PATH: &str = "test1.png";
/// Query used by `medrelay image` when `--query` is omitted
pub const DEFAULT_IMAGE_QUERY: &str = "what are the encoders in this picture?";

/// Relay for a medical chatbot backed by a hosted chat-completion API
#[derive(Parser)]
#[command(name = "medrelay")]
#[command(version)]
#[command(about = "Relay for a medical chatbot backed by a hosted chat-completion API")]
pub struct Cli {
    /// Path to configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP relay server
    Serve,

    /// Ask the model about a local image and print the result as JSON
    Image {
        /// Image file to send
        #[arg(short, long, default_value = DEFAULT_IMAGE_PATH)]
        path: PathBuf,

        /// Question about the image
        #[arg(short, long, default_value = DEFAULT_IMAGE_QUERY)]
        query: String,
    },

    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# medrelay Configuration
# ======================
#
# Every setting below is optional; the values shown are the defaults.
# The API key is never stored here. Put it in the environment (or a .env
# file next to the binary) under the name given by upstream.api_key_env.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "127.0.0.1"

# Port to listen on
port = 8000

# Origins allowed to call the API from a browser. Empty allows any origin.
# cors_allowed_origins = ["http://localhost:3000"]
cors_allowed_origins = []

# ─────────────────────────────────────────────────────────────────────────────
# UPSTREAM CHAT-COMPLETION API
# ─────────────────────────────────────────────────────────────────────────────

[upstream]
# OpenAI-compatible chat completions endpoint
api_url = "https://api.groq.com/openai/v1/chat/completions"

# Model used for both text and image queries
model = "meta-llama/llama-4-scout-17b-16e-instruct"

# Key the image subcommand reports the model's answer under
report_key = "llama-4-scout-17b"

# Environment variable holding the bearer token
api_key_env = "GROQ_API_KEY"

# System instruction sent before every text query
system_prompt = "You are a helpful medical assistant."

# Sampling temperature for text queries (0.0-2.0)
temperature = 0.7

# Token limits for text and image queries
max_tokens = 500
image_max_tokens = 1000

# Timeout for each upstream request in seconds (1-300)
timeout_seconds = 30

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error" (RUST_LOG overrides)
log_level = "info"
"#
}
