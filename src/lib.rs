//! medrelay - relay from a medical chatbot frontend to a hosted chat-completion API
//!
//! Two entry points share this library: an HTTP endpoint that forwards text
//! queries, and a command-line utility that sends a local image along with a
//! query.

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod handlers;
pub mod image_query;
pub mod middleware;
pub mod relay;
pub mod telemetry;
