//! shellpilot - natural language to shell commands, under supervision.
//!
//! shellpilot sends a free-text request to a language-model backend, parses
//! the structured suggestion it returns (command, explanation, risk tier,
//! warnings), resolves any tools the command needs that are not installed,
//! and executes the command once the operator approves it.
//!
//! # Architecture
//!
//! - [`config`] - credentials, model override, timeout
//! - [`error`] - failure taxonomy (config / provider / parse)
//! - [`http_client`] - JSON-over-POST transport abstraction
//! - [`llm_provider`] - suggestion providers (Anthropic, OpenAI, mock)
//! - [`catalog`] - tool name → package name table
//! - [`registry`] - package manager definitions
//! - [`environment`] - OS/distro detection, active manager resolution
//! - [`resolver`] - missing-tool detection and install commands
//! - [`executor`] - shell execution with a bounded timeout
//! - [`prompt_ui`] - interactive prompts and rendering
//! - [`orchestrator`] - the per-request decision state machine
//!
//! # Example
//!
//! ```ignore
//! use shellpilot::config::Config;
//! use shellpilot::environment::ResolvedEnvironment;
//! use shellpilot::llm_provider::provider_from_config;
//! use shellpilot::orchestrator::RequestOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load();
//!     let provider = provider_from_config(&config)?;
//!     let orchestrator = RequestOrchestrator::new(
//!         provider,
//!         ResolvedEnvironment::detect(),
//!         false,
//!         config.timeout_seconds(),
//!     );
//!     orchestrator.process_request("list files in current directory").await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod environment;
pub mod error;
pub mod executor;
pub mod http_client;
pub mod llm_provider;
pub mod orchestrator;
pub mod prompt_ui;
pub mod registry;
pub mod resolver;
