//! Suggestion providers: the language-model capability behind shellpilot.
//!
//! A [`CommandSuggestionProvider`] turns free text into a structured
//! [`CommandSuggestion`] and, during dependency remediation, proposes an
//! alternative command that avoids a missing tool. Two live backends are
//! supported (Anthropic and OpenAI, selected at startup by credential
//! priority) plus a deterministic mock for tests.
//!
//! The backends are asked for "JSON only, no markdown". That is a
//! best-effort contract: code fences are stripped deterministically before
//! structural parsing, but malformed payloads surface as
//! [`PilotError::ResponseParse`] rather than being repaired or re-prompted.

use crate::config::{Config, ProviderCredential};
use crate::error::{PilotError, Result};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a Linux expert. Always return valid JSON only.";

/// Advisory risk tier for a suggested command.
///
/// Purely a gate on auto-execution and prompt styling; never a guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyLevel {
    Safe,
    Caution,
    Dangerous,
}

impl SafetyLevel {
    /// Normalizes a wire value. Unrecognized values fail safe to `Caution`.
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "safe" => SafetyLevel::Safe,
            "dangerous" => SafetyLevel::Dangerous,
            "caution" => SafetyLevel::Caution,
            other => {
                if !other.is_empty() {
                    warn!("Unknown safety level '{}', treating as caution", other);
                }
                SafetyLevel::Caution
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SafetyLevel::Safe => "SAFE",
            SafetyLevel::Caution => "CAUTION",
            SafetyLevel::Dangerous => "DANGEROUS",
        }
    }
}

/// A structured suggestion from the language model.
///
/// `command` is the only mutable field; the orchestrator overwrites it when
/// the operator edits the command or accepts an alternative.
#[derive(Debug, Clone)]
pub struct CommandSuggestion {
    pub command: String,
    pub explanation: String,
    pub safety_level: SafetyLevel,
    pub warnings: Vec<String>,
}

/// Replacement proposal for a command whose tool is missing.
#[derive(Debug, Clone)]
pub struct AlternativeSuggestion {
    pub command: String,
    pub explanation: String,
}

/// Capability contract: free text in, structured suggestion out.
#[async_trait]
pub trait CommandSuggestionProvider: Send + Sync {
    /// Generates a command suggestion for a natural-language request.
    async fn generate(&self, request: &str) -> Result<CommandSuggestion>;

    /// Proposes an alternative to `original_command` that avoids
    /// `missing_tool`. Used only during dependency remediation.
    async fn suggest_alternative(
        &self,
        original_command: &str,
        missing_tool: &str,
    ) -> Result<AlternativeSuggestion>;

    /// Backend name, for logging and messages.
    fn name(&self) -> &'static str;
}

/// Builds the provider selected by credential priority.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn CommandSuggestionProvider>> {
    match config.active_credential()? {
        ProviderCredential::Anthropic(key) => {
            info!("Using Anthropic suggestion provider");
            Ok(Box::new(AnthropicProvider::new(
                Box::new(ReqwestHttpClient::new()),
                key,
                config.model.clone(),
            )))
        }
        ProviderCredential::OpenAi(key) => {
            info!("Using OpenAI suggestion provider");
            Ok(Box::new(OpenAiProvider::new(
                Box::new(ReqwestHttpClient::new()),
                key,
                config.model.clone(),
            )))
        }
        ProviderCredential::Mock => {
            info!("Using mock suggestion provider (SHELLPILOT_USE_MOCK)");
            Ok(Box::new(MockProvider))
        }
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Deserialize)]
struct SuggestionWire {
    command: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    safety_level: String,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AlternativeWire {
    command: String,
    #[serde(default)]
    explanation: String,
}

/// Strips markdown code fences the backend may wrap around its JSON.
///
/// Handles ```` ```json ```` and bare ```` ``` ```` fences at the start and
/// end of the text. Anything else is left untouched; this is a formatting
/// strip, not a repair step.
pub fn strip_code_fences(text: &str) -> String {
    let mut trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        // Drop an optional language tag on the opening fence line.
        trimmed = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
        if let Some(body) = trimmed.trim_end().strip_suffix("```") {
            trimmed = body;
        }
    }
    trimmed.trim().to_string()
}

/// Parses backend text into a [`CommandSuggestion`].
pub fn parse_suggestion(text: &str) -> Result<CommandSuggestion> {
    let stripped = strip_code_fences(text);
    let wire: SuggestionWire = serde_json::from_str(&stripped)
        .map_err(|err| PilotError::ResponseParse(format!("{err}; raw response: {text}")))?;

    if wire.command.trim().is_empty() {
        return Err(PilotError::ResponseParse(
            "suggestion contained an empty command".to_string(),
        ));
    }

    Ok(CommandSuggestion {
        command: wire.command,
        explanation: wire.explanation,
        safety_level: SafetyLevel::from_wire(&wire.safety_level),
        warnings: wire.warnings,
    })
}

/// Parses backend text into an [`AlternativeSuggestion`].
pub fn parse_alternative(text: &str) -> Result<AlternativeSuggestion> {
    let stripped = strip_code_fences(text);
    let wire: AlternativeWire = serde_json::from_str(&stripped)
        .map_err(|err| PilotError::ResponseParse(format!("{err}; raw response: {text}")))?;

    if wire.command.trim().is_empty() {
        return Err(PilotError::ResponseParse(
            "alternative contained an empty command".to_string(),
        ));
    }

    Ok(AlternativeSuggestion {
        command: wire.command,
        explanation: wire.explanation,
    })
}

fn build_suggestion_prompt(request: &str) -> String {
    format!(
        "Convert this request into a shell command. Respond ONLY with valid JSON, no markdown:\n\
         \n\
         Request: \"{request}\"\n\
         \n\
         {{\n\
           \"command\": \"the shell command\",\n\
           \"explanation\": \"what it does (1 sentence)\",\n\
           \"safety_level\": \"safe|caution|dangerous\",\n\
           \"warnings\": [\"side effects worth knowing about, if any\"]\n\
         }}\n\
         \n\
         Rules: Use common tools. Prefer the safest variant. One line command."
    )
}

fn build_alternative_prompt(original_command: &str, missing_tool: &str) -> String {
    format!(
        "The command below requires '{missing_tool}', which is not installed on this machine.\n\
         Suggest an alternative command that accomplishes the same goal with commonly\n\
         preinstalled tools. Respond ONLY with valid JSON, no markdown:\n\
         \n\
         Original: \"{original_command}\"\n\
         \n\
         {{\n\
           \"command\": \"the alternative shell command\",\n\
           \"explanation\": \"what it does (1 sentence)\"\n\
         }}"
    )
}

// =============================================================================
// Anthropic backend
// =============================================================================

pub struct AnthropicProvider {
    http: Box<dyn HttpClient>,
    api_key: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(http: Box<dyn HttpClient>, api_key: String, model: Option<String>) -> Self {
        Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| ANTHROPIC_DEFAULT_MODEL.to_string()),
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": 500,
            "system": SYSTEM_PROMPT,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let response_text = self
            .http
            .post_json(
                ANTHROPIC_API_URL,
                &[
                    ("x-api-key", self.api_key.as_str()),
                    ("content-type", "application/json"),
                    ("anthropic-version", "2023-06-01"),
                ],
                &body,
            )
            .await?;

        extract_anthropic_text(&response_text)
    }
}

/// Pulls the assistant text out of an Anthropic messages-API envelope.
fn extract_anthropic_text(response_text: &str) -> Result<String> {
    let envelope: serde_json::Value = serde_json::from_str(response_text)
        .map_err(|_| PilotError::Provider(format!("non-JSON API response: {response_text}")))?;

    if let Some(message) = envelope
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Err(PilotError::Provider(message.to_string()));
    }

    envelope
        .get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|item| item.get("text"))
        .and_then(|text| text.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            PilotError::ResponseParse(format!("no text content in API response: {response_text}"))
        })
}

#[async_trait]
impl CommandSuggestionProvider for AnthropicProvider {
    async fn generate(&self, request: &str) -> Result<CommandSuggestion> {
        info!("Requesting suggestion from Anthropic for: {}", request);
        let text = self.complete(&build_suggestion_prompt(request)).await?;
        parse_suggestion(&text)
    }

    async fn suggest_alternative(
        &self,
        original_command: &str,
        missing_tool: &str,
    ) -> Result<AlternativeSuggestion> {
        info!("Requesting alternative for missing tool '{}'", missing_tool);
        let text = self
            .complete(&build_alternative_prompt(original_command, missing_tool))
            .await?;
        parse_alternative(&text)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

// =============================================================================
// OpenAI backend
// =============================================================================

pub struct OpenAiProvider {
    http: Box<dyn HttpClient>,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(http: Box<dyn HttpClient>, api_key: String, model: Option<String>) -> Self {
        Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": 500,
            "temperature": 0.2,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ]
        });

        let auth = format!("Bearer {}", self.api_key);
        let response_text = self
            .http
            .post_json(
                OPENAI_API_URL,
                &[
                    ("authorization", auth.as_str()),
                    ("content-type", "application/json"),
                ],
                &body,
            )
            .await?;

        extract_openai_text(&response_text)
    }
}

/// Pulls the assistant text out of a chat-completions envelope.
fn extract_openai_text(response_text: &str) -> Result<String> {
    let envelope: serde_json::Value = serde_json::from_str(response_text)
        .map_err(|_| PilotError::Provider(format!("non-JSON API response: {response_text}")))?;

    if let Some(message) = envelope
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return Err(PilotError::Provider(message.to_string()));
    }

    envelope
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            PilotError::ResponseParse(format!("no text content in API response: {response_text}"))
        })
}

#[async_trait]
impl CommandSuggestionProvider for OpenAiProvider {
    async fn generate(&self, request: &str) -> Result<CommandSuggestion> {
        info!("Requesting suggestion from OpenAI for: {}", request);
        let text = self.complete(&build_suggestion_prompt(request)).await?;
        parse_suggestion(&text)
    }

    async fn suggest_alternative(
        &self,
        original_command: &str,
        missing_tool: &str,
    ) -> Result<AlternativeSuggestion> {
        info!("Requesting alternative for missing tool '{}'", missing_tool);
        let text = self
            .complete(&build_alternative_prompt(original_command, missing_tool))
            .await?;
        parse_alternative(&text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// =============================================================================
// Mock backend
// =============================================================================

/// Deterministic provider for tests, keyed on phrases in the request.
pub struct MockProvider;

#[async_trait]
impl CommandSuggestionProvider for MockProvider {
    async fn generate(&self, request: &str) -> Result<CommandSuggestion> {
        let lowered = request.to_lowercase();
        let suggestion = if lowered.contains("list") && lowered.contains("file") {
            CommandSuggestion {
                command: "ls -la".to_string(),
                explanation: "Lists all files including hidden ones".to_string(),
                safety_level: SafetyLevel::Safe,
                warnings: vec![],
            }
        } else if lowered.contains("disk") {
            CommandSuggestion {
                command: "df -h".to_string(),
                explanation: "Shows disk usage per filesystem".to_string(),
                safety_level: SafetyLevel::Safe,
                warnings: vec![],
            }
        } else if lowered.contains("convert") && lowered.contains("video") {
            CommandSuggestion {
                command: "ffmpeg -i input.mp4 output.avi".to_string(),
                explanation: "Converts the video to AVI format".to_string(),
                safety_level: SafetyLevel::Caution,
                warnings: vec!["Overwrites output.avi if it exists".to_string()],
            }
        } else if lowered.contains("wipe") || lowered.contains("delete everything") {
            CommandSuggestion {
                command: "rm -rf ./target-dir".to_string(),
                explanation: "Recursively deletes the directory".to_string(),
                safety_level: SafetyLevel::Dangerous,
                warnings: vec!["Deleted files cannot be recovered".to_string()],
            }
        } else if lowered.contains("fail to parse") {
            return Err(PilotError::ResponseParse(
                "mock parse failure requested".to_string(),
            ));
        } else {
            CommandSuggestion {
                command: format!("echo '{}'", request.replace('\'', "")),
                explanation: "Echoes the request back".to_string(),
                safety_level: SafetyLevel::Safe,
                warnings: vec![],
            }
        };
        Ok(suggestion)
    }

    async fn suggest_alternative(
        &self,
        original_command: &str,
        missing_tool: &str,
    ) -> Result<AlternativeSuggestion> {
        Ok(AlternativeSuggestion {
            command: format!("busybox {original_command}"),
            explanation: format!("Runs the command through busybox instead of {missing_tool}"),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
