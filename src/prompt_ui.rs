//! Interactive prompts for the decision state machine.
//!
//! Renders suggestions and reads operator choices. All prompt methods come
//! in `_with_io` form taking injected reader/writer pairs so the state
//! machine can be driven from scripted input in tests, plus stdin/stdout
//! convenience wrappers.
//!
//! Unrecognized input always resolves to the safe/decline default; prompts
//! never loop.

use crate::executor::ExecutionResult;
use crate::llm_provider::{AlternativeSuggestion, CommandSuggestion, SafetyLevel};
use anyhow::Result;
use std::io::{self, BufRead, Write};
use tracing::info;

/// Operator decision at the confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmChoice {
    Execute,
    Copy,
    /// Replacement command text entered at the edit prompt (may be empty).
    Edit(String),
    Cancel,
}

/// Operator decision at the dependency remediation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyChoice {
    Install,
    Alternative,
    Continue,
    Cancel,
}

/// Destination for a command the operator chose to copy.
///
/// The default implementation prints the text for manual copying; a real
/// clipboard integration can be dropped in behind this seam.
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<()>;
}

/// Prints the command so the operator can copy it by hand.
pub struct ManualClipboard;

impl Clipboard for ManualClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        println!("\nCommand to copy:");
        println!("  {text}");
        Ok(())
    }
}

fn safety_marker(level: SafetyLevel) -> &'static str {
    match level {
        SafetyLevel::Safe => "🟢",
        SafetyLevel::Caution => "🟡",
        SafetyLevel::Dangerous => "🔴",
    }
}

pub struct PromptUi;

impl PromptUi {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    // Display
    // =========================================================================

    pub fn show_banner_with_io<W: Write>(&self, output: &mut W) -> Result<()> {
        writeln!(output, "\n{}", "=".repeat(60))?;
        writeln!(output, "  shellpilot — natural language to shell commands")?;
        writeln!(output, "{}\n", "=".repeat(60))?;
        Ok(())
    }

    pub fn show_banner(&self) {
        let _ = self.show_banner_with_io(&mut io::stdout());
    }

    /// Renders a suggestion: command, explanation, safety tier, warnings.
    pub fn display_suggestion_with_io<W: Write>(
        &self,
        suggestion: &CommandSuggestion,
        output: &mut W,
    ) -> Result<()> {
        writeln!(output, "\nGenerated command:")?;
        writeln!(output, "  {}", suggestion.command)?;
        writeln!(output, "\nExplanation:")?;
        writeln!(output, "  {}", suggestion.explanation)?;
        writeln!(
            output,
            "\n{} Safety: {}",
            safety_marker(suggestion.safety_level),
            suggestion.safety_level.label()
        )?;
        for warning in &suggestion.warnings {
            writeln!(output, "⚠️  {warning}")?;
        }
        Ok(())
    }

    pub fn display_suggestion(&self, suggestion: &CommandSuggestion) {
        let _ = self.display_suggestion_with_io(suggestion, &mut io::stdout());
    }

    /// Reports an execution result: output sections, then the verdict line.
    pub fn display_result_with_io<W: Write>(
        &self,
        result: &ExecutionResult,
        output: &mut W,
    ) -> Result<()> {
        if result.timed_out {
            writeln!(output, "\n⏱️  Command timed out and was terminated")?;
            return Ok(());
        }
        if !result.stdout.is_empty() {
            writeln!(output, "\n[output]")?;
            write!(output, "{}", result.stdout)?;
        }
        if !result.stderr.is_empty() {
            writeln!(output, "\n[stderr]")?;
            write!(output, "{}", result.stderr)?;
        }
        if result.success() {
            writeln!(output, "\n✅ Command completed")?;
        } else {
            writeln!(
                output,
                "\n❌ Command failed (exit code {})",
                result
                    .exit_code
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            )?;
        }
        Ok(())
    }

    pub fn display_result(&self, result: &ExecutionResult) {
        let _ = self.display_result_with_io(result, &mut io::stdout());
    }

    // =========================================================================
    // Prompts
    // =========================================================================

    /// Confirmation prompt: `y` execute, `c` copy, `e` edit, anything else
    /// declines.
    pub fn prompt_confirmation_with_io<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<ConfirmChoice> {
        write!(output, "\nExecute command? [y/n/c=copy/e=edit]: ")?;
        output.flush()?;

        let choice = match read_choice(input)?.as_str() {
            "y" => ConfirmChoice::Execute,
            "c" => ConfirmChoice::Copy,
            "e" => {
                write!(output, "Enter modified command: ")?;
                output.flush()?;
                let mut line = String::new();
                input.read_line(&mut line)?;
                ConfirmChoice::Edit(line.trim().to_string())
            }
            other => {
                if !matches!(other, "n" | "") {
                    info!("Unrecognized confirmation input '{}', declining", other);
                }
                ConfirmChoice::Cancel
            }
        };
        Ok(choice)
    }

    /// Remediation prompt listing missing tools and their install commands.
    ///
    /// `missing` pairs each tool with its resolved install command, `None`
    /// when no package manager is active on this host.
    pub fn prompt_dependency_choice_with_io<R: BufRead, W: Write>(
        &self,
        missing: &[(String, Option<String>)],
        input: &mut R,
        output: &mut W,
    ) -> Result<DependencyChoice> {
        writeln!(output, "\n📦 The command needs tools that are not installed:")?;
        for (tool, install) in missing {
            match install {
                Some(install) => writeln!(output, "   {tool}  (install: {install})")?,
                None => writeln!(output, "   {tool}  (no package manager found to install it)")?,
            }
        }
        write!(
            output,
            "\nInstall missing tools, use an alternative, continue anyway, or cancel? [i/a/c/n]: "
        )?;
        output.flush()?;

        let choice = match read_choice(input)?.as_str() {
            "i" => DependencyChoice::Install,
            "a" => DependencyChoice::Alternative,
            "c" => DependencyChoice::Continue,
            _ => DependencyChoice::Cancel,
        };
        Ok(choice)
    }

    /// Asks whether to accept a proposed alternative command.
    pub fn prompt_alternative_with_io<R: BufRead, W: Write>(
        &self,
        alternative: &AlternativeSuggestion,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool> {
        writeln!(output, "\nAlternative command:")?;
        writeln!(output, "  {}", alternative.command)?;
        writeln!(output, "  {}", alternative.explanation)?;
        write!(output, "Use this alternative? [y/n]: ")?;
        output.flush()?;

        Ok(read_choice(input)? == "y")
    }
}

impl Default for PromptUi {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads one line of operator input, lowercased and trimmed. EOF reads as
/// empty, which every prompt treats as decline.
fn read_choice<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn suggestion(level: SafetyLevel, warnings: Vec<&str>) -> CommandSuggestion {
        CommandSuggestion {
            command: "ls -la".to_string(),
            explanation: "lists files".to_string(),
            safety_level: level,
            warnings: warnings.into_iter().map(String::from).collect(),
        }
    }

    // =========================================================================
    // Confirmation prompt
    // =========================================================================

    #[test]
    fn confirmation_y_executes() {
        let ui = PromptUi::new();
        let mut input = Cursor::new(b"y\n");
        let mut output = Vec::new();
        let choice = ui.prompt_confirmation_with_io(&mut input, &mut output).unwrap();
        assert_eq!(choice, ConfirmChoice::Execute);
    }

    #[test]
    fn confirmation_c_copies() {
        let ui = PromptUi::new();
        let mut input = Cursor::new(b"c\n");
        let mut output = Vec::new();
        let choice = ui.prompt_confirmation_with_io(&mut input, &mut output).unwrap();
        assert_eq!(choice, ConfirmChoice::Copy);
    }

    #[test]
    fn confirmation_e_reads_replacement_text() {
        let ui = PromptUi::new();
        let mut input = Cursor::new(b"e\ndu -sh *\n");
        let mut output = Vec::new();
        let choice = ui.prompt_confirmation_with_io(&mut input, &mut output).unwrap();
        assert_eq!(choice, ConfirmChoice::Edit("du -sh *".to_string()));
    }

    #[test]
    fn confirmation_unrecognized_input_declines() {
        let ui = PromptUi::new();
        for garbage in ["x\n", "yes please\n", "\n", ""] {
            let mut input = Cursor::new(garbage.as_bytes());
            let mut output = Vec::new();
            let choice = ui.prompt_confirmation_with_io(&mut input, &mut output).unwrap();
            assert_eq!(choice, ConfirmChoice::Cancel, "input {garbage:?}");
        }
    }

    #[test]
    fn confirmation_input_is_case_insensitive() {
        let ui = PromptUi::new();
        let mut input = Cursor::new(b"Y\n");
        let mut output = Vec::new();
        let choice = ui.prompt_confirmation_with_io(&mut input, &mut output).unwrap();
        assert_eq!(choice, ConfirmChoice::Execute);
    }

    // =========================================================================
    // Dependency prompt
    // =========================================================================

    fn missing_ffmpeg() -> Vec<(String, Option<String>)> {
        vec![(
            "ffmpeg".to_string(),
            Some("sudo apt install -y ffmpeg".to_string()),
        )]
    }

    #[test]
    fn dependency_prompt_maps_all_choices() {
        let ui = PromptUi::new();
        let cases = [
            ("i\n", DependencyChoice::Install),
            ("a\n", DependencyChoice::Alternative),
            ("c\n", DependencyChoice::Continue),
            ("n\n", DependencyChoice::Cancel),
            ("whatever\n", DependencyChoice::Cancel),
        ];
        for (text, expected) in cases {
            let mut input = Cursor::new(text.as_bytes());
            let mut output = Vec::new();
            let choice = ui
                .prompt_dependency_choice_with_io(&missing_ffmpeg(), &mut input, &mut output)
                .unwrap();
            assert_eq!(choice, expected, "input {text:?}");
        }
    }

    #[test]
    fn dependency_prompt_shows_install_commands() {
        let ui = PromptUi::new();
        let mut input = Cursor::new(b"n\n");
        let mut output = Vec::new();
        ui.prompt_dependency_choice_with_io(&missing_ffmpeg(), &mut input, &mut output)
            .unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("ffmpeg"));
        assert!(text.contains("sudo apt install -y ffmpeg"));
    }

    #[test]
    fn dependency_prompt_notes_missing_manager() {
        let ui = PromptUi::new();
        let mut input = Cursor::new(b"n\n");
        let mut output = Vec::new();
        ui.prompt_dependency_choice_with_io(
            &[("ffmpeg".to_string(), None)],
            &mut input,
            &mut output,
        )
        .unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("no package manager"));
    }

    // =========================================================================
    // Alternative prompt
    // =========================================================================

    #[test]
    fn alternative_prompt_accepts_on_y_only() {
        let ui = PromptUi::new();
        let alt = AlternativeSuggestion {
            command: "tar -czf out.tar.gz dir".to_string(),
            explanation: "uses tar instead".to_string(),
        };

        let mut input = Cursor::new(b"y\n");
        let mut output = Vec::new();
        assert!(ui.prompt_alternative_with_io(&alt, &mut input, &mut output).unwrap());

        let mut input = Cursor::new(b"n\n");
        let mut output = Vec::new();
        assert!(!ui.prompt_alternative_with_io(&alt, &mut input, &mut output).unwrap());
    }

    // =========================================================================
    // Display
    // =========================================================================

    #[test]
    fn display_suggestion_shows_all_fields() {
        let ui = PromptUi::new();
        let mut output = Vec::new();
        ui.display_suggestion_with_io(
            &suggestion(SafetyLevel::Dangerous, vec!["irreversible"]),
            &mut output,
        )
        .unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("ls -la"));
        assert!(text.contains("lists files"));
        assert!(text.contains("DANGEROUS"));
        assert!(text.contains("irreversible"));
    }

    #[test]
    fn display_result_reports_timeout() {
        let ui = PromptUi::new();
        let result = ExecutionResult {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            timed_out: true,
        };
        let mut output = Vec::new();
        ui.display_result_with_io(&result, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("timed out"));
    }

    #[test]
    fn display_result_reports_nonzero_exit_with_stderr() {
        let ui = PromptUi::new();
        let result = ExecutionResult {
            stdout: String::new(),
            stderr: "no such file\n".to_string(),
            exit_code: Some(2),
            timed_out: false,
        };
        let mut output = Vec::new();
        ui.display_result_with_io(&result, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("no such file"));
        assert!(text.contains("exit code 2"));
    }
}
