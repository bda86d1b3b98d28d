//! The per-request decision state machine.
//!
//! One request flows one direction: free text → suggestion → optional
//! dependency remediation → optional execution. Each transition blocks on a
//! provider call, a subprocess, or operator input; there is never more than
//! one request in flight per orchestrator.
//!
//! A suggested command is never executed without either explicit operator
//! confirmation or a `safe` classification under auto-execute mode.

use crate::environment::ResolvedEnvironment;
use crate::executor::{CommandRunner, ExecutionEngine};
use crate::llm_provider::{CommandSuggestionProvider, SafetyLevel};
use crate::prompt_ui::{Clipboard, ConfirmChoice, DependencyChoice, ManualClipboard, PromptUi};
use crate::resolver::DependencyResolver;
use anyhow::Result;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

/// Terminal state of one request.
#[derive(Debug)]
pub enum RequestOutcome {
    /// The command ran to completion; success or failure is on the result.
    Completed(crate::executor::ExecutionResult),
    /// The command exceeded the timeout and was terminated.
    TimedOut,
    /// Command text was handed to the clipboard collaborator.
    Copied,
    /// The operator declined somewhere along the way.
    Cancelled,
}

pub struct RequestOrchestrator {
    provider: Box<dyn CommandSuggestionProvider>,
    resolver: DependencyResolver,
    runner: Box<dyn CommandRunner>,
    clipboard: Box<dyn Clipboard>,
    ui: PromptUi,
    environment: ResolvedEnvironment,
    auto_execute: bool,
    timeout_seconds: u64,
}

impl RequestOrchestrator {
    pub fn new(
        provider: Box<dyn CommandSuggestionProvider>,
        environment: ResolvedEnvironment,
        auto_execute: bool,
        timeout_seconds: u64,
    ) -> Self {
        Self::with_parts(
            provider,
            DependencyResolver::new(),
            Box::new(ExecutionEngine::new()),
            Box::new(ManualClipboard),
            environment,
            auto_execute,
            timeout_seconds,
        )
    }

    /// Constructor with every collaborator injected (for tests).
    pub fn with_parts(
        provider: Box<dyn CommandSuggestionProvider>,
        resolver: DependencyResolver,
        runner: Box<dyn CommandRunner>,
        clipboard: Box<dyn Clipboard>,
        environment: ResolvedEnvironment,
        auto_execute: bool,
        timeout_seconds: u64,
    ) -> Self {
        Self {
            provider,
            resolver,
            runner,
            clipboard,
            ui: PromptUi::new(),
            environment,
            auto_execute,
            timeout_seconds,
        }
    }

    /// Runs one request against stdin/stdout.
    pub async fn process_request(&self, request: &str) -> Result<RequestOutcome> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        self.process_request_with_io(request, &mut input, &mut output).await
    }

    /// Runs one request with injected operator I/O.
    pub async fn process_request_with_io<R: BufRead, W: Write>(
        &self,
        request: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<RequestOutcome> {
        // Generating
        writeln!(output, "\n💭 Generating command via {}...", self.provider.name())?;
        let mut suggestion = self.provider.generate(request).await?;
        info!("Suggested command: {}", suggestion.command);

        // Suggested
        self.ui.display_suggestion_with_io(&suggestion, output)?;

        let tools = self.resolver.extract_tools(&suggestion.command);
        let missing = self.resolver.find_missing(&tools);

        // DependencyChoice
        if !missing.is_empty() {
            warn!("Missing tools for suggested command: {:?}", missing);
            let manager = self.environment.package_manager;
            let remediation: Vec<(String, Option<String>)> = missing
                .iter()
                .map(|tool| {
                    (
                        tool.clone(),
                        self.resolver.resolve_install_command(tool, manager),
                    )
                })
                .collect();

            match self
                .ui
                .prompt_dependency_choice_with_io(&remediation, input, output)?
            {
                DependencyChoice::Install => {
                    self.install_missing(&remediation, output).await?;
                }
                DependencyChoice::Alternative => {
                    match self.try_alternative(&suggestion.command, &missing[0], input, output).await? {
                        Some(alternative) => suggestion.command = alternative,
                        None => return Ok(RequestOutcome::Cancelled),
                    }
                }
                DependencyChoice::Continue => {
                    info!("Continuing with missing tools: {:?}", missing);
                }
                DependencyChoice::Cancel => return Ok(RequestOutcome::Cancelled),
            }
        }

        // AwaitingConfirmation. Auto-execute applies only to commands the
        // provider classified safe; everything else asks.
        if self.auto_execute && suggestion.safety_level == SafetyLevel::Safe {
            writeln!(output, "\n⚡ Auto-executing (classified safe)")?;
        } else {
            match self.ui.prompt_confirmation_with_io(input, output)? {
                ConfirmChoice::Execute => {}
                ConfirmChoice::Copy => {
                    self.clipboard.copy(&suggestion.command)?;
                    return Ok(RequestOutcome::Copied);
                }
                ConfirmChoice::Edit(replacement) => {
                    if replacement.is_empty() {
                        return Ok(RequestOutcome::Cancelled);
                    }
                    suggestion.command = replacement;
                }
                ConfirmChoice::Cancel => {
                    writeln!(output, "Execution cancelled")?;
                    return Ok(RequestOutcome::Cancelled);
                }
            }
        }

        // Executing
        let result = self.runner.run(&suggestion.command, self.timeout_seconds).await?;
        self.ui.display_result_with_io(&result, output)?;

        if result.timed_out {
            Ok(RequestOutcome::TimedOut)
        } else {
            Ok(RequestOutcome::Completed(result))
        }
    }

    /// Best-effort sequential install of every missing tool. A failing
    /// install is reported and does not abort the remaining ones.
    async fn install_missing<W: Write>(
        &self,
        remediation: &[(String, Option<String>)],
        output: &mut W,
    ) -> Result<()> {
        for (tool, install) in remediation {
            let Some(install) = install else {
                writeln!(output, "⏭️  No install command available for '{tool}', skipping")?;
                continue;
            };
            writeln!(output, "\n📥 Installing {tool}: {install}")?;
            match self.runner.run(install, self.timeout_seconds).await {
                Ok(result) if result.success() => {
                    writeln!(output, "✅ Installed {tool}")?;
                }
                Ok(result) => {
                    warn!("Install of {} failed with {:?}", tool, result.exit_code);
                    writeln!(output, "❌ Install of {tool} failed; continuing")?;
                    if !result.stderr.is_empty() {
                        write!(output, "{}", result.stderr)?;
                    }
                }
                Err(err) => {
                    warn!("Install of {} could not run: {}", tool, err);
                    writeln!(output, "❌ Install of {tool} could not run: {err}")?;
                }
            }
        }
        Ok(())
    }

    /// Asks the provider for an alternative avoiding the first missing tool.
    ///
    /// Returns the replacement command if the operator accepts it; `None`
    /// means the request is cancelled (declined, or the call failed).
    async fn try_alternative<R: BufRead, W: Write>(
        &self,
        original_command: &str,
        missing_tool: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<Option<String>> {
        let alternative = match self
            .provider
            .suggest_alternative(original_command, missing_tool)
            .await
        {
            Ok(alternative) => alternative,
            Err(err) => {
                warn!("Alternative suggestion failed: {}", err);
                writeln!(output, "❌ Could not get an alternative: {err}")?;
                return Ok(None);
            }
        };

        if self.ui.prompt_alternative_with_io(&alternative, input, output)? {
            Ok(Some(alternative.command))
        } else {
            Ok(None)
        }
    }
}
