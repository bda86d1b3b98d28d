use clap::{Arg, ArgAction, Command};
use std::io::{self, Write};
use tracing::info;

use shellpilot::config::Config;
use shellpilot::environment::ResolvedEnvironment;
use shellpilot::llm_provider::provider_from_config;
use shellpilot::orchestrator::RequestOrchestrator;
use shellpilot::prompt_ui::PromptUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let matches = Command::new("shellpilot")
        .about("Translate natural language into supervised shell commands")
        .long_about(
            "shellpilot asks a language-model backend for a shell command matching your \
             request, shows its risk tier, offers to install missing tools, and executes \
             only what you approve",
        )
        .arg(
            Arg::new("auto")
                .long("auto")
                .help("Execute commands classified safe without asking for confirmation")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("request")
                .help("The request to translate; omit to enter interactive mode")
                .num_args(0..),
        )
        .get_matches();

    let config = Config::load();
    let provider = match provider_from_config(&config) {
        Ok(provider) => provider,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };

    let auto_execute = matches.get_flag("auto");
    let environment = ResolvedEnvironment::detect();
    let orchestrator =
        RequestOrchestrator::new(provider, environment, auto_execute, config.timeout_seconds());

    let request_args: Vec<String> = matches
        .get_many::<String>("request")
        .unwrap_or_default()
        .cloned()
        .collect();

    if !request_args.is_empty() {
        let request = request_args.join(" ");
        info!("Processing single request: {}", request);
        if let Err(err) = orchestrator.process_request(&request).await {
            eprintln!("❌ {err}");
        }
        return Ok(());
    }

    run_interactive(&orchestrator).await
}

/// Read-loop until an exit keyword, EOF, or interrupt.
async fn run_interactive(orchestrator: &RequestOrchestrator) -> anyhow::Result<()> {
    let ui = PromptUi::new();
    ui.show_banner();
    println!("Type a request in plain English. 'quit' or Ctrl-C ends the session.");

    // An interrupt ends the session the same way an explicit quit does.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nSession ended");
            std::process::exit(0);
        }
    });

    let stdin = io::stdin();
    loop {
        print!("\nWhat would you like to do? ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let request = line.trim();
        if request.is_empty() {
            continue;
        }
        if matches!(request.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        // Provider and parse failures abort this request only.
        if let Err(err) = orchestrator.process_request(request).await {
            eprintln!("❌ {err}");
        }
    }

    println!("\nSession ended");
    Ok(())
}
