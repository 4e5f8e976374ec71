//! Interactive chat playground for Hugging Face chat models.
//!
//! This binary provides a REPL for chatting with a model from a fixed
//! allow-list via the Hugging Face chat-completion API.
//!
//! # Usage
//!
//! ```bash
//! # Token from the environment
//! HUGGINGFACEHUB_API_TOKEN=hf_... hfchat
//!
//! # Token from a secrets file
//! hfchat --secrets ~/.config/hfchat/secrets.yaml
//!
//! # Pick a model and disable colors (useful for piping output)
//! hfchat --model mistralai/Mistral-7B-Instruct-v0.1 --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Clear conversation history
//! - `/models` - List available models
//! - `/model <name|number>` - Change the model
//! - `/history` - Show the conversation so far
//! - `/export [path]` - Save the transcript
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use hfchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    models_text, parse_command,
};
use hfchat::{
    Credential, DEFAULT_EXPORT_FILE, DEFAULT_SECRETS_PATH, Inference, InferenceClient,
    TOKEN_VARIABLE,
};

/// Main entry point for the hfchat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("hfchat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;

    // Flag for skipping the reply animation
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    let mut renderer =
        PlainTextRenderer::with_color(config.use_color).with_interrupt(interrupted.clone());

    let credential = load_credential(&config, &mut renderer);
    let client = InferenceClient::with_options(config.base_url.clone(), config.timeout)?;
    let mut session = ChatSession::new(client, &config, credential);
    let mut rl = DefaultEditor::new()?;

    println!("LLM Playground (model: {})", session.model());
    println!("Chat with a large language model. Switch models at any time with /model.");
    println!("Type /help for commands, /quit to exit\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    if !run_command(cmd, &mut session, &mut renderer) {
                        break;
                    }
                    continue;
                }

                session.submit(line, &mut renderer).await;
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn load_credential(config: &ChatConfig, renderer: &mut dyn Renderer) -> Option<Credential> {
    match Credential::from_environment(config.secrets_path.as_deref()) {
        Ok(Some(credential)) => {
            renderer.print_success("Hugging Face API token loaded successfully!");
            Some(credential)
        }
        Ok(None) => {
            renderer.print_error("Hugging Face API token not found!");
            let secrets = config
                .secrets_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| DEFAULT_SECRETS_PATH.to_string());
            renderer.print_info(&format!(
                "Set {TOKEN_VARIABLE} or add it to {secrets}. Chatting works, but replies are disabled."
            ));
            None
        }
        Err(err) => {
            renderer.print_error(&format!("Could not load API token: {err}"));
            None
        }
    }
}

/// Runs a slash command. Returns false when the session should end.
fn run_command<I: Inference>(
    cmd: ChatCommand,
    session: &mut ChatSession<I>,
    renderer: &mut PlainTextRenderer,
) -> bool {
    match cmd {
        ChatCommand::Quit => {
            println!("Goodbye!");
            return false;
        }
        ChatCommand::Clear => {
            session.clear();
            renderer.print_success("Chat history cleared!");
        }
        ChatCommand::Help => {
            for line in help_text().lines() {
                println!("    {}", line);
            }
        }
        ChatCommand::ListModels => {
            for line in models_text(session.model()).lines() {
                println!("    {}", line);
            }
        }
        ChatCommand::Model(model) => {
            session.set_model(model);
            renderer.print_info(&format!("Model changed to: {}", model));
        }
        ChatCommand::History => {
            session.replay_history(renderer);
        }
        ChatCommand::Export(path) => {
            let path = path.unwrap_or_else(|| DEFAULT_EXPORT_FILE.to_string());
            if session.message_count() == 0 {
                renderer.print_info("Chat history is empty.");
            } else {
                match session.export_to(&path) {
                    Ok(()) => renderer.print_success(&format!("Chat history saved to {}", path)),
                    Err(err) => {
                        renderer.print_error(&format!("Failed to export chat history: {}", err))
                    }
                }
            }
        }
        ChatCommand::Stats => {
            print_stats(session);
        }
        ChatCommand::Invalid(message) => {
            renderer.print_error(&message);
        }
    }
    true
}

fn print_stats<I: Inference>(session: &ChatSession<I>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Messages: {}", stats.message_count);
    println!(
        "      API token: {}",
        if stats.has_credential {
            "loaded"
        } else {
            "missing"
        }
    );
    println!(
        "      Requests: {} ({} failed)",
        stats.total_requests, stats.failed_requests
    );
    println!(
        "      Total tokens: {} in / {} out",
        stats.total_prompt_tokens, stats.total_completion_tokens
    );
}
