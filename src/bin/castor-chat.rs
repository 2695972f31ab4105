//! Interactive chat application for conversing with Gemini.
//!
//! This binary provides a REPL interface for chatting with Gemini models,
//! with multiple in-memory conversations and code-block saving.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings (requires GEMINI_API_KEY)
//! castor-chat
//!
//! # Specify a model
//! castor-chat --model gemini-2.5-pro
//!
//! # Disable colors (useful for piping output)
//! castor-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/new` - Start a new conversation
//! - `/chats` - List conversations
//! - `/switch <n>` - Switch to conversation n
//! - `/save <n> <file>` - Save code block n to a file
//! - `/model <name>` - Change the model
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::path::PathBuf;
use std::sync::Arc;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use castor::chat::{
    ChatArgs, ChatCommand, ChatConfig, Conversation, PlainTextRenderer, Renderer, SessionStore,
    dispatch_turn, help_text, parse_command, render_model_text, save_code_block,
};
use castor::{Gateway, Gemini, Role};

/// Main entry point for the castor-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("castor-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let use_color = config.use_color;

    // A missing GEMINI_API_KEY is fatal before any prompt is shown.
    let mut client = match Gemini::with_options(
        None,
        config.endpoint.clone(),
        Some(config.model.clone()),
        None,
    ) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("castor-chat: {err}");
            std::process::exit(1);
        }
    };

    let mut store = SessionStore::new();
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Save targets for /save: every code block rendered in the current
    // conversation, in display order.
    let mut code_blocks: Vec<String> = Vec::new();

    println!("Gemini Chat (model: {})", client.model());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::New => {
                            store.create_conversation();
                            code_blocks.clear();
                            renderer.print_info("Started a new conversation.");
                        }
                        ChatCommand::Chats => {
                            print_chats(&store);
                        }
                        ChatCommand::Switch(number) => {
                            match store.switch_to(number - 1) {
                                Ok(()) => {
                                    code_blocks.clear();
                                    renderer.print_info(&format!(
                                        "Switched to: {}",
                                        store.current().title()
                                    ));
                                    render_transcript(
                                        &mut renderer,
                                        store.current(),
                                        &mut code_blocks,
                                    );
                                }
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::SaveCode { index, path } => {
                            match code_blocks.get(index - 1) {
                                Some(code) => {
                                    match save_code_block(code, &PathBuf::from(&path)) {
                                        Ok(written) => renderer.print_info(&format!(
                                            "Code saved to {}",
                                            written.display()
                                        )),
                                        Err(err) => renderer.print_error(&format!(
                                            "Failed to save code: {}",
                                            err
                                        )),
                                    }
                                }
                                None => renderer.print_error(&format!(
                                    "No code block #{index} in this conversation"
                                )),
                            }
                        }
                        ChatCommand::Model(model_name) => {
                            client.set_model(&model_name);
                            renderer.print_info(&format!("Model changed to: {}", model_name));
                        }
                        ChatCommand::Stats => {
                            print_stats(&store, client.model());
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message: append the turn, dispatch the worker,
                // and block on the result channel. No new input is read
                // while the request is in flight.
                store.append_message(Role::User, line);
                let snapshot = store.current().messages().to_vec();
                let gateway: Arc<dyn Gateway> = Arc::new(client.clone());
                let mut rx = dispatch_turn(gateway, snapshot);

                match rx.recv().await {
                    Some(Ok(reply)) => {
                        store.append_message(Role::Model, &reply.text);
                        renderer.begin_message(Role::Model);
                        render_model_text(&mut renderer, &reply.text, &mut code_blocks);
                        renderer.finish_message();
                    }
                    Some(Err(err)) => {
                        if err.rolls_back_turn() {
                            store.rollback_last_user_message();
                        }
                        renderer.print_error(&err.to_string());
                    }
                    None => {
                        store.rollback_last_user_message();
                        renderer.print_error("Request worker terminated unexpectedly");
                    }
                }
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

fn print_chats(store: &SessionStore) {
    println!("    Conversations:");
    for (i, conversation) in store.conversations().iter().enumerate() {
        let marker = if i == store.current_index() { "*" } else { " " };
        println!("    {} {}. {}", marker, i + 1, conversation.title());
    }
}

fn print_stats(store: &SessionStore, model: &str) {
    println!("    Session Statistics:");
    println!("      Model: {}", model);
    println!("      Conversations: {}", store.conversations().len());
    println!(
        "      Current: {} ({} messages)",
        store.current().title(),
        store.current().messages().len()
    );
}

/// Re-display a stored transcript. Model messages go through the same
/// segmenter as live replies, so code blocks come back with save indices.
fn render_transcript(
    renderer: &mut dyn Renderer,
    conversation: &Conversation,
    code_blocks: &mut Vec<String>,
) {
    for message in conversation.messages() {
        renderer.begin_message(message.role);
        match message.role {
            Role::User => renderer.print_text(&message.text()),
            Role::Model => render_model_text(renderer, &message.text(), code_blocks),
        }
        renderer.finish_message();
    }
}
