// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use socrates::api::{BackendClient, TutorBackend};
use socrates::cli::ChatArgs;
use socrates::config::Settings;
use socrates::error::Result;
use socrates::session::{Message, MessageRole, SessionController, SubmitIgnored, SubmitOutcome};

/// What the REPL should do with one line of input
#[derive(Debug, PartialEq, Eq)]
enum ReplInput {
    Quit,
    Help,
    New,
    Submit(String),
    Nothing,
}

/// Map a raw input line to an action. A bare number picks from `options`.
fn parse_input(line: &str, options: &[String]) -> ReplInput {
    let trimmed = line.trim();
    match trimmed {
        "" => ReplInput::Nothing,
        "/quit" | "/exit" | "exit" => ReplInput::Quit,
        "/help" => ReplInput::Help,
        "/new" => ReplInput::New,
        _ => match trimmed.parse::<usize>() {
            Ok(n) if n >= 1 && n <= options.len() => ReplInput::Submit(options[n - 1].clone()),
            _ => ReplInput::Submit(line.trim_end_matches(['\r', '\n']).to_string()),
        },
    }
}

pub(super) async fn run_chat(
    args: ChatArgs,
    client: Arc<BackendClient>,
    settings: &Settings,
) -> Result<()> {
    let backend: Arc<dyn TutorBackend> = client;
    let mut controller = SessionController::new(backend);
    if let Some(trail) = &args.trail {
        controller = controller.with_trail(trail.clone());
    }
    let show_timestamps = settings.defaults.show_timestamps;

    print_welcome(&controller)?;

    let mut pending_prompt = args.prompt;
    loop {
        let options = controller.prompt_options();
        let line = match pending_prompt.take() {
            Some(prompt) => prompt,
            None => {
                print_prompt_options(&options)?;
                match read_user_input()? {
                    Some(line) => line,
                    None => break,
                }
            }
        };

        match parse_input(&line, &options) {
            ReplInput::Nothing => continue,
            ReplInput::Quit => break,
            ReplInput::Help => print_help(),
            ReplInput::New => match controller.reset() {
                Ok(()) => print_welcome(&controller)?,
                Err(e) => eprintln!("{}", e),
            },
            ReplInput::Submit(text) => {
                let before = controller.message_count();
                match submit_with_indicator(&controller, &text).await? {
                    SubmitOutcome::Ignored(SubmitIgnored::EmptyInput) => continue,
                    SubmitOutcome::Ignored(SubmitIgnored::AlreadyPending) => {
                        eprintln!("Aguarde a resposta anterior.");
                        continue;
                    }
                    _ => {}
                }
                for message in controller.messages().iter().skip(before + 1) {
                    print_message(message, show_timestamps)?;
                }
                if let Some(assessment) = controller.last_assessment() {
                    let mut stdout = io::stdout();
                    stdout.execute(SetForegroundColor(Color::DarkGrey))?;
                    println!("avaliação: {}", assessment);
                    stdout.execute(ResetColor)?;
                }
            }
        }
    }

    Ok(())
}

/// Submit on a background task and print a thinking indicator until it ends.
async fn submit_with_indicator(
    controller: &SessionController,
    text: &str,
) -> Result<SubmitOutcome> {
    let mut handle = match controller.spawn_submit(text) {
        Ok(handle) => handle,
        Err(reason) => return Ok(SubmitOutcome::Ignored(reason)),
    };

    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::DarkGrey))?;
    print!("sócrates está pensando");
    stdout.flush()?;

    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    ticker.tick().await;
    let outcome = loop {
        tokio::select! {
            joined = &mut handle => break joined,
            _ = ticker.tick() => {
                print!(".");
                stdout.flush()?;
            }
        }
    };
    println!();
    stdout.execute(ResetColor)?;

    match outcome {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            tracing::error!(target: "socrates.session", error = %e, "submit task failed");
            Ok(SubmitOutcome::Detached)
        }
    }
}

fn print_welcome(controller: &SessionController) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    println!("Socrates' Echo v{}", env!("CARGO_PKG_VERSION"));
    stdout.execute(ResetColor)?;
    println!("Seu tutor socrático de filosofia");
    println!("Sessão: {}", controller.short_session_label());
    println!("Digite /help para ver os comandos.");
    println!();
    Ok(())
}

fn print_help() {
    println!("\nComandos:");
    println!("  /new   - Começar uma nova conversa");
    println!("  /help  - Mostrar esta ajuda");
    println!("  /quit  - Sair");
    println!("  <n>    - Enviar a pergunta sugerida de número n");
    println!();
}

fn print_prompt_options(options: &[String]) -> Result<()> {
    if options.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Yellow))?;
    for (i, option) in options.iter().enumerate() {
        println!("  [{}] {}", i + 1, option);
    }
    stdout.execute(ResetColor)?;
    Ok(())
}

fn role_color(role: MessageRole) -> Color {
    match role {
        MessageRole::User => Color::Green,
        MessageRole::Assistant => Color::Cyan,
        MessageRole::Error => Color::Red,
    }
}

fn print_message(message: &Message, show_timestamps: bool) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(role_color(message.role)))?;
    if show_timestamps {
        print!("\n[{}] ", message.created_at.format("%H:%M"));
    } else {
        println!();
    }
    print!("{}: ", message.role.label());
    stdout.execute(ResetColor)?;
    println!("{}", message.text);

    if let Some(image) = &message.image {
        stdout.execute(SetForegroundColor(Color::DarkGrey))?;
        println!("[imagem: {} bytes]", image.len());
        stdout.execute(ResetColor)?;
    }
    Ok(())
}

/// Read one line; `None` on end of input.
fn read_user_input() -> Result<Option<String>> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Green))?;
    print!("você: ");
    stdout.execute(ResetColor)?;
    stdout.flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input))
}
