// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! Socrates' Echo - Socratic philosophy tutor for your terminal
//!
//! Entry point for the Socrates CLI application.

use std::sync::Arc;

use clap::Parser;

use socrates::api::BackendClient;
use socrates::auth::TokenStore;
use socrates::cli::{ChatArgs, Cli, Commands};
use socrates::config::Settings;
use socrates::error::Result;

#[path = "main/chat_repl.rs"]
mod chat_repl;
#[path = "main/cli_commands.rs"]
mod cli_commands;

use chat_repl::run_chat;
use cli_commands::{
    run_ask, run_classes, run_configure, run_login, run_logout, run_models, run_register,
    run_trails, run_whoami,
};

const DEBUG_TARGETS: [&str; 4] = [
    "socrates.session",
    "socrates.provider",
    "socrates.api",
    "socrates.auth",
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let settings = Settings::load()?;
    settings.validate()?;

    let tokens = Arc::new(TokenStore::open(
        Settings::token_path(),
        Some(settings.auth.token_env.clone()),
    )?);

    let client = match &cli.backend_url {
        Some(url) => BackendClient::new(url.as_str(), tokens.clone(), settings.request_timeout())?,
        None => BackendClient::from_settings(&settings, tokens.clone())?,
    };
    let client = Arc::new(client);
    tracing::debug!(base_url = client.base_url(), "backend client ready");

    match cli.command {
        None => run_chat(ChatArgs::default(), client, &settings).await?,
        Some(Commands::Chat(args)) => run_chat(args, client, &settings).await?,
        Some(Commands::Ask(args)) => run_ask(args, client).await?,
        Some(Commands::Configure(args)) => run_configure(args, client, &settings).await?,
        Some(Commands::Models(args)) => run_models(args)?,
        Some(Commands::Login(args)) => run_login(args, &client, &tokens).await?,
        Some(Commands::Register(args)) => run_register(args, &client, &tokens).await?,
        Some(Commands::Whoami) => run_whoami(&client).await?,
        Some(Commands::Logout) => run_logout(&tokens)?,
        Some(Commands::Trails) => run_trails(&client).await?,
        Some(Commands::Classes) => run_classes(&client).await?,
    }

    Ok(())
}

/// `-v` turns on debug output for the client's own targets, `-vv` trace.
/// `RUST_LOG` still takes precedence.
fn init_tracing(verbose: u8) {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    let level = match verbose {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    };
    if let Some(level) = level {
        for target in DEBUG_TARGETS {
            if let Ok(parsed) = format!("{}={}", target, level).parse() {
                env_filter = env_filter.add_directive(parsed);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
