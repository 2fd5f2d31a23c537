// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for Socrates.

use clap::{Parser, Subcommand};

use crate::api::UserRole;
use crate::provider::Provider;

/// Socrates' Echo - a Socratic philosophy tutor in your terminal
#[derive(Parser, Debug)]
#[command(name = "socrates")]
#[command(version, about = "Socratic philosophy tutor for your terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend base URL (overrides settings and environment)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive conversation (default when no command given)
    Chat(ChatArgs),

    /// Ask a single question (non-interactive)
    Ask(AskArgs),

    /// Validate and save an LLM provider credential
    Configure(ConfigureArgs),

    /// List the models offered for each provider
    Models(ModelsArgs),

    /// Log in and store the access token
    Login(LoginArgs),

    /// Create an account and store the access token
    Register(RegisterArgs),

    /// Show the logged-in user
    Whoami,

    /// Forget the stored access token
    Logout,

    /// List learning trails
    Trails,

    /// List classes
    Classes,
}

/// Arguments for the chat subcommand
#[derive(clap::Args, Debug, Default)]
pub struct ChatArgs {
    /// Opening question
    pub prompt: Option<String>,

    /// Learning trail to attach the conversation to
    #[arg(long)]
    pub trail: Option<String>,
}

/// Arguments for the ask subcommand
#[derive(clap::Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,

    /// Learning trail to attach the question to
    #[arg(long)]
    pub trail: Option<String>,
}

/// Arguments for the configure subcommand
#[derive(clap::Args, Debug)]
pub struct ConfigureArgs {
    /// Provider to configure (defaults to the settings default)
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// API key for the provider
    #[arg(short = 'k', long)]
    pub api_key: String,

    /// Model to use (defaults to the provider's first model)
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for the models subcommand
#[derive(clap::Args, Debug)]
pub struct ModelsArgs {
    /// Only list this provider
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,
}

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,
}

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    #[arg(long, value_enum, default_value = "student")]
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_no_command() {
        let cli = Cli::parse_from(["socrates"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(cli.backend_url.is_none());
    }

    #[test]
    fn test_cli_verbose_multiple() {
        let cli = Cli::parse_from(["socrates", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_backend_url_is_global() {
        let cli = Cli::parse_from(["socrates", "trails", "--backend-url", "http://tutor:8001"]);
        assert_eq!(cli.backend_url.as_deref(), Some("http://tutor:8001"));
        assert!(matches!(cli.command, Some(Commands::Trails)));
    }

    #[test]
    fn test_chat_command_with_prompt() {
        let cli = Cli::parse_from(["socrates", "chat", "O que é filosofia?"]);
        match cli.command {
            Some(Commands::Chat(args)) => {
                assert_eq!(args.prompt.as_deref(), Some("O que é filosofia?"));
                assert!(args.trail.is_none());
            }
            other => panic!("Expected Chat command, got {:?}", other),
        }
    }

    #[test]
    fn test_ask_command_with_trail() {
        let cli = Cli::parse_from(["socrates", "ask", "Quem foi Sócrates?", "--trail", "t1"]);
        match cli.command {
            Some(Commands::Ask(args)) => {
                assert_eq!(args.question, "Quem foi Sócrates?");
                assert_eq!(args.trail.as_deref(), Some("t1"));
            }
            other => panic!("Expected Ask command, got {:?}", other),
        }
    }

    #[test]
    fn test_configure_command() {
        let cli = Cli::parse_from([
            "socrates",
            "configure",
            "--provider",
            "anthropic",
            "--api-key",
            "sk-ant",
            "--model",
            "claude-3-5-haiku-20241022",
        ]);
        match cli.command {
            Some(Commands::Configure(args)) => {
                assert_eq!(args.provider, Some(Provider::Anthropic));
                assert_eq!(args.api_key, "sk-ant");
                assert_eq!(args.model.as_deref(), Some("claude-3-5-haiku-20241022"));
            }
            other => panic!("Expected Configure command, got {:?}", other),
        }
    }

    #[test]
    fn test_configure_requires_api_key() {
        assert!(Cli::try_parse_from(["socrates", "configure"]).is_err());
    }

    #[test]
    fn test_models_rejects_unknown_provider() {
        assert!(Cli::try_parse_from(["socrates", "models", "--provider", "mistral"]).is_err());
    }

    #[test]
    fn test_register_defaults_to_student() {
        let cli = Cli::parse_from([
            "socrates",
            "register",
            "--name",
            "Maria",
            "--email",
            "m@example.com",
            "--password",
            "secret",
        ]);
        match cli.command {
            Some(Commands::Register(args)) => assert_eq!(args.role, UserRole::Student),
            other => panic!("Expected Register command, got {:?}", other),
        }
    }
}
