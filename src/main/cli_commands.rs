// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 The Socrates' Echo Authors

use std::io;
use std::sync::Arc;

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use socrates::api::{AuthReply, BackendClient, RegisterRequest, TutorBackend};
use socrates::auth::TokenStore;
use socrates::cli::{AskArgs, ConfigureArgs, LoginArgs, ModelsArgs, RegisterArgs};
use socrates::config::Settings;
use socrates::error::{Result, SocratesError};
use socrates::provider::{
    default_models, Provider, ProviderConfigGate, ValidateIgnored, ValidateOutcome,
    ValidationResult,
};
use socrates::session::{MessageRole, SessionController, SubmitOutcome};

/// Ask a single question and print the reply with its follow-ups
pub(super) async fn run_ask(args: AskArgs, client: Arc<BackendClient>) -> Result<()> {
    let backend: Arc<dyn TutorBackend> = client;
    let mut controller = SessionController::new(backend);
    if let Some(trail) = args.trail {
        controller = controller.with_trail(trail);
    }

    if let SubmitOutcome::Ignored(_) = controller.submit(&args.question).await {
        return Err(SocratesError::InvalidInput(
            "Question must not be empty".to_string(),
        ));
    }

    let Some(reply) = controller.last_message() else {
        return Ok(());
    };
    if reply.role == MessageRole::Error {
        let mut stderr = io::stderr();
        stderr.execute(SetForegroundColor(Color::Red))?;
        eprintln!("{}", reply.text);
        stderr.execute(ResetColor)?;
        return Ok(());
    }

    println!("{}", reply.text);
    if let Some(image) = &reply.image {
        println!("[imagem: {} bytes]", image.len());
    }
    let suggested = controller.suggested();
    if !suggested.is_empty() {
        println!("\nPerguntas sugeridas:");
        for question in suggested {
            println!("  - {}", question);
        }
    }
    Ok(())
}

/// Validate a provider credential and save it to the account
pub(super) async fn run_configure(
    args: ConfigureArgs,
    client: Arc<BackendClient>,
    settings: &Settings,
) -> Result<()> {
    let provider = match args.provider {
        Some(provider) => provider,
        None => settings.default_provider()?,
    };

    let backend: Arc<dyn TutorBackend> = client;
    let gate = ProviderConfigGate::with_provider(backend, provider);
    gate.set_api_key(args.api_key);
    if let Some(model) = &args.model {
        gate.select_model(model)?;
    }

    let config = gate.config();
    println!("Validando {} ({})...", config.provider.display_name(), config.model);

    let mut stdout = io::stdout();
    match gate.validate().await {
        ValidateOutcome::Finished(ValidationResult::Valid { models }) => {
            stdout.execute(SetForegroundColor(Color::Green))?;
            println!("✓ Chave válida e configuração salva.");
            stdout.execute(ResetColor)?;
            let selected = gate.config().model;
            println!("Modelo salvo: {}", selected);
            if !models.is_empty() {
                println!("Modelos disponíveis:");
                for model in models {
                    let marker = if model == selected { "*" } else { " " };
                    println!("  {} {}", marker, model);
                }
            }
            Ok(())
        }
        ValidateOutcome::Finished(result) => {
            let error = result.error().unwrap_or("Validation failed");
            Err(SocratesError::Provider(error.to_string()))
        }
        ValidateOutcome::Ignored(ValidateIgnored::MissingApiKey) => Err(
            SocratesError::InvalidInput("API key must not be empty".to_string()),
        ),
        ValidateOutcome::Ignored(ValidateIgnored::AlreadyValidating)
        | ValidateOutcome::Detached => Ok(()),
    }
}

/// Print the static model catalog
pub(super) fn run_models(args: ModelsArgs) -> Result<()> {
    let providers: Vec<Provider> = match args.provider {
        Some(provider) => vec![provider],
        None => Provider::ALL.to_vec(),
    };

    let mut stdout = io::stdout();
    for provider in providers {
        stdout.execute(SetForegroundColor(Color::Cyan))?;
        println!("{} ({})", provider.display_name(), provider);
        stdout.execute(ResetColor)?;
        for model in default_models(provider) {
            println!("  {}", model);
        }
    }
    Ok(())
}

pub(super) async fn run_login(
    args: LoginArgs,
    client: &BackendClient,
    tokens: &TokenStore,
) -> Result<()> {
    let reply = client.login(&args.email, &args.password).await?;
    remember_login(reply, tokens)
}

pub(super) async fn run_register(
    args: RegisterArgs,
    client: &BackendClient,
    tokens: &TokenStore,
) -> Result<()> {
    let request = RegisterRequest {
        name: args.name,
        email: args.email,
        password: args.password,
        role: args.role,
    };
    let reply = client.register(&request).await?;
    remember_login(reply, tokens)
}

fn remember_login(reply: AuthReply, tokens: &TokenStore) -> Result<()> {
    tokens.store(&reply.access_token)?;
    println!(
        "Conectado como {} <{}> ({})",
        reply.user.name,
        reply.user.email,
        reply.user.role.label()
    );
    Ok(())
}

pub(super) async fn run_whoami(client: &BackendClient) -> Result<()> {
    let user = client.me().await?;
    println!("{} <{}>", user.name, user.email);
    println!("Papel: {}", user.role.label());
    if !user.class_ids.is_empty() {
        println!("Turmas: {}", user.class_ids.len());
    }
    Ok(())
}

pub(super) fn run_logout(tokens: &TokenStore) -> Result<()> {
    tokens.clear()?;
    println!("Sessão encerrada.");
    Ok(())
}

pub(super) async fn run_trails(client: &BackendClient) -> Result<()> {
    let trails = client.trails().await?;
    println!("{} trilha(s)", trails.len());
    for trail in trails {
        if trail.subject.is_empty() {
            println!("  {}  {}", trail.id, trail.title);
        } else {
            println!("  {}  {} [{}]", trail.id, trail.title, trail.subject);
        }
    }
    Ok(())
}

pub(super) async fn run_classes(client: &BackendClient) -> Result<()> {
    let classes = client.classes().await?;
    println!("{} turma(s)", classes.len());
    for class in classes {
        println!(
            "  {}  (código {}, {} aluno(s))",
            class.name,
            class.join_code,
            class.student_ids.len()
        );
    }
    Ok(())
}
