// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use stackit_webhook::{
    config::DefaultConfigProvider,
    constants::{
        DEFAULT_LISTEN_ADDR, DEFAULT_NAMESPACE_FILE, DEFAULT_SERVICE_ACCOUNT_TOKEN_URL,
        ENV_AUTH_TOKEN, ENV_GROUP_NAME, ENV_SERVICE_ACCOUNT_KEY_PATH,
        ENV_SERVICE_ACCOUNT_TOKEN_URL,
    },
    credentials::AmbientCredentials,
    repository::{StackitRRSetRepositoryFactory, StackitZoneRepositoryFactory},
    solver::{Solver, StackitSolver},
    webhook::{router, WebhookState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = "stackit-webhook")]
#[command(about = "cert-manager DNS-01 webhook solver for STACKIT DNS")]
struct Cli {
    /// API group the webhook is registered under
    #[arg(long, env = ENV_GROUP_NAME)]
    group_name: String,

    /// Address the webhook server listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    listen: SocketAddr,

    /// Bearer token used for every challenge instead of the configured secret
    #[arg(long, env = ENV_AUTH_TOKEN, hide_env_values = true)]
    auth_token: Option<String>,

    /// Service-account key file used when a challenge does not name one
    #[arg(long, env = ENV_SERVICE_ACCOUNT_KEY_PATH)]
    service_account_key_path: Option<PathBuf>,

    /// Token endpoint of the service-account key flow
    #[arg(long, env = ENV_SERVICE_ACCOUNT_TOKEN_URL, default_value = DEFAULT_SERVICE_ACCOUNT_TOKEN_URL)]
    service_account_token_url: String,

    /// File holding the pod namespace, used when a challenge names no secret namespace
    #[arg(long, default_value = DEFAULT_NAMESPACE_FILE)]
    namespace_file: PathBuf,
}

impl Cli {
    fn ambient_credentials(&self) -> AmbientCredentials {
        AmbientCredentials {
            auth_token: self.auth_token.clone(),
            service_account_key_path: self.service_account_key_path.clone(),
            service_account_token_url: self.service_account_token_url.clone(),
        }
    }
}

fn main() -> Result<()> {
    // reqwest and kube enable different rustls backends; pick one for the process
    let _ = rustls::crypto::ring::default_provider().install_default();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("stackit-webhook")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

fn init_tracing() {
    // RUST_LOG selects the filter (default: info), RUST_LOG_FORMAT=json|text the output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    info!(group_name = %cli.group_name, "Starting STACKIT cert-manager webhook");

    let ambient = cli.ambient_credentials();
    debug!(?ambient, "Ambient credentials loaded");

    let mut solver = StackitSolver::new(
        reqwest::Client::new(),
        ambient,
        Box::new(DefaultConfigProvider::with_namespace_file(&cli.namespace_file)),
        Box::new(StackitZoneRepositoryFactory),
        Box::new(StackitRRSetRepositoryFactory),
    );

    let kube_config = kube::Config::infer()
        .await
        .context("Failed to infer Kubernetes client configuration")?;
    solver
        .initialize(kube_config)
        .await
        .context("Failed to initialize solver")?;

    let state = WebhookState::new(cli.group_name.clone(), vec![Arc::new(solver) as Arc<dyn Solver>]);

    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("Failed to bind {}", cli.listen))?;
    info!(listen = %cli.listen, "Webhook server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down gracefully"),
        () = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
