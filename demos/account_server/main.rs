//! Account server example
//!
//! Serves registration, password reset and unsubscribe routes backed by the
//! in-memory store. Configuration comes from the YAML file named by
//! `QB_CONFIG` (falling back to test defaults) plus `QB_*` overrides.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use qbuilder::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("QB_CONFIG") {
        Ok(path) => AppConfig::from_yaml_file(&path)?,
        Err(_) => AppConfig::default_config(),
    }
    .with_env_overrides()?;

    let alice = Account::new("alice@example.com", "correct horse battery");
    let store = InMemoryAccountStore::with_accounts([alice.clone()]);

    let state = AppState::new(
        &config,
        Arc::new(store),
        Arc::new(LoggingNotifier),
        Arc::new(SystemClock),
    )?;
    let app = build_account_routes(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8000));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, account = %alice.id, "account server listening");

    println!("Available endpoints:");
    println!("   POST /register                                   {{\"email\"}}");
    println!("   POST /password-reset/trigger                     {{\"email\"}}");
    println!("   POST /password-reset/confirm                     {{\"uuid\", \"token\", \"newPassword\"}}");
    println!("   GET  /unsubscribe/{{uidb64}}/{{token}}/{{email_type}}");
    println!();
    println!("Example:");
    println!(
        "   curl -X POST http://{}/password-reset/trigger -H 'content-type: application/json' -d '{{\"email\": \"alice@example.com\"}}'",
        addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
