use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::{error, info};
use wd_api::{create_app, telemetry, AppState};
use wd_core::{AuthorityConfig, CredentialAuthority, SecretProvisioner};
use wd_infra::Infrastructure;
use wd_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().context("refusing to start with invalid configuration")?;
    telemetry::init_tracing(&config.logging)?;

    info!(
        environment = %config.environment,
        failure_policy = %config.revocation.failure_policy,
        "Starting Warden credential service"
    );

    // Nothing may be served before the signing secrets are valid
    let secrets = match SecretProvisioner::provision(&config.jwt, config.environment) {
        Ok(secrets) => secrets,
        Err(err) => {
            error!(error = %err, "Refusing to start without valid signing secrets");
            std::process::exit(1);
        }
    };

    let infra = Infrastructure::connect(&config)
        .await
        .context("failed to initialise infrastructure")?;

    let authority = Arc::new(CredentialAuthority::new(
        &secrets,
        infra.revocations.clone(),
        infra.identities.clone(),
        AuthorityConfig::from(&config),
    ));
    authority.start_background_sweeps().await;

    let state = web::Data::new(AppState::new(authority.clone()));
    let bind_address = config.server.bind_address();
    info!(%bind_address, "HTTP server listening");

    let served = HttpServer::new(move || create_app(state.clone()))
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {bind_address}"))?
        .run()
        .await;

    authority.shutdown().await;
    infra.close().await;

    served.context("HTTP server terminated with an error")
}
