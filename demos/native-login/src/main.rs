//! Native authentication walkthrough
//!
//! Drives the provider's multi-step flow from the terminal: initiates the
//! flow, lists the offered authenticators, submits username/password, and
//! prints the resulting tokens.
//!
//! Configuration comes from environment variables:
//!   IDP_BASE_URL, IDP_CLIENT_ID, IDP_CLIENT_SECRET (optional),
//!   IDP_REDIRECT_URI
//!
//! Run with:
//!   cargo run -p native-login

use std::io::{BufRead, Write};

use anyhow::{Context, bail};
use oidc_agent_sdk::{AuthConfig, FlowStatus, NativeAuthClient};
use serde_json::json;

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn config_from_env() -> anyhow::Result<AuthConfig> {
    let base_url = std::env::var("IDP_BASE_URL").context("IDP_BASE_URL is not set")?;
    let client_id = std::env::var("IDP_CLIENT_ID").context("IDP_CLIENT_ID is not set")?;
    let redirect_uri = std::env::var("IDP_REDIRECT_URI").context("IDP_REDIRECT_URI is not set")?;

    let builder = AuthConfig::builder()
        .base_url(base_url)
        .client_id(client_id)
        .redirect_uri(redirect_uri);
    let config = match std::env::var("IDP_CLIENT_SECRET") {
        Ok(secret) => builder.client_secret(secret).build(),
        Err(_) => builder.build(),
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = config_from_env()?;
    let mut client = NativeAuthClient::new(config)?;

    println!("Starting authentication flow...");
    client.authenticate(None, None).await?;
    println!("Flow ID: {}", client.flow_id().unwrap_or("<none>"));
    println!(
        "Flow status: {}",
        client.flow_status().map_or("<none>".to_string(), ToString::to_string)
    );

    if client.flow_status() == Some(&FlowStatus::Incomplete) {
        let step = client
            .next_step()
            .context("incomplete flow without a next step")?;
        let names: Vec<&str> = step
            .authenticators
            .iter()
            .map(|auth| auth.authenticator.as_str())
            .collect();
        println!("Available authenticators: {names:?}");

        let Some(basic) = step
            .authenticators
            .iter()
            .find(|auth| auth.authenticator == "Username & Password")
        else {
            bail!("no username/password authenticator offered");
        };
        let authenticator_id = basic.authenticator_id.clone();

        let username = prompt("Username")?;
        let password = prompt("Password")?;

        client
            .authenticate(
                Some(&authenticator_id),
                Some(json!({"username": username, "password": password})),
            )
            .await?;
        println!(
            "Updated flow status: {}",
            client.flow_status().map_or("<none>".to_string(), ToString::to_string)
        );
    }

    if client.flow_status() == Some(&FlowStatus::SuccessCompleted) {
        let token = client.get_token().await?;
        println!("Authentication completed successfully!");
        println!("  Token type:  {}", token.token_type);
        println!("  Expires in:  {:?} seconds", token.expires_in);
        println!("  Scope:       {:?}", token.scope);
        println!("  Has ID token: {}", token.id_token.is_some());
        println!("  Has refresh token: {}", token.refresh_token.is_some());
    } else {
        println!(
            "Authentication failed with status: {}",
            client.flow_status().map_or("<none>".to_string(), ToString::to_string)
        );
    }

    client.close().await?;
    Ok(())
}
