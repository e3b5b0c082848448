//! Agent authentication and On-Behalf-Of walkthrough
//!
//! 1. The agent obtains its own token (client-credentials grant).
//! 2. A user authorization URL is printed; the user opens it, authorizes the
//!    agent, and pastes the `code` and `state` from the redirect back here.
//! 3. The state is verified, then the code is redeemed together with the
//!    agent's token for a token representing the user.
//!
//! Configuration comes from environment variables:
//!   IDP_BASE_URL, IDP_CLIENT_ID, IDP_CLIENT_SECRET (optional),
//!   IDP_REDIRECT_URI, AGENT_ID, AGENT_SECRET
//!
//! Run with:
//!   cargo run -p agent-obo

use std::io::{BufRead, Write};

use anyhow::{Context, bail};
use oidc_agent_sdk::{AgentAuthManager, AgentIdentity, AuthConfig, verify_state};

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn config_from_env() -> anyhow::Result<(AuthConfig, AgentIdentity)> {
    let base_url = std::env::var("IDP_BASE_URL").context("IDP_BASE_URL is not set")?;
    let client_id = std::env::var("IDP_CLIENT_ID").context("IDP_CLIENT_ID is not set")?;
    let redirect_uri = std::env::var("IDP_REDIRECT_URI").context("IDP_REDIRECT_URI is not set")?;
    let agent_id = std::env::var("AGENT_ID").context("AGENT_ID is not set")?;
    let agent_secret = std::env::var("AGENT_SECRET").context("AGENT_SECRET is not set")?;

    let builder = AuthConfig::builder()
        .base_url(base_url)
        .client_id(client_id)
        .redirect_uri(redirect_uri);
    let config = match std::env::var("IDP_CLIENT_SECRET") {
        Ok(secret) => builder.client_secret(secret).build(),
        Err(_) => builder.build(),
    };
    Ok((config, AgentIdentity::new(agent_id, agent_secret)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let (config, agent) = config_from_env()?;
    let manager = AgentAuthManager::new(config, agent)?;

    println!("Authenticating agent...");
    let agent_token = manager.get_agent_token(&["openid", "profile"]).await?;
    println!(
        "Agent authenticated (expires in {:?} seconds)",
        agent_token.expires_in
    );

    let user_scopes = ["openid", "profile", "email"];
    let request = manager.get_authorization_url(&user_scopes, None)?;

    println!();
    println!("Open this URL in a browser and authorize the agent:");
    println!("  {}", request.url);
    println!();
    println!("After authorizing you will be redirected to the callback URL.");
    println!("Copy the 'code' and 'state' query parameters from it.");
    println!();

    let code = prompt("Authorization code")?;
    if code.is_empty() {
        bail!("no authorization code provided");
    }
    let returned_state = prompt("State from redirect")?;

    // CSRF check: refuse the code if the redirect's state does not match
    verify_state(&request.state, &returned_state)?;

    println!("Exchanging authorization code for a user token...");
    let user_token = manager
        .get_obo_token(&code, &user_scopes, &agent_token)
        .await?;

    println!("User token obtained via OBO flow!");
    println!("  Token type:  {}", user_token.token_type);
    println!("  Expires in:  {:?} seconds", user_token.expires_in);
    println!("  Scope:       {:?}", user_token.scope);
    println!("  Has ID token: {}", user_token.id_token.is_some());
    println!("The agent can now call APIs on behalf of the user.");

    manager.close().await?;
    Ok(())
}
