//! CLI auth command handlers for login, status, and logout.

use std::sync::Arc;

use crate::auth::device_code::DeviceCodeSession;
use crate::auth::providers::MicrosoftIdentity;
use crate::auth::{AuthError, SessionAuthenticator};
use crate::config::MeetConfig;

/// Authenticator backed by the file token cache, prompting on the terminal.
pub fn authenticator(config: &MeetConfig) -> Arc<SessionAuthenticator> {
    let identity = MicrosoftIdentity::from_config(config).with_prompt(Arc::new(print_prompt));
    Arc::new(SessionAuthenticator::new(
        Arc::new(identity),
        config.token_store(),
    ))
}

fn print_prompt(session: &DeviceCodeSession) {
    match &session.message {
        Some(message) => println!("🔗 {message}"),
        None => {
            println!("🔗 Visit: {}", session.verification_url);
            println!("📋 Enter code: {}", session.user_code);
        }
    }
    println!("⏳ Waiting for authorization...");
}

/// Handle `meetai auth login`.
pub async fn handle_login(config: &MeetConfig) -> Result<(), Box<dyn std::error::Error>> {
    let auth = authenticator(config);

    let session = tokio::select! {
        result = auth.sign_in() => result?,
        _ = tokio::signal::ctrl_c() => return Err(AuthError::Cancelled.into()),
    };

    println!("✅ Connected as: {}", session.display_name());
    Ok(())
}

/// Handle `meetai auth status`.
pub async fn handle_status(config: &MeetConfig) -> Result<(), Box<dyn std::error::Error>> {
    let auth = authenticator(config);

    println!("Token cache: {}", config.token_dir.display());
    match auth.session().await {
        Some(session) => {
            println!("  Account: {}", session.display_name());
            println!("  Id:      {}", session.account_id);
        }
        None => println!("  Not signed in (run `meetai auth login`)"),
    }
    println!("  Folder:  {} ({})", config.folder_name, config.folder_lookup);
    Ok(())
}

/// Handle `meetai auth logout`.
pub async fn handle_logout(config: &MeetConfig) -> Result<(), Box<dyn std::error::Error>> {
    let auth = authenticator(config);
    let previous = auth.session().await;
    auth.sign_out().await?;
    match previous {
        Some(session) => println!("✅ Signed out {}", session.display_name()),
        None => println!("Nothing to sign out"),
    }
    Ok(())
}
