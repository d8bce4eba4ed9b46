//! Interactive login that creates the session file used by every other command.

use std::io::{self, BufRead, Write};

use grammers_client::SignInError;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::get_client_for_init;

const CONFIRMATION: &str = "YES";

/// True only for the exact (trimmed) confirmation word.
pub fn is_confirmed(input: &str) -> bool {
    input.trim() == CONFIRMATION
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub async fn run() -> Result<()> {
    let config = Config::new();
    config.require_credentials()?;

    let session_file = config.session_file();
    println!(
        r#"
This creates a new Telegram session in '{}'.
Signing in logs this tool in as your account; keep the file private.

Type '{}' to continue: "#,
        session_file.display(),
        CONFIRMATION
    );

    let answer = prompt("")?;
    if !is_confirmed(&answer) {
        println!("Cancelled. No session file was created.");
        return Ok(());
    }

    let phone = if config.phone.trim().is_empty() {
        prompt("Phone number (international format): ")?
    } else {
        config.phone.clone()
    };
    if phone.is_empty() {
        return Err(Error::Config("a phone number is required to sign in".into()));
    }

    let client = get_client_for_init(&config).await?;

    if client.is_authorized().await? {
        println!("Session '{}' is already authorized.", session_file.display());
        return Ok(());
    }

    tracing::info!("Requesting login code for {}", phone);
    let token = client
        .request_login_code(&phone, &config.api_hash)
        .await
        .map_err(|e| Error::TelegramError(format!("Failed to request code: {}", e)))?;

    let code = prompt("Enter the code you received: ")?;

    let user = match client.sign_in(&token, &code).await {
        Ok(user) => user,
        Err(SignInError::PasswordRequired(password_token)) => {
            let hint = password_token.hint().unwrap_or("none").to_string();
            let password = prompt(&format!("Two-step verification password (hint: {}): ", hint))?;
            client
                .check_password(password_token, password.trim())
                .await
                .map_err(|e| Error::TelegramError(format!("Failed to sign in: {}", e)))?
        }
        Err(e) => return Err(Error::TelegramError(format!("Failed to sign in: {}", e))),
    };

    println!(
        "Signed in as {} (@{}). Session saved to '{}'.",
        user.full_name(),
        user.username().unwrap_or("no username"),
        session_file.display()
    );

    Ok(())
}
