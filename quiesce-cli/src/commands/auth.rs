///! Authentication commands

use anyhow::{anyhow, Result};
use clap::Subcommand;

use quiesce_client::services::SettingsQuery;
use quiesce_client::{PlatformClient, SettingsStore};
use quiesce_common::MANAGEMENT_ZONE_SCHEMA;

use crate::config::Config;
use crate::output;

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store an environment and API token after checking they work.
    ///
    /// Uses --environment and --token when given, prompts otherwise.
    Login {
        /// Email recorded as the author of created windows
        #[arg(long)]
        email: Option<String>,
    },

    /// Logout (clear stored credentials)
    Logout,

    /// Show current authentication status
    Status,
}

pub async fn handle_auth_command(
    command: AuthCommands,
    environment: Option<String>,
    token: Option<String>,
    config: &mut Config,
) -> Result<()> {
    match command {
        AuthCommands::Login { email } => {
            let environment = match environment.or_else(|| config.environment_url.clone()) {
                Some(url) => url,
                None => dialoguer::Input::<String>::new()
                    .with_prompt("Environment URL")
                    .interact_text()?,
            };

            let token = match token {
                Some(token) => token,
                None => dialoguer::Password::new().with_prompt("API token").interact()?,
            };

            let email = match email {
                Some(email) => Some(email),
                None => {
                    let entered = dialoguer::Input::<String>::new()
                        .with_prompt("Author email (optional)")
                        .allow_empty(true)
                        .with_initial_text(config.user_email.clone().unwrap_or_default())
                        .interact_text()?;
                    Some(entered.trim().to_string()).filter(|e| !e.is_empty())
                }
            };

            let api = PlatformClient::new(&environment)?.with_token(&token);

            let spinner = output::spinner(format!("Checking access to {}...", api.base_url()));
            let check = api
                .list_settings(&SettingsQuery::new(MANAGEMENT_ZONE_SCHEMA, 1), None)
                .await;
            spinner.finish_and_clear();
            check.map_err(|e| anyhow!("Login failed: {}", e.user_message()))?;

            config.environment_url = Some(api.base_url().to_string());
            config.api_token = Some(token);
            config.user_email = email;
            config.save()?;

            output::print_success("Login successful");
            output::print_info(&format!("Environment: {}", api.base_url()));
            if let Some(email) = &config.user_email {
                output::print_info(&format!("Author: {}", email));
            }
        }

        AuthCommands::Logout => {
            config.clear_credentials();
            config.save()?;

            output::print_success("Logged out successfully");
        }

        AuthCommands::Status => match (&config.environment_url, &config.api_token) {
            (Some(url), Some(token)) => {
                println!("Environment: {}", url);
                println!("Token: {}", output::mask_secret(token));
                match &config.user_email {
                    Some(email) => println!("Author: {}", email),
                    None => output::print_warning("No author email stored, windows will be stamped anonymously"),
                }
            }
            (Some(url), None) => {
                println!("Environment: {}", url);
                println!("Not authenticated");
                println!("Use 'quiesce auth login' to authenticate");
            }
            _ => {
                println!("Not authenticated");
                println!("Use 'quiesce auth login' to authenticate");
            }
        },
    }

    Ok(())
}
