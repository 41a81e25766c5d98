use clap::Subcommand;
use serde_json::json;

use crate::api::{LoginRequest, LogoutOutcome};
use crate::cli::shell::Shell;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::guard::{ApprovalGate, GateDecision};
use crate::oauth::OAuthCallbackIngest;
use crate::routes::Destination;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login with email and password")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Logout (always clears the local session)")]
    Logout,

    #[command(about = "Show current session and where it is allowed to go")]
    Status,

    #[command(about = "Complete an OAuth login from the provider's redirect URL or query string")]
    OauthCallback {
        #[arg(help = "Redirect URL (http://.../oauth/success?...) or its query string")]
        redirect: String,
    },
}

pub async fn handle(cmd: AuthCommands, shell: &Shell, output_format: &OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let session = shell
                .client
                .login(&LoginRequest { email, pwd: password })
                .await?;

            output_success(
                output_format,
                &format!("Logged in as member {}", session.member_id),
                Some(json!({
                    "member_id": session.member_id,
                    "role": session.role,
                    "status": session.approval_status,
                })),
            )
        }
        AuthCommands::Logout => {
            let message = match shell.client.logout().await {
                LogoutOutcome::Confirmed => "Logged out",
                LogoutOutcome::Unconfirmed => "Logged out locally (server did not confirm)",
            };
            output_success(output_format, message, None)
        }
        AuthCommands::Status => {
            let Some(session) = shell.ctx.session()? else {
                return output_success(
                    output_format,
                    "Not logged in",
                    Some(json!({ "session": null })),
                );
            };

            let landing = match ApprovalGate::decide(&session, &Destination::Home) {
                GateDecision::Allow => Destination::Home,
                GateDecision::Redirect(to) => to,
            };
            let since = shell.ctx.store().written_at()?;

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "session": {
                                "member_id": session.member_id,
                                "role": session.role,
                                "status": session.approval_status,
                                "since": since,
                            },
                            "landing": landing.path(),
                            "parked": landing.is_approval_interstitial(),
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("Member:  {}", session.member_id);
                    println!("Role:    {}", session.role);
                    println!("Status:  {}", session.approval_status);
                    if let Some(since) = since {
                        println!("Since:   {}", since.format("%Y-%m-%d %H:%M"));
                    }
                    if landing.is_approval_interstitial() {
                        println!("Landing: {} (registration not yet approved)", landing);
                    } else {
                        println!("Landing: {}", landing);
                    }
                }
            }
            Ok(())
        }
        AuthCommands::OauthCallback { redirect } => {
            let fields = if redirect.contains("://") {
                OAuthCallbackIngest::parse_url(&redirect)?
            } else {
                OAuthCallbackIngest::parse_query(&redirect)
            };

            let session = shell.oauth.ingest_fields(fields).await?;
            output_success(
                output_format,
                &format!("OAuth login completed for member {}", session.member_id),
                Some(json!({
                    "member_id": session.member_id,
                    "role": session.role,
                    "status": session.approval_status,
                })),
            )
        }
    }
}
