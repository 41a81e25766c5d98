use clap::Subcommand;
use serde_json::json;

use crate::api::ProfileCompletion;
use crate::cli::shell::Shell;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::routes::Destination;
use crate::screen::Screen;

#[derive(Subcommand)]
pub enum MemberCommands {
    #[command(about = "Submit the additional information required after first login")]
    Complete {
        #[arg(long, help = "Full name")]
        name: String,
        #[arg(long, help = "Phone number")]
        phone: String,
        #[arg(long, help = "Gender")]
        gender: String,
        #[arg(long, help = "Company")]
        company: String,
        #[arg(long, help = "New password (optional)")]
        password: Option<String>,
    },

    #[command(about = "Show own member profile")]
    Me,
}

pub async fn handle(cmd: MemberCommands, shell: &Shell, output_format: &OutputFormat) -> anyhow::Result<()> {
    match cmd {
        MemberCommands::Complete {
            name,
            phone,
            gender,
            company,
            password,
        } => {
            let Ok(screen) = Screen::activate(&shell.ctx, Destination::ProfileCompletion) else {
                return Ok(());
            };

            let form = ProfileCompletion {
                pwd: password.unwrap_or_default(),
                name,
                phone_number: phone,
                gender,
                company,
            };
            let Some(result) = screen.run(shell.client.complete_profile(&form)).await else {
                return Ok(());
            };
            let session = result?;

            output_success(
                output_format,
                &format!("Profile submitted, status is now {}", session.approval_status),
                Some(json!({ "status": session.approval_status })),
            )
        }
        MemberCommands::Me => {
            let Some(user) = shell.ctx.current_user()? else {
                shell.ctx.navigator().navigate(Destination::Login);
                return Ok(());
            };
            let Ok(screen) = Screen::activate(&shell.ctx, Destination::MemberDetail(user.id)) else {
                return Ok(());
            };
            let Some(result) = screen.run(shell.client.my_profile()).await else {
                return Ok(());
            };
            let profile = result?;

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "member": profile }))?);
                }
                OutputFormat::Text => {
                    println!("ID:      {}", profile.id);
                    println!("Email:   {}", profile.email);
                    println!("Name:    {}", profile.name);
                    println!("Phone:   {}", profile.phone_number);
                    println!("Gender:  {}", profile.gender);
                    println!("Company: {}", profile.company);
                }
            }
            Ok(())
        }
    }
}
