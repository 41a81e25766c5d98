use clap::Subcommand;
use serde_json::json;

use crate::cli::shell::Shell;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::routes::Destination;
use crate::screen::Screen;

#[derive(Subcommand)]
pub enum ClientCommands {
    #[command(about = "List client profiles")]
    List {
        #[arg(long, default_value_t = 0, help = "Zero-based page number")]
        page: u32,
    },

    #[command(about = "Show a client profile")]
    Detail {
        #[arg(help = "Client ID")]
        id: String,
    },
}

pub async fn handle(cmd: ClientCommands, shell: &Shell, output_format: &OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ClientCommands::List { page } => {
            let Ok(screen) = Screen::activate(&shell.ctx, Destination::ClientList) else {
                return Ok(());
            };
            let Some(result) = screen.run(shell.client.list_clients(page)).await else {
                return Ok(());
            };
            let listing = result?;

            if listing.content.is_empty() {
                return output_empty_collection(output_format, "clients", "No clients found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "clients": listing.content,
                        "page": page,
                        "total_pages": listing.total_pages,
                    }))?);
                }
                OutputFormat::Text => {
                    println!("{:<8} {:<15} {:<6} {:<20} {}", "ID", "NAME", "AGE", "UNIVERSITY", "JOB");
                    println!("{}", "-".repeat(70));
                    for client in &listing.content {
                        println!(
                            "{:<8} {:<15} {:<6} {:<20} {}",
                            client.client_id,
                            client.client_name,
                            client.age.as_deref().unwrap_or("-"),
                            client.university.as_deref().unwrap_or("-"),
                            client.current_job.as_deref().unwrap_or("-"),
                        );
                    }
                    println!("Page {} of {}", page + 1, listing.total_pages);
                }
            }
            Ok(())
        }
        ClientCommands::Detail { id } => {
            let Ok(screen) = Screen::activate(&shell.ctx, Destination::ClientDetail(id.clone())) else {
                return Ok(());
            };
            let Some(result) = screen.run(shell.client.client_detail(&id)).await else {
                return Ok(());
            };
            let detail = result?;

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "client": detail }))?);
                }
                OutputFormat::Text => {
                    println!("ID:     {}", detail.id);
                    println!("Name:   {}", detail.name);
                    if let Some(status) = &detail.status {
                        println!("Status: {}", status);
                    }
                    for (key, value) in &detail.extra {
                        if !value.is_null() {
                            println!("{}: {}", key, value);
                        }
                    }
                    println!("Images: {}", detail.profile_images.len());
                }
            }
            Ok(())
        }
    }
}
