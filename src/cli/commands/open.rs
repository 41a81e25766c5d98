use serde_json::json;

use crate::cli::shell::Shell;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::routes::Destination;
use crate::screen::Screen;

pub fn handle(path: &str, shell: &Shell, output_format: &OutputFormat) -> anyhow::Result<()> {
    let destination = Destination::parse(path)
        .ok_or_else(|| anyhow::anyhow!("Unknown screen '{}'", path))?;

    match Screen::activate(&shell.ctx, destination) {
        Ok(screen) => output_success(
            output_format,
            &format!("Opened {}", screen.destination()),
            Some(json!({
                "screen": screen.destination().path(),
                "current_user": screen.current_user(),
            })),
        ),
        Err(redirect) => output_success(
            output_format,
            &format!("{} is not reachable, redirected to {}", path, redirect.0),
            Some(json!({ "redirected_to": redirect.0.path() })),
        ),
    }
}
