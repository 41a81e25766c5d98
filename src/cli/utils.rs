use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::error::PortalError;
use crate::routes::Destination;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(obj)) = (data, response.as_object_mut()) {
                obj.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, error: &PortalError) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": error.to_string(),
                "error_code": error.error_code(),
                "retryable": error.is_retryable(),
            });

            if let PortalError::Validation { fields } = error {
                response["field_errors"] = json!(fields);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", error);
            if let PortalError::Validation { fields } = error {
                for (field, problem) in fields {
                    eprintln!("  {}: {}", field, problem);
                }
            }
            if error.is_retryable() {
                eprintln!("(temporary failure, try again)");
            }
        }
    }
    Ok(())
}

/// Output the screen the portal ended up on
pub fn output_location(
    output_format: &OutputFormat,
    location: Option<&Destination>,
) -> anyhow::Result<()> {
    let Some(location) = location else {
        return Ok(());
    };

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "location": location.path() }))?
            );
        }
        OutputFormat::Text => {
            println!("→ {}", location);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}
