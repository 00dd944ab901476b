use serde_json::json;

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    if let Some(raw) = &result.raw {
        println!("{raw}");
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let envelope = json!({
                "data": result.data,
                "warnings": result.warnings,
            });
            let payload = if pretty {
                serde_json::to_string_pretty(&envelope)?
            } else {
                serde_json::to_string(&envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => render_table(result),
    }

    Ok(())
}

fn render_table(result: &CommandResult) {
    for line in &result.lines {
        println!("{line}");
    }

    if !result.warnings.is_empty() {
        println!("warnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }
}
