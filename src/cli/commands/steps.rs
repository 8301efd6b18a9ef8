use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::onboarding::step_views;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let steps = step_views();

    match output_format {
        OutputFormat::Json => output_success(&output_format, "Onboarding steps", Some(json!({ "steps": steps }))),
        OutputFormat::Text => {
            for step in &steps {
                println!("{}. {} - {}", step.id, step.title, step.description);
                for field in &step.fields {
                    let marker = if field.required { "*" } else { " " };
                    println!("   {} {} ({:?}): {}", marker, field.name, field.kind, field.options.join(", "));
                }
            }
            Ok(())
        }
    }
}
