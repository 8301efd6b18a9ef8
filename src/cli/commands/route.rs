use serde_json::json;

use crate::cli::utils::{output_rows, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::gate::RouteTable;

/// Classify `path` without a session; auth and protected paths report that
/// their outcome depends on the session.
pub fn handle(path: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let table = RouteTable::from_config(&config::config().routes);
    let class = table.classify(path);
    let decision = table.static_decision(path);

    let decision_str = decision.as_ref().map(|d| d.as_str()).unwrap_or("depends_on_session");
    let redirect = decision.as_ref().and_then(|d| d.redirect_target());

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            "Route classified",
            Some(json!({
                "path": path,
                "class": class,
                "decision": decision_str,
                "redirect": redirect,
            })),
        ),
        OutputFormat::Text => {
            output_rows(&[
                ("path", path.to_string()),
                ("class", class.as_str().to_string()),
                ("decision", decision_str.to_string()),
                ("redirect", redirect.unwrap_or_else(|| "-".to_string())),
            ]);
            Ok(())
        }
    }
}
