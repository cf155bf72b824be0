//! CLI output formatting

use crate::core::{CallContext, Pipeline, PipelineError, Response};
use console::Emoji;
use serde_json::{json, Value};

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format a pipeline as `service_type.name: a → b → c`
pub fn format_pipeline(pipeline: &Pipeline) -> String {
    let steps = if pipeline.is_empty() {
        style("(empty)").dim().to_string()
    } else {
        pipeline
            .step_names()
            .iter()
            .map(|name| style(name).cyan().to_string())
            .collect::<Vec<_>>()
            .join(" → ")
    };

    format!(
        "{} {}: {}",
        if pipeline.is_empty() { WARN } else { CHECK },
        style(format!("{}.{}", pipeline.service_type, pipeline.name)).bold(),
        steps
    )
}

/// Format a build error, including its cause
pub fn format_build_error(error: &PipelineError) -> String {
    format!("{} {}", CROSS, style(error).red())
}

/// Format the response a call ended with
pub fn format_response(response: &Response) -> String {
    match &response.err {
        Some(err) => format!(
            "{} Call failed (status {}): {}",
            CROSS,
            response.status,
            style(err).red()
        ),
        None => {
            let result = response
                .result
                .as_ref()
                .map(|value| value.to_string())
                .unwrap_or_else(|| style("(no result)").dim().to_string());
            format!(
                "{} Call succeeded (status {}): {}",
                CHECK,
                response.status,
                result
            )
        }
    }
}

/// JSON summary of a finished call: its final context and response
pub fn call_summary(ctx: &CallContext, response: &Response) -> serde_json::Result<Value> {
    Ok(json!({
        "context": serde_json::to_value(ctx)?,
        "response": {
            "status": response.status,
            "result": response.result,
            "error": response.err.as_ref().map(|err| format!("{:#}", err)),
        },
    }))
}
