//! Chart-data extraction — pulls label/value pairs out of free-form answer
//! text via the completion service, parsed against a strict two-field shape.

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::llm::ChatCompletion;

/// Paired label/value sequences suitable for a bar chart. Both empty means
/// the text contained nothing chartable — distinct from an extraction
/// failure, which propagates as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartData {
    pub x_labels: Vec<String>,
    pub y_values: Vec<f64>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.x_labels.is_empty() && self.y_values.is_empty()
    }
}

/// Ask the completion service for label/value pairs found in `text`.
///
/// A response that does not deserialize into [`ChartData`] exactly is a
/// terminal [`ChatError::Extraction`] — never a partial fill.
pub async fn extract_chart(client: &dyn ChatCompletion, text: &str) -> Result<ChartData> {
    let prompt = build_extraction_prompt(text);
    let raw = client.complete_json(&prompt).await?;
    parse_chart_response(&raw)
}

fn build_extraction_prompt(text: &str) -> String {
    format!(
        "You are given a text. Extract all relevant label and numeric value \
         pairs suitable for a bar chart.\n\n\
         Return the result as a JSON object with exactly these fields:\n\
         - \"x_labels\": a list of strings (the labels)\n\
         - \"y_values\": a list of numbers (the corresponding values)\n\n\
         If no such pairs are found, return:\n\
         {{ \"x_labels\": [], \"y_values\": [] }}\n\n\
         Text:\n\
         \"\"\"{text}\"\"\"\n\n\
         Respond with the JSON object only."
    )
}

fn parse_chart_response(raw: &str) -> Result<ChartData> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).map_err(|e| {
        let snippet: String = body.chars().take(200).collect();
        ChatError::Extraction(format!("{e} — response was: {snippet}"))
    })
}

/// Models sometimes wrap JSON in markdown fences despite instructions.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
