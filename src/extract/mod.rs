//! Indicator heuristics, one submodule per website flavor.

pub mod booking;
pub mod empresa;
pub mod google;

use crate::error::ExtractError;
use crate::models::{CompanyResult, Flavor, IndicatorSpec};
use scraper::Html;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Suffix of the column holding an indicator's context snippet.
pub const CONTEXT_POSTFIX: &str = "_Contexto";

/// Collapses every whitespace run (line breaks included) into a single space.
pub fn sanitize(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wraps every occurrence of `keyword` in `**`.
pub fn highlight(content: &str, keyword: &str) -> String {
    content.replace(keyword, &format!("**{}**", keyword))
}

/// Renders a JSON scalar the way it should appear in the output table.
pub(crate) fn json_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn process_document(
    flavor: Flavor,
    document: &Html,
    indicators: &BTreeMap<String, IndicatorSpec>,
    result: &mut CompanyResult,
) -> Result<(), ExtractError> {
    match flavor {
        Flavor::Empresa => empresa::process(document, indicators, result),
        Flavor::Booking => booking::process(document, indicators, result)?,
        Flavor::Google => google::process(document, indicators, result),
    }
    Ok(())
}

pub fn process_file(
    flavor: Flavor,
    html_file: &Path,
    indicators: &BTreeMap<String, IndicatorSpec>,
    result: &mut CompanyResult,
) -> Result<(), ExtractError> {
    let content = fs::read_to_string(html_file).map_err(|source| ExtractError::Io {
        path: html_file.to_path_buf(),
        source,
    })?;
    let document = Html::parse_document(&content);
    process_document(flavor, &document, indicators, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize("  piscina\n\n climatizada \t y spa "), "piscina climatizada y spa");
    }

    #[test]
    fn highlight_marks_every_occurrence() {
        assert_eq!(highlight("agua y más agua", "agua"), "**agua** y más **agua**");
    }

    #[test]
    fn json_scalars_render_without_quotes() {
        assert_eq!(json_to_text(&json!("GOLD")), "GOLD");
        assert_eq!(json_to_text(&json!(4)), "4");
        assert_eq!(json_to_text(&json!(null)), "");
    }
}
