//! Keyword search over the plain text of a company's own website.

use super::{highlight, sanitize};
use crate::models::{CompanyResult, ExtractionType, IndicatorHit, IndicatorSpec};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;
use std::collections::BTreeMap;
use tracing::debug;

/// Characters kept on each side of a keyword hit.
const CONTEXT_RADIUS: usize = 80;

lazy_static! {
    static ref NUMBER_REGEX: Regex = Regex::new(r"\d+(?:[.,]\d+)*").unwrap();
}

pub fn process(
    document: &Html,
    indicators: &BTreeMap<String, IndicatorSpec>,
    result: &mut CompanyResult,
) {
    let text = document.root_element().text().collect::<String>().to_lowercase();

    for (name, spec) in indicators {
        if result.is_found(name) {
            continue;
        }
        if let Some(context) = find_indicator(&text, spec) {
            debug!("[{}] {} [{}]: {}", result.nif, name, spec.extract, context);
            result.set(name, IndicatorHit::found_with(context));
        }
    }
}

/// Returns the context of the first keyword that occurs as a standalone word.
pub fn find_indicator(text: &str, spec: &IndicatorSpec) -> Option<String> {
    for keyword in &spec.keywords {
        let Some(index) = text.find(keyword.as_str()) else {
            continue;
        };
        let (begin, end) = window(text, index, CONTEXT_RADIUS);
        let context = &text[begin..end];

        if !occurs_as_word(context, keyword) {
            continue;
        }

        let snippet = sanitize(&highlight(context, keyword));
        let extracted = match spec.extract {
            ExtractionType::Word | ExtractionType::Section => snippet,
            ExtractionType::Phrase => sentence_around(text, index, keyword.len())
                .map(|sentence| sanitize(&highlight(sentence, keyword)))
                .unwrap_or(snippet),
            ExtractionType::Number => text
                .get(index + keyword.len()..end)
                .and_then(|tail| NUMBER_REGEX.find(tail))
                .map(|number| format!("{} | {}", number.as_str(), snippet))
                .unwrap_or(snippet),
        };
        return Some(extracted);
    }
    None
}

/// Whether `keyword` appears after a space and before whitespace or `.,;:`.
/// Substring hits inside longer words ("aguacate" for "agua") do not count.
fn occurs_as_word(context: &str, keyword: &str) -> bool {
    let needle = format!(" {}", keyword);
    context.match_indices(&needle).any(|(i, _)| {
        context[i + needle.len()..]
            .chars()
            .next()
            .map_or(false, |c| c.is_whitespace() || matches!(c, '.' | ',' | ';' | ':'))
    })
}

/// Byte range covering up to `radius` characters before and after `index`.
fn window(text: &str, index: usize, radius: usize) -> (usize, usize) {
    let begin = text[..index]
        .char_indices()
        .rev()
        .nth(radius - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let end = text[index..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| index + i)
        .unwrap_or(text.len());
    (begin, end)
}

const MAX_SENTENCE_LEN: usize = 400;

fn sentence_around(text: &str, index: usize, keyword_len: usize) -> Option<&str> {
    let is_boundary = |c: char| matches!(c, '.' | '!' | '?' | '\n');
    let begin = text[..index]
        .rfind(is_boundary)
        .map(|i| i + 1)
        .unwrap_or(0);
    let after = index + keyword_len;
    let end = text[after..]
        .find(is_boundary)
        .map(|i| after + i + 1)
        .unwrap_or(text.len());
    let sentence = text[begin..end].trim();
    (sentence.chars().count() <= MAX_SENTENCE_LEN).then_some(sentence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(keywords: &[&str], extract: ExtractionType) -> IndicatorSpec {
        IndicatorSpec {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            extract,
        }
    }

    #[test]
    fn word_hit_is_highlighted_in_context() {
        let text = "nuestro hotel dispone de paneles solares, y reciclamos todo.";
        let context = find_indicator(text, &spec(&["paneles solares"], ExtractionType::Word));
        assert_eq!(
            context.as_deref(),
            Some("nuestro hotel dispone de **paneles solares**, y reciclamos todo.")
        );
    }

    #[test]
    fn keyword_inside_a_longer_word_is_ignored() {
        let text = "tostadas con aguacate para desayunar";
        assert_eq!(find_indicator(text, &spec(&["agua"], ExtractionType::Word)), None);
    }

    #[test]
    fn falls_through_to_the_next_keyword() {
        let text = "el spa cuenta con sauna finlandesa y jacuzzi.";
        let context = find_indicator(text, &spec(&["piscina", "sauna"], ExtractionType::Word));
        assert!(context.unwrap().contains("**sauna**"));
    }

    #[test]
    fn window_is_limited_to_the_radius() {
        let text = format!("{} energía renovable. {}", "x".repeat(200), "y".repeat(200));
        let context = find_indicator(&text, &spec(&["energía"], ExtractionType::Word)).unwrap();
        assert!(context.starts_with(&"x".repeat(79)));
        assert!(!context.contains(&"x".repeat(81)));
        assert!(context.contains("**energía**"));
    }

    #[test]
    fn phrase_extracts_the_whole_sentence() {
        let text = "bienvenidos. usamos energía solar en todo el edificio. reserve ya.";
        let context = find_indicator(text, &spec(&["energía"], ExtractionType::Phrase));
        assert_eq!(
            context.as_deref(),
            Some("usamos **energía** solar en todo el edificio.")
        );
    }

    #[test]
    fn number_prefixes_the_figure_after_the_keyword() {
        let text = "disponemos de habitaciones: 120 en total.";
        let context = find_indicator(text, &spec(&["habitaciones"], ExtractionType::Number)).unwrap();
        assert!(context.starts_with("120 | "));
    }

    #[test]
    fn process_reads_all_document_text() {
        let html = Html::parse_document(
            "<html><body><p>Hotel con <b>certificado iso 14001</b> vigente.</p></body></html>",
        );
        let mut indicators = BTreeMap::new();
        indicators.insert(
            "Empresa_ISO".to_string(),
            spec(&["certificado iso 14001"], ExtractionType::Word),
        );
        let mut result = CompanyResult::new("B1");
        process(&html, &indicators, &mut result);
        assert!(result.is_found("Empresa_ISO"));
        assert_eq!(
            result.hits["Empresa_ISO"].context.as_deref(),
            Some("hotel con **certificado iso 14001** vigente.")
        );
    }

    #[test]
    fn keyword_needs_a_separator_after_it() {
        assert!(occurs_as_word("usamos agua: de lluvia", "agua"));
        assert!(occurs_as_word("sin agua\ncaliente", "agua"));
        assert!(!occurs_as_word("agua al principio", "agua"));
        assert!(!occurs_as_word("con aguacate y agua", "agua"));
        assert!(occurs_as_word("con aguacate y agua.", "agua"));
        assert!(occurs_as_word("el (eco) hotel, limpio", "(eco) hotel"));
    }

    #[test]
    fn phrase_limit_counts_characters_not_bytes() {
        let sentence = format!("{} energía solar", "ñ".repeat(300));
        let text = format!("inicio. {}. fin", sentence);
        let context = find_indicator(&text, &spec(&["energía"], ExtractionType::Phrase)).unwrap();
        assert!(context.starts_with(&"ñ".repeat(300)));
        assert!(context.ends_with("**energía** solar."));
    }
}
