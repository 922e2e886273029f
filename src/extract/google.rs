//! Google hotel listings: amenity sections and ARIA-labelled rating widgets.

use crate::models::{CompanyResult, ExtractionType, IndicatorHit, IndicatorSpec};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::BTreeMap;

lazy_static! {
    static ref H4: Selector = Selector::parse("h4").unwrap();
    static ref LABELLED_DIV: Selector = Selector::parse("div[aria-label]").unwrap();
    static ref STARS_REGEX: Regex =
        Regex::new(r"^([\d,.]+) de 5 estrellas a partir de ([\d.]+) reseñas").unwrap();
}

pub const REVIEWS: &str = "Google_Reseñas";
pub const SCORE: &str = "Google_Puntuación";

pub fn process(
    document: &Html,
    indicators: &BTreeMap<String, IndicatorSpec>,
    result: &mut CompanyResult,
) {
    let headings: Vec<ElementRef> = document.select(&H4).collect();

    let expected: Vec<&str> = indicators
        .values()
        .flat_map(|spec| spec.keywords.iter().map(String::as_str))
        .collect();
    let labelled: Vec<(ElementRef, &str)> = document
        .select(&LABELLED_DIV)
        .filter_map(|div| div.value().attr("aria-label").map(|label| (div, label)))
        .filter(|(_, label)| {
            expected.contains(&label.to_lowercase().as_str()) || STARS_REGEX.is_match(label)
        })
        .collect();

    for (name, spec) in indicators {
        if result.is_found(name) {
            continue;
        }
        for keyword in &spec.keywords {
            let hit = match spec.extract {
                ExtractionType::Section => section_context(&headings, keyword),
                ExtractionType::Phrase => labelled
                    .iter()
                    .find(|(_, label)| label.to_lowercase() == *keyword)
                    .map(|(div, _)| div.text().collect::<String>()),
                _ if name == REVIEWS || name == SCORE => labelled.iter().find_map(|(_, label)| {
                    let captures = STARS_REGEX.captures(label)?;
                    let group = if name == REVIEWS { 2 } else { 1 };
                    Some(captures.get(group)?.as_str().to_string())
                }),
                _ => None,
            };
            if let Some(context) = hit {
                result.set(name, IndicatorHit::found_with(context));
                break;
            }
        }
    }
}

/// Heading text followed by the text pieces of the block right after it.
fn section_context(headings: &[ElementRef], keyword: &str) -> Option<String> {
    let heading = headings
        .iter()
        .find(|h4| h4.text().collect::<String>().to_lowercase() == keyword)?;

    let mut context = heading.text().collect::<String>();
    if let Some(sibling) = heading.next_sibling() {
        let pieces: Vec<&str> = match sibling.value() {
            Node::Text(text) => vec![&**text],
            Node::Element(_) => ElementRef::wrap(sibling)
                .map(|element| element.text().collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        context.push(';');
        context.push_str(&pieces.join(";"));
    }
    Some(context)
}
