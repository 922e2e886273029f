//! Booking.com listings: embedded JSON state plus the review score widget.

use super::{json_to_text, CONTEXT_POSTFIX};
use crate::booking_catalog;
use crate::error::ExtractError;
use crate::models::{CompanyResult, IndicatorHit, IndicatorSpec};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

lazy_static! {
    static ref BANNER: Selector =
        Selector::parse(r#"div[data-testid="sustainability-banner-container"]"#).unwrap();
    static ref SCRIPT: Selector = Selector::parse("script").unwrap();
    static ref JSON_SCRIPT: Selector = Selector::parse(r#"script[type="application/json"]"#).unwrap();
    static ref REVIEW_WIDGET: Selector =
        Selector::parse(r#"div[data-capla-component$="PropertyReviewScoreRight"]"#).unwrap();
    static ref DIV: Selector = Selector::parse("div").unwrap();
    static ref COMMENTS_REGEX: Regex = Regex::new(r"([\d.]+) comentarios").unwrap();
    static ref SCORE_REGEX: Regex = Regex::new(r"Puntuación: ([\d,.]+)").unwrap();
}

pub const SCORE: &str = "Booking_Puntuación";
pub const COMMENTS: &str = "Booking_Comentarios";
pub const STARS: &str = "Booking_Estrellas";
pub const CERTIFICATES: &str = "Booking_Certificados_Sostenibilidad";
pub const TIER: &str = "Booking_Nivel_Sostenibilidad";

/// Everything the heuristics could read off one Booking snapshot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BookingFacts {
    /// Sustainability facility ids; `None` when the banner or its data is missing.
    pub facilities: Option<Vec<String>>,
    pub tier: Option<String>,
    pub certificates: Option<Vec<String>>,
    pub stars: Option<String>,
    pub score: Option<String>,
    pub comments: Option<String>,
}

pub fn read_facts(document: &Html) -> Result<BookingFacts, ExtractError> {
    let mut facts = BookingFacts::default();

    read_sustainability(document, &mut facts)?;
    read_chain_programmes(document, &mut facts)?;
    read_review_widget(document, &mut facts);

    Ok(facts)
}

fn script_text(script: &ElementRef) -> String {
    script.text().collect()
}

fn read_sustainability(document: &Html, facts: &mut BookingFacts) -> Result<(), ExtractError> {
    if document.select(&BANNER).count() != 1 {
        debug!("Can't find sustainability banner");
        return Ok(());
    }

    let scripts: Vec<String> = document
        .select(&SCRIPT)
        .map(|script| script_text(&script))
        .filter(|text| text.contains("PropertySustainability"))
        .collect();
    let [script] = scripts.as_slice() else {
        debug!("Problem retrieving the sustainability banner data ({} scripts)", scripts.len());
        return Ok(());
    };

    let content: Value = serde_json::from_str(script)?;
    let mut facilities = Vec::new();
    if let Some(entries) = content.as_object() {
        for (key, value) in entries {
            if key.contains("PropertySustainabilityFacility") {
                if let Some(id) = value.get("id") {
                    facilities.push(json_to_text(id));
                }
            } else if key.contains("PropertySustainabilityTier") {
                facts.tier = value.get("type").map(json_to_text);
            }
        }
    }
    facts.facilities = Some(facilities);
    Ok(())
}

fn read_chain_programmes(document: &Html, facts: &mut BookingFacts) -> Result<(), ExtractError> {
    let scripts: Vec<String> = document
        .select(&JSON_SCRIPT)
        .map(|script| script_text(&script))
        .filter(|text| text.contains("chainProgrammes"))
        .collect();
    let [script] = scripts.as_slice() else {
        debug!("Problem retrieving chainProgrammes ({} scripts)", scripts.len());
        return Ok(());
    };

    let content: Value = serde_json::from_str(script)?;

    if let Some(programmes) = content
        .get("PropertySustainability:{}")
        .and_then(|sustainability| sustainability.get("chainProgrammes"))
        .and_then(Value::as_array)
    {
        facts.certificates = Some(
            programmes
                .iter()
                .map(|programme| {
                    format!(
                        "{}_{}",
                        programme.get("chainName").map(json_to_text).unwrap_or_default(),
                        programme.get("programmeName").map(json_to_text).unwrap_or_default()
                    )
                })
                .collect(),
        );
    }

    facts.stars = content
        .get("StarRating:{}")
        .and_then(|rating| rating.get("value"))
        .filter(|value| !value.is_null())
        .map(json_to_text);

    Ok(())
}

fn read_review_widget(document: &Html, facts: &mut BookingFacts) {
    let widgets: Vec<ElementRef> = document.select(&REVIEW_WIDGET).collect();
    let [widget] = widgets.as_slice() else {
        debug!("Problem retrieving PropertyReviewScoreRight ({} widgets)", widgets.len());
        return;
    };
    let Some(inner) = widget.children().find_map(ElementRef::wrap) else {
        debug!("PropertyReviewScoreRight has no content");
        return;
    };
    let divs: Vec<ElementRef> = inner
        .select(&DIV)
        .filter(|div| div.id() != inner.id())
        .collect();

    facts.score = review_score(&divs);
    facts.comments = review_comments(&divs);
}

fn review_score(divs: &[ElementRef]) -> Option<String> {
    let labels: Vec<&str> = divs
        .iter()
        .filter_map(|div| div.value().attr("aria-label"))
        .filter(|label| label.starts_with("Puntuación"))
        .collect();
    let [label] = labels.as_slice() else {
        debug!("Problem retrieving Puntuación ({} labels)", labels.len());
        return None;
    };
    Some(
        SCORE_REGEX
            .captures(label)
            .and_then(|captures| captures.get(1))
            .map(|score| score.as_str())
            .unwrap_or(*label)
            .to_string(),
    )
}

fn review_comments(divs: &[ElementRef]) -> Option<String> {
    let text = divs
        .iter()
        .map(|div| div.text().collect::<String>())
        .find(|text| text.ends_with("comentarios"))?;
    Some(
        COMMENTS_REGEX
            .captures(&text)
            .and_then(|captures| captures.get(1))
            .map(|count| count.as_str().to_string())
            .unwrap_or(text),
    )
}

pub fn process(
    document: &Html,
    indicators: &BTreeMap<String, IndicatorSpec>,
    result: &mut CompanyResult,
) -> Result<(), ExtractError> {
    let facts = read_facts(document)?;
    apply_facts(&facts, indicators, result);
    Ok(())
}

pub fn apply_facts(
    facts: &BookingFacts,
    indicators: &BTreeMap<String, IndicatorSpec>,
    result: &mut CompanyResult,
) {
    for name in indicators.keys() {
        if result.is_found(name) {
            continue;
        }

        if let (Some(prefix), Some(facilities)) =
            (booking_catalog::block_prefix(name), facts.facilities.as_ref())
        {
            for id in facilities {
                let Some(block) = booking_catalog::facility_block(id) else {
                    debug!("[{}] unknown sustainability facility {}", result.nif, id);
                    continue;
                };
                if block.starts_with(prefix) {
                    let hit = result.hit_mut(name);
                    hit.found = true;
                    if let Some(text) = booking_catalog::block_description(block) {
                        hit.push_context(text);
                        hit.push_context("; ");
                    }
                }
            }
        }

        let value = match name.as_str() {
            SCORE => facts.score.clone(),
            COMMENTS => facts.comments.clone(),
            STARS => facts.stars.clone(),
            CERTIFICATES => facts.certificates.as_ref().map(|certs| certs.join(";")),
            TIER => facts.tier.clone(),
            _ => None,
        };
        if let Some(value) = value {
            debug!("[{}] {}{} = {}", result.nif, name, CONTEXT_POSTFIX, value);
            result.set(name, IndicatorHit::found_with(value));
        }
    }
}
