use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Kind of web page a snapshot was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flavor {
    Empresa,
    Booking,
    Google,
}

impl Flavor {
    pub const ALL: [Flavor; 3] = [Flavor::Empresa, Flavor::Booking, Flavor::Google];

    pub fn label(&self) -> &'static str {
        match self {
            Flavor::Empresa => "Empresa",
            Flavor::Booking => "Booking",
            Flavor::Google => "Google",
        }
    }

    /// Column of the company listing holding the URL for this flavor.
    pub fn url_column(&self) -> &'static str {
        match self {
            Flavor::Empresa => "Dirección web",
            Flavor::Booking => "BOOKING",
            Flavor::Google => "GOOGLE",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Flavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flavor::ALL
            .into_iter()
            .find(|flavor| flavor.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown flavor '{}' (expected Empresa, Booking or Google)", s))
    }
}

/// How an indicator's context should be extracted once a keyword is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionType {
    Number,
    Section,
    Phrase,
    Word,
}

impl ExtractionType {
    pub fn label(&self) -> &'static str {
        match self {
            ExtractionType::Number => "Número",
            ExtractionType::Section => "Apartado",
            ExtractionType::Phrase => "Frase",
            ExtractionType::Word => "Palabra",
        }
    }
}

impl fmt::Display for ExtractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExtractionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [
            ExtractionType::Number,
            ExtractionType::Section,
            ExtractionType::Phrase,
            ExtractionType::Word,
        ]
        .into_iter()
        .find(|kind| kind.label() == s)
        .ok_or_else(|| format!("unknown extraction type '{}'", s))
    }
}

/// A row of the company listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub nif: String,
    pub web: Option<String>,
    pub booking: Option<String>,
    pub google: Option<String>,
}

impl Company {
    pub fn url_for(&self, flavor: Flavor) -> Option<&str> {
        match flavor {
            Flavor::Empresa => self.web.as_deref(),
            Flavor::Booking => self.booking.as_deref(),
            Flavor::Google => self.google.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorSpec {
    pub keywords: Vec<String>,
    pub extract: ExtractionType,
}

/// Indicators to look for, grouped by flavor and keyed by identifier.
pub type IndicatorSet = BTreeMap<Flavor, BTreeMap<String, IndicatorSpec>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorHit {
    pub found: bool,
    pub context: Option<String>,
}

impl IndicatorHit {
    pub fn found_with(context: impl Into<String>) -> Self {
        Self {
            found: true,
            context: Some(context.into()),
        }
    }

    /// Appends to the context, creating it if needed.
    pub fn push_context(&mut self, text: &str) {
        self.context.get_or_insert_with(String::new).push_str(text);
    }
}

/// Indicator results for a single company folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyResult {
    pub nif: String,
    pub hits: HashMap<String, IndicatorHit>,
}

impl CompanyResult {
    pub fn new(nif: impl Into<String>) -> Self {
        Self {
            nif: nif.into(),
            hits: HashMap::new(),
        }
    }

    pub fn is_found(&self, name: &str) -> bool {
        self.hits.get(name).map(|hit| hit.found).unwrap_or(false)
    }

    pub fn hit_mut(&mut self, name: &str) -> &mut IndicatorHit {
        self.hits.entry(name.to_string()).or_default()
    }

    pub fn set(&mut self, name: &str, hit: IndicatorHit) {
        self.hits.insert(name.to_string(), hit);
    }
}
