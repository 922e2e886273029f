use crate::models::{ExtractionType, Flavor, IndicatorSet, IndicatorSpec};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct IndicatorRecord {
    #[serde(rename = "Identificador")]
    name: String,
    #[serde(rename = "Web")]
    flavor: String,
    #[serde(rename = "Búsqueda")]
    keywords: String,
    #[serde(rename = "Extracción")]
    extract: String,
}

/// Splits a `Búsqueda` cell into lowercase keywords. Both `/` and line breaks separate entries.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.replace('\n', "/")
        .split('/')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

pub fn load_indicators(csv_path: &Path, flavors: Option<&[Flavor]>) -> Result<IndicatorSet> {
    let file = File::open(csv_path)
        .with_context(|| format!("Failed to open indicators file: {}", csv_path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut indicators = IndicatorSet::new();
    for (line, result) in reader.deserialize::<IndicatorRecord>().enumerate() {
        let row = line + 2;
        let record = result.with_context(|| format!("Invalid indicator row {}", row))?;

        let flavor: Flavor = record
            .flavor
            .parse()
            .map_err(|e| anyhow!("Indicator row {}: {}", row, e))?;
        if let Some(filter) = flavors {
            if !filter.contains(&flavor) {
                continue;
            }
        }

        let extract: ExtractionType = record
            .extract
            .parse()
            .map_err(|e| anyhow!("Indicator row {}: {}", row, e))?;

        indicators.entry(flavor).or_default().insert(
            record.name.trim().to_string(),
            IndicatorSpec {
                keywords: split_keywords(&record.keywords),
                extract,
            },
        );
    }

    let total: usize = indicators.values().map(|by_name| by_name.len()).sum();
    info!("Loaded {} indicators from {}", total, csv_path.display());
    Ok(indicators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn keywords_split_on_slash_and_newline() {
        assert_eq!(
            split_keywords("Reciclaje / Residuos\nPapeleras/"),
            vec!["reciclaje", "residuos", "papeleras"]
        );
    }

    #[test]
    fn rows_outside_the_flavor_filter_are_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Identificador,Web,Búsqueda,Extracción").unwrap();
        writeln!(file, "Empresa_Agua,Empresa,\"agua\nducha\",Palabra").unwrap();
        writeln!(file, "Google_Spa,Google,Spa,Apartado").unwrap();

        let all = load_indicators(file.path(), None).unwrap();
        assert_eq!(all.len(), 2);
        let spec = &all[&Flavor::Empresa]["Empresa_Agua"];
        assert_eq!(spec.keywords, vec!["agua", "ducha"]);
        assert_eq!(spec.extract, ExtractionType::Word);

        let google_only = load_indicators(file.path(), Some(&[Flavor::Google][..])).unwrap();
        assert_eq!(google_only.keys().collect::<Vec<_>>(), vec![&Flavor::Google]);
    }

    #[test]
    fn unknown_extraction_type_names_the_row() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Identificador,Web,Búsqueda,Extracción").unwrap();
        writeln!(file, "X,Empresa,agua,Tabla").unwrap();

        let err = load_indicators(file.path(), None).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn unknown_flavor_names_the_row() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Identificador,Web,Búsqueda,Extracción").unwrap();
        writeln!(file, "Empresa_Agua,Empresa,agua,Palabra").unwrap();
        writeln!(file, "Trip_Spa,Tripadvisor,spa,Frase").unwrap();

        let err = load_indicators(file.path(), Some(&[Flavor::Empresa][..])).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("row 3"));
        assert!(message.contains("Tripadvisor"));
    }
}
