//! Cleans the financial export joined with the indicator dataset and reshapes
//! it into the analysis table (English column labels, one row per NIF).

use crate::booking_catalog;
use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

lazy_static! {
    static ref THOUSANDS_REGEX: Regex = Regex::new(r"^-?\d{1,3}(\.\d{3})+$").unwrap();
}

const DROPPED_COLUMNS: [&str; 3] = ["Código NIF.1", "Localidad.1", "Dirección web.1"];

const EMPLOYEES: &str = "Número empleados 2019";
const LEVEL: &str = "Booking_Nivel_Sostenibilidad_Contexto";
const GROUP: &str = "PERTENECE A UN GRUPO O HAY MÁS HOTELES";
const BEACH: &str = "PLAYA (PLAYA= 1 HASTA 10 KM; otros)";
const TOTAL_ASSETS: &str = "Total Activo EUR 2019";
const TOTAL_ASSETS_LOG: &str = "Total Activo log 2019";
const INDEPENDENCE: &str = "Indicator de Independencia BvD";
const INDEPENDENCE_NUM: &str = "Indicator de Independencia num";
const ROA_VARIATION: &str = "Tasa variación rentabilidad económica";
const ROE_VARIATION: &str = "Tasa variación rentabilidad financiera";
const INDICATOR_COUNT: &str = "Número de indicadores";

const INDEPENDENCE_GRADES: [&str; 9] = ["D", "C", "C+", "B-", "B", "B+", "A-", "A", "A+"];

const FIXED_COLUMNS: [&str; 8] = [
    "NIF",
    "Nombre EMPRESA",
    INDEPENDENCE_NUM,
    GROUP,
    BEACH,
    "Genero Director Ejecutivo",
    ROA_VARIATION,
    ROE_VARIATION,
];

const BOOKING_COLUMNS: [&str; 3] = [
    "Booking_Estrellas_Contexto",
    "Booking_Puntuación_Contexto",
    LEVEL,
];

/// 2019 columns selected by name prefix.
const YEAR_PREFIXES: [&str; 11] = [
    "Rentabilidad sobre capital empleado",
    "Rentabilidad económica",
    "Rentabilidad financiera",
    "Número empleados",
    "Endeudamiento",
    "Margen de beneficio",
    "Ingresos de explotación",
    "Ratio de solvencia",
    "Result. ordinarios antes Impuestos",
    "EBIT",
    "Total Activo log",
];

const RENAMES: [(&str, &str); 20] = [
    ("Booking_Estrellas_Contexto", "Star rating"),
    ("Genero Director Ejecutivo", "Gender of CEO"),
    ("Número empleados 2019", "Employees"),
    (GROUP, "Group"),
    (BEACH, "Beach"),
    ("EBIT 2019", "EBIT"),
    ("EBITDA 2019", "EBITDA"),
    ("Endeudamiento (%) % 2019", "Indebtedness"),
    ("Ingresos de explotación EUR 2019", "Operating income"),
    ("Margen de beneficio (%) % 2019", "Profit margin"),
    ("Ratio de solvencia % 2019", "Solvency"),
    ("Rentabilidad económica (%) % 2019", "ROA"),
    ("Rentabilidad financiera (%) % 2019", "ROE"),
    ("Rentabilidad sobre capital empleado (%) % 2019", "ROIC"),
    ("Result. ordinarios antes Impuestos EUR 2019", "EBT"),
    (ROA_VARIATION, "Variation in ROA"),
    (ROE_VARIATION, "Variation in ROE"),
    (TOTAL_ASSETS_LOG, "Asset"),
    (INDEPENDENCE_NUM, "Independence indicator"),
    (LEVEL, "Level Sustainability Index"),
];

/// Header-addressed string table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open financial data: {}", path.display()))?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

        let raw: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let headers = dedupe_headers(&raw)
            .into_iter()
            .map(|h| h.replace('\n', " "))
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        info!("Loaded {} rows x {} columns from {}", rows.len(), headers.len(), path.display());
        Ok(Self { headers, rows })
    }

    pub fn index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of a column; empty strings when the column is absent.
    pub fn column(&self, name: &str) -> Vec<String> {
        match self.index(name) {
            Some(i) => self.rows.iter().map(|row| row[i].clone()).collect(),
            None => vec![String::new(); self.rows.len()],
        }
    }

    /// Replaces or appends a column.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        let i = match self.index(name) {
            Some(i) => i,
            None => {
                self.headers.push(name.to_string());
                for row in self.rows.iter_mut() {
                    row.push(String::new());
                }
                self.headers.len() - 1
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[i] = value;
        }
    }

    pub fn map_column(&mut self, name: &str, f: impl Fn(&str) -> String) {
        if let Some(i) = self.index(name) {
            for row in self.rows.iter_mut() {
                row[i] = f(&row[i]);
            }
        }
    }

    pub fn drop_column(&mut self, name: &str) {
        if let Some(i) = self.index(name) {
            self.headers.remove(i);
            for row in self.rows.iter_mut() {
                row.remove(i);
            }
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        info!("Saved {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

/// Repeated header names get `.1`, `.2`, ... suffixes, first occurrence unchanged.
pub fn dedupe_headers(headers: &[String]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    headers
        .iter()
        .map(|h| {
            let count = seen.entry(h.as_str()).or_insert(0);
            let name = if *count == 0 { h.clone() } else { format!("{}.{}", h, count) };
            *count += 1;
            name
        })
        .collect()
}

/// Lenient numeric parse: `n.d.`/`n.s.` are missing, `1.234.567` and `12,5` are accepted.
pub fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("n.d.") || value.eq_ignore_ascii_case("n.s.") {
        return None;
    }
    if let Ok(number) = value.parse::<f64>() {
        return Some(number);
    }
    if THOUSANDS_REGEX.is_match(value) {
        return value.replace('.', "").parse().ok();
    }
    if value.contains(',') {
        return value.replace('.', "").replace(',', ".").parse().ok();
    }
    None
}

fn format_number(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

pub fn sustainability_level(value: &str) -> String {
    match value.trim() {
        "" | "NONE" => "NO_LEVEL".to_string(),
        "BRONZE" => "LEVEL_1".to_string(),
        "SILVER" => "LEVEL_2".to_string(),
        "GOLD" => "LEVEL_3".to_string(),
        other => other.to_string(),
    }
}

pub fn independence_score(grade: &str) -> String {
    INDEPENDENCE_GRADES
        .iter()
        .position(|g| *g == grade.trim())
        .map(|score| score.to_string())
        .unwrap_or_default()
}

fn variation(current: &str, previous: &str) -> String {
    match (parse_number(current), parse_number(previous)) {
        (Some(current), Some(previous)) if previous != 0.0 => {
            format_number((current - previous) / previous)
        }
        _ => String::new(),
    }
}

fn derive_variation(table: &mut Table, target: &str, base: &str) {
    let current = table.column(&format!("{} (%) % 2019", base));
    let previous = table.column(&format!("{} (%) % 2018", base));
    let values = current
        .iter()
        .zip(&previous)
        .map(|(c, p)| variation(c, p))
        .collect();
    table.set_column(target, values);
}

/// Runs the full cleaning pipeline and returns the analysis table.
pub fn sanitize(mut table: Table) -> Result<Table> {
    for column in DROPPED_COLUMNS {
        table.drop_column(column);
    }

    let Some(employees) = table.index(EMPLOYEES) else {
        bail!("Missing column '{}'", EMPLOYEES);
    };
    let before = table.rows.len();
    table.rows.retain(|row| {
        parse_number(&row[employees])
            .map(|n| (10.0..=250.0).contains(&n))
            .unwrap_or(false)
    });
    info!("Kept {} of {} hotels with 10 to 250 employees", table.rows.len(), before);

    if table.index(LEVEL).is_none() {
        table.set_column(LEVEL, Vec::new());
    }
    table.map_column(LEVEL, sustainability_level);
    table.map_column(GROUP, |v| if v.trim().is_empty() { "0".to_string() } else { v.to_string() });
    table.map_column(BEACH, |v| {
        let on_beach = matches!(v.trim(), "1" | "PLAYA");
        u8::from(on_beach).to_string()
    });

    let log_assets = table
        .column(TOTAL_ASSETS)
        .iter()
        .map(|v| parse_number(v).map(f64::ln).map(format_number).unwrap_or_default())
        .collect();
    table.set_column(TOTAL_ASSETS_LOG, log_assets);

    let independence = table
        .column(INDEPENDENCE)
        .iter()
        .map(|grade| independence_score(grade))
        .collect();
    table.set_column(INDEPENDENCE_NUM, independence);

    derive_variation(&mut table, ROA_VARIATION, "Rentabilidad económica");
    derive_variation(&mut table, ROE_VARIATION, "Rentabilidad financiera");

    let mut booking_columns: Vec<String> = BOOKING_COLUMNS.iter().map(|c| c.to_string()).collect();
    for (context_column, _) in booking_catalog::SPLIT_CONTEXTS {
        let contexts = table.column(context_column);
        for (text, column) in booking_catalog::splits_for(context_column) {
            let flags = contexts
                .iter()
                .map(|context| u8::from(context.contains(text)).to_string())
                .collect();
            table.set_column(column, flags);
            booking_columns.push(column.to_string());
        }
    }

    let indicator_indexes: Vec<usize> = booking_catalog::indicator_columns()
        .filter_map(|column| table.index(column))
        .collect();
    let counts = table
        .rows
        .iter()
        .map(|row| {
            indicator_indexes
                .iter()
                .map(|&i| row[i].parse::<u32>().unwrap_or(0))
                .sum::<u32>()
                .to_string()
        })
        .collect();
    table.set_column(INDICATOR_COUNT, counts);

    let mut targets: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    targets.extend(booking_columns);
    for column in &table.headers {
        if column.ends_with("2019") && YEAR_PREFIXES.iter().any(|p| column.starts_with(p)) {
            targets.push(column.clone());
        }
    }
    targets.push(INDICATOR_COUNT.to_string());

    select_and_rename(&table, &targets)
}

fn select_and_rename(table: &Table, targets: &[String]) -> Result<Table> {
    if table.index("NIF").is_none() {
        bail!("Missing column 'NIF'");
    }

    let mut seen = HashSet::new();
    let mut indexes = Vec::new();
    for target in targets {
        if !seen.insert(target.as_str()) {
            continue;
        }
        match table.index(target) {
            Some(i) => indexes.push(i),
            None => warn!("Column '{}' not found, skipping it", target),
        }
    }

    let renames: HashMap<&str, &str> = RENAMES.into_iter().collect();
    let headers = indexes
        .iter()
        .map(|&i| {
            let name = table.headers[i].as_str();
            renames.get(name).copied().unwrap_or(name).to_string()
        })
        .collect();
    let rows = table
        .rows
        .iter()
        .map(|row| indexes.iter().map(|&i| row[i].clone()).collect())
        .collect();

    Ok(Table { headers, rows })
}
