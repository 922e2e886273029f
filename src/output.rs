use crate::extract::CONTEXT_POSTFIX;
use crate::models::CompanyResult;
use anyhow::{Context, Result};
use chrono::Local;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Parser output: one row per NIF, one flag column per indicator plus its context column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<CompanyResult>,
}

impl ResultTable {
    pub fn from_results(mut rows: Vec<CompanyResult>) -> Self {
        rows.sort_by(|a, b| a.nif.cmp(&b.nif));

        let names: BTreeSet<&str> = rows
            .iter()
            .flat_map(|row| row.hits.keys().map(String::as_str))
            .collect();
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_by(|a, b| natural_cmp(a, b));

        let mut columns = Vec::with_capacity(names.len() * 2);
        for name in names {
            columns.push(name.to_string());
            let has_context = rows
                .iter()
                .any(|row| row.hits.get(name).map_or(false, |hit| hit.context.is_some()));
            if has_context {
                columns.push(format!("{}{}", name, CONTEXT_POSTFIX));
            }
        }

        Self { columns, rows }
    }

    pub fn header(&self) -> Vec<&str> {
        std::iter::once("NIF")
            .chain(self.columns.iter().map(String::as_str))
            .collect()
    }

    pub fn record(&self, row: &CompanyResult) -> Vec<String> {
        let mut record = Vec::with_capacity(self.columns.len() + 1);
        record.push(row.nif.clone());
        for column in &self.columns {
            let value = match column.strip_suffix(CONTEXT_POSTFIX) {
                Some(name) => row
                    .hits
                    .get(name)
                    .and_then(|hit| hit.context.clone())
                    .unwrap_or_default(),
                None => {
                    if row.is_found(column) {
                        "True".to_string()
                    } else {
                        String::new()
                    }
                }
            };
            record.push(value);
        }
        record
    }

    pub fn write_delimited(&self, path: &Path, delimiter: u8) -> Result<()> {
        backup_existing(path)?;
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(file);

        writer.write_record(self.header())?;
        for row in &self.rows {
            writer.write_record(self.record(row))?;
        }
        writer.flush()?;
        info!("Saved {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Writes the CSV plus a tab-separated copy for spreadsheets.
    pub fn save(&self, csv_path: &Path) -> Result<PathBuf> {
        self.write_delimited(csv_path, b',')?;
        let sheet_path = spreadsheet_path(csv_path);
        self.write_delimited(&sheet_path, b'\t')?;
        Ok(sheet_path)
    }
}

/// `results.csv` -> `results.tsv`.
pub fn spreadsheet_path(csv_path: &Path) -> PathBuf {
    csv_path.with_extension("tsv")
}

/// Copies an existing file to `<name>.<timestamp>.bak` before it is overwritten.
pub fn backup_existing(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let mut backup = path.as_os_str().to_owned();
    backup.push(format!(".{}.bak", stamp));
    let backup = PathBuf::from(backup);
    fs::copy(path, &backup)
        .with_context(|| format!("Failed to back up {}", path.display()))?;
    info!("Backed up {} to {}", path.display(), backup.display());
    Ok(Some(backup))
}

/// Orders strings with embedded numbers numerically ("Item_2" < "Item_10").
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars().peekable();
    let mut b_chars = b.chars().peekable();

    loop {
        match (a_chars.peek().copied(), b_chars.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let x_num = take_number(&mut a_chars);
                let y_num = take_number(&mut b_chars);
                let x_trimmed = x_num.trim_start_matches('0');
                let y_trimmed = y_num.trim_start_matches('0');
                let ordering = x_trimmed
                    .len()
                    .cmp(&y_trimmed.len())
                    .then_with(|| x_trimmed.cmp(y_trimmed))
                    .then_with(|| x_num.len().cmp(&y_num.len()));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a_chars.next();
                b_chars.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut number = String::new();
    while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
        number.push(c);
        chars.next();
    }
    number
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndicatorHit;
    use pretty_assertions::assert_eq;

    fn row(nif: &str, hits: &[(&str, IndicatorHit)]) -> CompanyResult {
        let mut result = CompanyResult::new(nif);
        for (name, hit) in hits {
            result.set(name, hit.clone());
        }
        result
    }

    #[test]
    fn natural_order_compares_numbers_by_value() {
        let mut names = vec!["Ind_10", "Ind_2", "Ind_1", "Agua"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["Agua", "Ind_1", "Ind_2", "Ind_10"]);
    }

    #[test]
    fn context_columns_follow_their_flag_only_when_used() {
        let table = ResultTable::from_results(vec![
            row("B2", &[("Spa", IndicatorHit::default()), ("Agua", IndicatorHit::found_with("**agua**"))]),
            row("A1", &[("Spa", IndicatorHit::default()), ("Agua", IndicatorHit::default())]),
        ]);

        assert_eq!(table.columns, vec!["Agua", "Agua_Contexto", "Spa"]);
        assert_eq!(table.rows[0].nif, "A1");
        assert_eq!(table.record(&table.rows[0]), vec!["A1", "", "", ""]);
        assert_eq!(table.record(&table.rows[1]), vec!["B2", "True", "**agua**", ""]);
    }

    #[test]
    fn save_writes_csv_and_tsv_and_backs_up_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("results.csv");
        fs::write(&csv_path, "old").unwrap();

        let table = ResultTable::from_results(vec![row(
            "B1",
            &[("Agua", IndicatorHit::found_with("agua, luz"))],
        )]);
        let sheet = table.save(&csv_path).unwrap();

        assert_eq!(
            fs::read_to_string(&csv_path).unwrap(),
            "NIF,Agua,Agua_Contexto\nB1,True,\"agua, luz\"\n"
        );
        assert_eq!(sheet, dir.path().join("results.tsv"));
        assert_eq!(
            fs::read_to_string(&sheet).unwrap(),
            "NIF\tAgua\tAgua_Contexto\nB1\tTrue\tagua, luz\n"
        );
        let backups = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".bak"))
            .count();
        assert_eq!(backups, 1);
    }
}
