use crate::extract;
use crate::models::{CompanyResult, Flavor, IndicatorHit, IndicatorSet};
use crate::output::ResultTable;
use crate::pool;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Mines every company folder of a dump directory for the configured indicators.
pub struct Parser {
    dump_folder: PathBuf,
    indicators: IndicatorSet,
    workers: usize,
}

impl Parser {
    pub fn new(dump_folder: impl Into<PathBuf>, indicators: IndicatorSet) -> Self {
        Self {
            dump_folder: dump_folder.into(),
            indicators,
            workers: pool::default_workers(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn find_indicators_in_htmls(&self) -> Result<ResultTable> {
        let nifs = company_folders(&self.dump_folder)?;
        info!(
            "Finding indicators for {} companies with {} workers",
            nifs.len(),
            self.workers
        );

        let progress = ProgressBar::new(nifs.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("Finding indicators {bar:40} {pos}/{len} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut results = Vec::with_capacity(nifs.len());
        pool::run_unordered(
            nifs,
            self.workers,
            |nif: String| process_single_nif(&nif, &self.dump_folder, &self.indicators),
            |result| {
                progress.inc(1);
                results.push(result);
            },
        );
        progress.finish();

        Ok(ResultTable::from_results(results))
    }
}

/// Each subdirectory of the dump folder holds the snapshots of one NIF.
pub fn company_folders(dump_folder: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dump_folder)
        .with_context(|| format!("Failed to list dump folder: {}", dump_folder.display()))?;

    let mut nifs = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            nifs.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    nifs.sort();
    Ok(nifs)
}

/// Snapshot files `<nif>_<flavor>*.html` in file-name order, so the main page comes first.
pub fn snapshot_files(company_folder: &Path, nif: &str, flavor: Flavor) -> Vec<PathBuf> {
    let prefix = format!("{}_{}", nif, flavor);
    let Ok(entries) = fs::read_dir(company_folder) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(&prefix) && name.ends_with(".html"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

pub fn process_single_nif(nif: &str, dump_folder: &Path, indicators: &IndicatorSet) -> CompanyResult {
    let mut result = CompanyResult::new(nif);
    let company_folder = dump_folder.join(nif);

    for (flavor, by_name) in indicators {
        for name in by_name.keys() {
            result.set(name, IndicatorHit::default());
        }

        for html_file in snapshot_files(&company_folder, nif, *flavor) {
            if let Err(e) = extract::process_file(*flavor, &html_file, by_name, &mut result) {
                warn!("[{}] Can't process {}: {}", nif, html_file.display(), e);
            }
        }
    }

    result
}
