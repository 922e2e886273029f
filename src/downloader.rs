use crate::links;
use crate::models::{Company, Flavor};
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Stores a static HTML snapshot of a URL at a destination path.
pub trait Fetcher {
    fn name(&self) -> &str;
    fn fetch(&self, url: &str, destination: &Path) -> Result<()>;
}

/// Renders pages with the `shot-scraper` CLI in a headless browser.
#[derive(Debug, Clone)]
pub struct ShotScraper {
    pub wait_ms: u64,
    pub browser: String,
    pub locale: String,
}

impl Default for ShotScraper {
    fn default() -> Self {
        Self {
            wait_ms: 500,
            browser: "firefox".to_string(),
            locale: "es-ES".to_string(),
        }
    }
}

impl ShotScraper {
    /// Builds the `shot-scraper html` invocation; arguments are passed without a shell.
    fn command(&self, url: &str, destination: &Path) -> Command {
        let mut command = Command::new("shot-scraper");
        command
            .arg("html")
            .arg(url)
            .arg("-o")
            .arg(destination)
            .arg("--wait")
            .arg(self.wait_ms.to_string())
            .arg("--browser")
            .arg(&self.browser)
            .arg("--locale")
            .arg(&self.locale);
        command
    }
}

impl Fetcher for ShotScraper {
    fn name(&self) -> &str {
        "shot-scraper"
    }

    fn fetch(&self, url: &str, destination: &Path) -> Result<()> {
        let status = self
            .command(url, destination)
            .status()
            .context("Failed to run shot-scraper, is it installed?")?;

        if !status.success() {
            warn!("shot-scraper exited with {} for {}", status, url);
        }
        Ok(())
    }
}

/// Plain HTTP download, for pages that render without JavaScript.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    delay_ms: (u64, u64),
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            delay_ms: (500, 1000),
        })
    }
}

impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch(&self, url: &str, destination: &Path) -> Result<()> {
        let body = self
            .client
            .get(url)
            .header("Accept-Language", "es-ES,es;q=0.9")
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .with_context(|| format!("Failed to fetch {}", url))?;
        fs::write(destination, body)
            .with_context(|| format!("Failed to write {}", destination.display()))?;

        // Be polite to the server
        let (min, max) = self.delay_ms;
        thread::sleep(Duration::from_millis(rand::thread_rng().gen_range(min..max)));
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub fetched: usize,
    pub cached: usize,
    pub missing_url: usize,
    pub failed: usize,
}

/// Snapshots company pages into `<dump>/<NIF>/<NIF>_<Flavor>[_<page>].html`.
pub struct Downloader<F: Fetcher> {
    output_folder: PathBuf,
    fetcher: F,
    limit: Option<usize>,
}

impl<F: Fetcher> Downloader<F> {
    pub fn new(output_folder: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            output_folder: output_folder.into(),
            fetcher,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn snapshot_path(&self, nif: &str, flavor: Flavor, page: Option<&str>) -> PathBuf {
        let file_name = match page {
            Some(page) => format!("{}_{}_{}.html", nif, flavor, page),
            None => format!("{}_{}.html", nif, flavor),
        };
        self.output_folder.join(nif).join(file_name)
    }

    pub fn download_htmls(&self, companies: &[Company], flavor: Flavor) -> Result<DownloadSummary> {
        info!("Downloading {} pages with {}", flavor, self.fetcher.name());
        let mut summary = DownloadSummary::default();
        let mut counter = 0;

        for company in companies {
            if let Some(limit) = self.limit {
                if counter >= limit {
                    info!("Reached limit of {} companies, stopping", limit);
                    break;
                }
            }

            let Some(url) = company.url_for(flavor) else {
                info!("{} has no value in {}", company.nif, flavor.url_column());
                summary.missing_url += 1;
                continue;
            };
            let url = url.split('?').next().unwrap_or(url);

            let company_folder = self.output_folder.join(&company.nif);
            fs::create_dir_all(&company_folder)
                .with_context(|| format!("Failed to create {}", company_folder.display()))?;
            let html_file = self.snapshot_path(&company.nif, flavor, None);

            info!("[{}] Processing {} x {}", counter, company.nif, flavor.url_column());
            self.fetch_once(url, &html_file, &mut summary);

            if flavor == Flavor::Empresa && html_file.exists() {
                if let Err(e) = self.download_internal_links(&html_file, url, &company.nif, &mut summary) {
                    warn!("[{}] Can't follow internal links: {:#}", company.nif, e);
                }
            }

            counter += 1;
        }

        info!(
            "{}: {} fetched, {} already present, {} without URL, {} failed",
            flavor, summary.fetched, summary.cached, summary.missing_url, summary.failed
        );
        Ok(summary)
    }

    /// Fetches unless the snapshot already exists.
    fn fetch_once(&self, url: &str, html_file: &Path, summary: &mut DownloadSummary) {
        if html_file.exists() {
            debug!("Already downloaded: {}", html_file.display());
            summary.cached += 1;
            return;
        }
        match self.fetcher.fetch(url, html_file) {
            Ok(()) => summary.fetched += 1,
            Err(e) => {
                warn!("Error downloading {}: {:#}", url, e);
                summary.failed += 1;
            }
        }
    }

    fn download_internal_links(
        &self,
        html_file: &Path,
        url: &str,
        nif: &str,
        summary: &mut DownloadSummary,
    ) -> Result<()> {
        let html = fs::read_to_string(html_file)
            .with_context(|| format!("Failed to read {}", html_file.display()))?;
        let links = links::internal_links(&html, url)?;
        if links.is_empty() {
            return Ok(());
        }

        let progress = ProgressBar::new(links.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{msg} {bar:40} {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.set_message(format!("Internal links of {}", nif));

        for link in links {
            let page_file = self.snapshot_path(nif, Flavor::Empresa, Some(&link.page_name));
            self.fetch_once(&link.url, &page_file, summary);
            progress.inc(1);
        }
        progress.finish_and_clear();
        Ok(())
    }
}

/// Fails early when the dump folder path is taken by a regular file.
pub fn prepare_output_folder(output_folder: &Path) -> Result<()> {
    if output_folder.is_file() {
        bail!("Dump path {} is a file, expected a folder", output_folder.display());
    }
    fs::create_dir_all(output_folder)
        .with_context(|| format!("Failed to create dump folder {}", output_folder.display()))
}
