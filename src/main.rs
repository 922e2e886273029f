use anyhow::Result;
use clap::{Parser as ClapParser, ValueEnum};
use hotels_scraper::companies::{load_companies, sanity_check};
use hotels_scraper::downloader::{prepare_output_folder, Downloader, Fetcher, HttpFetcher, ShotScraper};
use hotels_scraper::indicators::load_indicators;
use hotels_scraper::logging;
use hotels_scraper::models::{Company, Flavor};
use hotels_scraper::parser::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FetcherKind {
    /// Render pages in a headless browser through the shot-scraper CLI
    ShotScraper,
    /// Plain HTTP GET, no JavaScript
    Http,
}

#[derive(ClapParser, Debug)]
#[clap(author, version, about = "Hotels Scraper - sustainability indicators from hotel web pages")]
struct Args {
    /// Input CSV file with the company listing
    #[clap(long)]
    input: PathBuf,

    /// Output CSV file. The spreadsheet copy is a tab-separated .tsv next to it, not an .xls
    #[clap(long)]
    output: PathBuf,

    /// Dump folder to save html files
    #[clap(long)]
    dump: PathBuf,

    /// CSV file with indicators
    #[clap(long)]
    indicators: PathBuf,

    /// Flavors to process (Empresa, Booking, Google); all when omitted
    #[clap(long, num_args = 1.., value_delimiter = ',')]
    flavors: Vec<Flavor>,

    /// Avoid downloading the pages
    #[clap(long)]
    skip_download: bool,

    /// Avoid parsing the pages
    #[clap(long)]
    skip_parser: bool,

    /// How pages are downloaded
    #[clap(long, value_enum, default_value = "shot-scraper")]
    fetcher: FetcherKind,

    /// Maximum number of companies to download per flavor
    #[clap(long)]
    limit: Option<usize>,

    /// Number of parser workers (defaults to the number of CPUs)
    #[clap(short, long)]
    workers: Option<usize>,

    /// Enable debug output
    #[clap(short, long)]
    debug: bool,
}

fn download_all<F: Fetcher>(downloader: Downloader<F>, companies: &[Company], flavors: &[Flavor]) -> Result<()> {
    for flavor in Flavor::ALL {
        if flavors.contains(&flavor) {
            downloader.download_htmls(companies, flavor)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.debug);

    println!("Hotels Scraper");
    println!("==============");

    let flavors = if args.flavors.is_empty() {
        Flavor::ALL.to_vec()
    } else {
        args.flavors.clone()
    };

    prepare_output_folder(&args.dump)?;

    let companies = sanity_check(load_companies(&args.input)?)?;

    if !args.skip_download {
        match args.fetcher {
            FetcherKind::ShotScraper => {
                let downloader = Downloader::new(args.dump.clone(), ShotScraper::default()).with_limit(args.limit);
                download_all(downloader, &companies, &flavors)?;
            }
            FetcherKind::Http => {
                let downloader = Downloader::new(args.dump.clone(), HttpFetcher::new()?).with_limit(args.limit);
                download_all(downloader, &companies, &flavors)?;
            }
        }
    } else {
        info!("Skipping download");
    }

    if args.skip_parser {
        info!("Skipping parser");
        return Ok(());
    }

    let indicators = load_indicators(&args.indicators, Some(flavors.as_slice()))?;
    let mut parser = Parser::new(args.dump.clone(), indicators);
    if let Some(workers) = args.workers {
        parser = parser.with_workers(workers);
    }
    let table = parser.find_indicators_in_htmls()?;
    let sheet = table.save(&args.output)?;

    println!("\n=== Summary ===");
    println!("Companies parsed: {}", table.rows.len());
    println!("Indicator columns: {}", table.columns.len());
    println!("Saved to: {} and {}", args.output.display(), sheet.display());

    Ok(())
}
