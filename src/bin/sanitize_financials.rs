use anyhow::Result;
use clap::Parser;
use hotels_scraper::financials::{self, Table};
use hotels_scraper::logging;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Cleans the financial CSV joined with the hotel indicators")]
struct Args {
    /// Path to the raw CSV file
    #[clap(short, long)]
    input: PathBuf,

    /// Path to the resulting CSV file
    #[clap(short, long)]
    output: PathBuf,

    /// Enable debug output
    #[clap(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.debug);

    let table = Table::read(&args.input)?;
    let cleaned = financials::sanitize(table)?;
    cleaned.write(&args.output)?;

    println!("Wrote {} hotels x {} columns to {}", cleaned.rows.len(), cleaned.headers.len(), args.output.display());
    Ok(())
}
