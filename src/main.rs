mod browser;
mod detail;
mod error;
mod http;
mod listing;
mod output;
mod pipeline;

use clap::Parser;
use tracing::info;

const OUTPUT_FILE: &str = "amazon_scraped_data.csv";

#[derive(Parser)]
#[command(about = "Scrape Amazon search listings and product details to CSV.")]
struct Args {
    /// How many search-result pages to scrape.
    #[arg(long, default_value_t = 20)]
    page_num: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let rows = pipeline::run(args.page_num, true).await?;
    output::write_csv_file(OUTPUT_FILE, &rows)?;
    info!(rows = rows.len(), file = OUTPUT_FILE, "scrape complete");

    Ok(())
}
