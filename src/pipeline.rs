use std::collections::HashMap;

use anyhow::Result;
use reqwest::Client;
use tracing::{info, warn};

use crate::browser::BrowserSession;
use crate::detail::{self, DetailRecord};
use crate::http;
use crate::listing::{self, ListingRecord};

/// One output row: listing keys plus whatever detail keys the product page
/// yielded. Detail keys land on top, so an equal key takes the detail value.
pub type MergedRecord = HashMap<String, String>;

/// Scrape pages `1..=pages`, enriching each listing through one shared
/// browser session.
///
/// A failed page (non-2xx fetch, browser fault) is logged and skipped; later
/// pages still run. The session is torn down when this function returns, on
/// success or error.
pub async fn run(pages: u32, more_info: bool) -> Result<Vec<MergedRecord>> {
    let client = http::client()?;
    let session = BrowserSession::launch()?;
    let mut rows = Vec::new();

    for page in 1..=pages {
        match scrape_page(&client, &session, page, more_info).await {
            Ok(mut page_rows) => {
                info!(page, listings = page_rows.len(), "page complete");
                rows.append(&mut page_rows);
            }
            Err(e) => warn!(page, error = %e, "page failed, continuing with next"),
        }
    }

    Ok(rows)
}

async fn scrape_page(
    client: &Client,
    session: &BrowserSession,
    page: u32,
    more_info: bool,
) -> Result<Vec<MergedRecord>> {
    let html = http::fetch_search_page(client, page).await?;
    let listings = listing::extract_listings(&html);
    let mut rows = Vec::with_capacity(listings.len());

    for record in listings {
        if !more_info {
            rows.push(merge(record, None));
            continue;
        }
        // Enrichment failure drops the whole listing, not just the detail
        // fields. A product page without the marketing container is the
        // usual cause.
        match detail::fetch_details(session, &record.url) {
            Ok(details) => rows.push(merge(record, Some(details))),
            Err(e) => warn!(asin = %record.asin, error = %e, "enrichment failed, dropping listing"),
        }
    }

    Ok(rows)
}

fn merge(listing: ListingRecord, details: Option<DetailRecord>) -> MergedRecord {
    let mut row = MergedRecord::new();
    row.insert("asin".into(), listing.asin);
    row.insert("name".into(), listing.name);
    row.insert("url".into(), listing.url);
    if let Some(rating) = listing.rating {
        row.insert("rating".into(), rating);
    }
    row.insert("price".into(), listing.price);
    if let Some(review) = listing.review {
        row.insert("review".into(), review);
    }

    if let Some(details) = details {
        row.extend(details.attributes);
        row.insert("ProductDescription".into(), details.product_description);
        row.insert("Description".into(), details.description);
    }

    row
}
