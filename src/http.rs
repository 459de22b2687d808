use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use tracing::info;

use crate::error::ScrapeError;

pub const BASE_URL: &str = "https://www.amazon.in";

const SEARCH_QUERY: &str = "bags";
// Tail parameters Amazon attaches to a search session; kept verbatim so the
// results match a real browser session for the same query.
const SEARCH_CRID: &str = "2M096C61O4MLT";
const SEARCH_QID: &str = "1688625292";
const SEARCH_SPREFIX: &str = "ba%2Caps%2C283";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Realistic browser header set. Amazon serves a stripped-down page (or a
/// captcha) to clients that look like bots.
static DEFAULT_HEADERS: Lazy<HeaderMap> = Lazy::new(|| {
    let mut headers = HeaderMap::new();
    headers.insert(
        "accept",
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        ),
    );
    headers.insert("accept-language", HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert("dnt", HeaderValue::from_static("1"));
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(
            "\"Not.A/Brand\";v=\"8\", \"Chromium\";v=\"114\", \"Google Chrome\";v=\"114\"",
        ),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("Windows"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
    headers
});

pub fn client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(DEFAULT_HEADERS.clone())
        .build()
}

/// Canonical product URL. Built from the ASIN rather than scraped from the
/// listing's anchor, which carries tracking parameters.
pub fn product_url(asin: &str) -> String {
    format!("{BASE_URL}/dp/{asin}")
}

pub fn search_url(page: u32) -> String {
    format!(
        "{BASE_URL}/s?k={}&page={page}&crid={SEARCH_CRID}&qid={SEARCH_QID}&sprefix={SEARCH_SPREFIX}&ref=sr_pg_{page}",
        urlencoding::encode(SEARCH_QUERY)
    )
}

/// Fetch one search-results page. Non-2xx is fatal for the page.
pub async fn fetch_search_page(client: &Client, page: u32) -> Result<String, ScrapeError> {
    let url = search_url(page);
    info!(%url, "fetching listing page");

    let response = client.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Transport {
            url,
            status: status.as_u16(),
        });
    }

    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_url_is_built_from_asin() {
        assert_eq!(
            product_url("B000ABC123"),
            "https://www.amazon.in/dp/B000ABC123"
        );
    }

    #[test]
    fn search_url_carries_page_number_twice() {
        let url = search_url(7);
        assert!(url.starts_with("https://www.amazon.in/s?k=bags&page=7&"));
        assert!(url.ends_with("&ref=sr_pg_7"));
    }
}
