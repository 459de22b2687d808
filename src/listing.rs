use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::error::ScrapeError;
use crate::http;

static SEARCH_RESULT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div[data-component-type='s-search-result']").unwrap());
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2 a.a-link-normal.a-text-normal").unwrap());
// Rating and review count carry no semantic markup of their own; they are the
// first and second sibling span inside the small summary row, in that order.
// Sibling position matters: the rating span nests spans of its own (the star
// icon's `.a-icon-alt`), so plain descendant order would misaddress them.
static RATING_SPAN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.a-row.a-size-small span:nth-of-type(1)").unwrap());
static REVIEW_SPAN: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.a-row.a-size-small span:nth-of-type(2)").unwrap());
static PRICE_WHOLE: Lazy<Selector> = Lazy::new(|| Selector::parse("span.a-price-whole").unwrap());

/// Summary of one search-result entry.
#[derive(Debug, Clone)]
pub struct ListingRecord {
    pub asin: String,
    pub name: String,
    pub url: String,
    pub rating: Option<String>,
    pub price: String,
    pub review: Option<String>,
}

/// Extract every listing on a search-results page.
///
/// A node without an ASIN is skipped silently; any other extraction failure
/// drops that one listing with a warning and the page continues. An empty
/// page yields an empty vector.
pub fn extract_listings(html: &str) -> Vec<ListingRecord> {
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for node in document.select(&SEARCH_RESULT) {
        let Some(asin) = node.value().attr("data-asin").filter(|a| !a.is_empty()) else {
            continue;
        };

        match extract_listing(&node, asin) {
            Ok(record) => records.push(record),
            Err(e) => warn!(asin, error = %e, "skipping listing"),
        }
    }

    records
}

fn extract_listing(node: &ElementRef, asin: &str) -> Result<ListingRecord, ScrapeError> {
    let name = node
        .select(&TITLE_LINK)
        .next()
        .ok_or(ScrapeError::Extraction("product title link"))?
        .text()
        .collect::<String>();

    let rating = node
        .select(&RATING_SPAN)
        .next()
        .ok_or(ScrapeError::Extraction("rating span"))?
        .value()
        .attr("aria-label")
        .map(str::to_string);
    let review = node
        .select(&REVIEW_SPAN)
        .next()
        .ok_or(ScrapeError::Extraction("review span"))?
        .value()
        .attr("aria-label")
        .map(str::to_string);

    let price = node
        .select(&PRICE_WHOLE)
        .next()
        .ok_or(ScrapeError::Extraction("price whole span"))?
        .text()
        .collect::<String>();

    Ok(ListingRecord {
        asin: asin.to_string(),
        name,
        url: http::product_url(asin),
        rating,
        price,
        review,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_node(asin: &str) -> String {
        format!(
            r#"<div data-component-type="s-search-result" data-asin="{asin}">
                 <h2><a class="a-link-normal a-text-normal" href="/gp/track?x=1">Canvas Tote</a></h2>
                 <div class="a-row a-size-small">
                   <span aria-label="4.3 out of 5 stars"></span>
                   <span aria-label="1,204"></span>
                 </div>
                 <span class="a-price-whole">1,299</span>
               </div>"#
        )
    }

    #[test]
    fn extracts_all_summary_fields() {
        let html = format!("<html><body>{}</body></html>", listing_node("B000ABC123"));
        let records = extract_listings(&html);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.asin, "B000ABC123");
        assert_eq!(r.name, "Canvas Tote");
        assert_eq!(r.url, "https://www.amazon.in/dp/B000ABC123");
        assert_eq!(r.rating.as_deref(), Some("4.3 out of 5 stars"));
        assert_eq!(r.review.as_deref(), Some("1,204"));
        assert_eq!(r.price, "1,299");
    }

    #[test]
    fn url_ignores_anchor_href() {
        let html = format!("<html><body>{}</body></html>", listing_node("B000ABC123"));
        let records = extract_listings(&html);
        // The anchor points at a tracking URL; the record must not.
        assert_eq!(records[0].url, "https://www.amazon.in/dp/B000ABC123");
    }

    #[test]
    fn node_without_asin_is_skipped() {
        let with = listing_node("B07XYZ9999");
        let without = r#"<div data-component-type="s-search-result">
                           <h2><a class="a-link-normal a-text-normal">No Identifier</a></h2>
                         </div>"#;
        let html = format!("<html><body>{without}{with}</body></html>");

        let records = extract_listings(&html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].asin, "B07XYZ9999");
        assert!(records.iter().all(|r| !r.asin.is_empty()));
    }

    #[test]
    fn empty_asin_is_skipped() {
        let html = r#"<html><body>
            <div data-component-type="s-search-result" data-asin=""></div>
        </body></html>"#;
        assert!(extract_listings(html).is_empty());
    }

    #[test]
    fn listing_missing_title_is_dropped_without_aborting_page() {
        let broken = r#"<div data-component-type="s-search-result" data-asin="B0BROKEN00">
                          <span class="a-price-whole">499</span>
                        </div>"#;
        let html = format!(
            "<html><body>{broken}{}</body></html>",
            listing_node("B000ABC123")
        );

        let records = extract_listings(&html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].asin, "B000ABC123");
    }

    #[test]
    fn nested_spans_inside_rating_do_not_shift_review() {
        // The rating span wraps the star icon, which carries spans of its
        // own; the review count is the row's second sibling span, not the
        // second span in document order.
        let html = r#"<html><body>
            <div data-component-type="s-search-result" data-asin="B0NESTED00">
              <h2><a class="a-link-normal a-text-normal">Rucksack</a></h2>
              <div class="a-row a-size-small">
                <span aria-label="4.1 out of 5 stars">
                  <i class="a-icon-star-small"><span class="a-icon-alt">4.1 out of 5 stars</span></i>
                </span>
                <span aria-label="1,204"></span>
              </div>
              <span class="a-price-whole">2,499</span>
            </div>
        </body></html>"#;

        let records = extract_listings(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rating.as_deref(), Some("4.1 out of 5 stars"));
        assert_eq!(records[0].review.as_deref(), Some("1,204"));
    }

    #[test]
    fn missing_aria_label_keeps_listing_with_empty_field() {
        let html = r#"<html><body>
            <div data-component-type="s-search-result" data-asin="B0NOLABEL0">
              <h2><a class="a-link-normal a-text-normal">Duffel</a></h2>
              <div class="a-row a-size-small"><span></span><span></span></div>
              <span class="a-price-whole">899</span>
            </div>
        </body></html>"#;

        let records = extract_listings(html);
        assert_eq!(records.len(), 1);
        assert!(records[0].rating.is_none());
        assert!(records[0].review.is_none());
    }

    #[test]
    fn empty_page_yields_no_records() {
        assert!(extract_listings("<html><body></body></html>").is_empty());
    }
}
