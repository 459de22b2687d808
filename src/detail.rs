use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::browser::BrowserSession;
use crate::error::ScrapeError;

static DETAIL_BULLETS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#detailBullets_feature_div > ul > li").unwrap());
static DETAIL_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#productDetails_detailBullets_sections1").unwrap());
static TABLE_ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static ROW_KEY: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());
static ROW_VALUE: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static FEATURE_BULLETS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#feature-bullets > ul > li").unwrap());
static APLUS: Lazy<Selector> = Lazy::new(|| Selector::parse("#aplus_feature_div").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Duplicates the review count already captured on the listing page.
const NOISE_KEY: &str = "Customer Reviews";

/// Extended attributes scraped from one product page.
#[derive(Debug, Clone, Default)]
pub struct DetailRecord {
    pub attributes: HashMap<String, String>,
    pub description: String,
    pub product_description: String,
}

/// The two markup structures Amazon uses for the structured attribute
/// section. Resolved once per page; the table form is only consulted when no
/// bullet nodes exist at all.
enum AttributeSource<'a> {
    Bullets(Vec<ElementRef<'a>>),
    Table(ElementRef<'a>),
}

/// Navigate the shared session to a product page and extract its details.
pub fn fetch_details(session: &BrowserSession, url: &str) -> anyhow::Result<DetailRecord> {
    let html = session.page_source(url)?;
    Ok(parse_detail_page(&html)?)
}

/// Extract attributes and descriptions from rendered product-page HTML.
///
/// An empty attribute section is not an error. A page without the
/// `#aplus_feature_div` marketing container is: that container is read
/// unconditionally, so such a page fails the whole listing's enrichment and
/// the caller drops the listing.
pub fn parse_detail_page(html: &str) -> Result<DetailRecord, ScrapeError> {
    let document = Html::parse_document(html);

    let attributes = match resolve_attribute_source(&document) {
        Some(AttributeSource::Bullets(items)) => bullets_to_map(&items),
        Some(AttributeSource::Table(table)) => table_to_map(&table),
        None => HashMap::new(),
    };

    let description = document
        .select(&FEATURE_BULLETS)
        .map(|li| li.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");

    let product_description = document
        .select(&APLUS)
        .next()
        .map(|el| normalize(&el.text().collect::<String>()))
        .ok_or(ScrapeError::Extraction("#aplus_feature_div"))?;

    Ok(DetailRecord {
        attributes,
        description,
        product_description,
    })
}

fn resolve_attribute_source(document: &Html) -> Option<AttributeSource<'_>> {
    let bullets: Vec<ElementRef> = document.select(&DETAIL_BULLETS).collect();
    if !bullets.is_empty() {
        return Some(AttributeSource::Bullets(bullets));
    }
    document.select(&DETAIL_TABLE).next().map(AttributeSource::Table)
}

/// Tier 1: each bullet is "Key : Value" free text. Bullets that do not split
/// into exactly two parts are dropped from the map, not the record.
fn bullets_to_map(items: &[ElementRef]) -> HashMap<String, String> {
    let mut attributes = HashMap::new();

    for item in items {
        let text = normalize(&item.text().collect::<String>());
        let mut parts = text.splitn(2, " : ");
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            attributes.insert(key.to_string(), value.to_string());
        }
    }

    attributes
}

/// Tier 2: a two-column key/value table. Amazon renders the key as a `th`;
/// older layouts use two `td`s.
fn table_to_map(table: &ElementRef) -> HashMap<String, String> {
    let mut attributes = HashMap::new();

    for row in table.select(&TABLE_ROW) {
        let mut cells = row.select(&ROW_VALUE);
        let Some(key) = row.select(&ROW_KEY).next().or_else(|| cells.next()) else {
            continue;
        };
        let Some(value) = cells.next() else { continue };

        attributes.insert(
            normalize(&key.text().collect::<String>()),
            normalize(&value.text().collect::<String>()),
        );
    }

    attributes.remove(NOISE_KEY);
    attributes
}

/// Collapse whitespace runs and strip the directional-mark control
/// characters (U+200E/U+200F) Amazon scatters through detail bullets.
fn normalize(text: &str) -> String {
    let text = text.replace(['\u{200e}', '\u{200f}'], "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}
