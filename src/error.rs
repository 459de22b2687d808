use thiserror::Error;

/// Failures a single unit of work (one listing, one page) can hit.
///
/// Both variants are treated the same way by the callers: log, drop the
/// unit, continue the surrounding loop.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request to {url} returned status {status}")]
    Transport { url: String, status: u16 },

    #[error("expected node missing or malformed: {0}")]
    Extraction(&'static str),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
