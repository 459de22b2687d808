use std::ffi::OsStr;
use std::sync::Arc;

use anyhow::Result;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::debug;

/// One Chrome instance with a single tab, shared across a whole run.
///
/// Detail pages render their attribute sections with JavaScript, so a plain
/// GET is not enough. Navigation is strictly sequential: navigate, read the
/// rendered source, then the next navigate. The browser process is torn down
/// when the session is dropped, on every exit path.
pub struct BrowserSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSession {
    pub fn launch() -> Result<Self> {
        let ua_arg = format!("--user-agent={}", crate::http::USER_AGENT);
        let args = vec![
            OsStr::new("--disable-blink-features=AutomationControlled"),
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-infobars"),
            OsStr::new("--ignore-certificate-errors"),
            OsStr::new("--headless=new"),
            OsStr::new(&ua_arg),
        ];

        let browser = Browser::new(LaunchOptions {
            // Modern headless mode is passed via args.
            headless: false,
            window_size: Some((1920, 1080)),
            args,
            ..Default::default()
        })?;
        let tab = browser.new_tab()?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// Navigate the shared tab and return the rendered page source.
    pub fn page_source(&self, url: &str) -> Result<String> {
        debug!(%url, "navigating browser session");
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        self.tab.get_content()
    }
}
