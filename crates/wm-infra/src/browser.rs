//! System browser opener

use tracing::info;
use wm_domain::repository::UrlOpener;

/// Opens URLs with the platform's default browser
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        info!("opening {} in browser", url);
        webbrowser::open(url)
    }
}
