//! Waste transfer note search and documents

use wm_types::{Result, WtnFormat, WtnPage};

use crate::client::{segment, with_query, ApiClient};

pub const WTN_PAGE_SIZE: u32 = 20;

impl ApiClient {
    /// Search notes; `page` is 1-based
    pub fn search_wtns(&self, q: &str, page: u32, page_size: u32) -> Result<WtnPage> {
        let page = page.max(1).to_string();
        let page_size = page_size.max(1).to_string();
        self.get(&with_query(
            "/wtn",
            &[("q", q), ("page", &page), ("page_size", &page_size)],
        ))
    }

    /// Absolute URL of a note rendered as PDF or HTML
    pub fn wtn_document_url(&self, id: &str, format: WtnFormat) -> String {
        self.url(&with_query(
            &format!("/wtn/{}.pdf", segment(id)),
            &[("format", format.as_str())],
        ))
    }
}
