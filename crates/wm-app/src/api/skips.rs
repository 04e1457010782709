//! Skip creation and label links

use serde_json::json;
use wm_domain::service::fallback::{with_fallback, ON_UNAVAILABLE};
use wm_types::{
    CreatedSkip, HttpMethod, LabelLinks, OwnedSkipIn, Result, SeedReceipt, SkipCreateIn, SkipOut,
};

use crate::client::{decode, segment, ApiClient};

/// PNG labels printed per skip
pub const LABEL_PNG_COUNT: usize = 3;

impl ApiClient {
    /// Create a skip through the admin seed endpoint.
    ///
    /// Servers without it (or refusing the key) get one retry against the
    /// dev ensure-skip endpoint, which only takes the QR code.
    pub fn admin_create_skip(&self, form: &SkipCreateIn) -> Result<SeedReceipt> {
        let body = serde_json::to_value(form)?;
        let dev_body = json!({ "qr_code": form.qr, "qr": form.qr });
        let dev_key = self.admin_key().or(self.driver_key());

        let value = with_fallback(
            ON_UNAVAILABLE,
            || {
                self.request_with_key(HttpMethod::Post, "/skips/_seed", Some(&body), self.admin_key())
            },
            || {
                self.request_with_key(
                    HttpMethod::Post,
                    "/driver/dev/ensure-skip",
                    Some(&dev_body),
                    dev_key,
                )
            },
        )?;
        decode(value)
    }

    /// Create a skip for an owner organisation through the admin-only
    /// `POST /skips`. The label links are the ones the server rendered,
    /// made absolute against the base URL.
    pub fn create_owned_skip(&self, form: &OwnedSkipIn) -> Result<CreatedSkip> {
        let body = serde_json::to_value(form)?;
        let value = self.request_with_key(HttpMethod::Post, "/skips", Some(&body), self.admin_key())?;
        let out: SkipOut = decode(value)?;
        Ok(CreatedSkip {
            labels: LabelLinks {
                pdf: self.asset_url(&out.labels_pdf_url),
                pngs: out.label_png_urls.iter().map(|u| self.asset_url(u)).collect(),
            },
            id: out.id,
            qr_code: out.qr_code,
            owner_org_id: Some(out.owner_org_id),
        })
    }

    fn asset_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            self.url(href)
        }
    }

    /// Absolute label download links for a skip
    pub fn label_links(&self, skip_id: &str) -> LabelLinks {
        let id = segment(skip_id);
        LabelLinks {
            pdf: self.url(&format!("/skips/{id}/labels.pdf")),
            pngs: (1..=LABEL_PNG_COUNT)
                .map(|i| self.url(&format!("/skips/{id}/labels/{i}.png")))
                .collect(),
        }
    }
}
