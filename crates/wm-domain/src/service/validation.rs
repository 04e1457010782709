//! Client-side form checks, run before any request is sent

use std::sync::OnceLock;

use regex::Regex;
use wm_types::{
    BinAssignmentForm, FieldErrors, MetaConfig, NewContractor, OwnedSkipIn, SkipCreateIn,
};

pub const MAX_CONTRACTOR_NAME: usize = 120;
pub const MAX_QR_CODE: usize = 64;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("static pattern"))
}

/// Loose `x@y.z` shape check
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

fn insert(fields: &mut FieldErrors, name: &str, msg: &str) {
    fields.insert(name.to_string(), msg.to_string());
}

pub fn validate_contractor(c: &NewContractor) -> FieldErrors {
    let mut e = FieldErrors::new();
    if c.org_name.trim().is_empty() {
        insert(&mut e, "name", "Name is required");
    }
    if c.org_name.chars().count() > MAX_CONTRACTOR_NAME {
        insert(&mut e, "name", "Name too long");
    }
    if let Some(email) = c.email.as_deref().filter(|s| !s.is_empty()) {
        if !is_valid_email(email) {
            insert(&mut e, "email", "Invalid email");
        }
    }
    e
}

pub fn validate_assignment(form: &BinAssignmentForm) -> FieldErrors {
    let mut e = FieldErrors::new();
    if form.contractor.trim().is_empty() {
        insert(&mut e, "contractor_id", "Contractor required");
    }
    if form.skip_qr.trim().is_empty() {
        insert(&mut e, "skip_qr", "QR code required");
    }
    e
}

/// Required fields, then membership in the advertised colors and sizes
pub fn validate_skip(form: &SkipCreateIn, meta: &MetaConfig) -> FieldErrors {
    let mut e = FieldErrors::new();
    if form.qr.trim().is_empty() {
        insert(&mut e, "qr", "QR code is required");
    }
    if form.color.trim().is_empty() {
        insert(&mut e, "color", "Color is required");
    } else if !meta.has_color(&form.color) {
        insert(&mut e, "color", "Unknown color");
    }
    if form.size.trim().is_empty() {
        insert(&mut e, "size", "Size is required");
    } else if !meta.has_size(&form.size) {
        insert(&mut e, "size", "Unknown size");
    }
    e
}

pub fn validate_owned_skip(form: &OwnedSkipIn) -> FieldErrors {
    let mut e = FieldErrors::new();
    if form.owner_org_id.trim().is_empty() {
        insert(&mut e, "owner_org_id", "Owner org ID is required");
    }
    if let Some(qr) = &form.qr_code {
        if qr.chars().count() > MAX_QR_CODE {
            insert(&mut e, "qr_code", "QR code too long");
        }
    }
    e
}
