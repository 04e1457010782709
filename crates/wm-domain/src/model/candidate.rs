//! Resolution candidates built from cached entity lists

use wm_types::{Contractor, Driver, Labelled, Vehicle};

/// An entity id plus every name it may be referred to by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub names: Vec<String>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            id: id.into(),
            names,
        }
    }
}

fn present(values: &[&Option<String>]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<&Driver> for Candidate {
    fn from(d: &Driver) -> Self {
        let mut names = present(&[&d.full_name, &d.name]);
        if names.is_empty() {
            names.push(d.label());
        }
        Candidate::new(d.id(), names)
    }
}

impl From<&Vehicle> for Candidate {
    fn from(v: &Vehicle) -> Self {
        let mut names = present(&[&v.reg_no, &v.plate]);
        if names.is_empty() {
            names.push(v.label());
        }
        Candidate::new(v.id(), names)
    }
}

impl From<&Contractor> for Candidate {
    fn from(c: &Contractor) -> Self {
        let mut names = present(&[&c.org_name, &c.contact_name]);
        if names.is_empty() {
            names.push(c.label());
        }
        Candidate::new(c.id(), names)
    }
}
