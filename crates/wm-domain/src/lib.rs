//! Domain logic for the waste-management console
//!
//! Everything here is transport-agnostic: the seams to storage and HTTP are
//! the traits in [`repository`].

pub mod model;
pub mod repository;
pub mod service;
