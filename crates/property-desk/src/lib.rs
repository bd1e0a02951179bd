//! Listing catalog, lead capture, and visit counting for a property marketing site.
//!
//! Each domain module owns its records, a repository trait describing the storage it needs, a
//! service holding the business rules, and an axum router. The [`storage`] module provides the
//! in-memory and SQLite backends that implement every repository trait.

pub mod access;
pub mod catalog;
pub mod config;
pub mod error;
pub mod leads;
pub mod media;
pub mod storage;
pub mod telemetry;
pub mod validation;
pub mod visits;
