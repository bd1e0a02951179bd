//! Per-page visit counters.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{PageKey, VisitCount, VisitCounter, DEFAULT_PAGE};
pub use repository::VisitRepository;
pub use router::visit_router;
pub use service::{VisitError, VisitService};
