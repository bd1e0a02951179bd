//! Listing catalog: public paginated search and lookup, admin create/update/delete.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Furnishing, Property, PropertyFields, PropertyFilter, PropertyId, PropertyInput, PropertyPage,
    PropertyStatus, PropertyType, PAGE_SIZE,
};
pub use repository::PropertyRepository;
pub use router::catalog_router;
pub use service::{CatalogError, CatalogService};
