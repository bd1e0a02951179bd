//! Listing media uploads behind an object-store seam.

pub mod router;
pub mod store;

pub use router::media_router;
pub use store::{LocalObjectStore, MediaUpload, ObjectStore, UploadError, ALLOWED_EXTENSIONS};
