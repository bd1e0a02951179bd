//! Lead capture and staff notification.

pub mod dispatch;
pub mod domain;
pub mod notifier;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use dispatch::NotificationDispatcher;
pub use domain::{
    Inquiry, InquiryId, InquirySubmission, InquiryView, NewInquiry, PropertySummary,
    GENERAL_INQUIRY,
};
pub use notifier::{
    LeadEmail, LeadNotifier, NotificationError, TracingNotifier, WebhookNotifier,
};
pub use repository::InquiryRepository;
pub use router::lead_router;
pub use service::{LeadError, LeadService};
