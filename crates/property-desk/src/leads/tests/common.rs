use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog::{CatalogService, Property, PropertyInput};
use crate::leads::{
    Inquiry, InquiryId, InquirySubmission, LeadNotifier, LeadService, NotificationDispatcher,
    NotificationError,
};
use crate::storage::MemoryStore;

pub(super) const ADMIN_TOKEN: &str = "lead-admin";

/// Notifier that remembers every subject it was asked to send.
#[derive(Default)]
pub(super) struct RecordingNotifier {
    pub(super) sent: Mutex<Vec<(InquiryId, String)>>,
}

impl RecordingNotifier {
    pub(super) fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, subject)| subject.clone())
            .collect()
    }
}

#[async_trait]
impl LeadNotifier for RecordingNotifier {
    async fn send_lead_notification(
        &self,
        inquiry: &Inquiry,
        subject_title: &str,
    ) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .unwrap()
            .push((inquiry.id, subject_title.to_string()));
        Ok(())
    }
}

pub(super) struct FailingNotifier;

#[async_trait]
impl LeadNotifier for FailingNotifier {
    async fn send_lead_notification(
        &self,
        _inquiry: &Inquiry,
        _subject_title: &str,
    ) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("relay refused connection".to_string()))
    }
}

pub(super) struct PanickingNotifier;

#[async_trait]
impl LeadNotifier for PanickingNotifier {
    async fn send_lead_notification(
        &self,
        _inquiry: &Inquiry,
        _subject_title: &str,
    ) -> Result<(), NotificationError> {
        panic!("template engine exploded");
    }
}

/// Never finishes on its own.
pub(super) struct StallingNotifier;

#[async_trait]
impl LeadNotifier for StallingNotifier {
    async fn send_lead_notification(
        &self,
        _inquiry: &Inquiry,
        _subject_title: &str,
    ) -> Result<(), NotificationError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

pub(super) type Leads = LeadService<MemoryStore, MemoryStore>;

pub(super) fn build_service(
    notifier: Arc<dyn LeadNotifier>,
) -> (Arc<Leads>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = NotificationDispatcher::new(notifier, Duration::from_millis(200));
    let service = Arc::new(LeadService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        dispatcher,
    ));
    (service, store)
}

pub(super) async fn add_listing(store: &Arc<MemoryStore>, title: &str) -> Property {
    CatalogService::new(Arc::clone(store))
        .create(PropertyInput {
            title: Some(title.to_string()),
            price: Some(3_200_000.0),
            location: Some("Wakad".to_string()),
            property_type: Some("Plot".to_string()),
            area: Some("2000 sq ft".to_string()),
            description: Some("Corner plot".to_string()),
            ..PropertyInput::default()
        })
        .await
        .expect("listing created")
}

pub(super) fn submission(property_id: Option<String>, name: &str) -> InquirySubmission {
    InquirySubmission {
        property_id,
        name: Some(name.to_string()),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: Some("+91 98000 00000".to_string()),
        message: Some("Please call me back".to_string()),
    }
}

pub(super) async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
