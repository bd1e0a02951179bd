use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::dispatch::NotificationDispatcher;
use super::domain::{subject_title, Inquiry, InquirySubmission, InquiryView, PropertySummary};
use super::repository::InquiryRepository;
use crate::catalog::{PropertyId, PropertyRepository};
use crate::storage::RepositoryError;
use crate::validation::ValidationError;

/// Lead capture: persists inquiries and hands notification to the dispatcher.
pub struct LeadService<I, P> {
    inquiries: Arc<I>,
    properties: Arc<P>,
    dispatcher: NotificationDispatcher,
}

impl<I, P> LeadService<I, P>
where
    I: InquiryRepository + 'static,
    P: PropertyRepository + 'static,
{
    pub fn new(inquiries: Arc<I>, properties: Arc<P>, dispatcher: NotificationDispatcher) -> Self {
        Self {
            inquiries,
            properties,
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Saves the lead, then schedules the staff notification.
    ///
    /// Success is decided by the save alone. Listing lookup and notification problems after the
    /// save are logged and absorbed.
    pub async fn create(&self, submission: InquirySubmission) -> Result<Inquiry, LeadError> {
        let new_inquiry = submission.validate()?;
        let inquiry = self.inquiries.insert(new_inquiry).await?;
        info!(inquiry_id = %inquiry.id, property_id = ?inquiry.property_id, "inquiry saved");

        let title = self.resolve_subject(&inquiry).await;
        self.dispatcher.dispatch(inquiry.clone(), title);

        Ok(inquiry)
    }

    async fn resolve_subject(&self, inquiry: &Inquiry) -> String {
        let Some(property_id) = inquiry.property_id else {
            return subject_title(None);
        };

        match self.properties.fetch(&property_id).await {
            Ok(property) => subject_title(property.as_ref()),
            Err(error) => {
                warn!(inquiry_id = %inquiry.id, %error, "listing lookup failed for notification");
                subject_title(None)
            }
        }
    }

    /// Every lead, newest first, with its listing title resolved.
    pub async fn list(&self) -> Result<Vec<InquiryView>, LeadError> {
        let mut inquiries = self.inquiries.all().await?;
        inquiries.reverse();
        inquiries.sort_by(|left, right| right.created_at.cmp(&left.created_at));

        let mut resolved: HashMap<PropertyId, Option<PropertySummary>> = HashMap::new();
        let mut views = Vec::with_capacity(inquiries.len());
        for inquiry in inquiries {
            let summary = match inquiry.property_id {
                Some(property_id) => match resolved.get(&property_id) {
                    Some(summary) => summary.clone(),
                    None => {
                        let summary = self
                            .properties
                            .fetch(&property_id)
                            .await?
                            .as_ref()
                            .map(PropertySummary::from);
                        resolved.insert(property_id, summary.clone());
                        summary
                    }
                },
                None => None,
            };
            views.push(InquiryView::new(inquiry, summary));
        }

        Ok(views)
    }
}

/// Error raised by the lead service.
#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
