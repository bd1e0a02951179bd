use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Property, PropertyId};
use crate::validation::{non_blank, ValidationError, Violations};

/// Subject label for inquiries without a resolvable listing.
pub const GENERAL_INQUIRY: &str = "General Inquiry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InquiryId(pub Uuid);

impl InquiryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for InquiryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Contact request posted by the public lead-capture form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquirySubmission {
    pub property_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

/// Validated inquiry content ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInquiry {
    pub property_id: Option<PropertyId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl InquirySubmission {
    /// A blank `propertyId` marks a general inquiry; a malformed one is rejected.
    pub fn validate(self) -> Result<NewInquiry, ValidationError> {
        let mut violations = Violations::default();

        let property_id = match non_blank(self.property_id) {
            Some(raw) => {
                let parsed = PropertyId::parse(&raw);
                if parsed.is_none() {
                    violations.push("propertyId is not a valid listing identifier");
                }
                parsed
            }
            None => None,
        };

        let name = violations.required_text("name", self.name);
        let email = violations.required_text("email", self.email);
        let phone = violations.required_text("phone", self.phone);
        let message = violations.required_text("message", self.message);

        violations.finish()?;
        Ok(NewInquiry {
            property_id,
            name,
            email,
            phone,
            message,
        })
    }
}

/// A stored lead. The listing reference is weak: it is never cleaned up when the listing goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: InquiryId,
    pub property_id: Option<PropertyId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Listing reference resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySummary {
    pub id: PropertyId,
    pub title: String,
}

impl From<&Property> for PropertySummary {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id,
            title: property.fields.title.clone(),
        }
    }
}

/// Admin view of a lead with its listing resolved. `property` is `null` for general inquiries
/// and for listings that have since been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryView {
    pub id: InquiryId,
    pub property_id: Option<PropertyId>,
    pub property: Option<PropertySummary>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl InquiryView {
    pub fn new(inquiry: Inquiry, property: Option<PropertySummary>) -> Self {
        Self {
            id: inquiry.id,
            property_id: inquiry.property_id,
            property,
            name: inquiry.name,
            email: inquiry.email,
            phone: inquiry.phone,
            message: inquiry.message,
            created_at: inquiry.created_at,
        }
    }
}

/// Human-readable title used in the notification subject.
pub fn subject_title(property: Option<&Property>) -> String {
    match property {
        Some(property) => format!("Property: {}", property.fields.title),
        None => GENERAL_INQUIRY.to_string(),
    }
}
