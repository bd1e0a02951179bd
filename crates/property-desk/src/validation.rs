//! Boundary validation shared by the catalog and lead modules.

/// Every constraint a write violated, in field order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", .violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl ValidationError {
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            violations: vec![message.into()],
        }
    }
}

/// Collects violations so a single response can list all of them.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<String>);

impl Violations {
    pub(crate) fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Returns the trimmed value, recording a violation when it is absent or blank.
    pub(crate) fn required_text(&mut self, field: &str, value: Option<String>) -> String {
        match value.map(|raw| raw.trim().to_string()) {
            Some(text) if !text.is_empty() => text,
            _ => {
                self.push(format!("{field} is required"));
                String::new()
            }
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.0 })
        }
    }
}

/// Treats absent, empty, and whitespace-only text alike.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|text| !text.is_empty())
}
