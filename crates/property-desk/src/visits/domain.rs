use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page key used when a request does not name one.
pub const DEFAULT_PAGE: &str = "home";

/// Counter key. Blank keys fall back to [`DEFAULT_PAGE`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageKey(String);

impl PageKey {
    pub fn new(raw: Option<&str>) -> Self {
        let key = raw
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .unwrap_or(DEFAULT_PAGE);
        Self(key.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PageKey {
    fn default() -> Self {
        Self(DEFAULT_PAGE.to_string())
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored counter row; at most one exists per page key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitCounter {
    pub page: PageKey,
    pub count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitCount {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_use_home() {
        assert_eq!(PageKey::new(None).as_str(), "home");
        assert_eq!(PageKey::new(Some("  ")).as_str(), "home");
        assert_eq!(PageKey::new(Some(" listings ")).as_str(), "listings");
        assert_eq!(PageKey::default(), PageKey::new(None));
    }
}
