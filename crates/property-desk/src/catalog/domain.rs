use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::validation::{non_blank, ValidationError, Violations};

/// Listings shown per catalog page.
pub const PAGE_SIZE: u32 = 10;

/// Server-generated listing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub Uuid);

impl PropertyId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// `None` for anything that is not a well-formed identifier.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Flat,
    Plot,
    Villa,
    Commercial,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Flat,
        PropertyType::Plot,
        PropertyType::Villa,
        PropertyType::Commercial,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            PropertyType::Flat => "Flat",
            PropertyType::Plot => "Plot",
            PropertyType::Villa => "Villa",
            PropertyType::Commercial => "Commercial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropertyStatus {
    #[default]
    Available,
    Sold,
    #[serde(rename = "Under Offer")]
    UnderOffer,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 3] = [
        PropertyStatus::Available,
        PropertyStatus::Sold,
        PropertyStatus::UnderOffer,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            PropertyStatus::Available => "Available",
            PropertyStatus::Sold => "Sold",
            PropertyStatus::UnderOffer => "Under Offer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Furnishing {
    #[default]
    Unfurnished,
    #[serde(rename = "Semi-Furnished")]
    SemiFurnished,
    #[serde(rename = "Fully-Furnished")]
    FullyFurnished,
}

impl Furnishing {
    pub const ALL: [Furnishing; 3] = [
        Furnishing::Unfurnished,
        Furnishing::SemiFurnished,
        Furnishing::FullyFurnished,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Furnishing::Unfurnished => "Unfurnished",
            Furnishing::SemiFurnished => "Semi-Furnished",
            Furnishing::FullyFurnished => "Fully-Furnished",
        }
    }
}

/// Rejected enumeration value, carrying the accepted labels for the error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub accepted: Vec<&'static str>,
}

macro_rules! parse_by_label {
    ($($kind:ty),+) => {
        $(
            impl FromStr for $kind {
                type Err = UnknownVariant;

                fn from_str(raw: &str) -> Result<Self, Self::Err> {
                    Self::ALL
                        .into_iter()
                        .find(|variant| variant.label() == raw.trim())
                        .ok_or_else(|| UnknownVariant {
                            accepted: Self::ALL.iter().map(|variant| variant.label()).collect(),
                        })
                }
            }

            impl fmt::Display for $kind {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )+
    };
}

parse_by_label!(PropertyType, PropertyStatus, Furnishing);

/// Validated listing content; everything about a listing except identity and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFields {
    pub title: String,
    pub price: f64,
    pub location: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub area: String,
    pub description: String,
    pub images: Vec<String>,
    pub status: PropertyStatus,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub balconies: u32,
    pub parking: String,
    pub furnishing: Furnishing,
    pub floor_number: String,
    pub carpet_area: String,
    pub super_area: String,
    pub property_age: String,
    pub facing: String,
    pub project: String,
    pub amenities: Vec<String>,
    pub video_url: String,
}

/// A stored listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    #[serde(flatten)]
    pub fields: PropertyFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing payload accepted by create and update.
///
/// Every field is optional at the wire level so that a create can report all missing fields at
/// once and an update can tell "not sent" apart from "sent as zero".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInput {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub price: Option<f64>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub area: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub bedrooms: Option<u32>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub bathrooms: Option<u32>,
    #[serde(default, deserialize_with = "number_or_text")]
    pub balconies: Option<u32>,
    pub parking: Option<String>,
    pub furnishing: Option<String>,
    pub floor_number: Option<String>,
    pub carpet_area: Option<String>,
    pub super_area: Option<String>,
    pub property_age: Option<String>,
    pub facing: Option<String>,
    pub project: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub video_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

/// Form posts send numbers as strings; a blank string counts as not sent.
fn number_or_text<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match Option::<NumberOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(value)) => Ok(Some(value)),
        Some(NumberOrText::Text(raw)) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse()
                .map(Some)
                .map_err(|err| de::Error::custom(format!("`{raw}` is not a number: {err}")))
        }
    }
}

const DEFAULT_PARKING: &str = "None";
const DEFAULT_PROPERTY_AGE: &str = "New Launch";

impl PropertyInput {
    /// Validates a create request, applying defaults for optional fields.
    pub fn into_fields(self) -> Result<PropertyFields, ValidationError> {
        let mut violations = Violations::default();

        let title = violations.required_text("title", self.title);
        let location = violations.required_text("location", self.location);
        let area = violations.required_text("area", self.area);
        let description = violations.required_text("description", self.description);

        let price = match self.price {
            Some(price) => check_price(&mut violations, price),
            None => {
                violations.push("price is required");
                0.0
            }
        };

        let property_type = match non_blank(self.property_type) {
            Some(raw) => parse_enum(&mut violations, "type", &raw),
            None => {
                violations.push("type is required");
                None
            }
        };
        let status = non_blank(self.status)
            .and_then(|raw| parse_enum(&mut violations, "status", &raw))
            .unwrap_or_default();
        let furnishing = non_blank(self.furnishing)
            .and_then(|raw| parse_enum(&mut violations, "furnishing", &raw))
            .unwrap_or_default();

        violations.finish()?;
        let Some(property_type) = property_type else {
            return Err(ValidationError::single("type is required"));
        };

        Ok(PropertyFields {
            title,
            price,
            location,
            property_type,
            area,
            description,
            images: clean_list(self.images.unwrap_or_default()),
            status,
            bedrooms: self.bedrooms.unwrap_or(0),
            bathrooms: self.bathrooms.unwrap_or(0),
            balconies: self.balconies.unwrap_or(0),
            parking: non_blank(self.parking).unwrap_or_else(|| DEFAULT_PARKING.to_string()),
            furnishing,
            floor_number: non_blank(self.floor_number).unwrap_or_default(),
            carpet_area: non_blank(self.carpet_area).unwrap_or_default(),
            super_area: non_blank(self.super_area).unwrap_or_default(),
            property_age: non_blank(self.property_age)
                .unwrap_or_else(|| DEFAULT_PROPERTY_AGE.to_string()),
            facing: non_blank(self.facing).unwrap_or_default(),
            project: non_blank(self.project).unwrap_or_default(),
            amenities: clean_list(self.amenities.unwrap_or_default()),
            video_url: non_blank(self.video_url).unwrap_or_default(),
        })
    }

    /// Merges an update into existing content.
    ///
    /// Numeric fields overwrite whenever they are present, zero included. Text and enumeration
    /// fields overwrite only with a non-blank value. Lists overwrite whenever present, so an
    /// empty list clears them.
    pub fn merge_into(self, current: &PropertyFields) -> Result<PropertyFields, ValidationError> {
        let mut violations = Violations::default();
        let mut merged = current.clone();

        overwrite_text(&mut merged.title, self.title);
        overwrite_text(&mut merged.location, self.location);
        overwrite_text(&mut merged.area, self.area);
        overwrite_text(&mut merged.description, self.description);
        overwrite_text(&mut merged.parking, self.parking);
        overwrite_text(&mut merged.floor_number, self.floor_number);
        overwrite_text(&mut merged.carpet_area, self.carpet_area);
        overwrite_text(&mut merged.super_area, self.super_area);
        overwrite_text(&mut merged.property_age, self.property_age);
        overwrite_text(&mut merged.facing, self.facing);
        overwrite_text(&mut merged.project, self.project);
        overwrite_text(&mut merged.video_url, self.video_url);

        if let Some(price) = self.price {
            merged.price = check_price(&mut violations, price);
        }
        if let Some(bedrooms) = self.bedrooms {
            merged.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = self.bathrooms {
            merged.bathrooms = bathrooms;
        }
        if let Some(balconies) = self.balconies {
            merged.balconies = balconies;
        }

        if let Some(raw) = non_blank(self.property_type) {
            if let Some(value) = parse_enum(&mut violations, "type", &raw) {
                merged.property_type = value;
            }
        }
        if let Some(raw) = non_blank(self.status) {
            if let Some(value) = parse_enum(&mut violations, "status", &raw) {
                merged.status = value;
            }
        }
        if let Some(raw) = non_blank(self.furnishing) {
            if let Some(value) = parse_enum(&mut violations, "furnishing", &raw) {
                merged.furnishing = value;
            }
        }

        if let Some(images) = self.images {
            merged.images = clean_list(images);
        }
        if let Some(amenities) = self.amenities {
            merged.amenities = clean_list(amenities);
        }

        violations.finish()?;
        Ok(merged)
    }
}

fn check_price(violations: &mut Violations, price: f64) -> f64 {
    if price.is_finite() && price >= 0.0 {
        price
    } else {
        violations.push("price must be a non-negative number");
        0.0
    }
}

fn parse_enum<T>(violations: &mut Violations, field: &str, raw: &str) -> Option<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(UnknownVariant { accepted }) => {
            violations.push(format!("{field} must be one of: {}", accepted.join(", ")));
            None
        }
    }
}

fn overwrite_text(slot: &mut String, incoming: Option<String>) {
    if let Some(text) = non_blank(incoming) {
        *slot = text;
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Catalog query. A blank keyword means no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    keyword: Option<String>,
}

impl PropertyFilter {
    pub fn new(keyword: Option<&str>) -> Self {
        let keyword = keyword
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
            .map(str::to_string);
        Self { keyword }
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// Case-insensitive substring match on the title.
    pub fn matches(&self, property: &Property) -> bool {
        match &self.keyword {
            Some(keyword) => property
                .fields
                .title
                .to_lowercase()
                .contains(&keyword.to_lowercase()),
            None => true,
        }
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyPage {
    pub properties: Vec<Property>,
    pub page: u32,
    pub pages: u32,
}

pub(crate) fn total_pages(matching: u64) -> u32 {
    let pages = matching.div_ceil(u64::from(PAGE_SIZE));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn villa_input() -> PropertyInput {
        PropertyInput {
            title: Some("Sunrise Villa".to_string()),
            price: Some(5_000_000.0),
            location: Some("Dehradun".to_string()),
            property_type: Some("Villa".to_string()),
            area: Some("1200 sqft".to_string()),
            description: Some("test".to_string()),
            ..PropertyInput::default()
        }
    }

    #[test]
    fn create_applies_defaults() {
        let fields = villa_input().into_fields().expect("valid listing");
        assert_eq!(fields.status, PropertyStatus::Available);
        assert_eq!(fields.furnishing, Furnishing::Unfurnished);
        assert_eq!(fields.parking, "None");
        assert_eq!(fields.property_age, "New Launch");
        assert_eq!(fields.bedrooms, 0);
        assert!(fields.images.is_empty());
        assert!(fields.video_url.is_empty());
    }

    #[test]
    fn numeric_fields_accept_strings() {
        let input: PropertyInput = serde_json::from_value(serde_json::json!({
            "price": "5000000",
            "bedrooms": " 3 ",
            "bathrooms": "",
            "balconies": 2,
        }))
        .expect("lenient numbers");
        assert_eq!(input.price, Some(5_000_000.0));
        assert_eq!(input.bedrooms, Some(3));
        assert_eq!(input.bathrooms, None);
        assert_eq!(input.balconies, Some(2));

        let missing: PropertyInput = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(missing.price, None);
        assert!(serde_json::from_value::<PropertyInput>(serde_json::json!({ "bedrooms": "three" }))
            .is_err());
        assert!(serde_json::from_value::<PropertyInput>(serde_json::json!({ "bedrooms": -1 }))
            .is_err());
    }

    #[test]
    fn create_lists_every_violation() {
        let input = PropertyInput {
            title: Some("   ".to_string()),
            price: Some(-1.0),
            property_type: Some("Castle".to_string()),
            status: Some("Gone".to_string()),
            ..PropertyInput::default()
        };

        let err = input.into_fields().expect_err("invalid listing");
        let joined = err.violations.join("|");
        assert!(joined.contains("title is required"));
        assert!(joined.contains("location is required"));
        assert!(joined.contains("price must be a non-negative number"));
        assert!(joined.contains("type must be one of: Flat, Plot, Villa, Commercial"));
        assert!(joined.contains("status must be one of: Available, Sold, Under Offer"));
    }

    #[test]
    fn create_rejects_missing_type_and_price() {
        let mut input = villa_input();
        input.property_type = None;
        input.price = None;
        let err = input.into_fields().expect_err("type and price required");
        assert_eq!(err.violations, vec!["price is required", "type is required"]);
    }

    #[test]
    fn merge_keeps_absent_fields_and_accepts_zero() {
        let current = villa_input().into_fields().expect("valid listing");
        let patch = PropertyInput {
            bedrooms: Some(0),
            price: None,
            title: Some(String::new()),
            ..PropertyInput::default()
        };
        let merged = patch.merge_into(&current).expect("merge succeeds");
        assert_eq!(merged.price, 5_000_000.0);
        assert_eq!(merged.bedrooms, 0);
        assert_eq!(merged.title, "Sunrise Villa");
    }

    #[test]
    fn merge_overwrites_price_with_zero() {
        let current = villa_input().into_fields().expect("valid listing");
        let patch = PropertyInput {
            price: Some(0.0),
            ..PropertyInput::default()
        };
        let merged = patch.merge_into(&current).expect("merge succeeds");
        assert_eq!(merged.price, 0.0);
    }

    #[test]
    fn merge_parses_enumerations() {
        let current = villa_input().into_fields().expect("valid listing");
        let patch = PropertyInput {
            status: Some("Under Offer".to_string()),
            furnishing: Some("Semi-Furnished".to_string()),
            ..PropertyInput::default()
        };
        let merged = patch.merge_into(&current).expect("merge succeeds");
        assert_eq!(merged.status, PropertyStatus::UnderOffer);
        assert_eq!(merged.furnishing, Furnishing::SemiFurnished);

        let invalid = PropertyInput {
            furnishing: Some("Bare".to_string()),
            ..PropertyInput::default()
        };
        assert!(invalid.merge_into(&current).is_err());
    }

    #[test]
    fn merge_replaces_lists_even_when_empty() {
        let mut current = villa_input().into_fields().expect("valid listing");
        current.amenities = vec!["Gym".to_string()];
        let patch = PropertyInput {
            amenities: Some(Vec::new()),
            images: Some(vec![" https://img/1.jpg ".to_string(), "  ".to_string()]),
            ..PropertyInput::default()
        };
        let merged = patch.merge_into(&current).expect("merge succeeds");
        assert!(merged.amenities.is_empty());
        assert_eq!(merged.images, vec!["https://img/1.jpg"]);
    }

    #[test]
    fn serializes_with_wire_names() {
        let fields = villa_input().into_fields().expect("valid listing");
        let property = Property {
            id: PropertyId::generate(),
            fields,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&property).expect("serializes");
        assert_eq!(value["type"], "Villa");
        assert_eq!(value["status"], "Available");
        assert_eq!(value["propertyAge"], "New Launch");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("id").is_some());
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let property = Property {
            id: PropertyId::generate(),
            fields: villa_input().into_fields().expect("valid listing"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(PropertyFilter::new(Some("villa")).matches(&property));
        assert!(PropertyFilter::new(Some("  ")).matches(&property));
        assert!(PropertyFilter::new(None).matches(&property));
        assert!(!PropertyFilter::new(Some("plot")).matches(&property));
        assert_eq!(PropertyFilter::new(Some("  ")).keyword(), None);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(11), 2);
    }

    #[test]
    fn malformed_ids_do_not_parse() {
        assert!(PropertyId::parse("not-an-id").is_none());
        let id = PropertyId::generate();
        assert_eq!(PropertyId::parse(&id.to_string()), Some(id));
    }
}
