//! Property Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A property listing.
///
/// `creator` references the owning [`User`](crate::user::entity::User);
/// the user keeps the matching back-reference in `owned_properties`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id")]
    pub id: String,

    pub title: String,

    pub description: String,

    /// Listing category, e.g. "apartment", "villa", "farmhouse".
    pub property_type: String,

    pub location: String,

    /// Asking price; always positive.
    pub price: f64,

    /// Thumbnail photo delivery URL (required).
    pub photo_url: String,

    /// Optional walkthrough video delivery URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Owning user's id.
    pub creator: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Property {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        property_type: impl Into<String>,
        location: impl Into<String>,
        price: f64,
        photo_url: impl Into<String>,
        video_url: Option<String>,
        creator: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            property_type: property_type.into(),
            location: location.into(),
            price,
            photo_url: photo_url.into(),
            video_url,
            creator: creator.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Ownership check backing every mutating operation.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.creator == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Property {
        Property::new(
            "Seaside villa",
            "Four bedrooms by the shore",
            "villa",
            "Lisbon",
            420_000.0,
            "https://res.example.com/demo/image/upload/v1/listings/p1.jpg",
            None,
            "user-1",
        )
    }

    #[test]
    fn test_new_property() {
        let property = sample();

        assert!(!property.id.is_empty());
        assert_eq!(property.creator, "user-1");
        assert!(property.video_url.is_none());
        assert_eq!(property.created_at, property.updated_at);
    }

    #[test]
    fn test_ownership_check() {
        let property = sample();

        assert!(property.is_owned_by("user-1"));
        assert!(!property.is_owned_by("user-2"));
    }

    #[test]
    fn test_bson_roundtrip_uses_id_field() {
        let property = sample();
        let doc = bson::to_document(&property).unwrap();

        assert!(doc.contains_key("_id"));
        assert!(doc.contains_key("propertyType"));
        assert!(!doc.contains_key("videoUrl"));

        let back: Property = bson::from_document(doc).unwrap();
        assert_eq!(back.id, property.id);
        assert_eq!(back.price, property.price);
    }
}
