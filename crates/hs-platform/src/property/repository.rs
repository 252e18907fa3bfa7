//! Property Repository

use futures::TryStreamExt;
use mongodb::{bson::doc, bson::Document, ClientSession, Collection, Database};

use crate::property::entity::Property;
use crate::shared::api_common::SortDirection;
use crate::shared::error::Result;

/// Search filter for the listing query.
#[derive(Debug, Clone)]
pub struct PropertySearch {
    /// Case-insensitive substring matched against title OR description.
    pub query_text: String,
    /// Optional exact property-type filter.
    pub property_type: Option<String>,
    pub skip: u64,
    pub limit: i64,
    pub sort_by: SortField,
    pub sort_direction: SortDirection,
}

/// Whitelisted sortable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Price,
    Title,
    Location,
}

impl SortField {
    /// Parse the API-level `sortBy` value; unknown fields fall back to
    /// creation time rather than letting callers sort by arbitrary keys.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("price") => SortField::Price,
            Some("title") => SortField::Title,
            Some("location") => SortField::Location,
            _ => SortField::CreatedAt,
        }
    }

    fn bson_key(self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Price => "price",
            SortField::Title => "title",
            SortField::Location => "location",
        }
    }
}

pub struct PropertyRepository {
    collection: Collection<Property>,
}

impl PropertyRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("properties"),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Property>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// Fetch several properties, preserving the order of `ids` (used for
    /// view history, which is ordered).
    pub async fn find_by_ids_ordered(&self, ids: &[String]) -> Result<Vec<Property>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self.collection.find(doc! { "_id": { "$in": ids } }).await?;
        let mut found: Vec<Property> = cursor.try_collect().await?;

        found.sort_by_key(|p| ids.iter().position(|id| *id == p.id).unwrap_or(usize::MAX));
        Ok(found)
    }

    fn search_filter(search: &PropertySearch) -> Document {
        // Escape the user's text so it matches literally.
        let pattern = regex::escape(&search.query_text);

        let mut filter = doc! {
            "$or": [
                { "title": { "$regex": &pattern, "$options": "i" } },
                { "description": { "$regex": &pattern, "$options": "i" } },
            ]
        };

        if let Some(ref property_type) = search.property_type {
            filter.insert("propertyType", property_type);
        }

        filter
    }

    /// Run a paginated search, returning the page plus the total match
    /// count.
    pub async fn search(&self, search: &PropertySearch) -> Result<(Vec<Property>, u64)> {
        let filter = Self::search_filter(search);

        let total = self.collection.count_documents(filter.clone()).await?;

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { search.sort_by.bson_key(): search.sort_direction.order() })
            .skip(search.skip)
            .limit(search.limit)
            .await?;
        let items: Vec<Property> = cursor.try_collect().await?;

        Ok((items, total))
    }

    /// Insert inside the caller's transaction (paired with the owner-list
    /// push).
    pub async fn insert_with_session(
        &self,
        property: &Property,
        session: &mut ClientSession,
    ) -> Result<()> {
        self.collection
            .insert_one(property)
            .session(session)
            .await?;
        Ok(())
    }

    /// Delete inside the caller's transaction (paired with the owner-list
    /// pull).
    pub async fn delete_with_session(
        &self,
        id: &str,
        session: &mut ClientSession,
    ) -> Result<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .session(session)
            .await?;
        Ok(result.deleted_count > 0)
    }

    /// Replace the stored document with the merged update.
    pub async fn update(&self, property: &Property) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &property.id }, property)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_whitelist() {
        assert_eq!(SortField::parse(Some("price")), SortField::Price);
        assert_eq!(SortField::parse(Some("title")), SortField::Title);
        assert_eq!(SortField::parse(Some("location")), SortField::Location);
        // Arbitrary keys fall back instead of reaching the database.
        assert_eq!(SortField::parse(Some("passwordHash")), SortField::CreatedAt);
        assert_eq!(SortField::parse(None), SortField::CreatedAt);
    }

    #[test]
    fn test_search_filter_escapes_regex_metacharacters() {
        let search = PropertySearch {
            query_text: "a+b (villa)".to_string(),
            property_type: None,
            skip: 0,
            limit: 10,
            sort_by: SortField::CreatedAt,
            sort_direction: SortDirection::Desc,
        };

        let filter = PropertyRepository::search_filter(&search);
        let or = filter.get_array("$or").unwrap();
        let title_clause = or[0].as_document().unwrap().get_document("title").unwrap();
        assert_eq!(title_clause.get_str("$regex").unwrap(), r"a\+b \(villa\)");
    }

    #[test]
    fn test_search_filter_includes_type_when_set() {
        let search = PropertySearch {
            query_text: "villa".to_string(),
            property_type: Some("farmhouse".to_string()),
            skip: 0,
            limit: 10,
            sort_by: SortField::Price,
            sort_direction: SortDirection::Asc,
        };

        let filter = PropertyRepository::search_filter(&search);
        assert_eq!(filter.get_str("propertyType").unwrap(), "farmhouse");
    }

    // Query execution and the transactional insert/delete paths require a
    // MongoDB replica set; covered by integration environments.
}
