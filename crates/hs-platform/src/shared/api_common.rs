//! Common API types and utilities

use serde::{Deserialize, Deserializer, de};
use utoipa::{IntoParams, ToSchema};

fn string_or_u32_opt<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNum {
        Num(u32),
        Str(String),
    }

    match Option::<StringOrNum>::deserialize(deserializer)? {
        Some(StringOrNum::Num(n)) => Ok(Some(n)),
        Some(StringOrNum::Str(s)) => s.parse().map(Some).map_err(de::Error::custom),
        None => Ok(None),
    }
}

/// Offset pagination, 1-based page numbering.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "string_or_u32_opt")]
    page: Option<u32>,
    #[serde(default, deserialize_with = "string_or_u32_opt")]
    limit: Option<u32>,
}

impl PaginationParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100) as i64
    }

    pub fn skip(&self) -> u64 {
        (self.page() as u64 - 1) * (self.limit() as u64)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            limit: Some(10),
        }
    }
}

/// A multipart form collected into text fields and temp-file uploads.
///
/// Each uploaded part is buffered into a [`tempfile::NamedTempFile`];
/// the file is deleted when the form (or the taken handle) is dropped,
/// on success and failure paths alike.
pub struct MultipartForm {
    texts: std::collections::HashMap<String, String>,
    files: std::collections::HashMap<String, tempfile::NamedTempFile>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(|s| s.as_str())
    }

    pub fn take_file(&mut self, name: &str) -> Option<tempfile::NamedTempFile> {
        self.files.remove(name)
    }
}

/// Drain an axum multipart stream into a [`MultipartForm`].
pub async fn collect_multipart(
    mut multipart: axum::extract::Multipart,
) -> crate::shared::error::Result<MultipartForm> {
    use crate::shared::error::HomesteadError;
    use std::io::Write;

    let mut texts = std::collections::HashMap::new();
    let mut files = std::collections::HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HomesteadError::validation(format!("Malformed multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };

        if field.file_name().is_some() {
            let data = field.bytes().await.map_err(|e| {
                HomesteadError::validation(format!("Failed to read upload '{}': {}", name, e))
            })?;
            let mut temp = tempfile::NamedTempFile::new().map_err(|e| {
                HomesteadError::internal(format!("Could not create temp file: {}", e))
            })?;
            temp.write_all(&data).map_err(|e| {
                HomesteadError::internal(format!("Could not buffer upload: {}", e))
            })?;
            files.insert(name, temp);
        } else {
            let value = field.text().await.map_err(|e| {
                HomesteadError::validation(format!("Failed to read field '{}': {}", name, e))
            })?;
            texts.insert(name, value);
        }
    }

    Ok(MultipartForm { texts, files })
}

/// Sort direction for listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// MongoDB sort value.
    pub fn order(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.skip(), 0);
    }

    #[test]
    fn test_pagination_skip_is_offset_based() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page": 2, "limit": 10}"#).unwrap();
        assert_eq!(params.skip(), 10);

        let params: PaginationParams =
            serde_json::from_str(r#"{"page": 3, "limit": 25}"#).unwrap();
        assert_eq!(params.skip(), 50);
    }

    #[test]
    fn test_pagination_accepts_string_values() {
        // Query strings arrive as strings; both forms must parse.
        let params: PaginationParams =
            serde_json::from_str(r#"{"page": "4", "limit": "5"}"#).unwrap();
        assert_eq!(params.page(), 4);
        assert_eq!(params.limit(), 5);
    }

    #[test]
    fn test_pagination_clamps_zero_page() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page": 0, "limit": 0}"#).unwrap();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_sort_direction_order() {
        assert_eq!(SortDirection::Asc.order(), 1);
        assert_eq!(SortDirection::Desc.order(), -1);
        assert_eq!(SortDirection::default().order(), -1);
    }
}
