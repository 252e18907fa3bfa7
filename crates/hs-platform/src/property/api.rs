//! Properties API
//!
//! REST endpoints for listing search, detail view (with explicit view
//! tracking), and ownership-checked create/update/delete.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

use crate::property::entity::Property;
use crate::property::operations::{
    CreatePropertyCommand, CreatePropertyUseCase, DeletePropertyUseCase, UpdatePropertyCommand,
    UpdatePropertyUseCase,
};
use crate::property::repository::{PropertyRepository, PropertySearch, SortField};
use crate::shared::api_common::{collect_multipart, PaginationParams, SortDirection};
use crate::shared::error::{HomesteadError, Result};
use crate::shared::middleware::Authenticated;
use crate::shared::response::ApiResponse;
use crate::user::entity::CreatorPublic;
use crate::user::repository::UserRepository;

/// Property document as exposed through the API, with the creator
/// expanded to public fields only.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub location: String,
    pub price: f64,
    pub photo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub creator: Option<CreatorPublic>,
    pub created_at: String,
    pub updated_at: String,
}

impl PropertyResponse {
    fn new(property: Property, creator: Option<CreatorPublic>) -> Self {
        Self {
            id: property.id,
            title: property.title,
            description: property.description,
            property_type: property.property_type,
            location: property.location,
            price: property.price,
            photo_url: property.photo_url,
            video_url: property.video_url,
            creator,
            created_at: property.created_at.to_rfc3339(),
            updated_at: property.updated_at.to_rfc3339(),
        }
    }
}

/// Expand each property's creator reference into the public projection.
pub async fn expand_creators(
    properties: Vec<Property>,
    user_repo: &UserRepository,
) -> Result<Vec<PropertyResponse>> {
    let mut creator_ids: Vec<String> = properties.iter().map(|p| p.creator.clone()).collect();
    creator_ids.sort();
    creator_ids.dedup();

    let creators = user_repo.find_public_by_ids(&creator_ids).await?;

    Ok(properties
        .into_iter()
        .map(|p| {
            let creator = creators.get(&p.creator).cloned();
            PropertyResponse::new(p, creator)
        })
        .collect())
}

/// Search query parameters.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchPropertiesQuery {
    /// Required search text, matched against title and description.
    pub query: Option<String>,
    /// Optional exact property-type filter.
    pub property_type: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub sort_by: Option<String>,
    pub sort_type: Option<SortDirection>,
}

/// Search response payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponseData {
    pub items: Vec<PropertyResponse>,
    pub total_count: u64,
}

/// Properties service state.
#[derive(Clone)]
pub struct PropertiesState {
    pub property_repo: Arc<PropertyRepository>,
    pub user_repo: Arc<UserRepository>,
    pub create_use_case: Arc<CreatePropertyUseCase>,
    pub update_use_case: Arc<UpdatePropertyUseCase>,
    pub delete_use_case: Arc<DeletePropertyUseCase>,
}

fn parse_property_id(id: &str) -> Result<()> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| HomesteadError::validation("Malformed property id"))
}

/// Search properties
///
/// `query` is required; matches are case-insensitive substrings of the
/// title or description. Zero matches answer 404.
#[utoipa::path(
    get,
    path = "",
    tag = "properties",
    operation_id = "getProperties",
    params(
        ("query" = String, Query, description = "Search text (required)"),
        ("propertyType" = Option<String>, Query, description = "Exact property type filter"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size"),
        ("sortBy" = Option<String>, Query, description = "Sort field: price, title, location (default: creation time)"),
        ("sortType" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "Matching properties", body = ApiResponse<SearchResponseData>),
        (status = 400, description = "Missing search text"),
        (status = 404, description = "No matches")
    )
)]
pub async fn search_properties(
    State(state): State<PropertiesState>,
    Query(query): Query<SearchPropertiesQuery>,
) -> Result<Json<ApiResponse<SearchResponseData>>> {
    let text = query
        .query
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if text.is_empty() {
        return Err(HomesteadError::validation("Search text is required"));
    }

    let search = PropertySearch {
        query_text: text.to_string(),
        property_type: query
            .property_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from),
        skip: query.pagination.skip(),
        limit: query.pagination.limit(),
        sort_by: SortField::parse(query.sort_by.as_deref()),
        sort_direction: query.sort_type.unwrap_or_default(),
    };

    let (properties, total) = state.property_repo.search(&search).await?;

    if total == 0 {
        return Err(HomesteadError::not_found("Property", text));
    }

    let items = expand_creators(properties, &state.user_repo).await?;
    let data = SearchResponseData {
        items,
        total_count: total,
    };

    Ok(Json(ApiResponse::ok(data, "Properties found")))
}

/// Get a property by id
///
/// Also records the property in the requesting user's view history
/// (idempotent set insertion).
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "properties",
    operation_id = "getPropertyById",
    params(
        ("id" = String, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Property found", body = ApiResponse<PropertyResponse>),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Property not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_property(
    State(state): State<PropertiesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PropertyResponse>>> {
    parse_property_id(&id)?;

    let property = state
        .property_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| HomesteadError::not_found("Property", &id))?;

    // Explicit view-tracking command; duplicate views are no-ops.
    state.user_repo.record_view(&auth.user_id, &property.id).await?;

    let mut items = expand_creators(vec![property], &state.user_repo).await?;
    let item = items.remove(0);

    Ok(Json(ApiResponse::ok(
        item,
        "Property retrieved successfully",
    )))
}

/// Create a property
///
/// Multipart form: `title`, `description`, `propertyType`, `location`,
/// `price` text fields, a required `photo` file, and an optional `video`
/// file.
#[utoipa::path(
    post,
    path = "",
    tag = "properties",
    operation_id = "postProperties",
    responses(
        (status = 201, description = "Property created", body = ApiResponse<PropertyResponse>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_property(
    State(state): State<PropertiesState>,
    auth: Authenticated,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut form = collect_multipart(multipart).await?;

    let price = form
        .text("price")
        .unwrap_or_default()
        .trim()
        .parse::<f64>()
        .map_err(|_| HomesteadError::validation("Price must be a positive number"))?;

    let command = CreatePropertyCommand {
        title: form.text("title").unwrap_or_default().to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        property_type: form.text("propertyType").unwrap_or_default().to_string(),
        location: form.text("location").unwrap_or_default().to_string(),
        price,
    };

    let photo = form
        .take_file("photo")
        .ok_or_else(|| HomesteadError::validation("Photo file is required"))?;
    let video = form.take_file("video");

    let property = state
        .create_use_case
        .execute(
            command,
            &auth.user_id,
            photo.path(),
            video.as_ref().map(|f| f.path()),
        )
        .await?;

    let mut items = expand_creators(vec![property], &state.user_repo).await?;
    let body = ApiResponse::created(items.remove(0), "Property created successfully");
    Ok((StatusCode::CREATED, Json(body)))
}

/// Update a property
///
/// Partial multipart patch; only supplied fields change. A new `photo`
/// replaces the stored asset.
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "properties",
    operation_id = "patchPropertyById",
    params(
        ("id" = String, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Property updated", body = ApiResponse<PropertyResponse>),
        (status = 400, description = "No fields supplied"),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Property not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_property(
    State(state): State<PropertiesState>,
    auth: Authenticated,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PropertyResponse>>> {
    parse_property_id(&id)?;

    let mut form = collect_multipart(multipart).await?;

    let price = match form.text("price") {
        Some(raw) => Some(
            raw.trim()
                .parse::<f64>()
                .map_err(|_| HomesteadError::validation("Price must be a positive number"))?,
        ),
        None => None,
    };

    let command = UpdatePropertyCommand {
        title: form.text("title").map(String::from),
        description: form.text("description").map(String::from),
        property_type: form.text("propertyType").map(String::from),
        location: form.text("location").map(String::from),
        price,
    };

    let photo = form.take_file("photo");

    let property = state
        .update_use_case
        .execute(
            &id,
            command,
            photo.as_ref().map(|f| f.path()),
            &auth.user_id,
        )
        .await?;

    let mut items = expand_creators(vec![property], &state.user_repo).await?;
    Ok(Json(ApiResponse::ok(
        items.remove(0),
        "Property updated successfully",
    )))
}

/// Delete a property
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "properties",
    operation_id = "deletePropertyById",
    params(
        ("id" = String, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Property deleted", body = ApiResponse<PropertyResponse>),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Property not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_property(
    State(state): State<PropertiesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PropertyResponse>>> {
    parse_property_id(&id)?;

    let property = state.delete_use_case.execute(&id, &auth.user_id).await?;

    let mut items = expand_creators(vec![property], &state.user_repo).await?;
    Ok(Json(ApiResponse::ok(
        items.remove(0),
        "Property deleted successfully",
    )))
}

pub fn properties_router(state: PropertiesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(search_properties, create_property))
        .routes(routes!(get_property, update_property, delete_property))
        .with_state(state)
}
