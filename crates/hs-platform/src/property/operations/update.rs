//! Update Property Use Case

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::media::gateway::{public_id_from_url, MediaGateway};
use crate::property::entity::Property;
use crate::property::repository::PropertyRepository;
use crate::shared::error::{HomesteadError, Result};

/// Partial-field patch: only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct UpdatePropertyCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub location: Option<String>,
    pub price: Option<f64>,
}

impl UpdatePropertyCommand {
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.property_type.is_some()
            || self.location.is_some()
            || self.price.is_some()
    }

    /// Supplied fields must still be valid values.
    pub fn validate(&self) -> Result<()> {
        for field in [&self.title, &self.description, &self.property_type, &self.location] {
            if let Some(value) = field {
                if value.trim().is_empty() {
                    return Err(HomesteadError::validation("Supplied fields must not be blank"));
                }
            }
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price <= 0.0 {
                return Err(HomesteadError::validation("Price must be a positive number"));
            }
        }
        Ok(())
    }
}

pub struct UpdatePropertyUseCase {
    property_repo: Arc<PropertyRepository>,
    media: Arc<MediaGateway>,
}

impl UpdatePropertyUseCase {
    pub fn new(property_repo: Arc<PropertyRepository>, media: Arc<MediaGateway>) -> Self {
        Self {
            property_repo,
            media,
        }
    }

    /// Patch a listing. Only the creator may update. When a replacement
    /// photo arrives, the old asset's id is derived before anything is
    /// uploaded (an unrecognized stored URL fails the update), and the old
    /// asset is destroyed only after the new upload succeeds.
    pub async fn execute(
        &self,
        property_id: &str,
        command: UpdatePropertyCommand,
        new_photo: Option<&Path>,
        requester_id: &str,
    ) -> Result<Property> {
        let mut property = self
            .property_repo
            .find_by_id(property_id)
            .await?
            .ok_or_else(|| HomesteadError::not_found("Property", property_id))?;

        if !property.is_owned_by(requester_id) {
            return Err(HomesteadError::forbidden(
                "Only the creator may update this property",
            ));
        }

        if !command.has_changes() && new_photo.is_none() {
            return Err(HomesteadError::validation("No fields supplied for update"));
        }
        command.validate()?;

        if let Some(photo_path) = new_photo {
            // Derive the old id first so a bad stored URL fails the
            // update instead of silently orphaning the asset.
            let old_public_id = public_id_from_url(&property.photo_url)?;

            let new_asset = self.media.upload(photo_path).await?;

            if let Err(e) = self.media.remove(&old_public_id).await {
                warn!(public_id = %old_public_id, error = %e, "failed to remove replaced asset");
            }

            property.photo_url = new_asset.url;
        }

        if let Some(title) = command.title {
            property.title = title.trim().to_string();
        }
        if let Some(description) = command.description {
            property.description = description.trim().to_string();
        }
        if let Some(property_type) = command.property_type {
            property.property_type = property_type.trim().to_string();
        }
        if let Some(location) = command.location {
            property.location = location.trim().to_string();
        }
        if let Some(price) = command.price {
            property.price = price;
        }
        property.updated_at = Utc::now();

        self.property_repo.update(&property).await?;

        info!(property_id = %property.id, "property updated");
        Ok(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_has_no_changes() {
        assert!(!UpdatePropertyCommand::default().has_changes());

        let cmd = UpdatePropertyCommand {
            price: Some(1.0),
            ..Default::default()
        };
        assert!(cmd.has_changes());
    }

    #[test]
    fn test_supplied_blank_field_rejected() {
        let cmd = UpdatePropertyCommand {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_supplied_bad_price_rejected() {
        let cmd = UpdatePropertyCommand {
            price: Some(-5.0),
            ..Default::default()
        };
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_absent_fields_are_fine() {
        assert!(UpdatePropertyCommand::default().validate().is_ok());
    }
}
