//! Create Property Use Case

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::media::gateway::{MediaGateway, StoredAsset};
use crate::property::entity::Property;
use crate::property::repository::PropertyRepository;
use crate::shared::error::{HomesteadError, Result};
use crate::user::repository::UserRepository;

/// Command for creating a property listing.
#[derive(Debug, Clone)]
pub struct CreatePropertyCommand {
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub location: String,
    pub price: f64,
}

impl CreatePropertyCommand {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty()
            || self.description.trim().is_empty()
            || self.property_type.trim().is_empty()
            || self.location.trim().is_empty()
        {
            return Err(HomesteadError::validation("All fields are required"));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(HomesteadError::validation("Price must be a positive number"));
        }
        Ok(())
    }
}

pub struct CreatePropertyUseCase {
    mongo: mongodb::Client,
    property_repo: Arc<PropertyRepository>,
    user_repo: Arc<UserRepository>,
    media: Arc<MediaGateway>,
}

impl CreatePropertyUseCase {
    pub fn new(
        mongo: mongodb::Client,
        property_repo: Arc<PropertyRepository>,
        user_repo: Arc<UserRepository>,
        media: Arc<MediaGateway>,
    ) -> Self {
        Self {
            mongo,
            property_repo,
            user_repo,
            media,
        }
    }

    /// Create a listing for `creator_id`.
    ///
    /// Upload order: all media first, then one transaction covering the
    /// property insert and the owner-list push. A failed transaction
    /// leaves no partial record; the already-uploaded assets are removed
    /// best-effort.
    pub async fn execute(
        &self,
        command: CreatePropertyCommand,
        creator_id: &str,
        photo: &Path,
        video: Option<&Path>,
    ) -> Result<Property> {
        command.validate()?;

        let creator = self
            .user_repo
            .find_by_id(creator_id)
            .await?
            .ok_or_else(|| HomesteadError::not_found("User", creator_id))?;

        let photo_asset = self.media.upload(photo).await?;

        let video_asset = match video {
            Some(path) => match self.media.upload(path).await {
                Ok(asset) => Some(asset),
                Err(e) => {
                    self.discard_assets(&[&photo_asset]).await;
                    return Err(e);
                }
            },
            None => None,
        };

        let property = Property::new(
            command.title.trim(),
            command.description.trim(),
            command.property_type.trim(),
            command.location.trim(),
            command.price,
            photo_asset.url.clone(),
            video_asset.as_ref().map(|a| a.url.clone()),
            &creator.id,
        );

        let mut uploaded: Vec<&StoredAsset> = vec![&photo_asset];
        if let Some(ref asset) = video_asset {
            uploaded.push(asset);
        }

        if let Err(e) = self.commit(&property, &creator.id).await {
            self.discard_assets(&uploaded).await;
            return Err(e);
        }

        info!(property_id = %property.id, creator = %creator.id, "property created");
        Ok(property)
    }

    /// Insert the property and push the owner back-reference atomically.
    async fn commit(&self, property: &Property, creator_id: &str) -> Result<()> {
        let mut session = self.mongo.start_session().await?;
        session.start_transaction().await?;

        if let Err(e) = self
            .property_repo
            .insert_with_session(property, &mut session)
            .await
        {
            let _ = session.abort_transaction().await;
            return Err(e);
        }

        if let Err(e) = self
            .user_repo
            .push_owned_property(creator_id, &property.id, &mut session)
            .await
        {
            let _ = session.abort_transaction().await;
            return Err(e);
        }

        session.commit_transaction().await?;
        Ok(())
    }

    async fn discard_assets(&self, assets: &[&StoredAsset]) {
        for asset in assets {
            if let Err(e) = self.media.remove(&asset.public_id).await {
                warn!(public_id = %asset.public_id, error = %e, "failed to discard uploaded asset");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_command() -> CreatePropertyCommand {
        CreatePropertyCommand {
            title: "Seaside villa".to_string(),
            description: "Four bedrooms by the shore".to_string(),
            property_type: "villa".to_string(),
            location: "Lisbon".to_string(),
            price: 420_000.0,
        }
    }

    #[test]
    fn test_valid_command_passes() {
        assert!(valid_command().validate().is_ok());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let mut cmd = valid_command();
        cmd.title = "   ".to_string();
        assert!(cmd.validate().is_err());

        let mut cmd = valid_command();
        cmd.location = "".to_string();
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut cmd = valid_command();
        cmd.price = 0.0;
        assert!(cmd.validate().is_err());

        cmd.price = -10.0;
        assert!(cmd.validate().is_err());

        cmd.price = f64::NAN;
        assert!(cmd.validate().is_err());
    }
}
