//! Delete Property Use Case

use std::sync::Arc;
use tracing::info;

use crate::property::entity::Property;
use crate::property::repository::PropertyRepository;
use crate::shared::error::{HomesteadError, Result};
use crate::user::repository::UserRepository;

pub struct DeletePropertyUseCase {
    mongo: mongodb::Client,
    property_repo: Arc<PropertyRepository>,
    user_repo: Arc<UserRepository>,
}

impl DeletePropertyUseCase {
    pub fn new(
        mongo: mongodb::Client,
        property_repo: Arc<PropertyRepository>,
        user_repo: Arc<UserRepository>,
    ) -> Self {
        Self {
            mongo,
            property_repo,
            user_repo,
        }
    }

    /// Delete a listing. Only the creator may delete. The document
    /// removal and the owner-list pull happen in one transaction: either
    /// both commit or neither does, so no dangling back-reference can
    /// survive a failure between the two.
    pub async fn execute(&self, property_id: &str, requester_id: &str) -> Result<Property> {
        let property = self
            .property_repo
            .find_by_id(property_id)
            .await?
            .ok_or_else(|| HomesteadError::not_found("Property", property_id))?;

        if !property.is_owned_by(requester_id) {
            return Err(HomesteadError::forbidden(
                "Only the creator may delete this property",
            ));
        }

        let mut session = self.mongo.start_session().await?;
        session.start_transaction().await?;

        match self
            .property_repo
            .delete_with_session(&property.id, &mut session)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                let _ = session.abort_transaction().await;
                return Err(HomesteadError::not_found("Property", property_id));
            }
            Err(e) => {
                let _ = session.abort_transaction().await;
                return Err(e);
            }
        }

        if let Err(e) = self
            .user_repo
            .pull_owned_property(&property.creator, &property.id, &mut session)
            .await
        {
            let _ = session.abort_transaction().await;
            return Err(e);
        }

        session.commit_transaction().await?;

        info!(property_id = %property.id, "property deleted");
        Ok(property)
    }
}

#[cfg(test)]
mod tests {
    // The transactional delete path requires a MongoDB replica set;
    // covered by integration environments.
}
