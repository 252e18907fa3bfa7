//! User Repository

use futures::TryStreamExt;
use mongodb::{bson::doc, ClientSession, Collection, Database};
use std::collections::HashMap;

use crate::shared::error::Result;
use crate::user::entity::{CreatorPublic, User};

pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    pub async fn insert(&self, user: &User) -> Result<()> {
        self.collection.insert_one(user).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! { "email": email.to_lowercase() })
            .await?)
    }

    /// Uniqueness probe used at registration: any user holding the name OR
    /// the email.
    pub async fn find_by_name_or_email(&self, name: &str, email: &str) -> Result<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! {
                "$or": [
                    { "name": name },
                    { "email": email.to_lowercase() }
                ]
            })
            .await?)
    }

    pub async fn find_all(&self, limit: i64) -> Result<Vec<User>> {
        let cursor = self.collection.find(doc! {}).limit(limit).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Persist the hash of a freshly issued refresh token.
    pub async fn set_refresh_token_hash(&self, user_id: &str, hash: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "refreshTokenHash": hash } },
            )
            .await?;
        Ok(())
    }

    /// Clear the refresh token hash on logout.
    pub async fn clear_refresh_token_hash(&self, user_id: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$unset": { "refreshTokenHash": "" } },
            )
            .await?;
        Ok(())
    }

    /// Record a property view. `$addToSet` keeps set semantics: viewing
    /// the same property twice is a no-op.
    pub async fn record_view(&self, user_id: &str, property_id: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$addToSet": { "viewedHistory": property_id } },
            )
            .await?;
        Ok(())
    }

    /// Append a property id to the owner's list, inside the caller's
    /// transaction.
    pub async fn push_owned_property(
        &self,
        user_id: &str,
        property_id: &str,
        session: &mut ClientSession,
    ) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$push": { "ownedProperties": property_id } },
            )
            .session(session)
            .await?;
        Ok(())
    }

    /// Pull a property id from the owner's list, inside the caller's
    /// transaction.
    pub async fn pull_owned_property(
        &self,
        user_id: &str,
        property_id: &str,
        session: &mut ClientSession,
    ) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": user_id },
                doc! { "$pull": { "ownedProperties": property_id } },
            )
            .session(session)
            .await?;
        Ok(())
    }

    /// Batch-fetch the public projection of several users, keyed by id.
    pub async fn find_public_by_ids(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, CreatorPublic>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids } })
            .await?;
        let users: Vec<User> = cursor.try_collect().await?;

        Ok(users
            .iter()
            .map(|u| (u.id.clone(), CreatorPublic::from(u)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    // Repository tests require a MongoDB connection (replica set for the
    // transactional paths); covered by integration environments.
}
