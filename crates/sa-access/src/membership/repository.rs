//! Membership Repository

use mongodb::{Collection, Database, bson::doc};
use futures::TryStreamExt;
use super::entity::Membership;
use crate::directory::mongo::TEAM_MEMBERS;
use crate::shared::error::{is_duplicate_key, AccessError, Result};

pub struct MembershipRepository {
    collection: Collection<Membership>,
}

impl MembershipRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(TEAM_MEMBERS),
        }
    }

    /// Insert, mapping a unique-index violation to `Duplicate`
    pub async fn insert(&self, membership: &Membership) -> Result<()> {
        match self.collection.insert_one(membership).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(AccessError::duplicate(
                "Membership",
                "principalId+storeId",
                format!("{}/{}", membership.principal_id, membership.store_id),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Membership>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_principal(&self, principal_id: &str) -> Result<Vec<Membership>> {
        let cursor = self.collection
            .find(doc! { "principalId": principal_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_principal_and_store(&self, principal_id: &str, store_id: &str) -> Result<Vec<Membership>> {
        let cursor = self.collection
            .find(doc! { "principalId": principal_id, "storeId": store_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_store(&self, store_id: &str) -> Result<Vec<Membership>> {
        let cursor = self.collection
            .find(doc! { "storeId": store_id })
            .sort(doc! { "invitedAt": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, membership: &Membership) -> Result<bool> {
        let result = self.collection
            .replace_one(doc! { "_id": &membership.id }, membership)
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn find_pending_by_principal(&self, principal_id: &str) -> Result<Vec<Membership>> {
        let cursor = self.collection
            .find(doc! { "principalId": principal_id, "status": "pending" })
            .sort(doc! { "invitedAt": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_by_store(&self, store_id: &str) -> Result<u64> {
        Ok(self.collection.count_documents(doc! { "storeId": store_id }).await?)
    }

    pub async fn delete_by_store(&self, store_id: &str) -> Result<u64> {
        let result = self.collection.delete_many(doc! { "storeId": store_id }).await?;
        Ok(result.deleted_count)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
