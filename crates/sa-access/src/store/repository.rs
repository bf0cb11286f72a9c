//! Store Repository

use mongodb::{Collection, Database, bson::doc};
use futures::TryStreamExt;
use super::entity::Store;
use crate::directory::mongo::STORES;
use crate::shared::error::{is_duplicate_key, AccessError, Result};

pub struct StoreRepository {
    collection: Collection<Store>,
}

impl StoreRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(STORES),
        }
    }

    pub async fn insert(&self, store: &Store) -> Result<()> {
        match self.collection.insert_one(store).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(AccessError::duplicate("Store", "slug", &store.slug)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Store>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Store>> {
        Ok(self.collection.find_one(doc! { "slug": slug }).await?)
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Store>> {
        let cursor = self.collection
            .find(doc! { "_id": { "$in": ids } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// All stores, or those whose name or slug equals `search`
    pub async fn find_all(&self, search: Option<&str>) -> Result<Vec<Store>> {
        let filter = match search {
            Some(term) => doc! { "$or": [ { "name": term }, { "slug": term } ] },
            None => doc! {},
        };
        let cursor = self.collection
            .find(filter)
            .sort(doc! { "createdAt": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, store: &Store) -> Result<bool> {
        match self.collection.replace_one(doc! { "_id": &store.id }, store).await {
            Ok(result) => Ok(result.matched_count > 0),
            Err(e) if is_duplicate_key(&e) => Err(AccessError::duplicate("Store", "slug", &store.slug)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
