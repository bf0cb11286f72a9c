//! User Repository

use mongodb::{Collection, Database, bson::doc};
use super::entity::{User, normalize_email};
use crate::directory::mongo::USERS;
use crate::shared::error::Result;

pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USERS),
        }
    }

    pub async fn insert(&self, user: &User) -> Result<()> {
        self.collection.insert_one(user).await?;
        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": normalize_email(email) }).await?)
    }
}
