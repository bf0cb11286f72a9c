//! MongoDB-backed directory

use async_trait::async_trait;
use mongodb::Database;
use tracing::debug;

use super::MembershipDirectory;
use crate::membership::{Membership, MembershipRepository};
use crate::shared::error::{AccessError, Result};
use crate::store::{Store, StoreRepository};
use crate::user::{User, UserRepository};

pub const STORES: &str = "stores";
pub const USERS: &str = "users";
pub const TEAM_MEMBERS: &str = "team_members";

pub struct MongoDirectory {
    stores: StoreRepository,
    users: UserRepository,
    members: MembershipRepository,
}

impl MongoDirectory {
    pub fn new(db: &Database) -> Self {
        Self {
            stores: StoreRepository::new(db),
            users: UserRepository::new(db),
            members: MembershipRepository::new(db),
        }
    }
}

#[async_trait]
impl MembershipDirectory for MongoDirectory {
    async fn stores_for_identity(&self, identity_id: &str) -> Result<Vec<Store>> {
        let mut memberships: Vec<Membership> = self.members
            .find_by_principal(identity_id)
            .await?
            .into_iter()
            .filter(Membership::is_active)
            .collect();
        memberships.sort_by_key(|m| m.invited_at);

        let mut store_ids: Vec<String> = Vec::with_capacity(memberships.len());
        for m in memberships {
            if !store_ids.contains(&m.store_id) {
                store_ids.push(m.store_id);
            }
        }
        if store_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut stores = self.stores.find_by_ids(&store_ids).await?;
        // `$in` does not preserve order
        stores.sort_by_key(|s| store_ids.iter().position(|id| *id == s.id));

        debug!(identity_id, count = stores.len(), "Resolved stores for identity");
        Ok(stores)
    }

    async fn memberships_in_store(&self, identity_id: &str, store_id: &str) -> Result<Vec<Membership>> {
        self.members.find_by_principal_and_store(identity_id, store_id).await
    }

    async fn list_stores(&self, search: Option<&str>) -> Result<Vec<Store>> {
        self.stores.find_all(search).await
    }

    async fn find_store(&self, id: &str) -> Result<Option<Store>> {
        self.stores.find_by_id(id).await
    }

    async fn find_store_by_slug(&self, slug: &str) -> Result<Option<Store>> {
        self.stores.find_by_slug(slug).await
    }

    async fn insert_store(&self, store: &Store) -> Result<()> {
        self.stores.insert(store).await
    }

    async fn update_store(&self, store: &Store) -> Result<()> {
        if self.stores.update(store).await? {
            Ok(())
        } else {
            Err(AccessError::not_found("Store", &store.id))
        }
    }

    async fn delete_store(&self, id: &str) -> Result<bool> {
        let removed = self.members.delete_by_store(id).await?;
        debug!(store_id = id, memberships = removed, "Removed store memberships");
        self.stores.delete(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        self.users.insert(user).await
    }

    async fn list_members(&self, store_id: &str) -> Result<Vec<Membership>> {
        self.members.find_by_store(store_id).await
    }

    async fn count_members(&self, store_id: &str) -> Result<u64> {
        self.members.count_by_store(store_id).await
    }

    async fn pending_invitations(&self, identity_id: &str) -> Result<Vec<Membership>> {
        self.members.find_pending_by_principal(identity_id).await
    }

    async fn find_membership(&self, id: &str) -> Result<Option<Membership>> {
        self.members.find_by_id(id).await
    }

    async fn insert_membership(&self, membership: &Membership) -> Result<()> {
        self.members.insert(membership).await
    }

    async fn update_membership(&self, membership: &Membership) -> Result<()> {
        if self.members.update(membership).await? {
            Ok(())
        } else {
            Err(AccessError::not_found("Membership", &membership.id))
        }
    }

    async fn delete_membership(&self, id: &str) -> Result<bool> {
        self.members.delete(id).await
    }
}
