//! Membership Directory
//!
//! Data-access seam for stores, users and memberships. The session resolver
//! and the team API only talk to this trait; MongoDB and in-memory backends
//! implement it.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::membership::entity::{resolve_role, Membership};
use crate::role::Role;
use crate::shared::error::Result;
use crate::store::Store;
use crate::user::User;

pub use memory::MemoryDirectory;
pub use mongo::MongoDirectory;

#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    /// Stores the identity holds an active membership in, oldest membership first
    async fn stores_for_identity(&self, identity_id: &str) -> Result<Vec<Store>>;

    /// Every membership record of the identity in the store, any status
    async fn memberships_in_store(&self, identity_id: &str, store_id: &str) -> Result<Vec<Membership>>;

    /// Effective role of the identity in the store
    async fn role_in_store(&self, identity_id: &str, store_id: &str) -> Result<Option<Role>> {
        let memberships = self.memberships_in_store(identity_id, store_id).await?;
        Ok(resolve_role(&memberships))
    }

    /// Every store in creation order; with `search`, only exact name or slug matches
    async fn list_stores(&self, search: Option<&str>) -> Result<Vec<Store>>;

    async fn find_store(&self, id: &str) -> Result<Option<Store>>;

    async fn find_store_by_slug(&self, slug: &str) -> Result<Option<Store>>;

    /// Fails with `Duplicate` if the slug is taken
    async fn insert_store(&self, store: &Store) -> Result<()>;

    /// Fails with `NotFound` if the store is gone, `Duplicate` on a taken slug
    async fn update_store(&self, store: &Store) -> Result<()>;

    /// Removes the store's memberships, then the store
    async fn delete_store(&self, id: &str) -> Result<bool>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Members of a store in invitation order
    async fn list_members(&self, store_id: &str) -> Result<Vec<Membership>>;

    async fn count_members(&self, store_id: &str) -> Result<u64> {
        Ok(self.list_members(store_id).await?.len() as u64)
    }

    /// Invitations addressed to the identity that are still pending
    async fn pending_invitations(&self, identity_id: &str) -> Result<Vec<Membership>>;

    async fn find_membership(&self, id: &str) -> Result<Option<Membership>>;

    /// Fails with `Duplicate` if the (principal, store) pair already has a record
    async fn insert_membership(&self, membership: &Membership) -> Result<()>;

    /// Fails with `NotFound` if the record is gone
    async fn update_membership(&self, membership: &Membership) -> Result<()>;

    async fn delete_membership(&self, id: &str) -> Result<bool>;
}
