//! In-memory directory for development mode and tests

use async_trait::async_trait;
use parking_lot::RwLock;

use super::MembershipDirectory;
use crate::membership::Membership;
use crate::shared::error::{AccessError, Result};
use crate::store::Store;
use crate::user::{entity::normalize_email, User};

#[derive(Default)]
struct Tables {
    stores: Vec<Store>,
    users: Vec<User>,
    memberships: Vec<Membership>,
}

#[derive(Default)]
pub struct MemoryDirectory {
    tables: RwLock<Tables>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(self, store: Store) -> Self {
        self.tables.write().stores.push(store);
        self
    }

    pub fn with_user(self, user: User) -> Self {
        self.tables.write().users.push(user);
        self
    }

    /// Adds a membership without the uniqueness check, so tests can stage duplicates
    pub fn with_membership(self, membership: Membership) -> Self {
        self.tables.write().memberships.push(membership);
        self
    }
}

#[async_trait]
impl MembershipDirectory for MemoryDirectory {
    async fn stores_for_identity(&self, identity_id: &str) -> Result<Vec<Store>> {
        let tables = self.tables.read();

        let mut memberships: Vec<&Membership> = tables.memberships
            .iter()
            .filter(|m| m.principal_id == identity_id && m.is_active())
            .collect();
        memberships.sort_by_key(|m| m.invited_at);

        let mut stores: Vec<Store> = Vec::new();
        for m in memberships {
            if stores.iter().any(|s| s.id == m.store_id) {
                continue;
            }
            if let Some(store) = tables.stores.iter().find(|s| s.id == m.store_id) {
                stores.push(store.clone());
            }
        }
        Ok(stores)
    }

    async fn memberships_in_store(&self, identity_id: &str, store_id: &str) -> Result<Vec<Membership>> {
        Ok(self.tables.read().memberships
            .iter()
            .filter(|m| m.principal_id == identity_id && m.store_id == store_id)
            .cloned()
            .collect())
    }

    async fn list_stores(&self, search: Option<&str>) -> Result<Vec<Store>> {
        let mut stores: Vec<Store> = self.tables.read().stores
            .iter()
            .filter(|s| search.map_or(true, |term| s.name == term || s.slug == term))
            .cloned()
            .collect();
        stores.sort_by_key(|s| s.created_at);
        Ok(stores)
    }

    async fn find_store(&self, id: &str) -> Result<Option<Store>> {
        Ok(self.tables.read().stores.iter().find(|s| s.id == id).cloned())
    }

    async fn find_store_by_slug(&self, slug: &str) -> Result<Option<Store>> {
        Ok(self.tables.read().stores.iter().find(|s| s.slug == slug).cloned())
    }

    async fn insert_store(&self, store: &Store) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.stores.iter().any(|s| s.slug == store.slug) {
            return Err(AccessError::duplicate("Store", "slug", &store.slug));
        }
        tables.stores.push(store.clone());
        Ok(())
    }

    async fn update_store(&self, store: &Store) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.stores.iter().any(|s| s.slug == store.slug && s.id != store.id) {
            return Err(AccessError::duplicate("Store", "slug", &store.slug));
        }
        let slot = tables.stores
            .iter_mut()
            .find(|s| s.id == store.id)
            .ok_or_else(|| AccessError::not_found("Store", &store.id))?;
        *slot = store.clone();
        Ok(())
    }

    async fn delete_store(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.write();
        tables.memberships.retain(|m| m.store_id != id);
        let before = tables.stores.len();
        tables.stores.retain(|s| s.id != id);
        Ok(tables.stores.len() < before)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        Ok(self.tables.read().users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AccessError::duplicate("User", "email", &user.email));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn list_members(&self, store_id: &str) -> Result<Vec<Membership>> {
        let mut members: Vec<Membership> = self.tables.read().memberships
            .iter()
            .filter(|m| m.store_id == store_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.invited_at);
        Ok(members)
    }

    async fn pending_invitations(&self, identity_id: &str) -> Result<Vec<Membership>> {
        let mut pending: Vec<Membership> = self.tables.read().memberships
            .iter()
            .filter(|m| m.principal_id == identity_id && m.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|m| m.invited_at);
        Ok(pending)
    }

    async fn find_membership(&self, id: &str) -> Result<Option<Membership>> {
        Ok(self.tables.read().memberships.iter().find(|m| m.id == id).cloned())
    }

    async fn insert_membership(&self, membership: &Membership) -> Result<()> {
        let mut tables = self.tables.write();
        let exists = tables.memberships
            .iter()
            .any(|m| m.principal_id == membership.principal_id && m.store_id == membership.store_id);
        if exists {
            return Err(AccessError::duplicate(
                "Membership",
                "principalId+storeId",
                format!("{}/{}", membership.principal_id, membership.store_id),
            ));
        }
        tables.memberships.push(membership.clone());
        Ok(())
    }

    async fn update_membership(&self, membership: &Membership) -> Result<()> {
        let mut tables = self.tables.write();
        let slot = tables.memberships
            .iter_mut()
            .find(|m| m.id == membership.id)
            .ok_or_else(|| AccessError::not_found("Membership", &membership.id))?;
        *slot = membership.clone();
        Ok(())
    }

    async fn delete_membership(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.write();
        let before = tables.memberships.len();
        tables.memberships.retain(|m| m.id != id);
        Ok(tables.memberships.len() < before)
    }
}
