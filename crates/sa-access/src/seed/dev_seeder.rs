//! Development Data Seeder
//!
//! Seeds fixture stores, users and memberships when running in dev mode.
//! Safe to run repeatedly: existing records are found by slug or email and
//! reused.
//!
//! Fixture logins (tokens are printed at startup):
//!   admin@storeadmin.local   superadmin in every store
//!   owner@storeadmin.local   owner of Downtown Store
//!   editor@storeadmin.local  editor of Downtown Store
//!   shipper@storeadmin.local shipper of Downtown Store and Harbor Outlet
//!   viewer@storeadmin.local  pending viewer invitation to Downtown Store

use std::sync::Arc;

use tracing::info;

use crate::auth::Identity;
use crate::directory::MembershipDirectory;
use crate::membership::Membership;
use crate::role::Role;
use crate::shared::error::Result;
use crate::store::{Store, StoreStatus};
use crate::user::User;

const SEEDER: &str = "DEV_SEEDER";

pub struct DevDataSeeder {
    directory: Arc<dyn MembershipDirectory>,
}

struct SeedStores {
    downtown: Store,
    harbor: Store,
}

impl DevDataSeeder {
    pub fn new(directory: Arc<dyn MembershipDirectory>) -> Self {
        Self { directory }
    }

    /// Seed all development data and return the fixture identities
    pub async fn seed(&self) -> Result<Vec<Identity>> {
        info!("=== DEV DATA SEEDER ===");

        let stores = self.seed_stores().await?;
        let identities = self.seed_users(&stores).await?;

        info!(stores = 2, users = identities.len(), "Development data seeded");
        Ok(identities)
    }

    async fn seed_stores(&self) -> Result<SeedStores> {
        let downtown = self.create_store_if_not_exists(
            "Downtown Store",
            "downtown",
            "Flagship store",
            StoreStatus::Active,
        ).await?;
        let harbor = self.create_store_if_not_exists(
            "Harbor Outlet",
            "harbor-outlet",
            "Seasonal outlet, currently closed",
            StoreStatus::Inactive,
        ).await?;

        Ok(SeedStores { downtown, harbor })
    }

    async fn create_store_if_not_exists(
        &self,
        name: &str,
        slug: &str,
        description: &str,
        status: StoreStatus,
    ) -> Result<Store> {
        if let Some(existing) = self.directory.find_store_by_slug(slug).await? {
            return Ok(existing);
        }

        let store = Store::new(name, slug, SEEDER)
            .with_description(description)
            .with_status(status);
        self.directory.insert_store(&store).await?;
        info!(store_id = %store.id, slug, "Created store");

        Ok(store)
    }

    async fn seed_users(&self, stores: &SeedStores) -> Result<Vec<Identity>> {
        let downtown = &stores.downtown;
        let harbor = &stores.harbor;

        let admin = self.create_user_if_not_exists("admin@storeadmin.local", "Store Administrator").await?;
        self.grant_if_not_exists(&admin, downtown, Role::Superadmin, true).await?;
        self.grant_if_not_exists(&admin, harbor, Role::Superadmin, true).await?;

        let owner = self.create_user_if_not_exists("owner@storeadmin.local", "Olivia Owner").await?;
        self.grant_if_not_exists(&owner, downtown, Role::Owner, true).await?;

        let editor = self.create_user_if_not_exists("editor@storeadmin.local", "Eddie Editor").await?;
        self.grant_if_not_exists(&editor, downtown, Role::Editor, true).await?;

        let shipper = self.create_user_if_not_exists("shipper@storeadmin.local", "Sam Shipper").await?;
        self.grant_if_not_exists(&shipper, downtown, Role::Shipper, true).await?;
        self.grant_if_not_exists(&shipper, harbor, Role::Shipper, true).await?;

        let viewer = self.create_user_if_not_exists("viewer@storeadmin.local", "Vera Viewer").await?;
        self.grant_if_not_exists(&viewer, downtown, Role::Viewer, false).await?;

        Ok([admin, owner, editor, shipper, viewer]
            .iter()
            .map(Identity::from)
            .collect())
    }

    async fn create_user_if_not_exists(&self, email: &str, name: &str) -> Result<User> {
        if let Some(existing) = self.directory.find_user_by_email(email).await? {
            return Ok(existing);
        }

        let user = User::new(crate::TsidGenerator::generate(), name, email);
        self.directory.insert_user(&user).await?;
        info!(user_id = %user.id, email, "Created user");

        Ok(user)
    }

    async fn grant_if_not_exists(&self, user: &User, store: &Store, role: Role, accepted: bool) -> Result<()> {
        let existing = self.directory.memberships_in_store(&user.id, &store.id).await?;
        if !existing.is_empty() {
            return Ok(());
        }

        let mut membership = Membership::invite(&user.id, &user.email, &store.id, role, SEEDER)
            .with_name(user.name.clone());
        if accepted {
            membership = membership.active();
        }
        self.directory.insert_membership(&membership).await?;

        Ok(())
    }
}
