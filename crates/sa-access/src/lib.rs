//! Store Admin Access Control
//!
//! Role-based access control for the multi-tenant store administration
//! console:
//! - Static role registry and permission evaluator
//! - Store memberships and the per-identity store context
//! - Permission guard and its HTTP mapping
//! - Team and store administration APIs
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - MongoDB data access
//! - `api` - REST endpoints (where applicable)

// Core aggregates
pub mod role;
pub mod store;
pub mod user;
pub mod membership;

// Context resolution & gating
pub mod directory;
pub mod session;
pub mod access;

// Authentication
pub mod auth;

// Shared infrastructure
pub mod shared;

pub mod seed;

pub use shared::error::{AccessError, Result};
pub use shared::tsid::TsidGenerator;

// Re-export main entity types for convenience
pub use role::{Action, Grants, PermissionGrant, Resource, Role, RoleRegistry};
pub use store::{Store, StoreStatus};
pub use user::User;
pub use membership::{Membership, MembershipStatus};

// Re-export repositories
pub use store::StoreRepository;
pub use user::UserRepository;
pub use membership::MembershipRepository;

// Re-export services
pub use directory::{MembershipDirectory, MemoryDirectory, MongoDirectory};
pub use session::{SessionManager, StoreContext};
pub use access::{GuardDecision, PermissionGuard};
pub use auth::{Identity, IdentityProvider, JwtIdentityProvider};
pub use shared::authorization_service::{can, has_permission};
pub use shared::middleware::{AppState, AuthLayer, Authenticated, StoreSession};
