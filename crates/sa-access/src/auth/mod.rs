//! Authentication
//!
//! Identity resolution from signed tokens.

pub mod identity;

pub use identity::{
    extract_bearer_token, extract_cookie, Identity, IdentityClaims, IdentityProvider,
    JwtIdentityProvider,
};
