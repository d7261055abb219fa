//! Account authentication.
//!
//! Passwords are hashed with Argon2id; successful registration or login mints
//! an HS256 JWT that clients present either as the `token` cookie or as an
//! `Authorization: Bearer` header.
//!
//! ## Logout and the blacklist
//!
//! Tokens are stateless, so logout records the token in the store's blacklist.
//! Every authenticated request checks blacklist absence *and* signature
//! validity. Entries carry the token's own expiry and are purged after it
//! passes (see [`crate::store::spawn_blacklist_purge`]).

pub mod error;
pub mod password;
pub(crate) mod principal;
pub mod service;
pub(crate) mod session;
mod state;
pub mod token;
pub mod types;
mod utils;

pub use error::AuthError;
pub use password::{PasswordConfig, PasswordHasher};
pub use principal::Principal;
pub use session::TOKEN_COOKIE_NAME;
pub use state::{AuthConfig, AuthState};
pub use token::TokenIssuer;
