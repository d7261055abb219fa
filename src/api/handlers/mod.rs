//! Route handlers.
//!
//! `users` carries the account endpoints, `health` the liveness probe. The
//! greeting at `/` stays out of the `OpenAPI` document.

pub mod health;
pub mod users;

pub use self::health::health;

/// Plain-text greeting served at `/`.
pub async fn root() -> &'static str {
    "Hello from Ryde!"
}
