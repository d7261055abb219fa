//! # Ryde (car rental accounts)
//!
//! `ryde` is the account backend of a car-rental platform. Customers register
//! with a name, email and password, log in to receive a session token, read
//! their profile, and log out.
//!
//! ## Sessions
//!
//! Tokens are HS256 JWTs carrying the user id in `sub`. Login also sets an
//! `HttpOnly` cookie named `token`; protected routes accept either the cookie
//! or an `Authorization: Bearer` header, cookie first.
//!
//! Logging out blacklists the token until it would have expired anyway, so a
//! stolen token stops working the moment its owner logs out.
//!
//! ## Storage
//!
//! PostgreSQL in production (schema in `sql/schema.sql`, applied at startup);
//! an in-memory store for development and tests.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

pub use api::GIT_COMMIT_HASH;
