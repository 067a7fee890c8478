//! # CLI Module
//!
//! User-facing commands for the Spotify Library Curator:
//!
//! - [`auth`] - OAuth 2.0 PKCE authentication flow
//! - [`run`] - the full curation run: page saved tracks, enrich, evaluate
//!   rules, batch-add matches, report tracks no playlist wanted
//! - [`rules`] - table of the configured rule specifications
//! - [`cache`] - cache statistics and optional wipe
//!
//! Each command delegates to the management, enrichment and Spotify layers
//! and handles user interaction: progress feedback, tables and the colored
//! status macros.

mod auth;
mod cache;
mod rules;
mod run;

pub use auth::auth;
pub use cache::cache;
pub use rules::rules;
pub use run::{evaluate, run};
