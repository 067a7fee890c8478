//! HTTP endpoints served by the local OAuth callback server: the
//! `/callback` handler that exchanges the authorization code for a token,
//! and a `/health` probe.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
