mod auth;
mod provider;

pub use auth::*;
pub use provider::{user_message, ServerProvider};
