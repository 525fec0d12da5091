//! Authentication module
//!
//! Provides JWT-based authentication for the API.

mod jwt;
mod middleware;
mod password;

pub use jwt::{create_tokens, decode_token, refresh_tokens, Claims, TokenPair};
pub use middleware::auth_middleware;
pub use password::{hash_password, verify_password};
