//! Session token implementations.

mod jwt;

pub use jwt::{JwtSessionService, SessionConfig};
