//! Authentication infrastructure module
//!
//! This module provides signed access/refresh token management.

mod jwt;

pub use jwt::{JwtConfig, JwtService, TokenIssuer};
