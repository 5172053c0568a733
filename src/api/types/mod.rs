//! HTTP request/response types

pub mod account;
pub mod error;
pub mod json;

pub use account::{
    LoginRequest, LoginResponse, MessageResponse, RefreshRequest, SignupRequest, UsersResponse,
};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
