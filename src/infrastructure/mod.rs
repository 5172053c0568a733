//! Infrastructure layer - Concrete hashers, token services, stores and observability

pub mod auth;
pub mod logging;
pub mod observability;
pub mod storage;
pub mod user;
