//! HTTP inbound adapter exposing the page over JSON endpoints.

pub mod cache_control;
pub mod error;
pub mod health;
pub mod page;
pub mod posts;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
