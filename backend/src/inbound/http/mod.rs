//! HTTP adapters: REST handlers, browser pages, and session plumbing.

pub mod api_jobs;
pub mod api_users;
mod error;
pub mod pages;
pub mod session;
pub mod state;

pub use error::ApiResult;
