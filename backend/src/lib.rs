//! Settlement roster backend.
//!
//! Hexagonal layout: `domain` holds the entities, services, and ports;
//! `inbound` the HTTP adapters (REST and browser); `outbound` the Diesel
//! persistence adapters over a single SQLite store file.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod seed;
pub mod server;

pub use middleware::Trace;
