//! Workboard: area, people, project and ticket record services.
//!
//! Each service owns one SQLite table and serves it over REST. Reads that
//! span services go through the [`peer`] client: views embed records owned
//! by a sibling, rankings combine a count query on one service with lookups
//! on another, and project progress joins remote projects against local
//! tickets.

pub mod aggregation;
pub mod config;
pub mod handlers;
pub mod model;
pub mod peer;
pub mod services;
pub mod storage;
pub mod utils;
