//! Configuration and the request-scoped data model

pub mod config;
pub mod models;
