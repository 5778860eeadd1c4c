//! Infrastructure layer - Cache implementations and supporting services

pub mod cache;
pub mod logging;
pub mod observability;
pub mod seed;
pub mod services;
