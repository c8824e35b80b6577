//! aerofinder - airline special-deal notice detection.
//!
//! Watches airline notice pages, detects new or changed notices, decides
//! which of them announce special fares, and publishes those as deals.

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod schema;
pub mod scrapers;
pub mod services;
pub mod utils;
