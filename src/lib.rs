//! Dahabiyat - content and booking backend for a Nile cruise operator
//!
//! This library provides the core functionality for the Dahabiyat system.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
