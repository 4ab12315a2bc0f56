//! services/api/src/lib.rs
//!
//! The HTTP service around `kitchen_king_core`: adapters, configuration, and the
//! axum web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
