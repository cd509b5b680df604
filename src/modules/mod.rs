//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the photo store and the outbound mail transport.

pub mod mail;
pub mod storage;
