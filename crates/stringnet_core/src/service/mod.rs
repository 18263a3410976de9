//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate resolver, builder and repositories into use-case APIs.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod network_service;
