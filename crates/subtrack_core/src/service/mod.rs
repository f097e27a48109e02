//! Core use-case services.
//!
//! # Responsibility
//! - Turn raw request input into repository calls.
//! - Keep the HTTP layer decoupled from storage details.

pub mod subscription_service;
