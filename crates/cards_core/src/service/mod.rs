//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep transport layers decoupled from storage details.

pub mod card_service;
