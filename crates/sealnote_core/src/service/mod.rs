//! Core use-case services.
//!
//! # Responsibility
//! - Combine key, cipher and notes file into the operation set UI layers call.
//! - Keep UI adapters decoupled from crypto and file details.

pub mod note_store;
