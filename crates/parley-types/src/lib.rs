//! Shared domain types for Parley.
//!
//! This crate contains the data shapes used across the workspace: chat
//! messages and responses, tool declarations and calls, model metadata,
//! provider kinds, global configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod model;
pub mod provider;
pub mod tool;
