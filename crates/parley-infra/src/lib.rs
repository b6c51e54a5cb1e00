//! Infrastructure layer for Parley.
//!
//! Contains the IO side of the ports defined in `parley-core`: the
//! reqwest-based OpenAI-compatible provider, environment credential lookup,
//! `config.toml` loading, and data directory resolution.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod secret;
