//! LLM provider abstractions for Parley.
//!
//! This module defines the core traits and utilities for backend integration:
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `ModelRegistry`: model metadata, pricing, and context lengths
//! - `ProviderResolver`: which backend to use, given credentials and hints
//! - `ModelListCache`: memoised `list_models` results

pub mod box_provider;
pub mod catalog;
pub mod credentials;
pub mod model_cache;
pub mod pricing;
pub mod provider;
pub mod registry;
pub mod resolver;
