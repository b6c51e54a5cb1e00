//! Provider-independent logic for Parley.
//!
//! Holds the model registry, provider resolution, and the interactive
//! tool-use orchestrator. Concrete HTTP backends and local tool execution
//! live in `parley-infra`; this crate depends only on `parley-types`.

pub mod llm;
pub mod orchestrator;
