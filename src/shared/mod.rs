//! Cross-cutting pieces shared by all layers.

pub mod config;
