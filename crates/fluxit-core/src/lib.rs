//! fluxit Core - Core types for scaffolding Flux applications
//!
//! This crate provides the foundational types used throughout fluxit:
//! - `AppParams`: The validated parameter set for one application scaffold
//! - `ConfirmPolicy`: When to ask before writing a file
//! - `TemplateContext`: Template rendering context
//! - `FluxitConfig`: Defaults loaded from a configuration file
//! - Namespace discovery in a Flux apps directory

pub mod config;
pub mod context;
pub mod error;
pub mod namespaces;
pub mod params;
pub mod policy;

pub use config::FluxitConfig;
pub use context::TemplateContext;
pub use error::{CoreError, Result};
pub use namespaces::{NamespaceEntry, discover_namespaces};
pub use params::{AppParams, DeploymentStrategy, IngressType};
pub use policy::ConfirmPolicy;
