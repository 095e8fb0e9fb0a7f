//! Shared library for the protoc-gen-go-tetragon plugin.
//!
//! This crate provides the pieces the plugin's generators build on:
//! read-only views over protoc descriptors with Go naming, discovery of the
//! event types of the FGS API, Go source emission helpers, configuration,
//! error handling and telemetry. It also vendors the health API model.

// Descriptor views with Go naming
pub mod schema;
pub use schema::{File, GoIdent, GoImportPath, Message};

// Event discovery over GetEventsResponse.event
pub mod events;
pub use events::{discover_events, has_field, is_parent_event, is_process_event};

// Go source emission
pub mod codegen;
pub use codegen::{new_generated_file, GeneratedFile};

// protoc request/response handling
pub mod plugin;
pub use plugin::Plugin;

// Configuration management
pub mod config;
pub use config::Config;

// Error handling types
pub mod error;
pub use error::{CodegenError, Result};

// Telemetry and observability
pub mod telemetry;

// Vendored API models
pub mod models;

pub use telemetry::init_tracing;
