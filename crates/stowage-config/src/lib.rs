#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Run configuration for the archive pipeline.
//!
//! Layout: `model.rs` (resolved configuration and overrides), `defaults.rs`
//! (hard-coded fallbacks), `validate.rs` (field checks), `loader.rs` (JSON
//! override documents).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_overrides;
pub use model::{ArchiveConfig, ArchiveFormat, ConfigOverrides, TimestampKind, WriterOptions};
