//! # icongen
//!
//! Builds publishable React and Vue icon component packages from a directory
//! of RemixIcon SVG sources.
//!
//! ## Features
//!
//! - One component module per icon, in both ES module and CommonJS form
//! - Type declarations and barrel indexes for every package root
//! - Bounded, FIFO-fair concurrency for file writes
//! - Release download and extraction of the SVG sources
//!
//! ## Quick Start
//!
//! ```no_run
//! use icongen::{Config, Pipeline, Platform};
//!
//! # async fn build() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .platform(Platform::React)
//!     .source_dir("./optimized")
//!     .output_dir(".")
//!     .build()?;
//!
//! Pipeline::new(config)?.run().await?.print_summary();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! A build flows through four stages:
//! 1. **Loader**: Reads `<source>/<style>/*.svg` into icon records
//! 2. **Transform**: Compiles each icon into a platform component
//! 3. **Writer**: Persists files atomically, bounded by a [`Gate`]
//! 4. **Pipeline**: Fans out every target and writes indexes and manifests

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod gate;
mod icon;
mod loader;
mod pipeline;
mod svg;
mod template;
mod writer;

pub mod fetch;
pub mod transform;

pub use config::{
    BuildTarget, Config, ConfigBuilder, DEFAULT_WRITE_LIMIT, ModuleFormat, Platform, Style,
    style_root,
};
pub use error::{Error, Result};
pub use fetch::{ExtractStats, FetchConfig, FetchConfigBuilder, Fetcher};
pub use gate::{Gate, GatePermit};
pub use icon::{IconRecord, component_name, escape_leading_digit};
pub use loader::Loader;
pub use pipeline::{BuildStats, Pipeline, export_all};
pub use svg::{SvgElement, SvgNode, parse as parse_svg};
pub use transform::{Transform, rewrite_imports, transform_for};
pub use writer::Writer;

/// Builds every configured package with the given configuration.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - A source directory doesn't exist or is inaccessible
/// - An icon fails to transform
/// - File operations fail
///
/// # Examples
///
/// ```no_run
/// use icongen::{Config, Platform, run};
///
/// # async fn build() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .platforms(Platform::ALL)
///     .build()?;
///
/// run(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run(config: Config) -> Result<BuildStats> {
    Pipeline::new(config)?.run().await
}
