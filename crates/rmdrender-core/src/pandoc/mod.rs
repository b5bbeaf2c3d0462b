/*
 * pandoc/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Pandoc discovery and invocation.
 */

//! Pandoc discovery and invocation.
//!
//! [`locate`] finds the best available pandoc installation and caches it
//! for the process lifetime; [`convert`] builds the argument vector and
//! runs the conversion as a blocking subprocess; [`args`] holds the
//! option-to-flag builders shared by output formats.

pub mod args;
pub mod convert;
pub mod locate;

pub use args::{Includes, MathjaxMode, TocOptions};
pub use convert::{ConversionRequest, convert, convert_with};
pub use locate::{PandocLocation, PandocLocator};
