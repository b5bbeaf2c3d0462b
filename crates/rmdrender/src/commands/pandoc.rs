/*
 * pandoc.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Pandoc availability command.
 */

//! Pandoc availability command.
//!
//! Reports the discovered installation and version; exits nonzero when
//! pandoc is absent or below the requested minimum version, so scripts
//! can use this as an availability probe.

use anyhow::{Context, Result};

use rmdrender_core::PandocLocator;
use rmdrender_util::Version;

pub fn execute(min_version: Option<String>, rescan: bool) -> Result<()> {
    let locator = PandocLocator::global();

    if rescan {
        locator
            .locate(true)
            .context("Failed to rescan pandoc installations")?;
    }

    let min = min_version
        .map(|v| {
            v.parse::<Version>()
                .with_context(|| format!("Invalid minimum version '{}'", v))
        })
        .transpose()?;

    let location = locator.require_available(min.as_ref())?;
    println!("pandoc {} ({})", location.version, location.binary.display());
    Ok(())
}
