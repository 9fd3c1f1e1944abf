// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Renderer configuration.
//!
//! Defaults reproduce the certificate layout: A4 paper, half-inch margins, backgrounds printed,
//! one page rendered at a time. Values can come from a JSON file and be overridden from the
//! environment:
//!
//! | variable               | field                  |
//! |------------------------|------------------------|
//! | `LABCERT_CHROME_PATH`  | `chromePath`           |
//! | `LABCERT_MAX_PAGES`    | `maxConcurrentPages`   |
//! | `LABCERT_HEADLESS`     | `headless`             |
//! | `LABCERT_SANDBOX`      | `sandbox`              |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Context as _, Error, ErrorKind};

const MM_PER_INCH: f64 = 25.4;

/// Page margins in inches.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const fn uniform(inches: f64) -> Self {
        Self {
            top: inches,
            right: inches,
            bottom: inches,
            left: inches,
        }
    }
}

/// How the browser prints a certificate page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PdfPageOptions {
    /// Paper width in inches.
    pub paper_width: f64,
    /// Paper height in inches.
    pub paper_height: f64,
    pub margins: Margins,
    pub print_background: bool,
    pub landscape: bool,
}

impl PdfPageOptions {
    /// A4 portrait, 0.5 in margins, backgrounds on.
    pub fn a4() -> Self {
        Self {
            paper_width: 210.0 / MM_PER_INCH,
            paper_height: 297.0 / MM_PER_INCH,
            margins: Margins::uniform(0.5),
            print_background: true,
            landscape: false,
        }
    }

    /// Paper size in PDF points (1/72 in), `(width, height)`.
    pub fn size_in_points(&self) -> (f64, f64) {
        let (w, h) = (self.paper_width * 72.0, self.paper_height * 72.0);
        if self.landscape {
            (h, w)
        } else {
            (w, h)
        }
    }
}

impl Default for PdfPageOptions {
    fn default() -> Self {
        Self::a4()
    }
}

/// Settings for the headless browser and the page pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RendererConfig {
    /// Upper bound on pages rendering at the same time.
    pub max_concurrent_pages: usize,
    pub headless: bool,
    pub sandbox: bool,
    /// Browser executable; auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
    pub window_size: Option<(u32, u32)>,
    /// Seconds without browser traffic before the driver drops the connection.
    pub idle_browser_timeout_secs: u64,
    pub page: PdfPageOptions,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pages: 1,
            headless: true,
            sandbox: true,
            chrome_path: None,
            window_size: None,
            idle_browser_timeout_secs: 24 * 60 * 60,
            page: PdfPageOptions::a4(),
        }
    }
}

impl RendererConfig {
    /// Reads a JSON configuration file. Missing keys take their default.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read renderer config {}", path.display()))?;
        let config: RendererConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid renderer config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `LABCERT_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("LABCERT_CHROME_PATH").filter(|p| !p.trim().is_empty()) {
            self.chrome_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup("LABCERT_MAX_PAGES") {
            self.max_concurrent_pages = raw.trim().parse().map_err(|_| {
                Error::new(
                    format!("LABCERT_MAX_PAGES must be a positive integer, got {:?}", raw),
                    ErrorKind::InvalidData,
                )
            })?;
        }
        if let Some(raw) = lookup("LABCERT_HEADLESS") {
            self.headless = parse_flag("LABCERT_HEADLESS", &raw)?;
        }
        if let Some(raw) = lookup("LABCERT_SANDBOX") {
            self.sandbox = parse_flag("LABCERT_SANDBOX", &raw)?;
        }
        self.validate()
    }

    /// Rejects a zero page limit and non-positive paper or negative margins.
    pub fn validate(&self) -> Result<(), Error> {
        let mut problems = Vec::new();
        if self.max_concurrent_pages == 0 {
            problems.push("maxConcurrentPages must be at least 1".to_string());
        }
        if self.page.paper_width <= 0.0 || self.page.paper_height <= 0.0 {
            problems.push("paper size must be positive".to_string());
        }
        let m = self.page.margins;
        if [m.top, m.right, m.bottom, m.left].iter().any(|v| *v < 0.0) {
            problems.push("margins must not be negative".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::new(
                format!("Invalid renderer config: {}", problems.join("; ")),
                ErrorKind::Validation(problems),
            ))
        }
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, Error> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::new(
            format!("{} must be a boolean, got {:?}", name, raw),
            ErrorKind::InvalidData,
        )),
    }
}
