// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Test certificates for compressive-strength testing of concrete cubes, cylinders, paving
//! blocks and bricks.
//!
//! The crate turns the raw readings stored on a register entry into a printable certificate in
//! three steps:
//!
//! 1. [`calc`] derives area, density, corrected load and strength for each specimen and the
//!    batch average.
//! 2. [`mapper`] combines those metrics with the laboratory, receipt, machine and approver
//!    records into a [`CertificateData`].
//! 3. [`export`] populates the HTML [`Template`] for preview, or prints it to an A4 PDF with a
//!    shared headless browser (`pdf` feature, enabled by default).
//!
//! # Example
//!
//! ```
//! use labcert::model::{RegisterEntry, SampleTestResult};
//! use labcert::{CertificateBundle, CertificateMapper, SpecimenShape};
//!
//! let bundle = CertificateBundle {
//!     entry: RegisterEntry {
//!         shape: SpecimenShape::Cube,
//!         results: vec![SampleTestResult::new("C1")
//!             .with_dimensions(150.0, 150.0, 150.0)
//!             .with_weight(8.5)
//!             .with_load(450.0)],
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! let data = CertificateMapper::new().map(bundle.sources())?;
//! let html = labcert::export::preview(&data)?;
//! assert!(html.contains("One (01) concrete cubes"));
//! # Ok::<(), labcert::error::Error>(())
//! ```

#![warn(missing_debug_implementations, rust_2018_idioms)]

pub mod calc;
pub mod certificate;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod inspect;
pub mod mapper;
pub mod model;
pub mod narrative;
pub mod rows;
pub mod specimen;
pub mod store;
pub mod template;

pub use calc::{Calculator, Leniency};
pub use certificate::CertificateData;
pub use config::RendererConfig;
pub use error::{Error, ErrorKind};
pub use export::{BrowserState, PdfRenderer};
pub use mapper::{CertificateBundle, CertificateMapper};
pub use specimen::SpecimenShape;
pub use template::Template;
