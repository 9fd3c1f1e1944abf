// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! End-to-end export through a real headless Chrome. Skipped when no browser can be started.

#![cfg(feature = "pdf")]

use labcert::error::ErrorKind;
use labcert::{BrowserState, CertificateBundle, CertificateMapper, PdfRenderer, RendererConfig};

#[test]
fn renders_a4_certificate() {
    let bundle: CertificateBundle =
        serde_json::from_str(include_str!("data/bundle.json")).unwrap();
    let data = CertificateMapper::new().map(bundle.sources()).unwrap();

    let mut config = RendererConfig::default();
    config.apply_env(|key| std::env::var(key).ok()).unwrap();
    let renderer = PdfRenderer::chrome(config).unwrap();

    let pdf = match renderer.render_pdf(&data) {
        Ok(pdf) => pdf,
        Err(e) if matches!(e.kind(), ErrorKind::BrowserLaunch(_)) => {
            eprintln!("skipping: {}", e);
            return;
        }
        Err(e) => panic!("render failed: {}", e),
    };
    assert_eq!(renderer.state(), BrowserState::Running);

    let boxes = labcert::inspect::page_boxes(&pdf).unwrap();
    assert!(!boxes.is_empty());
    // A4 is 595.28 x 841.89 pt; Chrome rounds to whole points
    assert!((boxes[0].width - 595.28).abs() < 1.0, "width {}", boxes[0].width);
    assert!((boxes[0].height - 841.89).abs() < 1.0, "height {}", boxes[0].height);

    renderer.close().unwrap();
    assert_eq!(renderer.state(), BrowserState::Uninitialized);
}
