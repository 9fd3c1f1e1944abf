// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! PdfRenderer behaviour against a scripted in-process browser.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use labcert::config::{PdfPageOptions, RendererConfig};
use labcert::error::{Error, ErrorKind};
use labcert::export::{BrowserHandle, BrowserLauncher, PageHandle};
use labcert::{BrowserState, CertificateBundle, CertificateMapper, PdfRenderer};

#[derive(Default)]
struct Script {
    fail_launch: bool,
    fail_print: bool,
    launches: AtomicUsize,
    closed: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
    loaded: Mutex<Vec<String>>,
    printed_with: Mutex<Vec<PdfPageOptions>>,
}

struct Launcher(Arc<Script>);
struct Browser(Arc<Script>);
struct Page(Arc<Script>);

impl BrowserLauncher for Launcher {
    fn launch(&self, _: &RendererConfig) -> Result<Arc<dyn BrowserHandle>, Error> {
        self.0.launches.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_launch {
            return Err(Error::new(
                "Failed to start headless chrome: no binary",
                ErrorKind::BrowserLaunch("no binary".into()),
            ));
        }
        Ok(Arc::new(Browser(self.0.clone())))
    }
}

impl BrowserHandle for Browser {
    fn open_page(&self) -> Result<Box<dyn PageHandle>, Error> {
        let now = self.0.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.0.peak.fetch_max(now, Ordering::SeqCst);
        Ok(Box::new(Page(self.0.clone())))
    }
}

impl PageHandle for Page {
    fn load_html(&self, html: &str) -> Result<(), Error> {
        self.0.loaded.lock().unwrap().push(html.to_string());
        thread::sleep(Duration::from_millis(5));
        Ok(())
    }

    fn print_pdf(&self, options: &PdfPageOptions) -> Result<Vec<u8>, Error> {
        self.0.printed_with.lock().unwrap().push(options.clone());
        if self.0.fail_print {
            return Err(Error::new(
                "Failed to print PDF",
                ErrorKind::PdfPrint("printer on fire".into()),
            ));
        }
        Ok(b"%PDF-1.7\n%fake".to_vec())
    }

    fn close(&self) -> Result<(), Error> {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
        self.0.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn certificate() -> labcert::CertificateData {
    let bundle: CertificateBundle =
        serde_json::from_str(include_str!("data/bundle.json")).unwrap();
    CertificateMapper::new().map(bundle.sources()).unwrap()
}

fn renderer(script: Arc<Script>, max_pages: usize) -> PdfRenderer {
    let config = RendererConfig {
        max_concurrent_pages: max_pages,
        ..Default::default()
    };
    PdfRenderer::new(config, Launcher(script)).unwrap()
}

#[test]
fn pdf_path_loads_the_preview_html() {
    let script = Arc::new(Script::default());
    let r = renderer(script.clone(), 1);
    let data = certificate();

    let pdf = r.render_pdf(&data).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let loaded = script.loaded.lock().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], r.preview(&data).unwrap());
}

#[test]
fn prints_a4_with_half_inch_margins_and_backgrounds() {
    let script = Arc::new(Script::default());
    let r = renderer(script.clone(), 1);
    r.render_pdf(&certificate()).unwrap();

    let printed = script.printed_with.lock().unwrap();
    let options = &printed[0];
    assert!(options.print_background);
    assert!(!options.landscape);
    assert!((options.paper_width - 8.27).abs() < 0.01);
    assert!((options.paper_height - 11.69).abs() < 0.01);
    assert_eq!(options.margins.top, 0.5);
    assert_eq!(options.margins.left, 0.5);
}

#[test]
fn page_is_closed_when_printing_fails() {
    let script = Arc::new(Script {
        fail_print: true,
        ..Default::default()
    });
    let r = renderer(script.clone(), 1);

    let err = r.render_pdf(&certificate()).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::PdfPrint(_)));
    assert_eq!(script.closed.load(Ordering::SeqCst), 1);
    assert_eq!(script.active.load(Ordering::SeqCst), 0);
    assert_eq!(r.pool().in_use(), 0);
    // the browser itself stays up
    assert_eq!(r.state(), BrowserState::Running);
}

#[test]
fn launch_failure_leaves_renderer_uninitialized() {
    let script = Arc::new(Script {
        fail_launch: true,
        ..Default::default()
    });
    let r = renderer(script.clone(), 1);

    let err = r.render_pdf(&certificate()).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::BrowserLaunch(_)));
    assert_eq!(r.state(), BrowserState::Uninitialized);
    assert_eq!(r.pool().in_use(), 0);

    // no automatic retry inside a call; the next call tries again
    let _ = r.render_pdf(&certificate());
    assert_eq!(script.launches.load(Ordering::SeqCst), 2);
}

#[test]
fn state_machine_transitions() {
    let script = Arc::new(Script::default());
    let r = renderer(script.clone(), 1);
    assert_eq!(r.state(), BrowserState::Uninitialized);

    r.render_pdf(&certificate()).unwrap();
    assert_eq!(r.state(), BrowserState::Running);

    r.close().unwrap();
    assert_eq!(r.state(), BrowserState::Uninitialized);
    // closing twice is harmless
    r.close().unwrap();
    assert_eq!(script.launches.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_renders_respect_page_limit() {
    let script = Arc::new(Script::default());
    let r = Arc::new(renderer(script.clone(), 2));
    let data = Arc::new(certificate());

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let (r, data) = (r.clone(), data.clone());
            thread::spawn(move || r.render_pdf(&data).map(|pdf| pdf.len()))
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap().unwrap() > 0);
    }

    assert!(script.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(script.closed.load(Ordering::SeqCst), 6);
    assert_eq!(script.launches.load(Ordering::SeqCst), 1);
    assert_eq!(r.pool().in_use(), 0);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = RendererConfig {
        max_concurrent_pages: 0,
        ..Default::default()
    };
    let err = PdfRenderer::new(config, Launcher(Arc::new(Script::default()))).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Validation(_)));
}
