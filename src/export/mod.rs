// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Certificate output: HTML preview and PDF export.
//!
//! Both paths go through [`render_html`], so a preview always shows exactly the HTML the browser
//! prints. PDF export runs on a shared headless browser that is started on first use and kept
//! until [`PdfRenderer::close`]. Each export takes a permit from a [`PagePool`], opens its own
//! page, loads the HTML, prints it and closes the page whether or not printing succeeded.
//!
//! The browser sits behind the [`BrowserLauncher`], [`BrowserHandle`] and [`PageHandle`] traits;
//! the `pdf` feature provides the headless Chrome implementation in [`chrome`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(feature = "pdf")]
use once_cell::sync::OnceCell;

use crate::certificate::CertificateData;
use crate::config::{PdfPageOptions, RendererConfig};
use crate::error::Error;
use crate::template::Template;

#[cfg(feature = "pdf")]
pub mod chrome;
mod pool;

pub use pool::{PagePermit, PagePool};

/// Populates `template` with `data`. Pure: equal inputs give byte-identical output.
pub fn render_html(template: &Template, data: &CertificateData) -> Result<String, Error> {
    template.populate(&data.fields())
}

/// HTML preview of `data` using the built-in certificate layout.
pub fn preview(data: &CertificateData) -> Result<String, Error> {
    render_html(&Template::certificate(), data)
}

/// Starts a browser.
pub trait BrowserLauncher: Send + Sync {
    fn launch(&self, config: &RendererConfig) -> Result<Arc<dyn BrowserHandle>, Error>;
}

/// A running browser that can open pages.
pub trait BrowserHandle: Send + Sync {
    fn open_page(&self) -> Result<Box<dyn PageHandle>, Error>;
}

/// One browser page, used by a single render.
pub trait PageHandle {
    /// Loads `html` and returns once the page has finished loading.
    fn load_html(&self, html: &str) -> Result<(), Error>;

    fn print_pdf(&self, options: &PdfPageOptions) -> Result<Vec<u8>, Error>;

    fn close(&self) -> Result<(), Error>;
}

/// Lifecycle of the shared browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowserState {
    Uninitialized,
    Running,
}

/// Closes its page when dropped.
struct PageGuard {
    page: Box<dyn PageHandle>,
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        match self.page.close() {
            Ok(()) => tracing::debug!("page closed"),
            Err(e) => tracing::warn!(error = %e, "failed to close page"),
        }
    }
}

/// Renders certificates to PDF on a shared browser.
pub struct PdfRenderer {
    config: RendererConfig,
    launcher: Box<dyn BrowserLauncher>,
    browser: Mutex<Option<Arc<dyn BrowserHandle>>>,
    pool: PagePool,
    template: Template,
}

impl fmt::Debug for PdfRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfRenderer")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("pool", &self.pool)
            .finish()
    }
}

#[cfg(feature = "pdf")]
static GLOBAL: OnceCell<PdfRenderer> = OnceCell::new();

impl PdfRenderer {
    /// Creates a renderer; the browser is not started until the first export.
    pub fn new(config: RendererConfig, launcher: impl BrowserLauncher + 'static) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            pool: PagePool::new(config.max_concurrent_pages),
            config,
            launcher: Box::new(launcher),
            browser: Mutex::new(None),
            template: Template::certificate(),
        })
    }

    /// A renderer backed by headless Chrome.
    #[cfg(feature = "pdf")]
    pub fn chrome(config: RendererConfig) -> Result<Self, Error> {
        Self::new(config, chrome::ChromeLauncher)
    }

    /// The process-wide renderer, configured from the environment on first call.
    #[cfg(feature = "pdf")]
    pub fn global() -> Result<&'static PdfRenderer, Error> {
        GLOBAL.get_or_try_init(|| Self::chrome(RendererConfig::from_env()?))
    }

    /// Replaces the built-in certificate layout.
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn pool(&self) -> &PagePool {
        &self.pool
    }

    pub fn state(&self) -> BrowserState {
        if self.lock_browser().is_some() {
            BrowserState::Running
        } else {
            BrowserState::Uninitialized
        }
    }

    /// HTML preview with this renderer's template.
    pub fn preview(&self, data: &CertificateData) -> Result<String, Error> {
        render_html(&self.template, data)
    }

    /// Renders `data` to PDF bytes.
    pub fn render_pdf(&self, data: &CertificateData) -> Result<Vec<u8>, Error> {
        let html = self.preview(data)?;
        tracing::info!(
            certificate = %data.certificate_no,
            specimens = data.results.len(),
            "rendering certificate PDF"
        );
        let pdf = self.render_html_to_pdf(&html)?;
        tracing::info!(
            certificate = %data.certificate_no,
            bytes = pdf.len(),
            "certificate PDF rendered"
        );
        Ok(pdf)
    }

    /// Prints already-populated HTML.
    pub fn render_html_to_pdf(&self, html: &str) -> Result<Vec<u8>, Error> {
        let _permit = self.pool.acquire()?;
        let browser = self.browser()?;

        tracing::debug!("opening page");
        let page = PageGuard {
            page: browser.open_page().map_err(|e| log_stage("open page", e))?,
        };

        tracing::debug!(html_bytes = html.len(), "loading certificate HTML");
        page.page
            .load_html(html)
            .map_err(|e| log_stage("load content", e))?;

        tracing::debug!("printing page");
        let pdf = page
            .page
            .print_pdf(&self.config.page)
            .map_err(|e| log_stage("print PDF", e))?;
        Ok(pdf)
    }

    /// Drops the shared browser. The next export starts a new one.
    pub fn close(&self) -> Result<(), Error> {
        let mut slot = self.lock_browser();
        if slot.take().is_some() {
            tracing::info!("headless browser shut down");
        }
        Ok(())
    }

    fn browser(&self) -> Result<Arc<dyn BrowserHandle>, Error> {
        let mut slot = self.lock_browser();
        if let Some(browser) = slot.as_ref() {
            return Ok(browser.clone());
        }
        tracing::info!(headless = self.config.headless, "starting headless browser");
        let browser = self
            .launcher
            .launch(&self.config)
            .map_err(|e| log_stage("launch browser", e))?;
        *slot = Some(browser.clone());
        Ok(browser)
    }

    // the slot only ever holds a fully launched handle, so a panic elsewhere cannot leave it
    // half written
    fn lock_browser(&self) -> MutexGuard<'_, Option<Arc<dyn BrowserHandle>>> {
        match self.browser.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn log_stage(stage: &str, err: Error) -> Error {
    tracing::error!(stage, error = %err, "certificate export failed");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        launches: AtomicUsize,
        opened: AtomicUsize,
        closed: AtomicUsize,
    }

    struct FakeLauncher(Arc<Counters>);
    struct FakeBrowser(Arc<Counters>);
    struct FakePage(Arc<Counters>);

    impl BrowserLauncher for FakeLauncher {
        fn launch(&self, _: &RendererConfig) -> Result<Arc<dyn BrowserHandle>, Error> {
            self.0.launches.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FakeBrowser(self.0.clone())))
        }
    }

    impl BrowserHandle for FakeBrowser {
        fn open_page(&self) -> Result<Box<dyn PageHandle>, Error> {
            self.0.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakePage(self.0.clone())))
        }
    }

    impl PageHandle for FakePage {
        fn load_html(&self, html: &str) -> Result<(), Error> {
            if html.contains("FAIL") {
                return Err(Error::new("load failed", ErrorKind::PageLoad("fake".into())));
            }
            Ok(())
        }

        fn print_pdf(&self, _: &PdfPageOptions) -> Result<Vec<u8>, Error> {
            Ok(b"%PDF-1.4 fake".to_vec())
        }

        fn close(&self) -> Result<(), Error> {
            self.0.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn renderer() -> (PdfRenderer, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let r = PdfRenderer::new(RendererConfig::default(), FakeLauncher(counters.clone())).unwrap();
        (r, counters)
    }

    #[test]
    fn browser_starts_lazily_and_is_reused() {
        let (r, c) = renderer();
        assert_eq!(r.state(), BrowserState::Uninitialized);
        r.render_html_to_pdf("<p>a</p>").unwrap();
        r.render_html_to_pdf("<p>b</p>").unwrap();
        assert_eq!(r.state(), BrowserState::Running);
        assert_eq!(c.launches.load(Ordering::SeqCst), 1);
        assert_eq!(c.opened.load(Ordering::SeqCst), 2);
        assert_eq!(c.closed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn page_is_closed_when_loading_fails() {
        let (r, c) = renderer();
        let err = r.render_html_to_pdf("FAIL").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::PageLoad(_)));
        assert_eq!(c.closed.load(Ordering::SeqCst), 1);
        assert_eq!(r.pool().in_use(), 0);
    }

    #[test]
    fn poisoned_lock_keeps_the_running_browser() {
        let (r, c) = renderer();
        r.render_html_to_pdf("<p>a</p>").unwrap();
        std::thread::scope(|s| {
            let holder = s.spawn(|| {
                let _slot = r.browser.lock().unwrap();
                panic!("panic while holding the browser slot");
            });
            assert!(holder.join().is_err());
        });
        assert!(r.browser.is_poisoned());

        assert_eq!(r.state(), BrowserState::Running);
        r.render_html_to_pdf("<p>b</p>").unwrap();
        assert_eq!(c.launches.load(Ordering::SeqCst), 1);
        r.close().unwrap();
        assert_eq!(r.state(), BrowserState::Uninitialized);
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn global_renderer_is_built_once_from_the_environment() {
        let first = PdfRenderer::global().unwrap();
        let second = PdfRenderer::global().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.state(), BrowserState::Uninitialized);
        assert_eq!(first.config(), &RendererConfig::from_env().unwrap());
    }

    #[test]
    fn close_returns_to_uninitialized() {
        let (r, c) = renderer();
        r.render_html_to_pdf("<p>a</p>").unwrap();
        r.close().unwrap();
        assert_eq!(r.state(), BrowserState::Uninitialized);
        r.render_html_to_pdf("<p>a</p>").unwrap();
        assert_eq!(c.launches.load(Ordering::SeqCst), 2);
    }
}
