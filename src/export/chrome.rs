// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Headless Chrome backend.
//!
//! Each page writes its HTML to a file in the temp directory and navigates to it with a
//! `file://` URL. The file is removed when the page closes.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};

use super::{BrowserHandle, BrowserLauncher, PageHandle};
use crate::config::{PdfPageOptions, RendererConfig};
use crate::error::{Error, ErrorKind};

static PAGE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Launches Chrome from a [`RendererConfig`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ChromeLauncher;

impl BrowserLauncher for ChromeLauncher {
    fn launch(&self, config: &RendererConfig) -> Result<Arc<dyn BrowserHandle>, Error> {
        let options = LaunchOptionsBuilder::default()
            .headless(config.headless)
            .sandbox(config.sandbox)
            .path(config.chrome_path.clone())
            .window_size(config.window_size)
            .idle_browser_timeout(Duration::from_secs(config.idle_browser_timeout_secs))
            .build()
            .map_err(|e| {
                Error::new(
                    format!("Invalid browser launch options: {}", e),
                    ErrorKind::BrowserLaunch(e.to_string()),
                )
            })?;
        let browser = Browser::new(options).map_err(|e| {
            Error::new(
                format!("Failed to start headless chrome: {}", e),
                ErrorKind::BrowserLaunch(e.to_string()),
            )
        })?;
        Ok(Arc::new(ChromeBrowser { browser }))
    }
}

/// A running Chrome instance.
pub struct ChromeBrowser {
    browser: Browser,
}

impl fmt::Debug for ChromeBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromeBrowser")
            .field("pid", &self.browser.get_process_id())
            .finish()
    }
}

impl BrowserHandle for ChromeBrowser {
    fn open_page(&self) -> Result<Box<dyn PageHandle>, Error> {
        let tab = self.browser.new_tab().map_err(|e| {
            Error::new(
                format!("Failed to open tab: {}", e),
                ErrorKind::PageLoad(e.to_string()),
            )
        })?;
        let file = std::env::temp_dir().join(format!(
            "labcert_{}_{}.html",
            std::process::id(),
            PAGE_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        Ok(Box::new(ChromePage { tab, file }))
    }
}

/// One Chrome tab and the temp file holding its HTML.
pub struct ChromePage {
    tab: Arc<Tab>,
    file: PathBuf,
}

impl fmt::Debug for ChromePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromePage").field("file", &self.file).finish()
    }
}

impl PageHandle for ChromePage {
    fn load_html(&self, html: &str) -> Result<(), Error> {
        std::fs::write(&self.file, html).map_err(|e| {
            Error::new(
                format!("Failed to write page to {}: {}", self.file.display(), e),
                ErrorKind::PageLoad(e.to_string()),
            )
        })?;
        let path = self.file.canonicalize().unwrap_or_else(|_| self.file.clone());
        self.tab
            .navigate_to(&format!("file://{}", path.display()))
            .map_err(|e| {
                Error::new(
                    format!("Failed to navigate: {}", e),
                    ErrorKind::PageLoad(e.to_string()),
                )
            })?;
        self.tab.wait_until_navigated().map_err(|e| {
            Error::new(
                format!("Navigation error: {}", e),
                ErrorKind::PageLoad(e.to_string()),
            )
        })?;
        Ok(())
    }

    fn print_pdf(&self, options: &PdfPageOptions) -> Result<Vec<u8>, Error> {
        let print = PrintToPdfOptions {
            landscape: Some(options.landscape),
            print_background: Some(options.print_background),
            paper_width: Some(options.paper_width),
            paper_height: Some(options.paper_height),
            margin_top: Some(options.margins.top),
            margin_bottom: Some(options.margins.bottom),
            margin_left: Some(options.margins.left),
            margin_right: Some(options.margins.right),
            ..Default::default()
        };
        self.tab.print_to_pdf(Some(print)).map_err(|e| {
            Error::new(
                format!("Failed to print PDF: {}", e),
                ErrorKind::PdfPrint(e.to_string()),
            )
        })
    }

    fn close(&self) -> Result<(), Error> {
        let removed = std::fs::remove_file(&self.file);
        self.tab.close(false).map_err(|e| {
            Error::new(format!("Failed to close tab: {}", e), ErrorKind::Internal)
        })?;
        match removed {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(Error::new(
                format!("Failed to remove {}: {}", self.file.display(), e),
                e,
            )),
            _ => Ok(()),
        }
    }
}
