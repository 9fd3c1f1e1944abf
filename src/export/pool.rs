// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Bounded pool of page permits.
//!
//! Every render holds one permit for as long as its browser page is open, which caps the number
//! of pages the shared browser has to carry at once.

use std::sync::{Condvar, Mutex, MutexGuard};

use crate::error::{Error, ErrorKind};

/// Counting permit pool with a fixed limit.
#[derive(Debug)]
pub struct PagePool {
    limit: usize,
    in_use: Mutex<usize>,
    freed: Condvar,
}

impl PagePool {
    /// Creates a pool; a limit of zero is raised to one.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            in_use: Mutex::new(0),
            freed: Condvar::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits currently held.
    pub fn in_use(&self) -> usize {
        self.lock().map(|n| *n).unwrap_or(self.limit)
    }

    /// Blocks until a permit is free.
    pub fn acquire(&self) -> Result<PagePermit<'_>, Error> {
        let mut in_use = self.lock()?;
        while *in_use >= self.limit {
            in_use = self.freed.wait(in_use).map_err(|_| poisoned())?;
        }
        *in_use += 1;
        Ok(PagePermit { pool: self })
    }

    /// Takes a permit only if one is free right now.
    pub fn try_acquire(&self) -> Option<PagePermit<'_>> {
        let mut in_use = self.lock().ok()?;
        if *in_use >= self.limit {
            return None;
        }
        *in_use += 1;
        Some(PagePermit { pool: self })
    }

    fn lock(&self) -> Result<MutexGuard<'_, usize>, Error> {
        self.in_use.lock().map_err(|_| poisoned())
    }

    fn release(&self) {
        // a poisoned counter can only come from a panic while holding it; recover the value
        let mut in_use = match self.in_use.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *in_use = in_use.saturating_sub(1);
        drop(in_use);
        self.freed.notify_one();
    }
}

/// A held slot; returned to the pool on drop.
#[derive(Debug)]
pub struct PagePermit<'a> {
    pool: &'a PagePool,
}

impl Drop for PagePermit<'_> {
    fn drop(&mut self) {
        self.pool.release();
    }
}

fn poisoned() -> Error {
    Error::new("Page pool lock poisoned", ErrorKind::Internal)
}
