// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Record lookups against the document store.
//!
//! The pipeline only reads: it fetches a register entry and follows its references to the
//! laboratory, receipt, machine and approver documents. [`MemoryStore`] backs tests and the CLI.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Context as _, Error, ErrorKind};
use crate::mapper::CertificateBundle;
use crate::model::{
    Approval, ApproverUser, CorrectionFactorMachine, Laboratory, Receipt, RegisterEntry,
};

/// Collection names.
pub mod collections {
    pub const LABORATORIES: &str = "laboratories";
    pub const RECEIPTS: &str = "receipts";
    pub const REGISTER_ENTRIES: &str = "registerEntries";
    pub const MACHINES: &str = "machines";
    pub const USERS: &str = "users";
}

/// Read access to JSON documents keyed by collection and id.
pub trait DocumentStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<serde_json::Value>, Error>;
}

/// Fetches and deserializes one document.
pub fn fetch<T, S>(store: &S, collection: &str, id: &str) -> Result<Option<T>, Error>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    match store.get(collection, id)? {
        Some(doc) => serde_json::from_value(doc)
            .with_context(|| format!("Malformed document {}/{}", collection, id))
            .map(Some),
        None => Ok(None),
    }
}

/// In-memory document store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    docs: HashMap<(String, String), serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `doc` under `collection/id`, replacing any previous document.
    pub fn insert(
        &mut self,
        collection: impl Into<String>,
        id: impl Into<String>,
        doc: &impl Serialize,
    ) -> Result<(), Error> {
        let value = serde_json::to_value(doc).context("Failed to serialize document")?;
        self.docs.insert((collection.into(), id.into()), value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<serde_json::Value>, Error> {
        Ok(self
            .docs
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }
}

/// Collects every record a certificate for `entry_id` needs.
///
/// A missing register entry is an error. Missing laboratory or receipt documents become empty
/// records; a missing machine or approver is simply absent.
pub fn load_bundle<S>(store: &S, entry_id: &str) -> Result<CertificateBundle, Error>
where
    S: DocumentStore + ?Sized,
{
    let entry: RegisterEntry = fetch(store, collections::REGISTER_ENTRIES, entry_id)?
        .ok_or_else(|| {
            Error::new(
                format!("Register entry {} not found", entry_id),
                ErrorKind::InvalidData,
            )
        })?;

    let laboratory = match entry.laboratory_id.as_deref() {
        Some(id) => fetch::<Laboratory, _>(store, collections::LABORATORIES, id)?,
        None => None,
    };
    let receipt = match entry.receipt_id.as_deref() {
        Some(id) => fetch::<Receipt, _>(store, collections::RECEIPTS, id)?,
        None => None,
    };
    if laboratory.is_none() || receipt.is_none() {
        tracing::warn!(
            entry = entry_id,
            laboratory = laboratory.is_some(),
            receipt = receipt.is_some(),
            "certificate sources incomplete; using empty records"
        );
    }
    let machine = match entry.machine_id.as_deref() {
        Some(id) => fetch::<CorrectionFactorMachine, _>(store, collections::MACHINES, id)?,
        None => None,
    };
    let engineer = approver(store, entry.engineer_approval.as_ref())?;
    let manager = approver(store, entry.manager_approval.as_ref())?;

    Ok(CertificateBundle {
        laboratory: laboratory.unwrap_or_default(),
        receipt: receipt.unwrap_or_default(),
        entry,
        machine,
        engineer,
        manager,
    })
}

fn approver<S>(store: &S, approval: Option<&Approval>) -> Result<Option<ApproverUser>, Error>
where
    S: DocumentStore + ?Sized,
{
    match approval.and_then(|a| a.approver_id.as_deref()) {
        Some(id) => fetch(store, collections::USERS, id),
        None => Ok(None),
    }
}
