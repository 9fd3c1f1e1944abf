// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Assembles a [`CertificateData`] from laboratory, receipt, register-entry, machine and approver
//! records.
//!
//! One mapper serves every [`SpecimenShape`](crate::specimen::SpecimenShape); the shape carried by
//! the register entry selects the geometric columns and labels.

use serde::{Deserialize, Serialize};

use crate::calc::{Calculator, Leniency};
use crate::certificate::{
    CertificateData, ClientDetails, CompanyIdentity, Signature, FIRST_VERSION, UNKNOWN_SIGNATORY,
};
use crate::error::Error;
use crate::format::{age_in_days, display_date};
use crate::model::{
    Approval, ApproverUser, CorrectionFactorMachine, Laboratory, Receipt, RegisterEntry,
};
use crate::narrative::sample_description;

/// Borrowed view of everything one certificate is built from.
#[derive(Clone, Copy, Debug)]
pub struct CertificateSources<'a> {
    pub laboratory: &'a Laboratory,
    pub receipt: &'a Receipt,
    pub entry: &'a RegisterEntry,
    pub machine: Option<&'a CorrectionFactorMachine>,
    pub engineer: Option<&'a ApproverUser>,
    pub manager: Option<&'a ApproverUser>,
}

/// Owned, serializable set of source records, as exchanged with the CLI.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateBundle {
    #[serde(default)]
    pub laboratory: Laboratory,
    #[serde(default)]
    pub receipt: Receipt,
    pub entry: RegisterEntry,
    #[serde(default)]
    pub machine: Option<CorrectionFactorMachine>,
    #[serde(default)]
    pub engineer: Option<ApproverUser>,
    #[serde(default)]
    pub manager: Option<ApproverUser>,
}

impl CertificateBundle {
    pub fn sources(&self) -> CertificateSources<'_> {
        CertificateSources {
            laboratory: &self.laboratory,
            receipt: &self.receipt,
            entry: &self.entry,
            machine: self.machine.as_ref(),
            engineer: self.engineer.as_ref(),
            manager: self.manager.as_ref(),
        }
    }
}

/// Builds certificate data; see the module documentation.
#[derive(Clone, Copy, Debug, Default)]
pub struct CertificateMapper {
    leniency: Leniency,
}

impl CertificateMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leniency(mut self, leniency: Leniency) -> Self {
        self.leniency = leniency;
        self
    }

    /// Maps the sources into a fresh [`CertificateData`].
    ///
    /// Only fails in [`Leniency::Strict`] mode, when readings are missing.
    pub fn map(&self, src: CertificateSources<'_>) -> Result<CertificateData, Error> {
        let entry = src.entry;
        let shape = entry.shape;

        if !src.machine.map_or(false, |m| m.is_calibrated())
            && entry
                .results
                .iter()
                .any(|r| r.corrected_failure_load.is_none())
        {
            tracing::warn!(
                entry = %entry.id,
                "no machine calibration; applying legacy correction factor"
            );
        }

        let batch = Calculator::new(shape)
            .with_machine(src.machine)
            .with_leniency(self.leniency)
            .batch(&entry.results)?;

        let casting = batch_date(
            entry.results.iter().map(|r| r.date_of_casting.as_deref()),
            entry.date_of_casting.as_deref(),
        );
        let testing = batch_date(
            entry.results.iter().map(|r| r.date_of_testing.as_deref()),
            entry.date_of_testing.as_deref(),
        );

        let data = CertificateData {
            shape,
            company: company_identity(src.laboratory),
            certificate_no: text(&entry.certificate_no),
            date_of_issue: date(&entry.date_of_issue),
            version: FIRST_VERSION.to_string(),
            client: client_details(src.receipt),
            sample_description: sample_description(entry.results.len(), shape),
            product_class: text(&entry.product_class),
            structure_element: text(&entry.structure_element),
            test_method: entry
                .test_method
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(shape.test_method())
                .to_string(),
            machine_id: machine_label(src.machine, entry),
            curing_condition: entry.curing_condition.clone(),
            sampling_report: entry.sampling_report.clone(),
            attachments: entry.attachments.clone(),
            remarks: text(&entry.remarks),
            results: batch.specimens,
            date_of_casting: display_date(casting),
            date_of_testing: display_date(testing),
            age_at_test: age_in_days(casting, testing)
                .map(|d| d.to_string())
                .unwrap_or_default(),
            average_compressive_strength: batch.average_strength,
            engineer: signature(
                "Tested by (Engineer)",
                entry.engineer_approval.as_ref(),
                src.engineer,
            ),
            manager: signature(
                "Approved by (Manager)",
                entry.manager_approval.as_ref(),
                src.manager,
            ),
            draft_status: (!entry.status.is_approved()).then(|| entry.status.label().to_string()),
        };

        tracing::debug!(
            entry = %entry.id,
            shape = %shape,
            specimens = data.results.len(),
            average = %data.average_compressive_strength,
            "mapped certificate data"
        );
        Ok(data)
    }
}

/// Resolves a signatory name: stored approver name, then user name, then user email, then
/// `"N/A"`.
pub fn signatory_name(approval: Option<&Approval>, user: Option<&ApproverUser>) -> String {
    first_non_empty([
        approval.and_then(|a| a.approver_name.as_deref()),
        user.and_then(|u| u.name.as_deref()),
        user.and_then(|u| u.email.as_deref()),
    ])
    .unwrap_or(UNKNOWN_SIGNATORY)
    .to_string()
}

fn signature(role: &str, approval: Option<&Approval>, user: Option<&ApproverUser>) -> Signature {
    Signature {
        role: role.to_string(),
        name: signatory_name(approval, user),
        signature_url: user
            .and_then(|u| u.signature_url.as_deref())
            .filter(|u| !u.trim().is_empty())
            .map(str::to_string),
        approved_on: approval
            .and_then(|a| a.approved_at.as_deref())
            .filter(|d| !d.trim().is_empty())
            .map(display_date),
    }
}

fn company_identity(lab: &Laboratory) -> CompanyIdentity {
    let company = lab.company.as_ref();
    let contact = lab.contact.as_ref();
    let regulatory = lab.regulatory.as_ref();
    let structured_address = lab
        .postal_address
        .as_ref()
        .map(|a| a.single_line())
        .unwrap_or_default();

    CompanyIdentity {
        name: pick([lab.name.as_deref(), company.and_then(|c| c.name.as_deref())]),
        address: pick([lab.address.as_deref(), Some(structured_address.as_str())]),
        email: pick([lab.email.as_deref(), contact.and_then(|c| c.email.as_deref())]),
        phone: pick([contact.and_then(|c| c.phone.as_deref())]),
        website: pick([contact.and_then(|c| c.website.as_deref())]),
        logo_url: pick([
            lab.logo_url.as_deref(),
            company.and_then(|c| c.logo_url.as_deref()),
        ]),
        accreditation_no: pick([
            regulatory.and_then(|r| r.accreditation_no.as_deref()),
            regulatory.and_then(|r| r.registration_no.as_deref()),
        ]),
    }
}

fn client_details(receipt: &Receipt) -> ClientDetails {
    ClientDetails {
        name: text(&receipt.client_name),
        address: text(&receipt.client_address),
        contact_person: text(&receipt.contact_person),
        project_name: text(&receipt.project_name),
        project_location: text(&receipt.project_location),
        receipt_no: text(&receipt.receipt_no),
        date_received: date(&receipt.date_received),
        sampled_by: text(&receipt.sampled_by),
    }
}

fn machine_label(machine: Option<&CorrectionFactorMachine>, entry: &RegisterEntry) -> String {
    first_non_empty([
        machine.map(|m| m.tag_id.as_str()),
        machine.map(|m| m.name.as_str()),
        entry.machine_id.as_deref(),
    ])
    .unwrap_or_default()
    .to_string()
}

/// Date shown in the batch-wide rowspan cell: the first specimen that records one, else the
/// entry's own date.
fn batch_date<'a>(
    specimens: impl IntoIterator<Item = Option<&'a str>>,
    entry: Option<&'a str>,
) -> &'a str {
    specimens
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|d| !d.is_empty())
        .or(entry)
        .unwrap_or_default()
}

fn first_non_empty<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn pick<const N: usize>(candidates: [Option<&str>; N]) -> String {
    first_non_empty(candidates).unwrap_or_default().to_string()
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn date(value: &Option<String>) -> String {
    value.as_deref().map(display_date).unwrap_or_default()
}
