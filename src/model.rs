// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Records read from the document store.
//!
//! These mirror the persisted laboratory, receipt, register-entry, machine and user documents.
//! Every field a certificate can live without is optional so that incomplete records still
//! deserialize; defaulting happens in the mapper, not here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::specimen::SpecimenShape;

/// Raw readings for one specimen (mm, kg, kN).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleTestResult {
    #[serde(default)]
    pub sample_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Failure load as read from the testing machine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<f64>,
    /// Failure load after the machine correction, when computed upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_failure_load: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_of_failure: Option<String>,
    /// Loaded plan area of a paver (mm²), measured upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_plan_area: Option<f64>,
    /// Per-specimen casting date; the entry's date applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_casting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_testing: Option<String>,
}

impl SampleTestResult {
    /// Creates a result with only the sample identifier set.
    pub fn new(sample_id: impl Into<String>) -> Self {
        Self {
            sample_id: sample_id.into(),
            ..Default::default()
        }
    }

    /// Sets length, width and height (mm).
    pub fn with_dimensions(mut self, length: f64, width: f64, height: f64) -> Self {
        self.length = Some(length);
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Sets the paver thickness (mm) and plan area (mm²).
    pub fn with_paver_geometry(mut self, thickness: f64, plan_area: f64) -> Self {
        self.thickness = Some(thickness);
        self.computed_plan_area = Some(plan_area);
        self
    }

    /// Sets the specimen weight (kg).
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Sets the raw failure load (kN).
    pub fn with_load(mut self, load: f64) -> Self {
        self.load = Some(load);
        self
    }

    /// Sets the mode of failure.
    pub fn with_mode_of_failure(mut self, mode: impl Into<String>) -> Self {
        self.mode_of_failure = Some(mode.into());
        self
    }
}

/// Linear load calibration of one compression machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionFactorMachine {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag_id: String,
    #[serde(default)]
    pub factor_m: Option<f64>,
    #[serde(default)]
    pub factor_c: Option<f64>,
}

impl CorrectionFactorMachine {
    /// Whether both calibration factors are recorded.
    pub fn is_calibrated(&self) -> bool {
        self.factor_m.is_some() && self.factor_c.is_some()
    }

    /// Applies `load * m + c`, or `None` for an uncalibrated machine.
    pub fn correct(&self, load: f64) -> Option<f64> {
        Some(load * self.factor_m? + self.factor_c?)
    }
}

/// Workflow status of a register entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterStatus {
    #[default]
    #[serde(rename = "Pending Test")]
    PendingTest,
    #[serde(rename = "Pending Initial Approval")]
    PendingInitialApproval,
    #[serde(rename = "Pending Final Approval")]
    PendingFinalApproval,
    #[serde(rename = "Approved")]
    Approved,
    #[serde(rename = "Rejected")]
    Rejected,
}

impl RegisterStatus {
    /// Human readable label, identical to the persisted value.
    pub const fn label(&self) -> &'static str {
        match self {
            RegisterStatus::PendingTest => "Pending Test",
            RegisterStatus::PendingInitialApproval => "Pending Initial Approval",
            RegisterStatus::PendingFinalApproval => "Pending Final Approval",
            RegisterStatus::Approved => "Approved",
            RegisterStatus::Rejected => "Rejected",
        }
    }

    pub const fn is_approved(&self) -> bool {
        matches!(self, RegisterStatus::Approved)
    }
}

impl fmt::Display for RegisterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sign-off recorded on a register entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    #[serde(default)]
    pub approver_id: Option<String>,
    /// Name stored at approval time; preferred over the user lookup.
    #[serde(default)]
    pub approver_name: Option<String>,
    /// ISO-8601 timestamp of the approval.
    #[serde(default)]
    pub approved_at: Option<String>,
}

/// One batch of specimens submitted for a test.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub shape: SpecimenShape,
    #[serde(default)]
    pub results: Vec<SampleTestResult>,
    #[serde(default)]
    pub status: RegisterStatus,
    #[serde(default)]
    pub laboratory_id: Option<String>,
    #[serde(default)]
    pub receipt_id: Option<String>,
    #[serde(default)]
    pub machine_id: Option<String>,
    #[serde(default)]
    pub certificate_no: Option<String>,
    #[serde(default)]
    pub date_of_issue: Option<String>,
    #[serde(default)]
    pub date_of_casting: Option<String>,
    #[serde(default)]
    pub date_of_testing: Option<String>,
    /// Concrete class, paver type or brick type depending on the shape.
    #[serde(default)]
    pub product_class: Option<String>,
    #[serde(default)]
    pub structure_element: Option<String>,
    #[serde(default)]
    pub curing_condition: Option<String>,
    #[serde(default)]
    pub test_method: Option<String>,
    #[serde(default)]
    pub sampling_report: Option<String>,
    #[serde(default)]
    pub attachments: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub engineer_approval: Option<Approval>,
    #[serde(default)]
    pub manager_approval: Option<Approval>,
}

/// Postal address sub-document of a laboratory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl PostalAddress {
    /// Joins the non-empty parts with ", ".
    pub fn single_line(&self) -> String {
        [&self.street, &self.city, &self.postal_code, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulatoryInfo {
    #[serde(default)]
    pub accreditation_no: Option<String>,
    #[serde(default)]
    pub registration_no: Option<String>,
}

/// Laboratory issuing the certificate.
///
/// Older records carry flat `name`/`address`/`email`/`logoUrl` fields, newer ones the structured
/// sub-documents. Flat fields win when both are present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Laboratory {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub company: Option<CompanyInfo>,
    #[serde(default)]
    pub postal_address: Option<PostalAddress>,
    #[serde(default)]
    pub contact: Option<ContactInfo>,
    #[serde(default)]
    pub regulatory: Option<RegulatoryInfo>,
}

/// Sample receipt issued to the client when specimens arrive.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(default)]
    pub receipt_no: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_address: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub project_location: Option<String>,
    #[serde(default)]
    pub date_received: Option<String>,
    #[serde(default)]
    pub sampled_by: Option<String>,
}

/// User record looked up for an approver.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproverUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub signature_url: Option<String>,
}
