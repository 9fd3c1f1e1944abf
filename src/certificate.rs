// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! The resolved, template-ready view of one certificate.
//!
//! A [`CertificateData`] is built fresh for every render by [`crate::mapper`] and is never
//! persisted. [`CertificateData::fields`] flattens it into the placeholder map consumed by
//! [`crate::template::Template`].

use crate::calc::SpecimenMetrics;
use crate::rows;
use crate::specimen::SpecimenShape;
use crate::template::{FieldValue, Fields};

/// Shown when no attachments are listed.
pub const DEFAULT_ATTACHMENTS: &str = "None";
/// Shown when no sampling report is referenced.
pub const DEFAULT_SAMPLING_REPORT: &str = "N/A";
/// Shown when the curing condition was not recorded.
pub const DEFAULT_CURING_CONDITION: &str = "Tested as Received";
/// Version of a first-generation certificate.
pub const FIRST_VERSION: &str = "01";
/// Name shown when no approver can be resolved.
pub const UNKNOWN_SIGNATORY: &str = "N/A";

/// Identity of the issuing laboratory. Every field defaults to the empty string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompanyIdentity {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub logo_url: String,
    pub accreditation_no: String,
}

/// Client and project the specimens were received from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientDetails {
    pub name: String,
    pub address: String,
    pub contact_person: String,
    pub project_name: String,
    pub project_location: String,
    pub receipt_no: String,
    pub date_received: String,
    pub sampled_by: String,
}

/// A label/value line of the test-conditions block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionField {
    pub label: String,
    pub value: String,
}

impl ConditionField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A signatory block at the foot of the certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub role: String,
    pub name: String,
    pub signature_url: Option<String>,
    /// Approval date, already formatted for display.
    pub approved_on: Option<String>,
}

impl Signature {
    /// A block with no resolvable approver.
    pub fn unsigned(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: UNKNOWN_SIGNATORY.to_string(),
            signature_url: None,
            approved_on: None,
        }
    }
}

/// Everything a certificate template needs.
#[derive(Clone, Debug, PartialEq)]
pub struct CertificateData {
    pub shape: SpecimenShape,
    pub company: CompanyIdentity,
    pub certificate_no: String,
    pub date_of_issue: String,
    pub version: String,
    pub client: ClientDetails,
    pub sample_description: String,
    pub product_class: String,
    pub structure_element: String,
    pub test_method: String,
    pub machine_id: String,
    pub curing_condition: Option<String>,
    pub sampling_report: Option<String>,
    pub attachments: Option<String>,
    pub remarks: String,
    pub results: Vec<SpecimenMetrics>,
    pub date_of_casting: String,
    pub date_of_testing: String,
    /// Age at test in days, empty when the dates are unknown.
    pub age_at_test: String,
    pub average_compressive_strength: String,
    pub engineer: Signature,
    pub manager: Signature,
    /// Register status label when the entry is not yet approved.
    pub draft_status: Option<String>,
}

impl CertificateData {
    /// The test-condition lines in display order, with literal fallbacks applied.
    pub fn conditions(&self) -> Vec<ConditionField> {
        let mut out = vec![
            ConditionField::new("Test Method", &self.test_method),
            ConditionField::new(self.shape.product_label(), &self.product_class),
            ConditionField::new("Curing Condition", self.curing_condition()),
            ConditionField::new("Machine ID", &self.machine_id),
            ConditionField::new("Sampling Report", self.sampling_report()),
            ConditionField::new("Date Received", &self.client.date_received),
        ];
        if !self.structure_element.is_empty() {
            out.push(ConditionField::new(
                "Structure/Element",
                &self.structure_element,
            ));
        }
        if !self.age_at_test.is_empty() {
            out.push(ConditionField::new("Age at Test (days)", &self.age_at_test));
        }
        out
    }

    pub fn curing_condition(&self) -> &str {
        non_empty_or(&self.curing_condition, DEFAULT_CURING_CONDITION)
    }

    pub fn sampling_report(&self) -> &str {
        non_empty_or(&self.sampling_report, DEFAULT_SAMPLING_REPORT)
    }

    pub fn attachments(&self) -> &str {
        non_empty_or(&self.attachments, DEFAULT_ATTACHMENTS)
    }

    /// Flattens the certificate into `{{token}}` values.
    ///
    /// Plain values are escaped when substituted; the generated table and signature fragments
    /// are inserted as markup.
    pub fn fields(&self) -> Fields {
        let mut f = Fields::new();
        let company = &self.company;
        let client = &self.client;

        f.text("certificateTitle", self.shape.certificate_title());
        f.text("companyName", &company.name);
        f.text("companyAddress", &company.address);
        f.text("companyEmail", &company.email);
        f.text("companyPhone", &company.phone);
        f.text("companyWebsite", &company.website);
        f.text("companyLogo", &company.logo_url);
        f.text("accreditationNo", &company.accreditation_no);

        f.text("certificateNo", &self.certificate_no);
        f.text("dateOfIssue", &self.date_of_issue);
        f.text("version", &self.version);

        f.text("clientName", &client.name);
        f.text("clientAddress", &client.address);
        f.text("contactPerson", &client.contact_person);
        f.text("projectName", &client.project_name);
        f.text("projectLocation", &client.project_location);
        f.text("receiptNo", &client.receipt_no);
        f.text("dateReceived", &client.date_received);
        f.text("sampledBy", &client.sampled_by);

        f.text("sampleDescription", &self.sample_description);
        f.text("sampleCount", self.results.len().to_string());
        f.text("productLabel", self.shape.product_label());
        f.text("productClass", &self.product_class);
        f.text("structureElement", &self.structure_element);
        f.text("testMethod", &self.test_method);
        f.text("machineId", &self.machine_id);
        f.text("curingCondition", self.curing_condition());
        f.text("samplingReport", self.sampling_report());
        f.text("attachments", self.attachments());
        f.text("remarks", &self.remarks);

        f.text("dateOfCasting", &self.date_of_casting);
        f.text("dateOfTesting", &self.date_of_testing);
        f.text("ageAtTest", &self.age_at_test);
        f.text(
            "averageCompressiveStrength",
            &self.average_compressive_strength,
        );

        f.insert(
            "conditionRows",
            FieldValue::Markup(rows::condition_rows(&self.conditions())),
        );
        f.insert(
            "resultHeader",
            FieldValue::Markup(rows::result_header(self.shape)),
        );
        f.insert(
            "resultRows",
            FieldValue::Markup(rows::result_rows(
                self.shape,
                &self.results,
                &self.date_of_casting,
                &self.date_of_testing,
            )),
        );
        f.insert(
            "signatures",
            FieldValue::Markup(rows::signature_blocks(&[&self.engineer, &self.manager])),
        );

        f.text("engineerName", &self.engineer.name);
        f.text("managerName", &self.manager.name);
        f.text(
            "draftNotice",
            self.draft_status
                .as_deref()
                .map(|status| format!("DRAFT - {}", status))
                .unwrap_or_default(),
        );
        f
    }
}

fn non_empty_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}
