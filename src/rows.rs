// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! HTML fragments for the result table, the test-condition block and the signatures.
//!
//! Precision is fixed per column: one decimal for lengths, loads and strengths, two for weight,
//! whole numbers (rounded) for area and density.

use std::fmt::Write as _;

use crate::calc::SpecimenMetrics;
use crate::certificate::{ConditionField, Signature};
use crate::format::{fixed, integer};
use crate::specimen::{Dimension, SpecimenShape};
use crate::template::escape_html;

/// Shown in text cells that have no value.
pub const EMPTY_CELL: &str = "-";

const FIXED_HEADINGS: [&str; 7] = [
    "Weight (kg)",
    "Area (mm&sup2;)",
    "Density (kg/m&sup3;)",
    "Failure Load (kN)",
    "Corrected Load (kN)",
    "Compressive Strength (N/mm&sup2;)",
    "Mode of Failure",
];

/// Number of columns in the result table for a shape.
pub fn column_count(shape: SpecimenShape) -> usize {
    3 + shape.dimensions().len() + FIXED_HEADINGS.len()
}

/// Header row of the result table.
pub fn result_header(shape: SpecimenShape) -> String {
    let mut out = String::from("<tr><th>Date of Casting</th><th>Date of Testing</th><th>Sample ID</th>");
    for dim in shape.dimensions() {
        let _ = write!(out, "<th>{}</th>", dim.heading());
    }
    for heading in FIXED_HEADINGS {
        let _ = write!(out, "<th>{}</th>", heading);
    }
    out.push_str("</tr>");
    out
}

/// One `<tr>` per specimen.
///
/// The first row carries the casting and testing dates with a rowspan covering the whole batch.
pub fn result_rows(
    shape: SpecimenShape,
    results: &[SpecimenMetrics],
    date_of_casting: &str,
    date_of_testing: &str,
) -> String {
    if results.is_empty() {
        return format!(
            "<tr><td colspan=\"{}\" class=\"empty\">No specimens recorded</td></tr>",
            column_count(shape)
        );
    }

    let span = results.len();
    let mut out = String::new();
    for (idx, m) in results.iter().enumerate() {
        out.push_str("<tr>");
        if idx == 0 {
            let _ = write!(
                out,
                "<td rowspan=\"{span}\">{}</td><td rowspan=\"{span}\">{}</td>",
                text_cell(date_of_casting),
                text_cell(date_of_testing),
            );
        }
        let _ = write!(out, "<td>{}</td>", text_cell(&m.sample_id));
        for dim in shape.dimensions() {
            let value = match dim {
                Dimension::Length => m.length,
                Dimension::Width => m.width,
                Dimension::Height => m.height,
                Dimension::Thickness => m.thickness,
            };
            let _ = write!(out, "<td class=\"num\">{}</td>", fixed(value, 1));
        }
        let _ = write!(
            out,
            "<td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td>\
             <td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td>{}</td>",
            fixed(m.weight, 2),
            integer(m.area),
            integer(m.density),
            fixed(m.load, 1),
            fixed(m.corrected_load, 1),
            fixed(m.strength, 1),
            text_cell(m.mode_of_failure.as_deref().unwrap_or_default()),
        );
        out.push_str("</tr>");
    }
    out
}

/// Label/value rows of the test-condition block.
pub fn condition_rows(conditions: &[ConditionField]) -> String {
    let mut out = String::new();
    for c in conditions {
        let _ = write!(
            out,
            "<tr><th>{}</th><td>{}</td></tr>",
            escape_html(&c.label),
            text_cell(&c.value)
        );
    }
    out
}

/// Signature blocks, side by side.
pub fn signature_blocks(signatures: &[&Signature]) -> String {
    let mut out = String::new();
    for sig in signatures {
        out.push_str("<div class=\"signature\">");
        match sig.signature_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => {
                let _ = write!(
                    out,
                    "<img class=\"signature-image\" src=\"{}\" alt=\"\">",
                    escape_html(url)
                );
            }
            None => out.push_str("<div class=\"signature-line\"></div>"),
        }
        let _ = write!(
            out,
            "<div class=\"signature-name\">{}</div><div class=\"signature-role\">{}</div>",
            escape_html(&sig.name),
            escape_html(&sig.role)
        );
        if let Some(date) = &sig.approved_on {
            let _ = write!(out, "<div class=\"signature-date\">{}</div>", escape_html(date));
        }
        out.push_str("</div>");
    }
    out
}

fn text_cell(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        escape_html(value)
    }
}
