// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Derived metrics for compression-test specimens.
//!
//! The formula functions are pure and never fail: a zero denominator yields `0.0`. Whether a
//! missing reading is acceptable is decided up front by [`Leniency`], so the same formulas serve
//! both the lenient certificate path (missing numbers print as zero) and strict callers.
//!
//! Units are fixed: mm, mm², kg, kN, N/mm², kg/m³.

use crate::error::{Error, ErrorKind};
use crate::format::{fixed, round_to};
use crate::model::{CorrectionFactorMachine, SampleTestResult};
use crate::specimen::{Dimension, SpecimenShape};

/// Multiplier applied when no machine calibration is available.
///
/// Kept for certificates produced before per-machine factors existed.
pub const LEGACY_CORRECTION_FACTOR: f64 = 0.9937;

/// mm³ to m³.
const MM3_TO_M3: f64 = 1e-9;

/// Plan area (mm²) of a rectangular loaded face.
pub fn cross_sectional_area(length: f64, width: f64) -> f64 {
    length * width
}

/// Density of a prismatic specimen, rounded to whole kg/m³.
///
/// # Examples
///
/// ```
/// use labcert::calc::prism_density;
/// assert_eq!(prism_density(8.5, 150.0, 150.0, 150.0), 2519.0);
/// assert_eq!(prism_density(8.5, 0.0, 150.0, 150.0), 0.0);
/// ```
pub fn prism_density(weight: f64, length: f64, width: f64, height: f64) -> f64 {
    let volume = length * width * height * MM3_TO_M3;
    if volume == 0.0 {
        return 0.0;
    }
    round_to(weight / volume, 0)
}

/// Density of a paver from its thickness (mm) and measured plan area (mm²), rounded to whole
/// kg/m³. Zero thickness or zero area gives zero.
pub fn paver_density(weight: f64, thickness: f64, plan_area: f64) -> f64 {
    let thickness_m = thickness / 1000.0;
    let area_m2 = plan_area / 1e6;
    if thickness_m == 0.0 || area_m2 == 0.0 {
        return 0.0;
    }
    round_to(weight / (thickness_m * area_m2), 0)
}

/// Applies the machine calibration, or [`LEGACY_CORRECTION_FACTOR`] when there is no machine
/// or its factors are not both recorded.
pub fn corrected_load(load: f64, machine: Option<&CorrectionFactorMachine>) -> f64 {
    machine
        .and_then(|m| m.correct(load))
        .unwrap_or(load * LEGACY_CORRECTION_FACTOR)
}

/// Compressive strength (N/mm²) from a load in kN over an area in mm².
///
/// # Examples
///
/// ```
/// use labcert::calc::compressive_strength;
/// assert_eq!(compressive_strength(450.0, 22500.0), 20.0);
/// ```
pub fn compressive_strength(load: f64, area: f64) -> f64 {
    if area == 0.0 {
        return 0.0;
    }
    load * 1000.0 / area
}

/// Mean of the given strengths to one decimal; `"0.0"` for an empty batch.
pub fn average_strength(strengths: &[f64]) -> String {
    if strengths.is_empty() {
        return fixed(0.0, 1);
    }
    let sum: f64 = strengths.iter().sum();
    fixed(sum / strengths.len() as f64, 1)
}

/// How missing readings are treated before calculation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Leniency {
    /// Missing readings become zero (150 mm for cube dimensions). Nothing fails.
    #[default]
    Lenient,
    /// Any missing reading is a validation error.
    Strict,
}

impl Leniency {
    /// Checks a batch against this mode.
    ///
    /// In lenient mode this only reports what will be defaulted; in strict mode every missing
    /// field becomes one entry of an [`ErrorKind::Validation`] error.
    pub fn check(&self, results: &[SampleTestResult], shape: SpecimenShape) -> Result<(), Error> {
        let missing: Vec<String> = results
            .iter()
            .flat_map(|r| missing_inputs(r, shape))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        match self {
            Leniency::Lenient => {
                tracing::warn!(
                    shape = %shape,
                    missing = missing.len(),
                    "defaulting missing readings: {}",
                    missing.join(", ")
                );
                Ok(())
            }
            Leniency::Strict => Err(Error::new(
                format!("{} missing reading(s): {}", missing.len(), missing.join(", ")),
                ErrorKind::Validation(missing),
            )),
        }
    }
}

/// Lists `"<sampleId>.<field>"` for each reading a full calculation needs but the result lacks.
pub fn missing_inputs(result: &SampleTestResult, shape: SpecimenShape) -> Vec<String> {
    let id = if result.sample_id.trim().is_empty() {
        "<unnamed>"
    } else {
        result.sample_id.as_str()
    };
    let mut missing = Vec::new();
    let mut require = |present: bool, field: &str| {
        if !present {
            missing.push(format!("{}.{}", id, field));
        }
    };
    if result.sample_id.trim().is_empty() {
        require(false, "sampleId");
    }
    for dim in shape.dimensions() {
        let (present, name) = match dim {
            Dimension::Length => (result.length.is_some(), "length"),
            Dimension::Width => (result.width.is_some(), "width"),
            Dimension::Height => (result.height.is_some(), "height"),
            Dimension::Thickness => (result.thickness.is_some(), "thickness"),
        };
        require(present, name);
    }
    if shape.uses_plan_area() {
        require(result.computed_plan_area.is_some(), "computedPlanArea");
    }
    require(result.weight.is_some(), "weight");
    require(
        result.load.is_some() || result.corrected_failure_load.is_some(),
        "load",
    );
    missing
}

/// Calculated values for one specimen, unformatted.
#[derive(Clone, Debug, PartialEq)]
pub struct SpecimenMetrics {
    pub sample_id: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
    pub weight: f64,
    pub load: f64,
    pub corrected_load: f64,
    pub area: f64,
    pub density: f64,
    pub strength: f64,
    pub mode_of_failure: Option<String>,
}

/// Metrics for a whole batch.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchMetrics {
    pub specimens: Vec<SpecimenMetrics>,
    /// Mean strength formatted to one decimal.
    pub average_strength: String,
}

/// Computes [`SpecimenMetrics`] for a batch of one shape on one machine.
#[derive(Clone, Debug)]
pub struct Calculator<'m> {
    shape: SpecimenShape,
    machine: Option<&'m CorrectionFactorMachine>,
    leniency: Leniency,
}

impl<'m> Calculator<'m> {
    pub fn new(shape: SpecimenShape) -> Self {
        Self {
            shape,
            machine: None,
            leniency: Leniency::default(),
        }
    }

    /// Uses the machine's linear calibration instead of the legacy factor.
    pub fn with_machine(mut self, machine: Option<&'m CorrectionFactorMachine>) -> Self {
        self.machine = machine;
        self
    }

    pub fn with_leniency(mut self, leniency: Leniency) -> Self {
        self.leniency = leniency;
        self
    }

    pub fn shape(&self) -> SpecimenShape {
        self.shape
    }

    /// Metrics for a single result. Never fails; missing readings are defaulted.
    pub fn specimen(&self, result: &SampleTestResult) -> SpecimenMetrics {
        let shape = self.shape;
        let dim = |value: Option<f64>, d: Dimension| value.unwrap_or(shape.nominal_dimension(d));

        let length = dim(result.length, Dimension::Length);
        let width = dim(result.width, Dimension::Width);
        let height = dim(result.height, Dimension::Height);
        let thickness = dim(result.thickness, Dimension::Thickness);
        let weight = result.weight.unwrap_or(0.0);
        let load = result.load.unwrap_or(0.0);
        let corrected = result
            .corrected_failure_load
            .unwrap_or_else(|| corrected_load(load, self.machine));

        let (area, density) = if shape.uses_plan_area() {
            let area = result.computed_plan_area.unwrap_or(0.0);
            (area, paver_density(weight, thickness, area))
        } else {
            (
                cross_sectional_area(length, width),
                prism_density(weight, length, width, height),
            )
        };

        SpecimenMetrics {
            sample_id: result.sample_id.clone(),
            length,
            width,
            height,
            thickness,
            weight,
            load,
            corrected_load: corrected,
            area,
            density,
            strength: compressive_strength(corrected, area),
            mode_of_failure: result.mode_of_failure.clone(),
        }
    }

    /// Validates according to the configured [`Leniency`], then computes every specimen and the
    /// batch average.
    pub fn batch(&self, results: &[SampleTestResult]) -> Result<BatchMetrics, Error> {
        self.leniency.check(results, self.shape)?;
        let specimens: Vec<SpecimenMetrics> = results.iter().map(|r| self.specimen(r)).collect();
        let strengths: Vec<f64> = specimens.iter().map(|s| s.strength).collect();
        Ok(BatchMetrics {
            average_strength: average_strength(&strengths),
            specimens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn machine() -> CorrectionFactorMachine {
        CorrectionFactorMachine {
            id: "m1".into(),
            name: "Compression machine".into(),
            tag_id: "CM-01".into(),
            factor_m: Some(0.98),
            factor_c: Some(1.5),
        }
    }

    #[test]
    fn cube_density_rounds_to_whole_units() {
        // 8.5 / 0.003375 = 2518.518...
        assert_eq!(prism_density(8.5, 150.0, 150.0, 150.0), 2519.0);
    }

    #[test]
    fn strength_over_standard_cube_face() {
        assert_eq!(fixed(compressive_strength(450.0, 22500.0), 1), "20.0");
    }

    #[test]
    fn empty_batch_average_is_literal_zero() {
        assert_eq!(average_strength(&[]), "0.0");
    }

    #[test]
    fn paver_density_zero_guard() {
        assert_eq!(paver_density(5.0, 0.0, 20000.0), 0.0);
        assert_eq!(paver_density(5.0, 80.0, 0.0), 0.0);
        assert!(paver_density(5.0, 80.0, 0.0).is_finite());
    }

    #[test]
    fn paver_density_uses_metres() {
        // 4.2 kg / (0.08 m * 0.0225 m²) = 2333.33
        assert_eq!(paver_density(4.2, 80.0, 22500.0), 2333.0);
    }

    #[test]
    fn machine_factor_is_linear() {
        let m = machine();
        assert!(approx_eq!(f64, corrected_load(100.0, Some(&m)), 99.5, epsilon = 1e-9));
    }

    #[test]
    fn legacy_factor_without_machine() {
        assert!(approx_eq!(f64, corrected_load(100.0, None), 99.37, epsilon = 1e-9));
    }

    #[test]
    fn legacy_factor_for_uncalibrated_machine() {
        let m = CorrectionFactorMachine {
            factor_c: None,
            ..machine()
        };
        assert!(approx_eq!(f64, corrected_load(100.0, Some(&m)), 99.37, epsilon = 1e-9));
    }

    #[test]
    fn paver_without_thickness_hits_zero_guard() {
        let m = Calculator::new(SpecimenShape::Paver).specimen(
            &SampleTestResult::new("P1")
                .with_weight(4.0)
                .with_load(300.0),
        );
        assert_eq!(m.thickness, 0.0);
        assert_eq!(m.density, 0.0);
    }

    #[test]
    fn non_cube_dimensions_default_to_zero() {
        let r = SampleTestResult::new("X1").with_weight(12.0).with_load(400.0);
        for shape in [SpecimenShape::Cylinder, SpecimenShape::Brick] {
            let m = Calculator::new(shape).specimen(&r);
            assert_eq!((m.length, m.width, m.height), (0.0, 0.0, 0.0));
            assert_eq!(m.area, 0.0);
            assert_eq!(m.density, 0.0);
            assert_eq!(m.strength, 0.0);
        }
        let cube = Calculator::new(SpecimenShape::Cube).specimen(&r);
        assert_eq!(cube.area, 22500.0);
    }

    #[test]
    fn precomputed_corrected_load_wins() {
        let m = machine();
        let mut r = SampleTestResult::new("C1").with_load(100.0);
        r.corrected_failure_load = Some(120.0);
        let metrics = Calculator::new(SpecimenShape::Cube)
            .with_machine(Some(&m))
            .specimen(&r);
        assert_eq!(metrics.corrected_load, 120.0);
    }

    #[test]
    fn missing_readings_default_in_lenient_mode() {
        let metrics = Calculator::new(SpecimenShape::Cube).specimen(&SampleTestResult::new("C1"));
        assert_eq!(metrics.length, 150.0);
        assert_eq!(metrics.weight, 0.0);
        assert_eq!(metrics.density, 0.0);
        assert_eq!(metrics.strength, 0.0);
    }

    #[test]
    fn strict_mode_lists_missing_fields() {
        let err = Calculator::new(SpecimenShape::Paver)
            .with_leniency(Leniency::Strict)
            .batch(&[SampleTestResult::new("P1").with_weight(4.0)])
            .unwrap_err();
        match err.kind() {
            ErrorKind::Validation(fields) => {
                assert_eq!(
                    fields,
                    &["P1.thickness", "P1.computedPlanArea", "P1.load"]
                );
            }
            k => panic!("unexpected kind: {:?}", k),
        }
    }

    #[test]
    fn lenient_batch_never_fails() {
        let batch = Calculator::new(SpecimenShape::Brick)
            .batch(&[SampleTestResult::new(""), SampleTestResult::new("B2")])
            .unwrap();
        assert_eq!(batch.specimens.len(), 2);
        assert_eq!(batch.average_strength, "0.0");
    }

    #[test]
    fn batch_average_uses_corrected_loads() {
        let m = machine();
        let results = vec![
            SampleTestResult::new("C1")
                .with_dimensions(150.0, 150.0, 150.0)
                .with_weight(8.5)
                .with_load(100.0),
            SampleTestResult::new("C2")
                .with_dimensions(150.0, 150.0, 150.0)
                .with_weight(8.4)
                .with_load(200.0),
        ];
        let batch = Calculator::new(SpecimenShape::Cube)
            .with_machine(Some(&m))
            .with_leniency(Leniency::Strict)
            .batch(&results)
            .unwrap();
        // (99.5 + 197.5) * 1000 / 22500 / 2 = 6.6
        assert_eq!(batch.average_strength, "6.6");
    }
}
