// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Specimen shapes and the field schema each one carries onto a certificate.
//!
//! Concrete cubes, cylinders, pavers and bricks/blocks share one mapper and one row generator.
//! What differs between them (which geometric columns exist, the nominal dimension used when a
//! reading is missing, the product label and the narrative noun) lives here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// A geometric column shown in the results table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    /// Length (mm).
    Length,
    /// Width (mm).
    Width,
    /// Height (mm).
    Height,
    /// Thickness (mm), pavers only.
    Thickness,
}

impl Dimension {
    /// Column heading used in the results table.
    pub const fn heading(&self) -> &'static str {
        match self {
            Dimension::Length => "Length (mm)",
            Dimension::Width => "Width (mm)",
            Dimension::Height => "Height (mm)",
            Dimension::Thickness => "Thickness (mm)",
        }
    }
}

/// Physical form of the specimens in a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecimenShape {
    /// Concrete cube.
    #[default]
    Cube,
    /// Concrete cylinder.
    Cylinder,
    /// Interlocking paver.
    Paver,
    /// Brick or block.
    Brick,
}

impl SpecimenShape {
    /// All shapes, in display order.
    pub const ALL: [SpecimenShape; 4] = [
        SpecimenShape::Cube,
        SpecimenShape::Cylinder,
        SpecimenShape::Paver,
        SpecimenShape::Brick,
    ];

    /// Geometric columns rendered for this shape, in table order.
    pub const fn dimensions(&self) -> &'static [Dimension] {
        match self {
            SpecimenShape::Cube | SpecimenShape::Cylinder | SpecimenShape::Brick => {
                &[Dimension::Length, Dimension::Width, Dimension::Height]
            }
            SpecimenShape::Paver => &[Dimension::Thickness],
        }
    }

    /// Value substituted for a missing dimension reading (mm).
    ///
    /// Only cubes have a standard size; every other shape counts a missing reading as zero so
    /// the density and strength guards apply.
    pub const fn nominal_dimension(&self, _dim: Dimension) -> f64 {
        match self {
            SpecimenShape::Cube => 150.0,
            SpecimenShape::Cylinder | SpecimenShape::Paver | SpecimenShape::Brick => 0.0,
        }
    }

    /// Whether the loaded area comes from an upstream plan-area measurement instead of L×W.
    pub const fn uses_plan_area(&self) -> bool {
        matches!(self, SpecimenShape::Paver)
    }

    /// Label of the product classification row ("Class of Concrete", "Paver type/name", ...).
    pub const fn product_label(&self) -> &'static str {
        match self {
            SpecimenShape::Cube | SpecimenShape::Cylinder => "Class of Concrete",
            SpecimenShape::Paver => "Paver type/name",
            SpecimenShape::Brick => "Brick/Block type",
        }
    }

    /// Plural noun used in the sample-count narrative.
    pub const fn noun(&self) -> &'static str {
        match self {
            SpecimenShape::Cube => "concrete cubes",
            SpecimenShape::Cylinder => "concrete cylinders",
            SpecimenShape::Paver => "paving blocks",
            SpecimenShape::Brick => "bricks/blocks",
        }
    }

    /// Title printed at the top of the certificate.
    pub const fn certificate_title(&self) -> &'static str {
        match self {
            SpecimenShape::Cube => "Test Certificate for Compressive Strength of Concrete Cubes",
            SpecimenShape::Cylinder => {
                "Test Certificate for Compressive Strength of Concrete Cylinders"
            }
            SpecimenShape::Paver => "Test Certificate for Compressive Strength of Paving Blocks",
            SpecimenShape::Brick => "Test Certificate for Compressive Strength of Bricks/Blocks",
        }
    }

    /// Default test method reference.
    pub const fn test_method(&self) -> &'static str {
        match self {
            SpecimenShape::Cube => "BS EN 12390-3:2019",
            SpecimenShape::Cylinder => "ASTM C39/C39M",
            SpecimenShape::Paver => "KS 827:2016 / BS EN 1338",
            SpecimenShape::Brick => "BS EN 772-1",
        }
    }

    /// Stable lowercase identifier, matching the serde representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SpecimenShape::Cube => "cube",
            SpecimenShape::Cylinder => "cylinder",
            SpecimenShape::Paver => "paver",
            SpecimenShape::Brick => "brick",
        }
    }
}

impl fmt::Display for SpecimenShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecimenShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cube" | "cubes" | "concrete cube" => Ok(SpecimenShape::Cube),
            "cylinder" | "cylinders" => Ok(SpecimenShape::Cylinder),
            "paver" | "pavers" | "paving block" => Ok(SpecimenShape::Paver),
            "brick" | "bricks" | "block" | "blocks" => Ok(SpecimenShape::Brick),
            other => Err(Error::new(
                format!("Unknown specimen shape: {}", other),
                ErrorKind::InvalidData,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_nominal_is_150mm() {
        for dim in SpecimenShape::Cube.dimensions() {
            assert_eq!(SpecimenShape::Cube.nominal_dimension(*dim), 150.0);
        }
    }

    #[test]
    fn other_shapes_have_no_nominal_size() {
        assert_eq!(SpecimenShape::Paver.nominal_dimension(Dimension::Thickness), 0.0);
        assert_eq!(SpecimenShape::Cylinder.nominal_dimension(Dimension::Height), 0.0);
        assert_eq!(SpecimenShape::Brick.nominal_dimension(Dimension::Length), 0.0);
    }

    #[test]
    fn paver_has_thickness_only() {
        assert_eq!(SpecimenShape::Paver.dimensions(), &[Dimension::Thickness]);
        assert!(SpecimenShape::Paver.uses_plan_area());
        assert!(!SpecimenShape::Cube.uses_plan_area());
    }

    #[test]
    fn product_labels_differ_per_shape() {
        assert_eq!(SpecimenShape::Cube.product_label(), "Class of Concrete");
        assert_eq!(SpecimenShape::Paver.product_label(), "Paver type/name");
    }

    #[test]
    fn parse_round_trips_display() {
        for shape in SpecimenShape::ALL {
            assert_eq!(shape.to_string().parse::<SpecimenShape>().unwrap(), shape);
        }
        assert!("sphere".parse::<SpecimenShape>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&SpecimenShape::Paver).unwrap();
        assert_eq!(json, "\"paver\"");
    }
}
