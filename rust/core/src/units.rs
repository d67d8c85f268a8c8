// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SI unit declarations for the project unit assignment
//!
//! Mirrors the IFCSIUNIT / IFCUNITASSIGNMENT pair: a unit type and an SI unit
//! name. Generated models are always in unprefixed metric units.

/// IfcUnitEnum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    Length,
    Area,
    Volume,
}

impl UnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Length => "LENGTHUNIT",
            Self::Area => "AREAUNIT",
            Self::Volume => "VOLUMEUNIT",
        }
    }
}

/// IfcSIUnitName
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiUnitName {
    Metre,
    SquareMetre,
    CubicMetre,
}

impl SiUnitName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metre => "METRE",
            Self::SquareMetre => "SQUARE_METRE",
            Self::CubicMetre => "CUBIC_METRE",
        }
    }
}

/// A single IFCSIUNIT
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiUnit {
    pub unit_type: UnitType,
    pub name: SiUnitName,
}

impl SiUnit {
    pub fn new(unit_type: UnitType, name: SiUnitName) -> Self {
        Self { unit_type, name }
    }
}

/// IFCUNITASSIGNMENT
#[derive(Debug, Clone, PartialEq)]
pub struct UnitAssignment {
    pub units: Vec<SiUnit>,
}

impl UnitAssignment {
    /// Metre, square metre and cubic metre.
    pub fn metric() -> Self {
        Self {
            units: vec![
                SiUnit::new(UnitType::Length, SiUnitName::Metre),
                SiUnit::new(UnitType::Area, SiUnitName::SquareMetre),
                SiUnit::new(UnitType::Volume, SiUnitName::CubicMetre),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_assignment() {
        let units = UnitAssignment::metric();
        let declared: Vec<(&str, &str)> = units
            .units
            .iter()
            .map(|u| (u.unit_type.as_str(), u.name.as_str()))
            .collect();
        assert_eq!(
            declared,
            vec![
                ("LENGTHUNIT", "METRE"),
                ("AREAUNIT", "SQUARE_METRE"),
                ("VOLUMEUNIT", "CUBIC_METRE"),
            ]
        );
    }
}
