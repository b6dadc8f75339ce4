// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Physical quantities at the boundaries of the models.

Public interfaces take `uom` quantities, so that dimensional errors are caught
by the compiler. The kernels work on plain `f64` values in fixed units (TeV,
eV, erg, gauss, kelvin); the helpers here do the unit stripping and the domain
checks that the compiler cannot do for us.

Photon energies can be given either as a bare sequence of energies or as a
table with an `energy` column; see `EnergyAxis`.

*/

use std::collections::BTreeMap;

use uom::si::energy::electronvolt;
use uom::si::f64::{Energy, MagneticFluxDensity, Pressure, ThermodynamicTemperature};
use uom::si::magnetic_flux_density::tesla;
use uom::si::pressure::pascal;
use uom::si::thermodynamic_temperature::kelvin as kelvin_unit;

use crate::errors::{Error, Result};
use crate::ERG_PER_EV;

/// Pascals in one erg per cubic centimeter.
const PASCAL_PER_ERG_CM3: f64 = 0.1;

/// An energy in TeV.
pub fn tev(value: f64) -> Energy {
    Energy::new::<electronvolt>(value * 1e12)
}

/// An energy in eV.
pub fn ev(value: f64) -> Energy {
    Energy::new::<electronvolt>(value)
}

/// The magnitude of an energy in TeV.
pub fn to_tev(e: Energy) -> f64 {
    e.get::<electronvolt>() * 1e-12
}

/// The magnitude of an energy in eV.
pub fn to_ev(e: Energy) -> f64 {
    e.get::<electronvolt>()
}

/// The magnitude of an energy in erg.
pub fn to_erg(e: Energy) -> f64 {
    e.get::<electronvolt>() * ERG_PER_EV
}

/// A magnetic field strength in gauss.
pub fn gauss(value: f64) -> MagneticFluxDensity {
    MagneticFluxDensity::new::<tesla>(value * 1e-4)
}

/// The magnitude of a magnetic field strength in gauss.
pub fn to_gauss(b: MagneticFluxDensity) -> f64 {
    b.get::<tesla>() * 1e4
}

/// A temperature in kelvin.
pub fn kelvin(value: f64) -> ThermodynamicTemperature {
    ThermodynamicTemperature::new::<kelvin_unit>(value)
}

/// The magnitude of a temperature in kelvin.
pub fn to_kelvin(t: ThermodynamicTemperature) -> f64 {
    t.get::<kelvin_unit>()
}

/// An energy density in eV per cubic centimeter.
pub fn ev_per_cm3(value: f64) -> Pressure {
    Pressure::new::<pascal>(value * ERG_PER_EV * PASCAL_PER_ERG_CM3)
}

/// The magnitude of an energy density in erg per cubic centimeter.
pub fn to_erg_per_cm3(u: Pressure) -> f64 {
    u.get::<pascal>() / PASCAL_PER_ERG_CM3
}

/// The magnitude of an energy density in eV per cubic centimeter.
pub fn to_ev_per_cm3(u: Pressure) -> f64 {
    to_erg_per_cm3(u) / ERG_PER_EV
}


/// Check that a parameter is finite.
pub fn validate_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::invalid_parameter(name, format!("must be finite, got {}", value)))
    }
}

/// Check that a parameter is finite and strictly positive.
pub fn validate_positive(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        Err(Error::invalid_parameter(name, format!("must be finite, got {}", value)))
    } else if value <= 0. {
        Err(Error::invalid_parameter(name, format!("must be positive, got {}", value)))
    } else {
        Ok(value)
    }
}

/// Check that a parameter is finite and not negative.
pub fn validate_non_negative(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        Err(Error::invalid_parameter(name, format!("must be finite, got {}", value)))
    } else if value < 0. {
        Err(Error::invalid_parameter(name, format!("must not be negative, got {}", value)))
    } else {
        Ok(value)
    }
}


/// One column of a `ColumnTable`.
#[derive(Clone,Debug,PartialEq)]
pub enum Column {
    /// Values with dimensions of energy.
    Energy(Vec<Energy>),

    /// Plain numbers.
    Dimensionless(Vec<f64>),
}


/// A set of named columns, such as a table of observed fluxes.
#[derive(Clone,Debug,Default,PartialEq)]
pub struct ColumnTable {
    columns: BTreeMap<String, Column>,
}

impl ColumnTable {
    /// Create an empty table.
    pub fn new() -> Self {
        ColumnTable::default()
    }

    /// Add (or replace) a column.
    pub fn with_column<S: Into<String>>(mut self, name: S, column: Column) -> Self {
        self.columns.insert(name.into(), column);
        self
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }
}


/// Photon energies at which to evaluate a spectrum.
#[derive(Clone,Debug,PartialEq)]
pub enum EnergyAxis {
    /// A plain sequence of energies.
    Raw(Vec<Energy>),

    /// A table; the energies are taken from its `energy` column.
    Table(ColumnTable),
}

impl From<Vec<Energy>> for EnergyAxis {
    fn from(v: Vec<Energy>) -> Self {
        EnergyAxis::Raw(v)
    }
}

impl<'a> From<&'a [Energy]> for EnergyAxis {
    fn from(v: &'a [Energy]) -> Self {
        EnergyAxis::Raw(v.to_vec())
    }
}

impl<'a> From<&'a Vec<Energy>> for EnergyAxis {
    fn from(v: &'a Vec<Energy>) -> Self {
        EnergyAxis::Raw(v.clone())
    }
}

impl From<ColumnTable> for EnergyAxis {
    fn from(t: ColumnTable) -> Self {
        EnergyAxis::Table(t)
    }
}


/// Resolve an `EnergyAxis` into a validated sequence of photon energies.
///
/// Every energy must be finite and positive, and there must be at least one.
pub fn extract_energies(axis: &EnergyAxis) -> Result<Vec<Energy>> {
    let energies = match *axis {
        EnergyAxis::Raw(ref v) => v.clone(),
        EnergyAxis::Table(ref t) => match t.column("energy") {
            Some(&Column::Energy(ref v)) => v.clone(),
            Some(&Column::Dimensionless(_)) => return Err(Error::EnergyColumnDimension),
            None => return Err(Error::MissingEnergyColumn),
        },
    };

    if energies.is_empty() {
        return Err(Error::InvalidInput("no photon energies given".to_owned()));
    }

    for e in &energies {
        let v = to_ev(*e);

        if !v.is_finite() || v <= 0. {
            return Err(Error::InvalidInput(format!("photon energy must be finite and positive, got {} eV", v)));
        }
    }

    Ok(energies)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_approx_eq!(to_tev(ev(2e11)), 0.2, 1e-12);
        assert_approx_eq!(to_erg(tev(1.)), 1.602176634, 1e-9);
        assert_approx_eq!(to_gauss(gauss(3.24e-6)), 3.24e-6, 1e-18);
        assert_approx_eq!(to_kelvin(kelvin(70.)), 70., 1e-12);
        assert_approx_eq!(to_ev_per_cm3(ev_per_cm3(0.2)), 0.2, 1e-12);
    }

    #[test]
    fn domains() {
        assert!(validate_positive("B", 1.).is_ok());
        assert!(validate_positive("B", 0.).is_err());
        assert!(validate_positive("B", f64::NAN).is_err());
        assert!(validate_non_negative("u", 0.).is_ok());
        assert!(validate_non_negative("u", -1.).is_err());
    }

    #[test]
    fn raw_axis() {
        let axis: EnergyAxis = vec![tev(1.), tev(10.)].into();
        assert_eq!(extract_energies(&axis).unwrap().len(), 2);
    }

    #[test]
    fn table_axis() {
        let t = ColumnTable::new()
            .with_column("flux", Column::Dimensionless(vec![1., 2.]))
            .with_column("energy", Column::Energy(vec![ev(1.), ev(2.)]));
        let e = extract_energies(&t.into()).unwrap();
        assert_approx_eq!(to_ev(e[1]), 2., 1e-12);
    }

    #[test]
    fn table_axis_errors() {
        let t = ColumnTable::new().with_column("flux", Column::Dimensionless(vec![1.]));
        assert_eq!(extract_energies(&t.into()), Err(Error::MissingEnergyColumn));

        let t = ColumnTable::new().with_column("energy", Column::Dimensionless(vec![1.]));
        assert_eq!(extract_energies(&t.into()), Err(Error::EnergyColumnDimension));
    }

    #[test]
    fn bad_energies() {
        assert!(extract_energies(&EnergyAxis::Raw(Vec::new())).is_err());
        assert!(extract_energies(&EnergyAxis::Raw(vec![ev(-1.)])).is_err());
    }
}
