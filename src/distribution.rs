// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Common particle energy distributions.

Both distributions are parameterized by an amplitude in particles per TeV at
a reference energy `e0`, and are evaluated with energies in TeV.

*/

use uom::si::f64::Energy;

use crate::errors::Result;
use crate::units::{to_tev, validate_finite, validate_non_negative, validate_positive};
use crate::ParticleDistribution;


/// A power law, `A (E / E0)^-alpha`.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct PowerLaw {
    amplitude: f64,
    e0: f64,
    alpha: f64,
}

impl PowerLaw {
    /// Create a power law with amplitude `amplitude` (particles per TeV) at
    /// the reference energy `e0`, and index `alpha`.
    pub fn new(amplitude: f64, e0: Energy, alpha: f64) -> Result<Self> {
        Ok(PowerLaw {
            amplitude: validate_non_negative("amplitude", amplitude)?,
            e0: validate_positive("e0", to_tev(e0))?,
            alpha: validate_finite("alpha", alpha)?,
        })
    }

    /// The power-law index.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl ParticleDistribution for PowerLaw {
    fn number_density(&self, energy_tev: f64) -> f64 {
        self.amplitude * (energy_tev / self.e0).powf(-self.alpha)
    }
}


/// A power law with an exponential cutoff,
/// `A (E / E0)^-alpha exp(-(E / E_cutoff)^beta)`.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct ExponentialCutoffPowerLaw {
    amplitude: f64,
    e0: f64,
    alpha: f64,
    e_cutoff: f64,
    beta: f64,
}

impl ExponentialCutoffPowerLaw {
    /// Create a cutoff power law. The cutoff sharpness `beta` is 1 for a
    /// simple exponential cutoff.
    pub fn new(amplitude: f64, e0: Energy, alpha: f64, e_cutoff: Energy, beta: f64) -> Result<Self> {
        Ok(ExponentialCutoffPowerLaw {
            amplitude: validate_non_negative("amplitude", amplitude)?,
            e0: validate_positive("e0", to_tev(e0))?,
            alpha: validate_finite("alpha", alpha)?,
            e_cutoff: validate_positive("e_cutoff", to_tev(e_cutoff))?,
            beta: validate_positive("beta", beta)?,
        })
    }
}

impl ParticleDistribution for ExponentialCutoffPowerLaw {
    fn number_density(&self, energy_tev: f64) -> f64 {
        self.amplitude * (energy_tev / self.e0).powf(-self.alpha)
            * (-(energy_tev / self.e_cutoff).powf(self.beta)).exp()
    }
}
