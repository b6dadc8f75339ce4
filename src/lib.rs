// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Compute non-thermal photon spectra of relativistic particle populations.

Given a particle energy distribution, this crate computes the differential
photon flux and the spectral energy distribution (SED) produced by three
radiative processes:

- synchrotron emission in a random magnetic field, following the
  approximation of [Aharonian, Kelner, and Prosekin (2010;
  DOI:10.1103/PhysRevD.82.043002)](https://dx.doi.org/10.1103/PhysRevD.82.043002);
- inverse-Compton scattering of blackbody-like seed photon fields, with the
  isotropic cross-section of [Khangulyan, Aharonian, and Kelner (2014;
  DOI:10.1088/0004-637X/783/2/100)](https://dx.doi.org/10.1088/0004-637X/783/2/100);
- gamma rays from neutral pions produced in proton-proton collisions, with
  the parameterization of [Kelner, Aharonian, and Bugayov (2006;
  DOI:10.1103/PhysRevD.74.034018)](https://dx.doi.org/10.1103/PhysRevD.74.034018).

The basic structure of each calculation is a one-dimensional integral over
the particle population. For synchrotron and inverse Compton the integral is
done with the trapezoid rule on a log-spaced grid of Lorentz factors; for pion
decay we use adaptive quadrature.

Normalization follows the usual convention that the particle distribution
gives the number of particles per unit energy, already divided by `4 pi d^2`
(and, for pion decay, multiplied by the target density), so that fluxes come
out in photons per second per eV.

*/

#![deny(missing_docs)]

#[cfg(test)] #[macro_use] extern crate assert_approx_eq;
#[macro_use] extern crate slog;

use uom::si::f64::Energy;

pub use std::f64::consts::PI;

pub mod config;
pub mod distribution;
pub mod errors;
pub mod grid;
pub mod inverse_compton;
pub mod pion_decay;
pub mod quad;
pub mod synchrotron;
pub mod units;

pub use distribution::{ExponentialCutoffPowerLaw, PowerLaw};
pub use errors::{Error, Result};
pub use grid::{GridSpec, ParticleGrid};
pub use inverse_compton::{InverseCompton, InverseComptonConfig, SeedPhotonField, SeedSpec};
pub use pion_decay::{Calibration, PionDecay, PionDecayConfig};
pub use synchrotron::{Synchrotron, SynchrotronConfig};
pub use units::{Column, ColumnTable, EnergyAxis};


/// The speed of light in cgs (centimeters per second).
pub const SPEED_LIGHT: f64 = 2.99792458e10;

/// The charge of the electron, in cgs (esu's).
pub const ELECTRON_CHARGE: f64 = 4.80320471e-10;

/// The mass of the electron in cgs (grams).
pub const MASS_ELECTRON: f64 = 9.1093837015e-28;

/// The reduced Planck constant in cgs (erg seconds).
pub const HBAR: f64 = 1.054571817e-27;

/// The Planck constant in cgs (erg seconds).
pub const PLANCK: f64 = 6.62607015e-27;

/// The Boltzmann constant in cgs (erg per kelvin).
pub const BOLTZMANN: f64 = 1.380649e-16;

/// The electron rest-mass energy in ergs.
pub const MEC2_ERG: f64 = 8.1871057769e-7;

/// The electron rest-mass energy in TeV.
pub const MEC2_TEV: f64 = 5.1099895e-7;

/// The proton rest-mass energy in TeV.
pub const MPC2_TEV: f64 = 9.3827208816e-4;

/// The neutral pion rest-mass energy in TeV.
pub const MPI0C2_TEV: f64 = 1.349766e-4;

/// The radiation constant `4 sigma_SB / c`, in erg per cubic centimeter per
/// kelvin^4.
pub const RADIATION_CONSTANT: f64 = 7.565733e-15;

/// Ergs per electron-volt.
pub const ERG_PER_EV: f64 = 1.602176634e-12;

/// `k_B / (m_e c^2)`: one kelvin in units of the electron rest-mass energy.
pub const KELVIN_TO_MEC2: f64 = 1.6863699549e-10;


/// A particle energy distribution.
///
/// The argument is the particle energy in TeV and the return value is the
/// number of particles per TeV. Any `Fn(f64) -> f64` closure is a
/// distribution.
pub trait ParticleDistribution {
    /// Evaluate the distribution at one energy.
    fn number_density(&self, energy_tev: f64) -> f64;

    /// Evaluate the distribution at many energies. Implementations that can
    /// vectorize their evaluation may override this.
    fn number_density_many(&self, energies_tev: &[f64]) -> Vec<f64> {
        energies_tev.iter().map(|e| self.number_density(*e)).collect()
    }
}

impl<F> ParticleDistribution for F where F: Fn(f64) -> f64 {
    fn number_density(&self, energy_tev: f64) -> f64 {
        self(energy_tev)
    }
}


/// Which quantity a `Spectrum` holds.
#[derive(Copy,Clone,Debug,Eq,Hash,PartialEq)]
pub enum SpectrumKind {
    /// Differential photon flux, in photons per second per eV.
    Flux,

    /// Spectral energy distribution `E^2 dN/dE`, in erg per second.
    Sed,
}


/// A computed photon spectrum: one value per requested photon energy, in the
/// order that the energies were given.
#[derive(Clone,Debug,PartialEq)]
pub struct Spectrum {
    kind: SpectrumKind,
    energies: Vec<Energy>,
    values: Vec<f64>,
}

impl Spectrum {
    /// Assemble a spectrum. The two vectors must have the same length.
    pub fn new(kind: SpectrumKind, energies: Vec<Energy>, values: Vec<f64>) -> Result<Self> {
        if energies.len() != values.len() {
            return Err(Error::InvalidInput(format!(
                "spectrum has {} energies but {} values", energies.len(), values.len()
            )));
        }

        Ok(Spectrum { kind: kind, energies: energies, values: values })
    }

    /// What kind of values this spectrum holds.
    pub fn kind(&self) -> SpectrumKind {
        self.kind
    }

    /// The photon energies.
    pub fn energies(&self) -> &[Energy] {
        &self.energies
    }

    /// The spectral values; see `SpectrumKind` for their units.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(energy, value)` pairs.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (Energy, f64)> + 'a {
        self.energies.iter().cloned().zip(self.values.iter().cloned())
    }

    /// Convert a flux spectrum into an SED by multiplying by `E^2`. An SED is
    /// returned unchanged.
    pub fn to_sed(self) -> Spectrum {
        match self.kind {
            SpectrumKind::Sed => self,
            SpectrumKind::Flux => {
                let values = self.energies.iter()
                    .zip(self.values.iter())
                    .map(|(e, f)| {
                        let e_ev = units::to_ev(*e);
                        f * e_ev * e_ev * ERG_PER_EV
                    })
                    .collect();

                Spectrum { kind: SpectrumKind::Sed, energies: self.energies, values: values }
            },
        }
    }
}


/// A type that can compute a photon spectrum.
pub trait RadiativeModel {
    /// Compute the differential photon flux, in photons per second per eV, at
    /// each of the given photon energies. The energies have already been
    /// validated.
    fn compute_flux(&self, photon_energies: &[Energy]) -> Result<Vec<f64>>;

    /// Compute the differential photon flux at the given photon energies.
    fn flux<A: Into<EnergyAxis>>(&self, photon_energies: A) -> Result<Spectrum> where Self: Sized {
        let energies = units::extract_energies(&photon_energies.into())?;
        let values = self.compute_flux(&energies)?;
        Spectrum::new(SpectrumKind::Flux, energies, values)
    }

    /// Compute the spectral energy distribution at the given photon energies.
    fn sed<A: Into<EnergyAxis>>(&self, photon_energies: A) -> Result<Spectrum> where Self: Sized {
        Ok(self.flux(photon_energies)?.to_sed())
    }
}


/// A logger that throws everything away, used until a model is given a real
/// one.
pub(crate) fn discard_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, o!())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::tev;

    #[test]
    fn closures_are_distributions() {
        let d = |e: f64| 2. * e;
        assert_eq!(d.number_density(3.), 6.);
        assert_eq!(d.number_density_many(&[1., 2.]), vec![2., 4.]);
    }

    #[test]
    fn sed_from_flux() {
        let s = Spectrum::new(SpectrumKind::Flux, vec![tev(1.), tev(2.)], vec![1e-20, 3e-20]).unwrap();
        let sed = s.clone().to_sed();
        assert_eq!(sed.kind(), SpectrumKind::Sed);
        assert_approx_eq!(sed.values()[0], 1e-20 * 1e24 * ERG_PER_EV, 1e-20);
        assert_approx_eq!(sed.values()[1] / (3e-20 * 4e24 * ERG_PER_EV), 1., 1e-12);
        assert_eq!(sed.clone().to_sed(), sed);
    }

    #[test]
    fn mismatched_spectrum_is_rejected() {
        match Spectrum::new(SpectrumKind::Flux, vec![tev(1.), tev(2.)], vec![1e-20]) {
            Err(Error::InvalidInput(_)) => {},
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn constants_agree() {
        assert_approx_eq!(BOLTZMANN / MEC2_ERG / KELVIN_TO_MEC2, 1., 1e-6);
        assert_approx_eq!(MEC2_ERG / (MEC2_TEV * 1e12 * ERG_PER_EV), 1., 1e-8);
        assert_approx_eq!(PLANCK / (2. * PI) / HBAR, 1., 1e-9);
    }
}
