// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Synchrotron emission from an electron population in a random magnetic field.

We use the approximation of [Aharonian, Kelner, and Prosekin (2010;
DOI:10.1103/PhysRevD.82.043002)](https://dx.doi.org/10.1103/PhysRevD.82.043002)
for the emission spectrum of a single electron averaged over an isotropic
distribution of field directions (their equation D7), and integrate it over
the electron population with the trapezoid rule.

*/

use slog::Logger;
use uom::si::f64::{Energy, MagneticFluxDensity};

use crate::config::{self, Configurable};
use crate::errors::{Error, Result};
use crate::grid::{GridSpec, ParticleGrid};
use crate::units::{gauss, to_erg, to_gauss, validate_positive};
use crate::{discard_logger, ParticleDistribution, RadiativeModel};
use crate::{ELECTRON_CHARGE, ERG_PER_EV, HBAR, MASS_ELECTRON, MEC2_ERG, PI, SPEED_LIGHT};


/// The default field strength: equipartition with the CMB, in gauss.
pub const DEFAULT_B_GAUSS: f64 = 3.24e-6;


/// Settings for a synchrotron calculation.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct SynchrotronConfig {
    /// The isotropic magnetic field strength.
    pub b_field: MagneticFluxDensity,

    /// The electron Lorentz-factor grid.
    pub grid: GridSpec,
}

impl Default for SynchrotronConfig {
    fn default() -> Self {
        SynchrotronConfig {
            b_field: gauss(DEFAULT_B_GAUSS),
            grid: GridSpec::synchrotron_default(),
        }
    }
}

impl SynchrotronConfig {
    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_positive("b_field", to_gauss(self.b_field))?;
        self.grid.validate()
    }
}

impl Configurable for SynchrotronConfig {
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(grid) = config::set_grid_option(&self.grid, key, value)? {
            self.grid = grid;
            return Ok(());
        }

        match key {
            "b_field" => {
                let b = validate_positive(key, config::parse_f64(key, value)?)?;
                self.b_field = gauss(b);
                Ok(())
            },
            _ => Err(Error::UnknownOption(key.to_owned())),
        }
    }

    fn keys() -> &'static [&'static str] {
        &["b_field", "grid.log10_min", "grid.log10_max", "grid.points_per_decade"]
    }
}


/// The AKP10 approximation to the angle-averaged synchrotron kernel, as a
/// function of `x = E_gamma / E_critical`.
pub fn gtilde(x: f64) -> f64 {
    // Taking the cube root once is about twice as fast as repeated powf.
    let cbrt = x.cbrt();
    let c2 = cbrt * cbrt;
    let c4 = c2 * c2;

    let gt1 = 1.808 * cbrt / (1. + 3.4 * c2).sqrt();
    let gt2 = 1. + 2.210 * c2 + 0.347 * c4;
    let gt3 = 1. + 1.353 * c2 + 0.217 * c4;
    gt1 * (gt2 / gt3) * (-x).exp()
}


/// Computes synchrotron spectra for an electron distribution.
#[derive(Clone,Debug)]
pub struct Synchrotron<D> {
    distrib: D,
    config: SynchrotronConfig,
    logger: Logger,
    cached_grid: Option<ParticleGrid>,
}

impl<D: ParticleDistribution> Synchrotron<D> {
    /// Create a calculator with the default configuration.
    pub fn new(distrib: D) -> Self {
        Synchrotron {
            distrib: distrib,
            config: SynchrotronConfig::default(),
            logger: discard_logger(),
            cached_grid: None,
        }
    }

    /// Create a calculator with an explicit configuration.
    pub fn with_config(distrib: D, config: SynchrotronConfig) -> Result<Self> {
        config.validate()?;
        let mut s = Synchrotron::new(distrib);
        s.config = config;
        Ok(s)
    }

    /// Change the magnetic field strength.
    pub fn b_field(mut self, b: MagneticFluxDensity) -> Result<Self> {
        validate_positive("b_field", to_gauss(b))?;
        self.config.b_field = b;
        Ok(self)
    }

    /// Change the Lorentz-factor grid. Any cached particle grid is discarded.
    pub fn grid(mut self, spec: GridSpec) -> Self {
        self.config.grid = spec;
        self.cached_grid = None;
        self
    }

    /// Log through `logger`.
    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// The current configuration.
    pub fn config(&self) -> &SynchrotronConfig {
        &self.config
    }

    /// Apply a textual configuration override. Any cached particle grid is
    /// discarded.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.config.set(key, value)?;
        self.invalidate();
        Ok(())
    }

    /// Sample the electron distribution now and reuse the sample in later
    /// calls, until `invalidate` is called. Without this, every call to
    /// `flux` resamples the distribution.
    pub fn prepare(&mut self) {
        self.cached_grid = Some(ParticleGrid::build(&self.config.grid, &self.distrib, &self.logger));
    }

    /// Drop any cached sample of the electron distribution.
    pub fn invalidate(&mut self) {
        self.cached_grid = None;
    }

    /// Whether a cached sample is in use.
    pub fn is_prepared(&self) -> bool {
        self.cached_grid.is_some()
    }

    /// The characteristic synchrotron energy of an electron with Lorentz
    /// factor `gamma`, in erg.
    pub fn critical_energy(&self, gamma: f64) -> f64 {
        let b = to_gauss(self.config.b_field);
        3. * ELECTRON_CHARGE * HBAR * b * gamma * gamma / (2. * MASS_ELECTRON * SPEED_LIGHT)
    }

    fn spectrum_on(&self, grid: &ParticleGrid, photon_energies: &[Energy]) -> Vec<f64> {
        let b = to_gauss(self.config.b_field);

        trace!(self.logger, "computing synchrotron spectrum";
               "b_gauss" => b,
               "n_energies" => photon_energies.len()
        );

        let cs1_0 = 3_f64.sqrt() * ELECTRON_CHARGE.powi(3) * b;

        photon_energies.iter()
            .map(|e| {
                let e_erg = to_erg(*e);
                let cs1 = cs1_0 / (2. * PI * MEC2_ERG * HBAR * e_erg);
                let per_erg = grid.integrate(|gamma| cs1 * gtilde(e_erg / self.critical_energy(gamma)));
                per_erg * ERG_PER_EV
            })
            .collect()
    }
}

impl<D: ParticleDistribution> RadiativeModel for Synchrotron<D> {
    fn compute_flux(&self, photon_energies: &[Energy]) -> Result<Vec<f64>> {
        Ok(match self.cached_grid {
            Some(ref grid) => self.spectrum_on(grid, photon_energies),
            None => {
                let grid = ParticleGrid::build(&self.config.grid, &self.distrib, &self.logger);
                self.spectrum_on(&grid, photon_energies)
            },
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{ev, tev};
    use crate::{PowerLaw, RadiativeModel};

    #[test]
    fn gtilde_limits() {
        // Small-x behavior is 1.808 x^(1/3).
        assert_approx_eq!(gtilde(1e-9) / (1.808e-3), 1., 1e-4);
        assert!(gtilde(100.) < 1e-40);
        assert!(gtilde(1.) > 0.);
    }

    #[test]
    fn critical_energy_scaling() {
        let pl = PowerLaw::new(1e36, tev(1.), 2.5).unwrap();
        let s = Synchrotron::new(pl);
        let e1 = s.critical_energy(1e6);
        assert_approx_eq!(s.critical_energy(2e6) / e1, 4., 1e-12);

        let s = s.b_field(gauss(2. * DEFAULT_B_GAUSS)).unwrap();
        assert_approx_eq!(s.critical_energy(1e6) / e1, 2., 1e-9);
    }

    #[test]
    fn bad_field() {
        let pl = PowerLaw::new(1e36, tev(1.), 2.5).unwrap();
        assert!(Synchrotron::new(pl).b_field(gauss(-1.)).is_err());

        let mut s = Synchrotron::new(pl);
        assert_eq!(s.set("B", "1e-5"), Err(Error::UnknownOption("B".to_owned())));
        assert!(s.set("b_field", "0").is_err());
        assert!(s.set("b_field", "1e-5").is_ok());
        assert_approx_eq!(to_gauss(s.config().b_field), 1e-5, 1e-15);
    }

    #[test]
    fn cached_grid_matches() {
        let pl = PowerLaw::new(1e36, tev(1.), 2.5).unwrap();
        let energies = vec![ev(1e-3), ev(1.), ev(1e3)];
        let mut s = Synchrotron::new(pl);
        let fresh = s.flux(&energies).unwrap();

        s.prepare();
        assert!(s.is_prepared());
        assert_eq!(s.flux(&energies).unwrap(), fresh);

        s.set("grid.points_per_decade", "50").unwrap();
        assert!(!s.is_prepared());
    }

    #[test]
    fn coarse_grid_is_close() {
        let pl = PowerLaw::new(1e36, tev(1.), 2.5).unwrap();
        let energies = vec![ev(1.)];
        let fine = Synchrotron::new(pl).flux(&energies).unwrap();
        let coarse = Synchrotron::new(pl)
            .grid(GridSpec::new(4., 10., 30.).unwrap())
            .flux(&energies)
            .unwrap();
        assert_approx_eq!(coarse.values()[0] / fine.values()[0], 1., 2e-2);
    }
}
