// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Gamma rays from the decay of neutral pions made in proton-proton collisions.

The relativistic protons collide with a stationary target. We use the
parameterizations of [Kelner, Aharonian, and Bugayov (2006;
DOI:10.1103/PhysRevD.74.034018)](https://dx.doi.org/10.1103/PhysRevD.74.034018)
for the inelastic cross-section (their equations 73 and 79) and for the photon
yield of a single collision (their equation 58).

Above a transition energy (0.1 TeV by default) the spectrum is computed by
direct adaptive integration over the photon energy fraction (KAB06 eq. 72).
Below it we use the delta-function approximation of KAB06 eq. 78, in which
each collision makes one pion carrying a fixed fraction `K_pi` of the proton
kinetic energy. The normalization `nhat` of the approximation is a free
parameter that we calibrate so that the two regimes agree at the transition.

All of the kernels here work in TeV, and the proton distribution is expected
to give particles per TeV (times `n_H / 4 pi d^2`).

*/

use std::str::FromStr;

use slog::Logger;
use uom::si::f64::Energy;

use crate::config::{self, Configurable};
use crate::errors::{Error, Result};
use crate::quad::IntegrationWorkspace;
use crate::units::{tev, to_tev, validate_positive};
use crate::{discard_logger, ParticleDistribution, RadiativeModel};
use crate::{ERG_PER_EV, MPC2_TEV, MPI0C2_TEV, SPEED_LIGHT};


/// The threshold proton energy for pion production, in TeV.
pub const THRESHOLD_TEV: f64 = 1.22e-3;

/// The mean fraction of the proton kinetic energy carried off by the pion in
/// the delta-function approximation.
pub const K_PI: f64 = 0.17;

/// The default transition energy between the two regimes, in TeV.
pub const DEFAULT_TRANSITION_TEV: f64 = 0.1;

const EPSREL: f64 = 1e-3;
const WORKSPACE_SIZE: usize = 1000;
const ERG_PER_TEV: f64 = ERG_PER_EV * 1e12;


/// How the normalization of the low-energy approximation is chosen.
#[derive(Copy,Clone,Debug,PartialEq)]
pub enum Calibration {
    /// Calibrate at the transition energy whenever any requested photon
    /// energy falls below it.
    Auto,

    /// Calibrate only when the requested photon energies lie on both sides of
    /// the transition energy; otherwise use 1.
    Straddling,

    /// Use a fixed value.
    Fixed(f64),
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration::Auto
    }
}

impl FromStr for Calibration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "auto" => Ok(Calibration::Auto),
            "straddling" => Ok(Calibration::Straddling),
            other => {
                let v = config::parse_f64("calibration", other)?;
                Ok(Calibration::Fixed(validate_positive("calibration", v)?))
            },
        }
    }
}


/// Settings for a pion-decay calculation.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct PionDecayConfig {
    /// The photon energy separating the low- and high-energy regimes.
    pub transition_energy: Energy,

    /// How to normalize the low-energy regime.
    pub calibration: Calibration,
}

impl Default for PionDecayConfig {
    fn default() -> Self {
        PionDecayConfig {
            transition_energy: tev(DEFAULT_TRANSITION_TEV),
            calibration: Calibration::Auto,
        }
    }
}

impl PionDecayConfig {
    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_positive("transition_energy", to_tev(self.transition_energy))?;

        if let Calibration::Fixed(n) = self.calibration {
            validate_positive("calibration", n)?;
        }

        Ok(())
    }
}

impl Configurable for PionDecayConfig {
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "transition_energy" => {
                let e = validate_positive(key, config::parse_f64(key, value)?)?;
                self.transition_energy = tev(e);
                Ok(())
            },
            "calibration" => {
                self.calibration = value.parse()?;
                Ok(())
            },
            _ => Err(Error::UnknownOption(key.to_owned())),
        }
    }

    fn keys() -> &'static [&'static str] {
        &["transition_energy", "calibration"]
    }
}


/// The inelastic proton-proton cross-section in cm^2, for a proton energy in
/// TeV (KAB06 eqs. 73 and 79). Below 0.1 TeV the threshold correction is
/// applied, so the cross-section vanishes below 1.22 GeV.
pub fn sigma_inel(ep: f64) -> f64 {
    if !(ep > THRESHOLD_TEV) {
        return 0.;
    }

    let l = ep.ln();
    let mut sigma = 34.3 + 1.88 * l + 0.25 * l * l;

    if ep <= 0.1 {
        sigma *= (1. - (THRESHOLD_TEV / ep).powi(4)).powi(2);
    }

    sigma * 1e-27 // mbarn
}

/// The spectrum of photons made by a proton of energy `ep` (TeV), as a
/// function of the fraction `x = E_gamma / E_p` (KAB06 eq. 58).
pub fn f_gamma(x: f64, ep: f64) -> f64 {
    let l = ep.ln();
    let b = 1.30 + 0.14 * l + 0.011 * l * l;
    let beta = 1. / (1.79 + 0.11 * l + 0.008 * l * l);
    let k = 1. / (0.801 + 0.049 * l + 0.014 * l * l);
    let xb = x.powf(beta);
    let lx = x.ln();
    let denom = 1. + k * xb * (1. - xb);

    let f1 = b * (lx / x) * ((1. - xb) / denom).powi(4);
    let f2 = 1. / lx - 4. * beta * xb / (1. - xb) - 4. * k * beta * xb * (1. - 2. * xb) / denom;
    f1 * f2
}


/// Computes pion-decay gamma-ray spectra for a proton distribution.
#[derive(Clone,Debug)]
pub struct PionDecay<D> {
    distrib: D,
    config: PionDecayConfig,
    logger: Logger,
}

impl<D: ParticleDistribution> PionDecay<D> {
    /// Create a calculator with the default configuration.
    pub fn new(distrib: D) -> Self {
        PionDecay {
            distrib: distrib,
            config: PionDecayConfig::default(),
            logger: discard_logger(),
        }
    }

    /// Create a calculator with an explicit configuration.
    pub fn with_config(distrib: D, config: PionDecayConfig) -> Result<Self> {
        config.validate()?;
        let mut p = PionDecay::new(distrib);
        p.config = config;
        Ok(p)
    }

    /// Change the transition energy.
    pub fn transition_energy(mut self, e: Energy) -> Result<Self> {
        validate_positive("transition_energy", to_tev(e))?;
        self.config.transition_energy = e;
        Ok(self)
    }

    /// Change the calibration of the low-energy regime.
    pub fn calibration(mut self, calibration: Calibration) -> Result<Self> {
        if let Calibration::Fixed(n) = calibration {
            validate_positive("calibration", n)?;
        }

        self.config.calibration = calibration;
        Ok(self)
    }

    /// Log through `logger`.
    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// The current configuration.
    pub fn config(&self) -> &PionDecayConfig {
        &self.config
    }

    /// Apply a textual configuration override.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.config.set(key, value)
    }

    /// The total energy of the protons above the pion production threshold,
    /// `W_p(E > 1.22 GeV)`, in erg. Like the distribution itself this is
    /// scaled by `n_H / 4 pi d^2`.
    pub fn proton_energy_above_threshold(&self) -> Result<f64> {
        let mut ws = IntegrationWorkspace::new(WORKSPACE_SIZE)?;
        let r = ws.qagiu(|e| e * self.distrib.number_density(e), THRESHOLD_TEV)
            .tolerance(0., 1e-6)
            .compute()?;
        Ok(r.value * ERG_PER_TEV)
    }

    /// The flux at `photon_energy` from the direct integral, in photons per
    /// second per eV.
    pub fn high_energy_flux(&self, photon_energy: Energy) -> Result<f64> {
        let mut ws = IntegrationWorkspace::new(WORKSPACE_SIZE)?;
        Ok(self.high_energy_tev(&mut ws, to_tev(photon_energy))? * 1e-12)
    }

    /// The flux at `photon_energy` from the delta-function approximation with
    /// normalization `nhat`, in photons per second per eV.
    pub fn low_energy_flux(&self, photon_energy: Energy, nhat: f64) -> Result<f64> {
        let mut ws = IntegrationWorkspace::new(WORKSPACE_SIZE)?;
        Ok(self.low_energy_tev(&mut ws, to_tev(photon_energy), nhat)? * 1e-12)
    }

    /// The normalization of the low-energy regime that would be used to
    /// compute the spectrum at `photon_energies`.
    pub fn calibration_factor(&self, photon_energies: &[Energy]) -> Result<f64> {
        let mut ws = IntegrationWorkspace::new(WORKSPACE_SIZE)?;
        self.nhat(&mut ws, photon_energies)
    }

    fn high_energy_tev(&self, ws: &mut IntegrationWorkspace, egamma: f64) -> Result<f64> {
        let integrand = |x: f64| {
            let ep = egamma / x;
            let v = sigma_inel(ep) * self.distrib.number_density(ep) * f_gamma(x, ep) / x;
            if v.is_finite() { v } else { 0. }
        };

        let r = ws.qag(integrand, 0., 1.)
            .tolerance(0., EPSREL)
            .compute()?;
        Ok(SPEED_LIGHT * r.value)
    }

    fn low_energy_tev(&self, ws: &mut IntegrationWorkspace, egamma: f64, nhat: f64) -> Result<f64> {
        let epi_min = egamma + MPI0C2_TEV * MPI0C2_TEV / (4. * egamma);

        let integrand = |epi: f64| {
            let ep0 = MPC2_TEV + epi / K_PI;
            let qpi = SPEED_LIGHT * (nhat / K_PI) * sigma_inel(ep0) * self.distrib.number_density(ep0);
            let v = qpi / (epi * epi + MPI0C2_TEV * MPI0C2_TEV).sqrt();
            if v.is_finite() { v } else { 0. }
        };

        let r = ws.qagiu(integrand, epi_min)
            .tolerance(0., EPSREL)
            .compute()?;
        Ok(2. * r.value)
    }

    fn nhat(&self, ws: &mut IntegrationWorkspace, photon_energies: &[Energy]) -> Result<f64> {
        let etrans = to_tev(self.config.transition_energy);
        let any_below = photon_energies.iter().any(|e| to_tev(*e) < etrans);
        let any_above = photon_energies.iter().any(|e| to_tev(*e) >= etrans);

        let calibrate = match self.config.calibration {
            Calibration::Fixed(n) => return Ok(n),
            Calibration::Auto => any_below,
            Calibration::Straddling => any_below && any_above,
        };

        if !calibrate {
            return Ok(1.);
        }

        let full = self.high_energy_tev(ws, etrans)?;
        let delta = self.low_energy_tev(ws, etrans, 1.)?;
        let nhat = full / delta;

        if !(nhat.is_finite() && nhat > 0.) {
            warn!(self.logger, "cannot calibrate the low-energy regime at {:.3e} TeV (got {:.3e} / {:.3e}); using nhat = 1",
                  etrans, full, delta);
            return Ok(1.);
        }

        debug!(self.logger, "calibrated delta-function approximation";
               "transition_tev" => etrans,
               "nhat" => nhat
        );

        Ok(nhat)
    }
}

impl<D: ParticleDistribution> RadiativeModel for PionDecay<D> {
    fn compute_flux(&self, photon_energies: &[Energy]) -> Result<Vec<f64>> {
        match self.proton_energy_above_threshold() {
            Ok(wp) => {
                info!(self.logger, "W_p(E > 1.22 GeV) * [n_H / 4 pi d^2] = {:.2e} erg / cm^5", wp;
                      "w_p" => wp);
            },
            Err(e) => {
                warn!(self.logger, "could not compute the proton energy above threshold: {}", e);
            },
        }

        let mut ws = IntegrationWorkspace::new(WORKSPACE_SIZE)?;
        let nhat = self.nhat(&mut ws, photon_energies)?;
        let etrans = to_tev(self.config.transition_energy);
        let mut flux = Vec::with_capacity(photon_energies.len());

        for e in photon_energies {
            let egamma = to_tev(*e);

            let per_tev = if egamma >= etrans {
                trace!(self.logger, "direct integration"; "e_tev" => egamma);
                self.high_energy_tev(&mut ws, egamma)?
            } else {
                trace!(self.logger, "delta-function approximation"; "e_tev" => egamma, "nhat" => nhat);
                self.low_energy_tev(&mut ws, egamma, nhat)?
            };

            flux.push(per_tev * 1e-12);
        }

        Ok(flux)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::PowerLaw;

    fn power_law() -> PowerLaw {
        PowerLaw::new(1e33, tev(1.), 2.5).unwrap()
    }

    #[test]
    fn cross_section_threshold() {
        assert_eq!(sigma_inel(0.), 0.);
        assert_eq!(sigma_inel(1e-90), 0.);
        assert_eq!(sigma_inel(-1.), 0.);
        assert_eq!(sigma_inel(1e-3), 0.);
        assert_eq!(sigma_inel(THRESHOLD_TEV), 0.);
        assert!(sigma_inel(1.3e-3) < 0.1 * sigma_inel(1e-2));
        assert_approx_eq!(sigma_inel(1.) / 34.3e-27, 1., 1e-12);
        assert!(sigma_inel(1e3) > sigma_inel(1.));
    }

    #[test]
    fn yield_shape() {
        // The yield vanishes as x -> 1 and is positive below.
        assert!(f_gamma(0.999999, 1.).abs() < 1e-10);
        assert!(f_gamma(0.1, 1.) > 0.);
        assert!(f_gamma(0.01, 100.) > f_gamma(0.1, 100.));
    }

    #[test]
    fn calibration_options() {
        assert_eq!("auto".parse::<Calibration>().unwrap(), Calibration::Auto);
        assert_eq!("straddling".parse::<Calibration>().unwrap(), Calibration::Straddling);
        assert_eq!("2.5".parse::<Calibration>().unwrap(), Calibration::Fixed(2.5));
        assert!("-1".parse::<Calibration>().is_err());
        assert!("sometimes".parse::<Calibration>().is_err());

        let mut p = PionDecay::new(power_law());
        assert_eq!(p.set("Etrans", "1"), Err(Error::UnknownOption("Etrans".to_owned())));
        assert!(p.set("transition_energy", "0").is_err());
        assert!(p.set("transition_energy", "0.3").is_ok());
        assert_approx_eq!(to_tev(p.config().transition_energy), 0.3, 1e-12);
    }

    #[test]
    fn calibration_modes() {
        let below = [tev(0.01)];
        let both = [tev(0.01), tev(1.)];

        let p = PionDecay::new(power_law());
        let auto = p.calibration_factor(&below).unwrap();
        assert!(auto > 0. && auto != 1.);
        assert_eq!(p.calibration_factor(&both).unwrap(), auto);
        assert_eq!(p.calibration_factor(&[tev(1.)]).unwrap(), 1.);

        let p = p.calibration(Calibration::Straddling).unwrap();
        assert_eq!(p.calibration_factor(&below).unwrap(), 1.);
        assert_eq!(p.calibration_factor(&both).unwrap(), auto);

        let p = p.calibration(Calibration::Fixed(0.7)).unwrap();
        assert_eq!(p.calibration_factor(&both).unwrap(), 0.7);
    }

    #[test]
    fn uncalibratable_falls_back_to_unity() {
        // Nothing above the transition, so both calibration integrals vanish.
        let p = PionDecay::new(|e: f64| if e < 0.05 { 1e33 * e.powf(-2.5) } else { 0. });
        assert_eq!(p.calibration_factor(&[tev(0.001)]).unwrap(), 1.);

        let p = p.calibration(Calibration::Straddling).unwrap();
        assert_eq!(p.calibration_factor(&[tev(0.001), tev(1.)]).unwrap(), 1.);
    }

    #[test]
    fn regimes_match_at_transition() {
        let p = PionDecay::new(power_law());
        let nhat = p.calibration_factor(&[tev(0.01)]).unwrap();
        let hi = p.high_energy_flux(tev(0.1)).unwrap();
        let lo = p.low_energy_flux(tev(0.1), nhat).unwrap();
        assert_approx_eq!(lo / hi, 1., 1e-6);
    }

    #[test]
    fn proton_energy() {
        let wp = PionDecay::new(power_law()).proton_energy_above_threshold().unwrap();
        // Analytic: A E0^2.5 Eth^-0.5 / 0.5, in erg.
        let expected = 1e33 * THRESHOLD_TEV.powf(-0.5) / 0.5 * ERG_PER_TEV;
        assert_approx_eq!(wp / expected, 1., 1e-4);
    }
}
