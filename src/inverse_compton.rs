// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Inverse-Compton emission from an electron population.

The electrons upscatter one or more gray-body seed photon fields. For each
field we integrate the cross-section for isotropic scattering off a Planck
photon spectrum, in the approximation of [Khangulyan, Aharonian, and Kelner
(2014; DOI:10.1088/0004-637X/783/2/100)](https://dx.doi.org/10.1088/0004-637X/783/2/100),
over the electron population with the trapezoid rule. The contributions of
the different fields are summed.

A seed field is a blackbody of temperature *T* whose energy density is scaled
by a dilution factor: the ratio of its actual energy density to `a T^4`.

*/

use std::str::FromStr;

use slog::Logger;
use uom::si::f64::{Energy, Pressure, ThermodynamicTemperature};

use crate::config::{self, Configurable};
use crate::errors::{Error, Result};
use crate::grid::{GridSpec, ParticleGrid};
use crate::units::{ev_per_cm3, kelvin, to_erg, to_erg_per_cm3, to_ev, to_kelvin};
use crate::units::{extract_energies, validate_non_negative, validate_positive};
use crate::{discard_logger, EnergyAxis, ParticleDistribution, RadiativeModel, Spectrum, SpectrumKind};
use crate::{ERG_PER_EV, KELVIN_TO_MEC2, MEC2_ERG, RADIATION_CONSTANT};


/// The CMB temperature in kelvin.
pub const CMB_TEMPERATURE: f64 = 2.72548;

/// The temperature of the default far-infrared field, in kelvin.
pub const FIR_TEMPERATURE: f64 = 70.;

/// The energy density of the default far-infrared field, in eV per cm^3.
pub const FIR_ENERGY_DENSITY: f64 = 0.2;

/// The temperature of the default near-infrared field, in kelvin.
pub const NIR_TEMPERATURE: f64 = 5000.;

/// The energy density of the default near-infrared field, in eV per cm^3.
pub const NIR_ENERGY_DENSITY: f64 = 0.2;


/// How a seed photon field is requested.
#[derive(Clone,Debug,PartialEq)]
pub enum SeedSpec {
    /// One of the predefined fields: `CMB`, `FIR` or `NIR`.
    Named(String),

    /// A user-defined field. An energy density of exactly zero means the
    /// blackbody energy density implied by the temperature.
    Custom {
        /// The name of the field.
        name: String,
        /// Its temperature.
        temperature: ThermodynamicTemperature,
        /// Its energy density.
        energy_density: Pressure,
    },
}

impl SeedSpec {
    /// Request a predefined field.
    pub fn named<S: Into<String>>(name: S) -> Self {
        SeedSpec::Named(name.into())
    }

    /// Request a user-defined field.
    pub fn custom<S: Into<String>>(name: S, temperature: ThermodynamicTemperature, energy_density: Pressure) -> Self {
        SeedSpec::Custom {
            name: name.into(),
            temperature: temperature,
            energy_density: energy_density,
        }
    }

    /// The name of the requested field.
    pub fn name(&self) -> &str {
        match *self {
            SeedSpec::Named(ref n) => n,
            SeedSpec::Custom { ref name, .. } => name,
        }
    }
}

impl FromStr for SeedSpec {
    type Err = Error;

    /// Parse either a bare name or `NAME:T:u`, with *T* in kelvin and *u* in
    /// eV per cubic centimeter.
    fn from_str(s: &str) -> Result<Self> {
        let pieces: Vec<&str> = s.split(':').map(|p| p.trim()).collect();

        match pieces.len() {
            1 if !pieces[0].is_empty() => Ok(SeedSpec::named(pieces[0])),
            3 if !pieces[0].is_empty() => {
                let t = pieces[1].parse::<f64>().map_err(|_| Error::MalformedSeedField(s.to_owned()))?;
                let u = pieces[2].parse::<f64>().map_err(|_| Error::MalformedSeedField(s.to_owned()))?;
                Ok(SeedSpec::custom(pieces[0], kelvin(t), ev_per_cm3(u)))
            },
            _ => Err(Error::MalformedSeedField(s.to_owned())),
        }
    }
}


/// Parse a list of seed fields.
///
/// Entries are separated by commas. An entry is either a custom `NAME:T:u`
/// specification or one or more predefined names joined by hyphens, so
/// `"CMB-FIR"` and `"CMB,DUST:30:1e-3"` are both valid.
pub fn parse_seed_list(s: &str) -> Result<Vec<SeedSpec>> {
    let mut specs = Vec::new();

    for entry in s.split(',') {
        if entry.contains(':') {
            specs.push(entry.parse()?);
        } else {
            for name in entry.split('-') {
                specs.push(name.parse()?);
            }
        }
    }

    Ok(specs)
}


/// A resolved seed photon field.
#[derive(Clone,Debug,PartialEq)]
pub struct SeedPhotonField {
    name: String,
    temperature: f64,
    dilution: f64,
}

impl SeedPhotonField {
    /// The name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The temperature of the field.
    pub fn temperature(&self) -> ThermodynamicTemperature {
        kelvin(self.temperature)
    }

    /// The ratio of the field's energy density to that of a blackbody of the
    /// same temperature.
    pub fn dilution(&self) -> f64 {
        self.dilution
    }

    /// The energy density of the field.
    pub fn energy_density(&self) -> Pressure {
        ev_per_cm3(self.dilution * RADIATION_CONSTANT * self.temperature.powi(4) / ERG_PER_EV)
    }
}


/// Resolves `SeedSpec`s into temperatures and dilution factors.
#[derive(Copy,Clone,Debug,Default,Eq,PartialEq)]
pub struct SeedPhotonFieldRegistry;

impl SeedPhotonFieldRegistry {
    /// The names of the predefined fields.
    pub const NAMES: &'static [&'static str] = &["CMB", "FIR", "NIR"];

    /// Resolve one field.
    pub fn resolve(&self, spec: &SeedSpec) -> Result<SeedPhotonField> {
        match *spec {
            SeedSpec::Named(ref name) => {
                let (temperature, dilution) = match name.as_str() {
                    "CMB" => (CMB_TEMPERATURE, 1.),
                    "FIR" => (FIR_TEMPERATURE, blackbody_dilution(FIR_TEMPERATURE, FIR_ENERGY_DENSITY * ERG_PER_EV)),
                    "NIR" => (NIR_TEMPERATURE, blackbody_dilution(NIR_TEMPERATURE, NIR_ENERGY_DENSITY * ERG_PER_EV)),
                    _ => return Err(Error::UnknownSeedField(name.clone())),
                };

                Ok(SeedPhotonField { name: name.clone(), temperature: temperature, dilution: dilution })
            },

            SeedSpec::Custom { ref name, temperature, energy_density } => {
                let t = validate_positive(&format!("{}-T", name), to_kelvin(temperature))?;
                let u = validate_non_negative(&format!("{}-u", name), to_erg_per_cm3(energy_density))?;

                let dilution = if u == 0. {
                    1.
                } else {
                    blackbody_dilution(t, u)
                };

                Ok(SeedPhotonField { name: name.clone(), temperature: t, dilution: dilution })
            },
        }
    }

    /// Resolve a list of fields. Field names must be unique.
    pub fn resolve_all(&self, specs: &[SeedSpec]) -> Result<Vec<SeedPhotonField>> {
        let mut fields: Vec<SeedPhotonField> = Vec::with_capacity(specs.len());

        for spec in specs {
            let field = self.resolve(spec)?;

            if fields.iter().any(|f| f.name == field.name) {
                return Err(Error::DuplicateSeedField(field.name));
            }

            fields.push(field);
        }

        Ok(fields)
    }
}

/// The dilution factor of a field of temperature `t` (K) and energy density
/// `u` (erg per cm^3).
fn blackbody_dilution(t: f64, u: f64) -> f64 {
    u / (RADIATION_CONSTANT * t.powi(4))
}


/// Settings for an inverse-Compton calculation.
#[derive(Clone,Debug,PartialEq)]
pub struct InverseComptonConfig {
    /// The seed photon fields.
    pub seeds: Vec<SeedSpec>,

    /// The electron Lorentz-factor grid.
    pub grid: GridSpec,
}

impl Default for InverseComptonConfig {
    fn default() -> Self {
        InverseComptonConfig {
            seeds: vec![SeedSpec::named("CMB")],
            grid: GridSpec::inverse_compton_default(),
        }
    }
}

impl InverseComptonConfig {
    /// Check the configuration, returning the resolved seed fields.
    pub fn validate(&self) -> Result<Vec<SeedPhotonField>> {
        self.grid.validate()?;
        SeedPhotonFieldRegistry.resolve_all(&self.seeds)
    }
}

impl Configurable for InverseComptonConfig {
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(grid) = config::set_grid_option(&self.grid, key, value)? {
            self.grid = grid;
            return Ok(());
        }

        match key {
            "seeds" => {
                let seeds = parse_seed_list(value)?;
                SeedPhotonFieldRegistry.resolve_all(&seeds)?;
                self.seeds = seeds;
                Ok(())
            },
            _ => Err(Error::UnknownOption(key.to_owned())),
        }
    }

    fn keys() -> &'static [&'static str] {
        &["seeds", "grid.log10_min", "grid.log10_max", "grid.points_per_decade"]
    }
}


const A3: [f64; 4] = [0.192, 0.448, 0.546, 1.377];
const A4: [f64; 4] = [1.69, 0.549, 1.06, 1.406];

#[inline]
fn g(x: f64, a: &[f64; 4]) -> f64 {
    let tmp = 1. + a[2] * x.powf(a[3]);
    let tmp2 = a[0] * x.powf(a[1]) / tmp + 1.;
    1. / tmp2
}

/// The scattering rate of an electron of Lorentz factor `gamma` on a Planck
/// photon field of temperature `soft_photon_temperature` (kelvin) into
/// photons of energy `gamma_energy` (in units of `m_e c^2`), per unit photon
/// energy, following KAK14.
///
/// The kernel is zero wherever the photon would carry more energy than the
/// electron or the electron is not relativistic. Any overflow in the
/// evaluation is discarded and reported as zero.
pub fn iso_ic_on_planck(gamma: f64, soft_photon_temperature: f64, gamma_energy: f64) -> f64 {
    if !(gamma_energy < gamma && gamma > 1.) {
        return 0.;
    }

    let t = soft_photon_temperature * KELVIN_TO_MEC2;
    let z = gamma_energy / gamma;
    let x = z / (1. - z) / (4. * gamma * t);
    let tmp = 1.644934 * x;
    let f = (1.644934 + tmp) / (1. + tmp) * (-x).exp();
    let cross_section = f * (z * z / (2. * (1. - z)) * g(x, &A3) + g(x, &A4));
    let v = (t / gamma).powi(2) * 2.6433905738281024e16 * cross_section;

    if v.is_finite() { v } else { 0. }
}


/// Computes inverse-Compton spectra for an electron distribution.
#[derive(Clone,Debug)]
pub struct InverseCompton<D> {
    distrib: D,
    config: InverseComptonConfig,
    fields: Vec<SeedPhotonField>,
    logger: Logger,
    cached_grid: Option<ParticleGrid>,
}

impl<D: ParticleDistribution> InverseCompton<D> {
    /// Create a calculator with the default configuration, scattering the CMB.
    pub fn new(distrib: D) -> Self {
        InverseCompton {
            distrib: distrib,
            config: InverseComptonConfig::default(),
            fields: vec![SeedPhotonField { name: "CMB".to_owned(), temperature: CMB_TEMPERATURE, dilution: 1. }],
            logger: discard_logger(),
            cached_grid: None,
        }
    }

    /// Create a calculator with an explicit configuration.
    pub fn with_config(distrib: D, config: InverseComptonConfig) -> Result<Self> {
        let fields = config.validate()?;
        let mut ic = InverseCompton::new(distrib);
        ic.config = config;
        ic.fields = fields;
        Ok(ic)
    }

    /// Replace the seed photon fields.
    pub fn seed_fields(mut self, seeds: Vec<SeedSpec>) -> Result<Self> {
        self.fields = SeedPhotonFieldRegistry.resolve_all(&seeds)?;
        self.config.seeds = seeds;
        Ok(self)
    }

    /// Replace the seed photon fields with ones parsed from a string such as
    /// `"CMB-FIR-NIR"`; see `parse_seed_list`.
    pub fn seed_string(self, seeds: &str) -> Result<Self> {
        let specs = parse_seed_list(seeds)?;
        self.seed_fields(specs)
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
    pub fn config(&self) -> &InverseComptonConfig {
        &self.config
    }

    /// The resolved seed photon fields, in the order they were given.
    pub fn seeds(&self) -> &[SeedPhotonField] {
        &self.fields
    }

    /// Apply a textual configuration override. Any cached particle grid is
    /// discarded.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.config.set(key, value)?;
        self.fields = self.config.validate()?;
        self.invalidate();
        Ok(())
    }

    /// Sample the electron distribution now and reuse the sample in later
    /// calls, until `invalidate` is called.
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

    /// Compute the flux due to a single one of the seed fields.
    pub fn seed_flux<A: Into<EnergyAxis>>(&self, seed: &str, photon_energies: A) -> Result<Spectrum> {
        let field = match self.fields.iter().find(|f| f.name == seed) {
            Some(f) => f,
            None => return Err(Error::UnknownSeedField(seed.to_owned())),
        };

        let energies = extract_energies(&photon_energies.into())?;
        let values = self.with_grid(|grid| self.seed_spectrum(grid, field, &energies));
        Spectrum::new(SpectrumKind::Flux, energies, values)
    }

    fn with_grid<T, F>(&self, f: F) -> T where F: FnOnce(&ParticleGrid) -> T {
        match self.cached_grid {
            Some(ref grid) => f(grid),
            None => f(&ParticleGrid::build(&self.config.grid, &self.distrib, &self.logger)),
        }
    }

    fn seed_spectrum(&self, grid: &ParticleGrid, field: &SeedPhotonField, photon_energies: &[Energy]) -> Vec<f64> {
        trace!(self.logger, "computing IC on seed photons";
               "seed" => &field.name,
               "temperature" => field.temperature,
               "dilution" => field.dilution
        );

        photon_energies.iter()
            .map(|e| {
                let eph = to_erg(*e) / MEC2_ERG;
                let rate = grid.integrate(|gamma| iso_ic_on_planck(gamma, field.temperature, eph));
                field.dilution * eph * rate / to_ev(*e)
            })
            .collect()
    }
}

impl<D: ParticleDistribution> RadiativeModel for InverseCompton<D> {
    fn compute_flux(&self, photon_energies: &[Energy]) -> Result<Vec<f64>> {
        Ok(self.with_grid(|grid| {
            let mut total = vec![0_f64; photon_energies.len()];

            for field in &self.fields {
                for (t, v) in total.iter_mut().zip(self.seed_spectrum(grid, field, photon_energies)) {
                    *t += v;
                }
            }

            total
        }))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{tev, to_ev_per_cm3};
    use crate::PowerLaw;

    #[test]
    fn named_fields() {
        let r = SeedPhotonFieldRegistry;
        let cmb = r.resolve(&SeedSpec::named("CMB")).unwrap();
        assert_eq!(cmb.dilution(), 1.);
        assert_approx_eq!(to_ev_per_cm3(cmb.energy_density()), 0.2606, 1e-3);

        let fir = r.resolve(&SeedSpec::named("FIR")).unwrap();
        assert_approx_eq!(to_ev_per_cm3(fir.energy_density()), FIR_ENERGY_DENSITY, 1e-9);
        assert_approx_eq!(to_kelvin(fir.temperature()), 70., 1e-9);

        assert_eq!(r.resolve(&SeedSpec::named("XRAY")), Err(Error::UnknownSeedField("XRAY".to_owned())));
    }

    #[test]
    fn custom_fields() {
        let r = SeedPhotonFieldRegistry;
        let bb = r.resolve(&SeedSpec::custom("star", kelvin(3000.), ev_per_cm3(0.))).unwrap();
        assert_eq!(bb.dilution(), 1.);

        let diluted = r.resolve(&SeedSpec::custom("dust", kelvin(30.), ev_per_cm3(0.5))).unwrap();
        assert_approx_eq!(to_ev_per_cm3(diluted.energy_density()), 0.5, 1e-9);

        assert!(r.resolve(&SeedSpec::custom("cold", kelvin(0.), ev_per_cm3(0.))).is_err());
        assert!(r.resolve(&SeedSpec::custom("neg", kelvin(10.), ev_per_cm3(-1.))).is_err());
    }

    #[test]
    fn parsing() {
        let specs = parse_seed_list("CMB-FIR,DUST:30:1e-3").unwrap();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[1].name(), "FIR");
        assert_eq!(specs[2].name(), "DUST");

        assert_eq!("DUST:30".parse::<SeedSpec>(), Err(Error::MalformedSeedField("DUST:30".to_owned())));
        assert!("DUST:hot:1".parse::<SeedSpec>().is_err());
        assert!(parse_seed_list("CMB--FIR").is_err());
    }

    #[test]
    fn duplicates_rejected() {
        let r = SeedPhotonFieldRegistry;
        let specs = parse_seed_list("CMB-CMB").unwrap();
        assert_eq!(r.resolve_all(&specs), Err(Error::DuplicateSeedField("CMB".to_owned())));
    }

    #[test]
    fn kernel_masking() {
        // Photon energy above the electron energy.
        assert_eq!(iso_ic_on_planck(1e3, 2.7, 2e3), 0.);
        assert_eq!(iso_ic_on_planck(1e3, 2.7, 1e3), 0.);
        // Sub-relativistic electron.
        assert_eq!(iso_ic_on_planck(0.5, 2.7, 0.1), 0.);
        // Deep in the exponential tail: underflows cleanly to zero.
        assert_eq!(iso_ic_on_planck(1e4, 2.7, 1e4 * (1. - 1e-12)), 0.);

        let v = iso_ic_on_planck(1e6, 2.7, 10.);
        assert!(v > 0. && v.is_finite());
    }

    #[test]
    fn seed_options() {
        let pl = PowerLaw::new(1e36, tev(1.), 2.5).unwrap();
        let mut ic = InverseCompton::new(pl);
        assert!(ic.set("seeds", "CMB-NIR").is_ok());
        assert_eq!(ic.seeds().len(), 2);
        assert!(ic.set("seeds", "CMB-UV").is_err());
        assert_eq!(ic.seeds().len(), 2);
        assert_eq!(ic.set("Etrans", "1"), Err(Error::UnknownOption("Etrans".to_owned())));
    }
}
