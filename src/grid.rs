// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Sampling a particle population on a grid of Lorentz factors.

Synchrotron and inverse-Compton spectra are computed by integrating a kernel
against the particle population with the trapezoid rule. The population is
sampled on a log-spaced grid of Lorentz factors `gamma`; the energy of each
grid point is `gamma m_e c^2`.

The distribution function gives particles per TeV; the sample stored here is
particles per unit `gamma`, so that the integral over the grid is
dimensionally consistent.

*/

use slog::Logger;

use crate::errors::{Error, Result};
use crate::quad;
use crate::{ParticleDistribution, MEC2_TEV};


/// The most points a grid may have.
pub const MAX_POINTS: usize = 10_000_000;


/// The range and density of a Lorentz-factor grid.
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct GridSpec {
    log10_min: f64,
    log10_max: f64,
    points_per_decade: f64,
}

impl GridSpec {
    /// Create a grid specification spanning `10^log10_min` to `10^log10_max`
    /// in Lorentz factor.
    pub fn new(log10_min: f64, log10_max: f64, points_per_decade: f64) -> Result<Self> {
        let spec = GridSpec {
            log10_min: log10_min,
            log10_max: log10_max,
            points_per_decade: points_per_decade,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check that the specification describes a usable grid.
    pub fn validate(&self) -> Result<()> {
        if !self.log10_min.is_finite() {
            return Err(Error::invalid_parameter("grid.log10_min", "must be finite"));
        }

        if !self.log10_max.is_finite() || self.log10_max <= self.log10_min {
            return Err(Error::invalid_parameter("grid.log10_max", "must be finite and larger than grid.log10_min"));
        }

        if !self.points_per_decade.is_finite() || self.points_per_decade <= 0. {
            return Err(Error::invalid_parameter("grid.points_per_decade", "must be finite and positive"));
        }

        if !(self.point_count() <= MAX_POINTS as f64) {
            return Err(Error::invalid_parameter(
                "grid.points_per_decade",
                format!("grid may have at most {} points", MAX_POINTS)
            ));
        }

        if self.len() < 2 {
            return Err(Error::invalid_parameter("grid.points_per_decade", "grid must have at least two points"));
        }

        Ok(())
    }

    /// The default grid for synchrotron calculations: 10^4 to 10^10, 100
    /// points per decade.
    pub fn synchrotron_default() -> Self {
        GridSpec { log10_min: 4., log10_max: 10., points_per_decade: 100. }
    }

    /// The default grid for inverse-Compton calculations: 10^4 to 10^10.5,
    /// 300 points per decade.
    pub fn inverse_compton_default() -> Self {
        GridSpec { log10_min: 4., log10_max: 10.5, points_per_decade: 300. }
    }

    /// The base-10 log of the smallest Lorentz factor.
    pub fn log10_min(&self) -> f64 {
        self.log10_min
    }

    /// The base-10 log of the largest Lorentz factor.
    pub fn log10_max(&self) -> f64 {
        self.log10_max
    }

    /// The number of grid points per decade.
    pub fn points_per_decade(&self) -> f64 {
        self.points_per_decade
    }

    /// Change the lower end of the grid.
    pub fn with_log10_min(mut self, v: f64) -> Result<Self> {
        self.log10_min = v;
        self.validate()?;
        Ok(self)
    }

    /// Change the upper end of the grid.
    pub fn with_log10_max(mut self, v: f64) -> Result<Self> {
        self.log10_max = v;
        self.validate()?;
        Ok(self)
    }

    /// Change the grid density.
    pub fn with_points_per_decade(mut self, v: f64) -> Result<Self> {
        self.points_per_decade = v;
        self.validate()?;
        Ok(self)
    }

    fn point_count(&self) -> f64 {
        (self.points_per_decade * (self.log10_max - self.log10_min)).round() + 1.
    }

    /// The total number of grid points, endpoints included. Validated specs
    /// never exceed `MAX_POINTS`.
    pub fn len(&self) -> usize {
        let n = self.point_count();

        if n.is_nan() || n < 1. {
            1
        } else {
            n.min(MAX_POINTS as f64) as usize
        }
    }

    /// The Lorentz factors of the grid points.
    pub fn lorentz_factors(&self) -> Vec<f64> {
        quad::logspace(self.log10_min, self.log10_max, self.len())
    }
}


/// A particle population sampled on a Lorentz-factor grid.
#[derive(Clone,Debug,PartialEq)]
pub struct ParticleGrid {
    gamma: Vec<f64>,
    sample: Vec<f64>,
}

impl ParticleGrid {
    /// Evaluate a distribution on the grid described by `spec`.
    pub fn build<D: ParticleDistribution + ?Sized>(spec: &GridSpec, distrib: &D, logger: &Logger) -> Self {
        let gamma = spec.lorentz_factors();
        let energies: Vec<f64> = gamma.iter().map(|g| g * MEC2_TEV).collect();
        let sample = distrib.number_density_many(&energies)
            .into_iter()
            .map(|n| n * MEC2_TEV)
            .collect();

        debug!(logger, "sampled particle distribution";
               "log10_gamma_min" => spec.log10_min,
               "log10_gamma_max" => spec.log10_max,
               "n_points" => gamma.len()
        );

        ParticleGrid { gamma: gamma, sample: sample }
    }

    /// The Lorentz factors of the grid points.
    pub fn lorentz_factors(&self) -> &[f64] {
        &self.gamma
    }

    /// The number of particles per unit Lorentz factor at each grid point.
    pub fn sample(&self) -> &[f64] {
        &self.sample
    }

    /// Integrate `n(gamma) k(gamma)` over the grid with the trapezoid rule,
    /// where `kernel` computes `k`.
    pub fn integrate<K>(&self, mut kernel: K) -> f64 where K: FnMut(f64) -> f64 {
        let integrand: Vec<f64> = self.gamma.iter()
            .zip(self.sample.iter())
            .map(|(g, n)| n * kernel(*g))
            .collect();
        quad::trapz(&integrand, &self.gamma)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::discard_logger;

    #[test]
    fn default_sizes() {
        assert_eq!(GridSpec::synchrotron_default().len(), 601);
        assert_eq!(GridSpec::inverse_compton_default().len(), 1951);
    }

    #[test]
    fn validation() {
        assert!(GridSpec::new(4., 10., 100.).is_ok());
        assert!(GridSpec::new(10., 4., 100.).is_err());
        assert!(GridSpec::new(4., 10., 0.).is_err());
        assert!(GridSpec::new(f64::NAN, 10., 10.).is_err());
        assert!(GridSpec::synchrotron_default().with_log10_max(3.).is_err());
    }

    #[test]
    fn oversized_grids_are_rejected() {
        assert!(GridSpec::new(0., 1., 1e20).is_err());
        assert!(GridSpec::new(0., 1e300, 1e10).is_err());
        assert!(GridSpec::new(-1e308, 1e308, 1.).is_err());
        assert!(GridSpec::new(0., 1., (MAX_POINTS - 1) as f64).is_ok());
        assert!(GridSpec::new(0., 1., MAX_POINTS as f64).is_err());
    }

    #[test]
    fn sample_is_per_unit_gamma() {
        let spec = GridSpec::new(0., 2., 1000.).unwrap();
        let grid = ParticleGrid::build(&spec, &|_e: f64| 1., &discard_logger());
        assert!(grid.lorentz_factors().windows(2).all(|w| w[1] > w[0]));
        assert_approx_eq!(grid.sample()[0], MEC2_TEV, 1e-20);

        // A flat dN/dE integrates to the energy span.
        let total = grid.integrate(|_| 1.);
        assert_approx_eq!(total / ((100. - 1.) * MEC2_TEV), 1., 1e-9);
    }
}
