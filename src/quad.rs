// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Numerical integration.

Adaptive Gauss-Kronrod quadrature from GSL, over a finite interval (QAG) and
over a semi-infinite interval `[a, inf)` (QAGIU), behind a small
workspace-plus-builder interface. There is also a trapezoid rule for
integrating sampled data and a helper to make log-spaced grids.

*/

use std::f64;
use std::sync::Once;

use rgsl::{GaussKronrodRule, Value};
use thiserror::Error;


/// Errors from the adaptive integrators.
#[derive(Clone,Debug,Error,PartialEq)]
pub enum QuadError {
    /// GSL could not allocate a workspace of the requested size.
    #[error("cannot allocate an integration workspace of {size} subintervals")]
    Allocation {
        /// The requested number of subintervals.
        size: usize,
    },

    /// The workspace ran out of subintervals before the requested tolerance
    /// was reached.
    #[error("maximum number of subdivisions ({limit}) reached")]
    MaxSubdivisions {
        /// The subdivision limit of the workspace.
        limit: usize,
    },

    /// Roundoff error kept the error estimate from reaching the tolerance.
    #[error("roundoff error prevents reaching the requested tolerance")]
    Roundoff,

    /// The integrand has a singularity or otherwise behaves too badly for
    /// the adaptive scheme.
    #[error("bad integrand behavior; probably a non-integrable singularity")]
    Singular,

    /// The integral appears to be divergent or too slowly convergent.
    #[error("integral is divergent or converges too slowly")]
    Diverges,

    /// The integration produced a non-finite value.
    #[error("integrand evaluated to a non-finite value")]
    NonFinite,

    /// Any other GSL failure.
    #[error("GSL integration failed: {0}")]
    Failed(String),
}

impl QuadError {
    fn from_status(status: Value, limit: usize) -> Self {
        match status {
            Value::MaxIteration => QuadError::MaxSubdivisions { limit: limit },
            Value::Round => QuadError::Roundoff,
            Value::Singularity => QuadError::Singular,
            Value::Diverge => QuadError::Diverges,
            other => QuadError::Failed(format!("{:?}", other)),
        }
    }
}

/// Results of integration.
pub type QuadResult<T> = Result<T, QuadError>;


static GSL_INIT: Once = Once::new();

/// GSL's default error handler aborts the process. We check every status
/// ourselves, so turn it off before the first integration.
fn init_gsl() {
    GSL_INIT.call_once(|| {
        rgsl::error::set_error_handler_off();
    });
}


/// Scratch space for the adaptive integrators. The size is the maximum
/// number of subintervals that may be created.
pub struct IntegrationWorkspace {
    limit: usize,
    handle: rgsl::IntegrationWorkspace,
}

impl IntegrationWorkspace {
    /// Create a workspace allowing up to `n` subintervals.
    pub fn new(n: usize) -> QuadResult<Self> {
        init_gsl();
        let limit = n.max(1);

        match rgsl::IntegrationWorkspace::new(limit) {
            Some(handle) => Ok(IntegrationWorkspace { limit: limit, handle: handle }),
            None => Err(QuadError::Allocation { size: limit }),
        }
    }

    /// The maximum number of subintervals.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Start building a finite-interval integration.
    pub fn qag<'a, F>(&'a mut self, f: F, lower_bound: f64, upper_bound: f64) -> IntegrationBuilder<'a, F> where F: Fn(f64) -> f64 {
        IntegrationBuilder::new(self, f, Integrator::QAG, lower_bound, upper_bound)
    }

    /// Start building an integration from `lower_bound` to positive infinity.
    pub fn qagiu<'a, F>(&'a mut self, f: F, lower_bound: f64) -> IntegrationBuilder<'a, F> where F: Fn(f64) -> f64 {
        IntegrationBuilder::new(self, f, Integrator::QAGIU, lower_bound, f64::INFINITY)
    }
}


/// The outcome of a successful integration.
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct IntegrationResult {
    /// The estimated value of the integral.
    pub value: f64,
    /// The estimated absolute error.
    pub abserr: f64
}


/// The Gauss-Kronrod rule to apply on each subinterval of a QAG integration.
/// QAGIU always uses the 15-point rule.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum IntegrationRule {
    /// 7-point Gauss, 15-point Kronrod.
    GaussKonrod15,
    /// 10-point Gauss, 21-point Kronrod.
    GaussKonrod21,
}

impl IntegrationRule {
    fn as_gsl(self) -> GaussKronrodRule {
        match self {
            IntegrationRule::GaussKonrod15 => GaussKronrodRule::Gauss15,
            IntegrationRule::GaussKonrod21 => GaussKronrodRule::Gauss21,
        }
    }
}


/// Which kind of interval we integrate over.
#[derive(Clone,Copy,Debug,Eq,PartialEq)]
pub enum Integrator {
    /// A finite interval `[a, b]`.
    QAG,
    /// A semi-infinite interval `[a, inf)`.
    QAGIU,
}


/// Collects the settings of one integration. Tolerances default to a
/// relative precision of 1e-8 with no absolute target.
pub struct IntegrationBuilder<'a, F: 'a> where F: Fn(f64) -> f64 {
    workspace: &'a mut IntegrationWorkspace,
    function: F,
    kind: Integrator,
    rule: IntegrationRule,
    lower_bound: f64,
    upper_bound: f64,
    epsabs: f64,
    epsrel: f64,
}


impl<'a, F: 'a> IntegrationBuilder<'a, F> where F: Fn(f64) -> f64 {
    /// Set up an integration of `f` using the given workspace.
    pub fn new(ws: &'a mut IntegrationWorkspace, f: F, kind: Integrator,
               lower: f64, upper: f64) -> IntegrationBuilder<'a, F> {
        IntegrationBuilder {
            workspace: ws,
            function: f,
            kind: kind,
            rule: IntegrationRule::GaussKonrod21,
            lower_bound: lower,
            upper_bound: upper,
            epsabs: 0.,
            epsrel: 1e-8,
        }
    }

    /// Set the absolute and relative error targets. The integration stops once
    /// the error estimate is below the larger of the two.
    pub fn tolerance(mut self, epsabs: f64, epsrel: f64) -> Self {
        self.epsabs = epsabs;
        self.epsrel = epsrel;
        self
    }

    /// Choose the Gauss-Kronrod rule.
    pub fn rule(mut self, rule: IntegrationRule) -> Self {
        self.rule = rule;
        self
    }

    /// Run the integration.
    pub fn compute(self) -> QuadResult<IntegrationResult> {
        let IntegrationBuilder { workspace, function, kind, rule, lower_bound,
                                 upper_bound, epsabs, epsrel } = self;
        let limit = workspace.limit;

        let outcome = match kind {
            Integrator::QAG => workspace.handle.qag(function, lower_bound, upper_bound,
                                                    epsabs, epsrel, limit, rule.as_gsl()),
            Integrator::QAGIU => workspace.handle.qagiu(function, lower_bound,
                                                        epsabs, epsrel, limit),
        };

        let (value, abserr) = outcome.map_err(|status| QuadError::from_status(status, limit))?;

        if !value.is_finite() {
            return Err(QuadError::NonFinite);
        }

        Ok(IntegrationResult { value: value, abserr: abserr })
    }
}


/// Integrate sampled data with the trapezoid rule.
///
/// `y` and `x` must have the same length; extra samples of the longer one are
/// ignored.
pub fn trapz(y: &[f64], x: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum()
}


/// `num` points spaced evenly in log10 between `10^log10_min` and
/// `10^log10_max`, endpoints included.
pub fn logspace(log10_min: f64, log10_max: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![10_f64.powf(log10_min)],
        _ => {
            let step = (log10_max - log10_min) / (num - 1) as f64;
            (0..num).map(|i| 10_f64.powf(log10_min + step * i as f64)).collect()
        },
    }
}


#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use super::*;

    #[test]
    fn qag_polynomial() {
        let mut ws = IntegrationWorkspace::new(100).unwrap();
        let r = ws.qag(|x| 3. * x * x, 0., 2.)
            .tolerance(0., 1e-10)
            .compute()
            .unwrap();
        assert_approx_eq!(r.value, 8., 1e-12);
    }

    #[test]
    fn qag_log_singularity() {
        let mut ws = IntegrationWorkspace::new(1000).unwrap();
        let r = ws.qag(|x| x.ln(), 0., 1.)
            .tolerance(0., 1e-6)
            .rule(IntegrationRule::GaussKonrod15)
            .compute()
            .unwrap();
        assert_approx_eq!(r.value, -1., 1e-5);
    }

    #[test]
    fn qagiu_tail() {
        let mut ws = IntegrationWorkspace::new(1000).unwrap();
        let r = ws.qagiu(|x| 1. / (x * x), 0.5)
            .tolerance(0., 1e-6)
            .compute()
            .unwrap();
        assert_approx_eq!(r.value, 2., 1e-5);

        let r = ws.qagiu(|x| (-x * x).exp(), 0.)
            .tolerance(0., 1e-8)
            .compute()
            .unwrap();
        assert_approx_eq!(r.value, 0.5 * PI.sqrt(), 1e-7);
    }

    #[test]
    fn zero_integrand_converges() {
        let mut ws = IntegrationWorkspace::new(10).unwrap();
        let r = ws.qag(|_| 0., 0., 1.).tolerance(0., 1e-3).compute().unwrap();
        assert_eq!(r.value, 0.);
    }

    #[test]
    fn subdivision_limit() {
        let mut ws = IntegrationWorkspace::new(3).unwrap();
        let r = ws.qag(|x| (50. * x).sin() / x.sqrt(), 0., 10.)
            .tolerance(0., 1e-12)
            .compute();
        match r {
            Err(QuadError::MaxSubdivisions { limit }) => assert_eq!(limit, 3),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn trapezoid() {
        let x = logspace(0., 2., 2001);
        let y: Vec<f64> = x.iter().map(|v| 1. / v).collect();
        assert_approx_eq!(trapz(&y, &x), 100_f64.ln(), 1e-5);
    }

    #[test]
    fn logspace_endpoints() {
        let g = logspace(4., 10., 601);
        assert_eq!(g.len(), 601);
        assert_approx_eq!(g[0], 1e4, 1e-8);
        assert_approx_eq!(g[600] / 1e10, 1., 1e-12);
        assert!(g.windows(2).all(|w| w[1] > w[0]));
    }
}
