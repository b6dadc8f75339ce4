// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Textual configuration overrides.

Every model has a typed configuration structure with documented defaults.
Those structures can also be adjusted with `key=value` strings, which is how
the command-line tools expose them. Unknown keys are an error rather than
being silently ignored.

*/

use crate::errors::{Error, Result};
use crate::grid::GridSpec;


/// A configuration that accepts textual `key = value` overrides.
pub trait Configurable {
    /// Set one option. Fails for unknown keys and unparseable or out-of-domain
    /// values; on failure the configuration is left unchanged.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// The keys understood by `set`.
    fn keys() -> &'static [&'static str] where Self: Sized;

    /// Apply a sequence of `key=value` assignments in order.
    fn apply<'a, I>(&mut self, assignments: I) -> Result<()> where I: IntoIterator<Item = &'a str>, Self: Sized {
        for a in assignments {
            let (key, value) = split_assignment(a)?;
            self.set(key, value)?;
        }

        Ok(())
    }
}


/// Split `key=value` into its two trimmed halves.
pub fn split_assignment(text: &str) -> Result<(&str, &str)> {
    match text.find('=') {
        Some(i) => Ok((text[..i].trim(), text[i + 1..].trim())),
        None => Err(Error::InvalidOptionValue { key: text.trim().to_owned(), value: String::new() }),
    }
}


/// Parse a floating-point option value.
pub fn parse_f64(key: &str, value: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| Error::InvalidOptionValue {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}


/// The option keys shared by configurations that carry a `GridSpec`.
pub const GRID_KEYS: &[&str] = &["grid.log10_min", "grid.log10_max", "grid.points_per_decade"];


/// Try to apply an option to a `GridSpec`. Returns `Ok(None)` if `key` is not
/// a grid key.
pub fn set_grid_option(grid: &GridSpec, key: &str, value: &str) -> Result<Option<GridSpec>> {
    Ok(Some(match key {
        "grid.log10_min" => grid.with_log10_min(parse_f64(key, value)?)?,
        "grid.log10_max" => grid.with_log10_max(parse_f64(key, value)?)?,
        "grid.points_per_decade" => grid.with_points_per_decade(parse_f64(key, value)?)?,
        _ => return Ok(None),
    }))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments() {
        assert_eq!(split_assignment(" b_field = 1e-5 ").unwrap(), ("b_field", "1e-5"));
        assert!(split_assignment("b_field").is_err());
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_f64("x", " 2.5").unwrap(), 2.5);
        assert_eq!(parse_f64("x", "two"), Err(Error::InvalidOptionValue {
            key: "x".to_owned(), value: "two".to_owned()
        }));
    }

    #[test]
    fn grid_options() {
        let g = GridSpec::synchrotron_default();
        let g2 = set_grid_option(&g, "grid.points_per_decade", "50").unwrap().unwrap();
        assert_eq!(g2.len(), 301);
        assert_eq!(set_grid_option(&g, "b_field", "1").unwrap(), None);
        assert!(set_grid_option(&g, "grid.log10_max", "1").is_err());
    }

    #[test]
    fn gridded_models_take_grid_keys() {
        use crate::{InverseComptonConfig, SynchrotronConfig};

        for k in GRID_KEYS {
            assert!(SynchrotronConfig::keys().contains(k));
            assert!(InverseComptonConfig::keys().contains(k));
        }
    }

    #[test]
    fn huge_grid_density_is_refused() {
        let grid = GridSpec::synchrotron_default();
        match set_grid_option(&grid, "grid.points_per_decade", "1e20") {
            Err(Error::InvalidParameter { ref name, .. }) => assert_eq!(name, "grid.points_per_decade"),
            other => panic!("unexpected result {:?}", other),
        }

        let mut c = crate::SynchrotronConfig::default();
        assert!(c.set("grid.points_per_decade", "1e20").is_err());
        assert_eq!(c.grid, GridSpec::synchrotron_default());
    }

    #[test]
    fn apply_in_order() {
        let mut c = crate::PionDecayConfig::default();
        c.apply(vec!["calibration = straddling", "transition_energy=0.5"]).unwrap();
        assert_eq!(c.calibration, crate::Calibration::Straddling);
        assert!(c.apply(vec!["nhat=2"]).is_err());
    }
}
