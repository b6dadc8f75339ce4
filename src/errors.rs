// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

//! Error types.

use thiserror::Error;

use crate::quad::QuadError;


/// Everything that can go wrong when setting up or evaluating a model.
#[derive(Clone,Debug,Error,PartialEq)]
pub enum Error {
    /// A seed photon field name that is not one of `CMB`, `FIR` or `NIR`.
    #[error("unrecognized seed photon field `{0}`; use CMB, FIR, NIR or a NAME:T:u specification")]
    UnknownSeedField(String),

    /// A custom seed photon field specification that could not be parsed.
    #[error("malformed seed photon field specification `{0}`")]
    MalformedSeedField(String),

    /// Two seed photon fields share a name.
    #[error("seed photon field `{0}` given more than once")]
    DuplicateSeedField(String),

    /// A scalar parameter is outside of its allowed domain.
    #[error("invalid value for `{name}`: {reason}")]
    InvalidParameter {
        /// The name of the parameter.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A configuration key that the model does not know about.
    #[error("unknown configuration option `{0}`")]
    UnknownOption(String),

    /// A configuration value that could not be parsed.
    #[error("cannot parse `{value}` as a value for option `{key}`")]
    InvalidOptionValue {
        /// The configuration key.
        key: String,
        /// The offending text.
        value: String,
    },

    /// A table of photon energies without an `energy` column.
    #[error("table does not have an `energy` column")]
    MissingEnergyColumn,

    /// A table whose `energy` column does not hold energies.
    #[error("the `energy` column does not have dimensions of energy")]
    EnergyColumnDimension,

    /// Photon energies that cannot be used.
    #[error("invalid photon energies: {0}")]
    InvalidInput(String),

    /// An adaptive integration did not converge.
    #[error("numerical integration failed: {0}")]
    Integration(#[from] QuadError),
}

/// Results of fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;


impl Error {
    pub(crate) fn invalid_parameter<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Error::InvalidParameter { name: name.into(), reason: reason.into() }
    }
}
