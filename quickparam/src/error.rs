//! Error types raised while configuring and resolving generators.

use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

use crate::types::TypeToken;

/// Which end of a range failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Min,
    Max,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Min => write!(f, "min"),
            Endpoint::Max => write!(f, "max"),
        }
    }
}

/// Failure to turn a raw endpoint into a generator's native domain
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundParseError {
    #[error(transparent)]
    Instant(#[from] chrono::ParseError),

    #[error(transparent)]
    Integer(#[from] ParseIntError),

    /// Parsed, but outside what the target type can hold
    #[error("{value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },
}

/// Malformed or self-contradictory range bounds.
///
/// Raised by `configure`, never by `generate`. Both raw endpoints are kept
/// verbatim; `None` means the endpoint was left unset.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// An endpoint could not be parsed
    #[error("cannot parse {endpoint} endpoint of range [{}, {}]: {source}", show(.min), show(.max))]
    Unparseable {
        endpoint: Endpoint,
        min: Option<String>,
        max: Option<String>,
        #[source]
        source: BoundParseError,
    },

    /// Both endpoints parsed but min sorts after max
    #[error("bad range, {} > {}", show(.min), show(.max))]
    Inverted {
        min: Option<String>,
        max: Option<String>,
    },
}

fn show(raw: &Option<String>) -> &str {
    raw.as_deref().unwrap_or("<unset>")
}

impl ConfigurationError {
    pub fn unparseable(
        endpoint: Endpoint,
        min: Option<&str>,
        max: Option<&str>,
        source: impl Into<BoundParseError>,
    ) -> Self {
        Self::Unparseable {
            endpoint,
            min: min.map(str::to_owned),
            max: max.map(str::to_owned),
            source: source.into(),
        }
    }

    pub fn inverted(min: Option<&str>, max: Option<&str>) -> Self {
        Self::Inverted {
            min: min.map(str::to_owned),
            max: max.map(str::to_owned),
        }
    }

    /// The raw min endpoint as supplied
    pub fn raw_min(&self) -> Option<&str> {
        match self {
            Self::Unparseable { min, .. } | Self::Inverted { min, .. } => min.as_deref(),
        }
    }

    /// The raw max endpoint as supplied
    pub fn raw_max(&self) -> Option<&str> {
        match self {
            Self::Unparseable { max, .. } | Self::Inverted { max, .. } => max.as_deref(),
        }
    }
}

/// Two range declarations on one parameter set the same field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} declared twice ({first:?} and {second:?})")]
pub struct RangeClash {
    pub field: &'static str,
    pub first: String,
    pub second: String,
}

/// Failures binding or resolving a generator for a parameter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    /// An explicitly named generator produces a type the parameter cannot hold
    #[error(
        "The generator {generator} named in {mechanism} on parameter of type {parameter} does not produce a type-compatible object (produces {produced})"
    )]
    IncompatibleGenerator {
        generator: String,
        mechanism: &'static str,
        parameter: TypeToken,
        produced: TypeToken,
    },

    /// No registered generator is compatible with the requested type
    #[error("No generator found for type {requested}")]
    NoGeneratorFound { requested: TypeToken },

    /// A generator identifier with no registered factory
    #[error("No generator registered under identifier {name:?}")]
    UnknownGenerator { name: String },

    /// A generator rejected its range configuration
    #[error("Generator {generator} rejected its range: {source}")]
    Configuration {
        generator: String,
        #[source]
        source: ConfigurationError,
    },

    /// The parameter's range declarations cannot be combined into one
    #[error("Conflicting ranges on parameter of type {parameter}: {source}")]
    ConflictingRanges {
        parameter: TypeToken,
        #[source]
        source: RangeClash,
    },

    /// The generated value was not of the requested Rust type
    #[error("Generator {generator} does not produce values of type {expected}")]
    ValueTypeMismatch {
        generator: String,
        expected: &'static str,
    },
}

impl GeneratorError {
    pub fn incompatible(
        generator: impl Into<String>,
        mechanism: &'static str,
        parameter: &TypeToken,
        produced: &TypeToken,
    ) -> Self {
        Self::IncompatibleGenerator {
            generator: generator.into(),
            mechanism,
            parameter: parameter.clone(),
            produced: produced.clone(),
        }
    }

    pub fn no_generator_found(requested: &TypeToken) -> Self {
        Self::NoGeneratorFound {
            requested: requested.clone(),
        }
    }
}

/// Result alias for generator binding and resolution
pub type Result<T> = std::result::Result<T, GeneratorError>;
