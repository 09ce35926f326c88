//! Per-parameter declarations handed over by the metadata layer.
//!
//! These are plain values; extracting them from test source is someone
//! else's job.

use crate::config::{ConfigError, get_global_config};
use crate::error::RangeClash;

/// Quantifier: how many samples to draw for a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForAll {
    sample_size: usize,
}

impl ForAll {
    /// Request a specific sample size
    pub fn new(sample_size: usize) -> Result<Self, ConfigError> {
        if sample_size == 0 {
            return Err(ConfigError::InvalidSampleSize(sample_size));
        }
        Ok(Self { sample_size })
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }
}

impl Default for ForAll {
    /// Uses the global default sample size
    fn default() -> Self {
        Self {
            sample_size: get_global_config().default_sample_size,
        }
    }
}

/// "Use these generators" declaration, by factory identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UseGenerators {
    generators: Vec<String>,
}

impl UseGenerators {
    /// Name used for this declaration in diagnostics
    pub const MECHANISM: &'static str = "UseGenerators";

    pub fn new<I, S>(generators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            generators: generators.into_iter().map(Into::into).collect(),
        }
    }

    /// No explicit generators
    pub fn none() -> Self {
        Self::default()
    }

    pub fn generators(&self) -> &[String] {
        &self.generators
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

/// Constraint: an opaque boolean expression evaluated by the harness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuchThat {
    expression: String,
}

impl SuchThat {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }
}

/// Closed range configuration for a generator.
///
/// Endpoints are raw text in the target generator's domain; `None` leaves
/// that end at the generator's default. The format hint is advisory and
/// generators with a canonical format ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InRange {
    min: Option<String>,
    max: Option<String>,
    format: Option<String>,
}

impl InRange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: impl Into<String>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<String>) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn raw_min(&self) -> Option<&str> {
        self.min.as_deref()
    }

    pub fn raw_max(&self) -> Option<&str> {
        self.max.as_deref()
    }

    pub fn format_hint(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Fold several declarations into one range.
    ///
    /// Each field may be set by at most one declaration.
    pub fn merge(ranges: &[InRange]) -> Result<InRange, RangeClash> {
        let mut merged = InRange::new();
        for range in ranges {
            take(&mut merged.min, &range.min, "min")?;
            take(&mut merged.max, &range.max, "max")?;
            take(&mut merged.format, &range.format, "format")?;
        }
        Ok(merged)
    }
}

fn take(
    slot: &mut Option<String>,
    incoming: &Option<String>,
    field: &'static str,
) -> Result<(), RangeClash> {
    match (slot.as_ref(), incoming) {
        (Some(first), Some(second)) => Err(RangeClash {
            field,
            first: first.clone(),
            second: second.clone(),
        }),
        (None, Some(value)) => {
            *slot = Some(value.clone());
            Ok(())
        }
        (_, None) => Ok(()),
    }
}
