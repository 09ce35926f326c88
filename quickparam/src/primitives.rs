//! Generators for booleans, integers, and enumerations.

use std::borrow::Cow;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use num_traits::{AsPrimitive, PrimInt};

use crate::error::{ConfigurationError, Endpoint};
use crate::generator::{GenerationStatus, Generator};
use crate::metadata::InRange;
use crate::rng::SourceOfRandomness;
use crate::types::{TypeToken, Typed};

/// Generator for boolean values
#[derive(Debug, Clone, Default)]
pub struct BoolGenerator;

impl Generator for BoolGenerator {
    type Output = bool;

    fn types(&self) -> Vec<TypeToken> {
        vec![bool::type_token()]
    }

    fn generate(&self, random: &mut dyn SourceOfRandomness, _status: &GenerationStatus) -> bool {
        random.next_boolean()
    }
}

/// Integer types whose whole domain fits in an `i64`
pub trait FitsInLong:
    PrimInt + AsPrimitive<i64> + FromStr<Err = ParseIntError> + fmt::Display + Typed + Send + Sync
{
}

macro_rules! impl_fits_in_long {
    ($($t:ty),*) => {
        $(impl FitsInLong for $t {})*
    };
}

impl_fits_in_long!(i8, i16, i32, i64, u8, u16, u32);

/// Generator for integers within an inclusive range.
///
/// Range endpoints are decimal literals; the format hint is ignored.
#[derive(Debug, Clone)]
pub struct IntegralGenerator<T> {
    min: T,
    max: T,
}

impl<T: FitsInLong> IntegralGenerator<T> {
    /// Create a generator for the full range of the type
    pub fn full_range() -> Self {
        Self {
            min: T::min_value(),
            max: T::max_value(),
        }
    }

    pub fn bounds(&self) -> (T, T) {
        (self.min, self.max)
    }
}

impl<T: FitsInLong> Default for IntegralGenerator<T> {
    fn default() -> Self {
        Self::full_range()
    }
}

impl<T> Generator for IntegralGenerator<T>
where
    T: FitsInLong,
    i64: AsPrimitive<T>,
{
    type Output = T;

    fn types(&self) -> Vec<TypeToken> {
        vec![T::type_token()]
    }

    fn configure(&mut self, range: &InRange) -> Result<(), ConfigurationError> {
        let parse = |endpoint, raw: &str| {
            raw.trim().parse::<T>().map_err(|e| {
                ConfigurationError::unparseable(endpoint, range.raw_min(), range.raw_max(), e)
            })
        };

        let min = match range.raw_min() {
            Some(raw) => parse(Endpoint::Min, raw)?,
            None => self.min,
        };
        let max = match range.raw_max() {
            Some(raw) => parse(Endpoint::Max, raw)?,
            None => self.max,
        };

        if min > max {
            return Err(ConfigurationError::inverted(range.raw_min(), range.raw_max()));
        }

        tracing::debug!(generator = self.name(), %min, %max, "configured integer range");
        self.min = min;
        self.max = max;
        Ok(())
    }

    fn generate(&self, random: &mut dyn SourceOfRandomness, _status: &GenerationStatus) -> T {
        let value = random.next_long(self.min.as_(), self.max.as_());
        AsPrimitive::<T>::as_(value)
    }
}

/// One member of an enumeration type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    /// Position in declaration order
    pub index: usize,
    pub name: Cow<'static, str>,
}

/// Picks members of an enumeration token uniformly
#[derive(Debug, Clone)]
pub struct EnumGenerator {
    token: TypeToken,
}

impl EnumGenerator {
    /// `None` unless `token` is an enumeration with at least one member
    pub fn new(token: TypeToken) -> Option<Self> {
        match token.enum_variants() {
            Some(variants) if !variants.is_empty() => Some(Self { token }),
            _ => None,
        }
    }

    fn variants(&self) -> &[Cow<'static, str>] {
        self.token.enum_variants().unwrap_or_default()
    }
}

impl Generator for EnumGenerator {
    type Output = EnumVariant;

    fn types(&self) -> Vec<TypeToken> {
        vec![self.token.clone()]
    }

    fn generate(
        &self,
        random: &mut dyn SourceOfRandomness,
        _status: &GenerationStatus,
    ) -> EnumVariant {
        let variants = self.variants();
        let index = random.next_index(variants.len());
        EnumVariant {
            index,
            name: variants[index].clone(),
        }
    }
}
