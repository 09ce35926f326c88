//! Core generator contract, type erasure, and the factory registry.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::error::{ConfigurationError, GeneratorError, Result};
use crate::metadata::InRange;
use crate::primitives::{BoolGenerator, IntegralGenerator};
use crate::rng::SourceOfRandomness;
use crate::time::{ClockGenerator, InstantGenerator};
use crate::types::TypeToken;

/// Per-iteration hint passed to generators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationStatus {
    attempts: usize,
    size: usize,
}

impl GenerationStatus {
    pub fn new(attempts: usize, size: usize) -> Self {
        Self { attempts, size }
    }

    /// Iterations attempted so far for this parameter
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Hint for the size of generated collections
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for GenerationStatus {
    fn default() -> Self {
        Self {
            attempts: 0,
            size: 10,
        }
    }
}

/// Produces values of one Rust type for test parameters.
///
/// `configure` is called at most once, before the first `generate`. Once
/// configured a generator is read-only.
pub trait Generator {
    type Output: 'static;

    /// The types this generator claims to produce
    fn types(&self) -> Vec<TypeToken>;

    /// Name used in diagnostics
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Restrict generation to a closed range.
    ///
    /// Generators without a notion of range accept and ignore it.
    fn configure(&mut self, range: &InRange) -> std::result::Result<(), ConfigurationError> {
        tracing::trace!(generator = self.name(), ?range, "range not supported; ignoring");
        Ok(())
    }

    /// Generate one value
    fn generate(&self, random: &mut dyn SourceOfRandomness, status: &GenerationStatus)
    -> Self::Output;
}

/// A generated value of whatever type its generator produces
pub type Value = Box<dyn Any + Send>;

/// Object-safe view of a [`Generator`], so generators of different output
/// types can share a repository.
pub trait AnyGenerator: Send + Sync {
    fn generator_name(&self) -> &'static str;

    fn produced_types(&self) -> Vec<TypeToken>;

    fn configure_range(&mut self, range: &InRange) -> std::result::Result<(), ConfigurationError>;

    fn generate_value(&self, random: &mut dyn SourceOfRandomness, status: &GenerationStatus)
    -> Value;
}

impl<G> AnyGenerator for G
where
    G: Generator + Send + Sync,
    G::Output: Send,
{
    fn generator_name(&self) -> &'static str {
        Generator::name(self)
    }

    fn produced_types(&self) -> Vec<TypeToken> {
        Generator::types(self)
    }

    fn configure_range(&mut self, range: &InRange) -> std::result::Result<(), ConfigurationError> {
        Generator::configure(self, range)
    }

    fn generate_value(
        &self,
        random: &mut dyn SourceOfRandomness,
        status: &GenerationStatus,
    ) -> Value {
        Box::new(Generator::generate(self, random, status))
    }
}

impl dyn AnyGenerator {
    /// Generate one value and downcast it to `T`
    pub fn generate_as<T: 'static>(
        &self,
        random: &mut dyn SourceOfRandomness,
        status: &GenerationStatus,
    ) -> Result<T> {
        self.generate_value(random, status)
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| GeneratorError::ValueTypeMismatch {
                generator: self.generator_name().to_owned(),
                expected: std::any::type_name::<T>(),
            })
    }
}

impl fmt::Debug for dyn AnyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyGenerator")
            .field("name", &self.generator_name())
            .field("types", &self.produced_types())
            .finish()
    }
}

type Factory = Box<dyn Fn() -> Box<dyn AnyGenerator> + Send + Sync>;

/// Maps stable generator identifiers to constructors.
///
/// Explicit generator declarations name generators by identifier; binding
/// looks the identifier up here and builds a fresh instance.
#[derive(Default)]
pub struct GeneratorFactories {
    factories: HashMap<String, Factory>,
}

impl GeneratorFactories {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in generators
    pub fn builtin() -> Self {
        let mut factories = Self::new();
        factories.register_default::<BoolGenerator>("bool");
        factories.register("i32", IntegralGenerator::<i32>::full_range);
        factories.register("i64", IntegralGenerator::<i64>::full_range);
        factories.register_default::<ClockGenerator>("clock");
        factories.register_default::<InstantGenerator>("instant");
        factories
    }

    /// Register a constructor; a later registration replaces an earlier one
    pub fn register<F, G>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> G + Send + Sync + 'static,
        G: AnyGenerator + 'static,
    {
        self.factories.insert(
            name.into(),
            Box::new(move || Box::new(factory()) as Box<dyn AnyGenerator>),
        );
    }

    /// Register a generator built with `Default::default`
    pub fn register_default<G>(&mut self, name: impl Into<String>)
    where
        G: AnyGenerator + Default + 'static,
    {
        self.register(name, G::default);
    }

    /// Build a fresh generator for an identifier
    pub fn instantiate(&self, name: &str) -> Result<Box<dyn AnyGenerator>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| GeneratorError::UnknownGenerator {
                name: name.to_owned(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for GeneratorFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("GeneratorFactories")
            .field("names", &names)
            .finish()
    }
}
