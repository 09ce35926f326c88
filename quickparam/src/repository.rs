//! Index from requested types to compatible generators.

use std::fmt;
use std::sync::Arc;

use crate::error::{GeneratorError, Result};
use crate::generator::{AnyGenerator, GenerationStatus, Value};
use crate::primitives::{BoolGenerator, IntegralGenerator};
use crate::rng::SourceOfRandomness;
use crate::time::{ClockGenerator, InstantGenerator};
use crate::types::TypeToken;

/// Registered generators, looked up by type compatibility.
///
/// Each generator is indexed under every type it claims. Lookup walks the
/// index in registration order and returns the first generator whose type
/// can stand in for the requested one, so resolution is deterministic.
///
/// The repository owns the randomness source its generators draw from.
pub struct GeneratorRepository {
    random: Box<dyn SourceOfRandomness + Send>,
    index: Vec<(TypeToken, Arc<dyn AnyGenerator>)>,
    registered: usize,
}

impl GeneratorRepository {
    /// Create an empty repository drawing from `random`
    pub fn new(random: impl SourceOfRandomness + Send + 'static) -> Self {
        Self {
            random: Box::new(random),
            index: Vec::new(),
            registered: 0,
        }
    }

    /// Repository preloaded with the built-in generators
    pub fn builtin(random: impl SourceOfRandomness + Send + 'static) -> Self {
        let mut repo = Self::new(random);
        repo.add(BoolGenerator);
        repo.add(IntegralGenerator::<i8>::full_range());
        repo.add(IntegralGenerator::<i16>::full_range());
        repo.add(IntegralGenerator::<i32>::full_range());
        repo.add(IntegralGenerator::<i64>::full_range());
        repo.add(IntegralGenerator::<u8>::full_range());
        repo.add(IntegralGenerator::<u16>::full_range());
        repo.add(IntegralGenerator::<u32>::full_range());
        repo.add(ClockGenerator::new());
        repo.add(InstantGenerator::new());
        repo
    }

    /// Register a generator under every type it claims
    pub fn add<G: AnyGenerator + 'static>(&mut self, generator: G) {
        self.add_shared(Arc::new(generator));
    }

    /// Register an already shared generator
    pub fn add_shared(&mut self, generator: Arc<dyn AnyGenerator>) {
        let types = generator.produced_types();
        tracing::debug!(
            generator = generator.generator_name(),
            types = ?types.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "registering generator"
        );
        for token in types {
            self.index.push((token, Arc::clone(&generator)));
        }
        self.registered += 1;
    }

    /// True iff nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.registered == 0
    }

    /// Number of generators registered
    pub fn len(&self) -> usize {
        self.registered
    }

    /// First registered generator whose claimed type may stand in for `requested`
    pub fn generator_for(&self, requested: &TypeToken) -> Result<Arc<dyn AnyGenerator>> {
        let found = self
            .index
            .iter()
            .find(|(claimed, _)| requested.is_assignable_from(claimed))
            .map(|(_, generator)| Arc::clone(generator));

        match found {
            Some(generator) => {
                tracing::trace!(
                    %requested,
                    generator = generator.generator_name(),
                    "resolved generator"
                );
                Ok(generator)
            }
            None => Err(GeneratorError::no_generator_found(requested)),
        }
    }

    /// The randomness source owned by this repository
    pub fn random(&mut self) -> &mut dyn SourceOfRandomness {
        self.random.as_mut()
    }

    /// Resolve a generator for `requested` and draw one value from it
    pub fn generate(&mut self, requested: &TypeToken, status: &GenerationStatus) -> Result<Value> {
        let generator = self.generator_for(requested)?;
        Ok(generator.generate_value(self.random.as_mut(), status))
    }
}

impl fmt::Debug for GeneratorRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRepository")
            .field("registered", &self.registered)
            .field(
                "index",
                &self
                    .index
                    .iter()
                    .map(|(token, generator)| (token.to_string(), generator.generator_name()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
