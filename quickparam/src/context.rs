//! Per-parameter generation plan.
//!
//! A [`ParameterContext`] is assembled in three phases, always in the same
//! order: quantifier, explicit generators, constraint. The builder's type
//! parameter tracks the phase, so phases cannot be skipped, repeated, or
//! reordered.
//!
//! ```rust
//! use quickparam::context::ParameterContext;
//! use quickparam::generator::GeneratorFactories;
//! use quickparam::metadata::{ForAll, InRange, SuchThat, UseGenerators};
//! use quickparam::rng::RngSource;
//! use quickparam::time::Clock;
//! use quickparam::types::type_of;
//!
//! let context = ParameterContext::builder_with_random(type_of::<dyn Clock>(), RngSource::seeded(1))
//!     .add_quantifier(&ForAll::new(50).unwrap())
//!     .add_generators(
//!         &UseGenerators::new(["clock"]),
//!         &GeneratorFactories::builtin(),
//!         &[InRange::new().min("2000-01-01T00:00:00Z")],
//!     )
//!     .unwrap()
//!     .add_constraint(Some(&SuchThat::new("clock.year() < 3000")));
//!
//! assert_eq!(context.sample_size(), 50);
//! assert!(context.explicit_generator().unwrap().is_some());
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use crate::config::get_global_config;
use crate::error::{GeneratorError, Result};
use crate::generator::{AnyGenerator, GenerationStatus, GeneratorFactories, Value};
use crate::metadata::{ForAll, InRange, SuchThat, UseGenerators};
use crate::repository::GeneratorRepository;
use crate::rng::SourceOfRandomness;
use crate::types::TypeToken;

/// Builder phase: nothing applied yet
#[derive(Debug)]
pub struct Unquantified;

/// Builder phase: sample size decided
#[derive(Debug)]
pub struct Quantified;

/// Builder phase: explicit generators bound
#[derive(Debug)]
pub struct GeneratorsBound;

/// Builds a [`ParameterContext`] one phase at a time
#[derive(Debug)]
pub struct ParameterContextBuilder<Phase> {
    parameter_type: TypeToken,
    sample_size: usize,
    repo: GeneratorRepository,
    _phase: PhantomData<Phase>,
}

impl<Phase> ParameterContextBuilder<Phase> {
    fn advance<Next>(self) -> ParameterContextBuilder<Next> {
        ParameterContextBuilder {
            parameter_type: self.parameter_type,
            sample_size: self.sample_size,
            repo: self.repo,
            _phase: PhantomData,
        }
    }
}

impl ParameterContextBuilder<Unquantified> {
    /// Decide the sample size from the parameter's raw type.
    ///
    /// Booleans get 2 and enumerations get their member count, which covers
    /// every value exactly. Everything else uses the quantifier's size.
    pub fn add_quantifier(mut self, quantifier: &ForAll) -> ParameterContextBuilder<Quantified> {
        let raw = self.parameter_type.raw();
        self.sample_size = if raw.is_boolean() {
            2
        } else if let Some(variants) = raw.enum_variants() {
            variants.len()
        } else {
            quantifier.sample_size()
        };

        tracing::debug!(
            parameter = %self.parameter_type,
            sample_size = self.sample_size,
            "decided sample size"
        );
        self.advance()
    }
}

impl ParameterContextBuilder<Quantified> {
    /// Bind the generators named in `declared`.
    ///
    /// `ranges` are merged into a single range first; two declarations
    /// setting the same field fail with `ConflictingRanges`. Each identifier
    /// is then instantiated from `factories`, checked against the parameter
    /// type, configured once with the merged range, and registered. The
    /// first failure aborts binding; generators registered before it are not
    /// rolled back.
    pub fn add_generators(
        mut self,
        declared: &UseGenerators,
        factories: &GeneratorFactories,
        ranges: &[InRange],
    ) -> Result<ParameterContextBuilder<GeneratorsBound>> {
        let range = if ranges.is_empty() {
            None
        } else {
            let merged = InRange::merge(ranges).map_err(|source| GeneratorError::ConflictingRanges {
                parameter: self.parameter_type.clone(),
                source,
            })?;
            Some(merged)
        };

        for name in declared.generators() {
            let mut generator = factories.instantiate(name)?;
            ensure_correct_type(&self.parameter_type, generator.as_ref())?;

            if let Some(range) = &range {
                generator
                    .configure_range(range)
                    .map_err(|source| GeneratorError::Configuration {
                        generator: generator.generator_name().to_owned(),
                        source,
                    })?;
            }

            tracing::debug!(
                parameter = %self.parameter_type,
                generator = %name,
                "bound explicit generator"
            );
            self.repo.add_shared(Arc::from(generator));
        }

        Ok(self.advance())
    }
}

impl ParameterContextBuilder<GeneratorsBound> {
    /// Attach the constraint expression, if any, and finish.
    ///
    /// The expression is not parsed here.
    pub fn add_constraint(self, constraint: Option<&SuchThat>) -> ParameterContext {
        let expression = constraint.map(|c| c.expression().to_owned());
        tracing::debug!(
            parameter = %self.parameter_type,
            expression = ?expression,
            "attached constraint"
        );

        ParameterContext {
            parameter_type: self.parameter_type,
            sample_size: self.sample_size,
            expression,
            repo: self.repo,
        }
    }
}

// Every type the generator claims must fit the parameter.
fn ensure_correct_type(parameter_type: &TypeToken, generator: &dyn AnyGenerator) -> Result<()> {
    for produced in generator.produced_types() {
        if !parameter_type.is_assignable_from(&produced) {
            return Err(GeneratorError::incompatible(
                generator.generator_name(),
                UseGenerators::MECHANISM,
                parameter_type,
                &produced,
            ));
        }
    }
    Ok(())
}

/// Everything the metadata layer declares for one parameter
#[derive(Debug, Clone, Default)]
pub struct ParameterMetadata {
    pub quantifier: ForAll,
    pub generators: UseGenerators,
    pub ranges: Vec<InRange>,
    pub constraint: Option<SuchThat>,
}

/// Resolved generation plan for one test parameter
#[derive(Debug)]
pub struct ParameterContext {
    parameter_type: TypeToken,
    sample_size: usize,
    expression: Option<String>,
    repo: GeneratorRepository,
}

impl ParameterContext {
    /// Start building; the private repository draws from a source seeded per
    /// the global configuration
    pub fn builder(parameter_type: TypeToken) -> ParameterContextBuilder<Unquantified> {
        Self::builder_with_random(parameter_type, get_global_config().create_source())
    }

    /// Start building with an explicit randomness source
    pub fn builder_with_random(
        parameter_type: TypeToken,
        random: impl SourceOfRandomness + Send + 'static,
    ) -> ParameterContextBuilder<Unquantified> {
        ParameterContextBuilder {
            parameter_type,
            sample_size: 0,
            repo: GeneratorRepository::new(random),
            _phase: PhantomData,
        }
    }

    /// Run all three phases from declared metadata
    pub fn from_metadata(
        parameter_type: TypeToken,
        metadata: &ParameterMetadata,
        factories: &GeneratorFactories,
        random: impl SourceOfRandomness + Send + 'static,
    ) -> Result<Self> {
        Ok(Self::builder_with_random(parameter_type, random)
            .add_quantifier(&metadata.quantifier)
            .add_generators(&metadata.generators, factories, &metadata.ranges)?
            .add_constraint(metadata.constraint.as_ref()))
    }

    pub fn parameter_type(&self) -> &TypeToken {
        &self.parameter_type
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Constraint expression for the harness to evaluate
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    /// The explicitly bound generator for this parameter, if any
    pub fn explicit_generator(&self) -> Result<Option<Arc<dyn AnyGenerator>>> {
        if self.repo.is_empty() {
            return Ok(None);
        }
        self.repo.generator_for(&self.parameter_type).map(Some)
    }

    /// Explicit generator first, then `shared`
    pub fn resolve(&self, shared: &GeneratorRepository) -> Result<Arc<dyn AnyGenerator>> {
        match self.explicit_generator()? {
            Some(generator) => Ok(generator),
            None => shared.generator_for(&self.parameter_type),
        }
    }

    /// Draw one value using this context's randomness source.
    ///
    /// The draw always comes from this context's own source, even when the
    /// generator was resolved from `shared`; `shared`'s source is left
    /// untouched. Seeding the context therefore fixes the whole stream for
    /// this parameter.
    pub fn generate(
        &mut self,
        shared: &GeneratorRepository,
        status: &GenerationStatus,
    ) -> Result<Value> {
        let generator = self.resolve(shared)?;
        Ok(generator.generate_value(self.repo.random(), status))
    }

    /// Draw one value and downcast it to `T`; draws like [`Self::generate`]
    pub fn generate_as<T: 'static>(
        &mut self,
        shared: &GeneratorRepository,
        status: &GenerationStatus,
    ) -> Result<T> {
        let generator = self.resolve(shared)?;
        generator.generate_as(self.repo.random(), status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngSource;
    use crate::time::{Clock, FixedClock};
    use crate::types::type_of;

    fn builder(parameter_type: TypeToken) -> ParameterContextBuilder<Unquantified> {
        ParameterContext::builder_with_random(parameter_type, RngSource::seeded(99))
    }

    fn finish(builder: ParameterContextBuilder<Quantified>) -> ParameterContext {
        builder
            .add_generators(&UseGenerators::none(), &GeneratorFactories::builtin(), &[])
            .unwrap()
            .add_constraint(None)
    }

    #[test]
    fn test_boolean_sample_size_is_two() {
        let context = finish(builder(type_of::<bool>()).add_quantifier(&ForAll::new(100).unwrap()));
        assert_eq!(context.sample_size(), 2);
    }

    #[test]
    fn test_enum_sample_size_is_member_count() {
        let color = TypeToken::enumeration("Color", ["Red", "Green", "Blue", "Alpha"]);
        let context = finish(builder(color).add_quantifier(&ForAll::new(100).unwrap()));
        assert_eq!(context.sample_size(), 4);
    }

    #[test]
    fn test_other_types_use_quantifier() {
        let context = finish(builder(type_of::<i32>()).add_quantifier(&ForAll::new(37).unwrap()));
        assert_eq!(context.sample_size(), 37);
    }

    #[test]
    fn test_no_explicit_generator_without_declaration() {
        let context = finish(builder(type_of::<i32>()).add_quantifier(&ForAll::default()));
        assert!(context.explicit_generator().unwrap().is_none());
        assert_eq!(context.expression(), None);
    }

    #[test]
    fn test_incompatible_generator_fails_at_binding() {
        let result = builder(type_of::<i32>())
            .add_quantifier(&ForAll::default())
            .add_generators(
                &UseGenerators::new(["clock"]),
                &GeneratorFactories::builtin(),
                &[],
            );

        match result {
            Err(GeneratorError::IncompatibleGenerator {
                generator,
                mechanism,
                parameter,
                produced,
            }) => {
                assert!(generator.ends_with("ClockGenerator"));
                assert_eq!(mechanism, "UseGenerators");
                assert_eq!(parameter, type_of::<i32>());
                assert_eq!(produced, type_of::<FixedClock>());
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unknown_generator_identifier() {
        let result = builder(type_of::<i32>())
            .add_quantifier(&ForAll::default())
            .add_generators(
                &UseGenerators::new(["missing"]),
                &GeneratorFactories::builtin(),
                &[],
            );
        assert!(matches!(result, Err(GeneratorError::UnknownGenerator { .. })));
    }

    #[test]
    fn test_explicit_generator_for_supertype_parameter() {
        let context = builder(type_of::<dyn Clock>())
            .add_quantifier(&ForAll::default())
            .add_generators(
                &UseGenerators::new(["clock"]),
                &GeneratorFactories::builtin(),
                &[],
            )
            .unwrap()
            .add_constraint(None);

        let generator = context.explicit_generator().unwrap().unwrap();
        assert!(generator.generator_name().ends_with("ClockGenerator"));
    }

    #[test]
    fn test_bad_range_fails_binding() {
        let result = builder(type_of::<FixedClock>())
            .add_quantifier(&ForAll::default())
            .add_generators(
                &UseGenerators::new(["clock"]),
                &GeneratorFactories::builtin(),
                &[InRange::new().min("not a time")],
            );
        assert!(matches!(result, Err(GeneratorError::Configuration { .. })));
    }

    fn bind_i32(ranges: Vec<InRange>) -> Result<ParameterContext> {
        ParameterContext::from_metadata(
            type_of::<i32>(),
            &ParameterMetadata {
                generators: UseGenerators::new(["i32"]),
                ranges,
                ..ParameterMetadata::default()
            },
            &GeneratorFactories::builtin(),
            RngSource::seeded(12),
        )
    }

    #[test]
    fn test_overlapping_ranges_are_rejected() {
        for second in [InRange::new().min("20"), InRange::new().max("5")] {
            let result = bind_i32(vec![InRange::new().min("0").max("10"), second]);
            match result {
                Err(GeneratorError::ConflictingRanges { parameter, source }) => {
                    assert_eq!(parameter, type_of::<i32>());
                    assert!(source.first == "0" || source.first == "10");
                }
                other => panic!("unexpected result: {:?}", other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_split_range_declarations_configure_once() {
        let mut context =
            bind_i32(vec![InRange::new().min("3"), InRange::new().max("4")]).unwrap();
        let shared = GeneratorRepository::new(RngSource::seeded(0));
        let seen: std::collections::HashSet<i32> = (0..500)
            .map(|_| {
                context
                    .generate_as::<i32>(&shared, &GenerationStatus::default())
                    .unwrap()
            })
            .collect();
        assert_eq!(seen, [3, 4].into_iter().collect());
    }

    #[test]
    fn test_merged_range_error_reports_both_endpoints() {
        let result = bind_i32(vec![InRange::new().min("20"), InRange::new().max("10")]);
        match result {
            Err(GeneratorError::Configuration { source, .. }) => {
                assert_eq!(source.to_string(), "bad range, 20 > 10");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_fallback_draws_from_context_source() {
        let draw = |shared_seed| {
            let mut context = ParameterContext::from_metadata(
                type_of::<i64>(),
                &ParameterMetadata::default(),
                &GeneratorFactories::new(),
                RngSource::seeded(21),
            )
            .unwrap();
            let mut shared = GeneratorRepository::builtin(RngSource::seeded(shared_seed));
            let values: Vec<i64> = (0..10)
                .map(|_| {
                    context
                        .generate_as::<i64>(&shared, &GenerationStatus::default())
                        .unwrap()
                })
                .collect();
            (values, shared.random().next_long(0, i64::MAX))
        };

        let (first, shared_next) = draw(1);
        let (second, _) = draw(2);
        assert_eq!(first, second);
        assert_eq!(shared_next, RngSource::seeded(1).next_long(0, i64::MAX));
    }

    #[test]
    fn test_constraint_is_kept_verbatim() {
        let context = builder(type_of::<i32>())
            .add_quantifier(&ForAll::default())
            .add_generators(&UseGenerators::none(), &GeneratorFactories::new(), &[])
            .unwrap()
            .add_constraint(Some(&SuchThat::new("#_ > 0 &&")));
        assert_eq!(context.expression(), Some("#_ > 0 &&"));
    }

    #[test]
    fn test_resolve_falls_back_to_shared_repository() {
        let context = finish(builder(type_of::<bool>()).add_quantifier(&ForAll::default()));
        let shared = GeneratorRepository::builtin(RngSource::seeded(1));
        assert!(context.resolve(&shared).is_ok());

        let empty = GeneratorRepository::new(RngSource::seeded(1));
        assert!(matches!(
            context.resolve(&empty),
            Err(GeneratorError::NoGeneratorFound { .. })
        ));
    }

    #[test]
    fn test_explicit_generator_wins_over_shared() {
        let mut context = ParameterContext::from_metadata(
            type_of::<i64>(),
            &ParameterMetadata {
                quantifier: ForAll::new(10).unwrap(),
                generators: UseGenerators::new(["i64"]),
                ranges: vec![InRange::new().min("5").max("6")],
                constraint: None,
            },
            &GeneratorFactories::builtin(),
            RngSource::seeded(7),
        )
        .unwrap();

        let shared = GeneratorRepository::builtin(RngSource::seeded(1));
        for _ in 0..100 {
            let value: i64 = context
                .generate_as(&shared, &GenerationStatus::default())
                .unwrap();
            assert!((5..=6).contains(&value));
        }
    }

    #[test]
    fn test_generate_as_wrong_type() {
        let mut context = finish(builder(type_of::<bool>()).add_quantifier(&ForAll::default()));
        let shared = GeneratorRepository::builtin(RngSource::seeded(1));
        let result = context.generate_as::<i32>(&shared, &GenerationStatus::default());
        assert!(matches!(result, Err(GeneratorError::ValueTypeMismatch { .. })));
    }
}
