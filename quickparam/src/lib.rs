#![allow(clippy::result_large_err)]

//! # quickparam - Type-Directed Value Generation for Property Tests
//!
//! quickparam resolves, for each parameter of a property test, the generator
//! that will produce its values: an explicitly named generator when one is
//! declared, otherwise the first compatible generator in a shared
//! repository. It also settles how many samples the parameter needs and
//! which constraint expression the harness should apply.
//!
//! ## Quick Start
//!
//! ```rust
//! use quickparam::{
//!     ForAll, GenerationStatus, GeneratorFactories, GeneratorRepository, InRange,
//!     ParameterContext, RngSource, UseGenerators, type_of,
//! };
//! use quickparam::time::FixedClock;
//!
//! let shared = GeneratorRepository::builtin(RngSource::seeded(1));
//!
//! let mut context = ParameterContext::builder_with_random(type_of::<FixedClock>(), RngSource::seeded(2))
//!     .add_quantifier(&ForAll::new(20).unwrap())
//!     .add_generators(
//!         &UseGenerators::new(["clock"]),
//!         &GeneratorFactories::builtin(),
//!         &[InRange::new().min("1970-01-01T00:00:00Z").max("1970-01-01T00:00:10Z")],
//!     )
//!     .unwrap()
//!     .add_constraint(None);
//!
//! for _ in 0..context.sample_size() {
//!     let clock: FixedClock = context
//!         .generate_as(&shared, &GenerationStatus::default())
//!         .unwrap();
//!     assert!((0..=10).contains(&clock.instant().timestamp()));
//! }
//! ```

// Public modules
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod metadata;
pub mod primitives;
pub mod repository;
pub mod rng;
pub mod time;
pub mod types;

// Re-export the main public API
pub use config::{ConfigError, ConfigManager, GlobalConfig, get_global_config, set_global_config};
pub use context::{ParameterContext, ParameterContextBuilder, ParameterMetadata};
pub use error::{BoundParseError, ConfigurationError, Endpoint, GeneratorError, RangeClash};
pub use generator::{AnyGenerator, GenerationStatus, Generator, GeneratorFactories, Value};
pub use metadata::{ForAll, InRange, SuchThat, UseGenerators};
pub use primitives::{BoolGenerator, EnumGenerator, EnumVariant, IntegralGenerator};
pub use repository::GeneratorRepository;
pub use rng::{DefaultRngProvider, RngProvider, RngSource, SourceOfRandomness};
pub use time::{Clock, ClockGenerator, FixedClock, InstantGenerator};
pub use types::{TypeArg, TypeKind, TypeToken, Typed, type_of};
