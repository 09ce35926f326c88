//! Time-point generators: fixed clocks and bare instants.

use chrono::{DateTime, Utc};

use crate::error::{ConfigurationError, Endpoint};
use crate::generator::{GenerationStatus, Generator};
use crate::metadata::InRange;
use crate::rng::SourceOfRandomness;
use crate::types::{TypeArg, TypeToken, Typed};

const MAX_SUBSEC_NANOS: i64 = 999_999_999;

/// Source of the current instant
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

impl Typed for dyn Clock {
    fn type_token() -> TypeToken {
        TypeToken::nominal("Clock")
    }
}

/// A clock frozen at one instant, always in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// The clock's zone; not configurable
    pub fn zone(&self) -> Utc {
        Utc
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl Typed for FixedClock {
    fn type_token() -> TypeToken {
        TypeToken::nominal("FixedClock").with_supertype(<dyn Clock>::type_token())
    }
}

impl Typed for DateTime<Utc> {
    fn type_token() -> TypeToken {
        TypeToken::nominal("DateTime").with_args([TypeArg::Exact(TypeToken::nominal("Utc"))])
    }
}

/// Closed interval of instants shared by the time-point generators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstantRange {
    min: DateTime<Utc>,
    max: DateTime<Utc>,
}

impl Default for InstantRange {
    /// The whole representable domain
    fn default() -> Self {
        Self {
            min: DateTime::<Utc>::MIN_UTC,
            max: DateTime::<Utc>::MAX_UTC,
        }
    }
}

impl InstantRange {
    pub fn min(&self) -> DateTime<Utc> {
        self.min
    }

    pub fn max(&self) -> DateTime<Utc> {
        self.max
    }

    /// Narrow the interval to the endpoints `range` sets.
    ///
    /// Endpoints are always parsed as ISO-8601 instants (RFC 3339, any
    /// offset normalized to UTC). The format hint is accepted and ignored.
    /// On error the interval is left untouched.
    pub fn configure(&mut self, range: &InRange) -> Result<(), ConfigurationError> {
        if let Some(format) = range.format_hint() {
            tracing::trace!(format, "ignoring format hint; instants are parsed as ISO-8601");
        }

        let parse = |endpoint, raw: &str| {
            DateTime::parse_from_rfc3339(raw.trim())
                .map(|instant| instant.with_timezone(&Utc))
                .map_err(|e| {
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

        tracing::debug!(%min, %max, "configured instant range");
        self.min = min;
        self.max = max;
        Ok(())
    }

    /// Draw one instant from the interval.
    ///
    /// Epoch seconds and the sub-second part are drawn independently, the
    /// seconds over `[min.seconds, max.seconds]` and the nanoseconds over
    /// `[min.nanos, max.nanos]`. Every result lies inside the interval, but
    /// when it spans several seconds with different sub-second endpoints the
    /// distribution is only approximately uniform. This is long-standing
    /// behavior and is kept as is.
    ///
    /// When `min.nanos > max.nanos` there is no such sub-second interval, so
    /// the nanoseconds range over the whole second and the result is clamped
    /// into the interval.
    pub fn sample(&self, random: &mut dyn SourceOfRandomness) -> DateTime<Utc> {
        let seconds = random.next_long(self.min.timestamp(), self.max.timestamp());

        let (low, high) = (subsec_nanos(&self.min), subsec_nanos(&self.max));
        let nanos = if low <= high {
            random.next_long(low, high)
        } else {
            random.next_long(0, MAX_SUBSEC_NANOS)
        };

        DateTime::from_timestamp(seconds, nanos as u32)
            .map_or(self.min, |instant| instant.clamp(self.min, self.max))
    }
}

// Leap seconds report nanos past one second; fold them into the last nanosecond.
fn subsec_nanos(instant: &DateTime<Utc>) -> i64 {
    i64::from(instant.timestamp_subsec_nanos()).min(MAX_SUBSEC_NANOS)
}

/// Produces [`FixedClock`] values.
///
/// Clocks are frozen at instants drawn uniformly from the configured range,
/// down to the nanosecond. With no range the whole representable domain is
/// used. The zone is always UTC.
#[derive(Debug, Clone, Default)]
pub struct ClockGenerator {
    range: InstantRange,
}

impl ClockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(&self) -> &InstantRange {
        &self.range
    }
}

impl Generator for ClockGenerator {
    type Output = FixedClock;

    fn types(&self) -> Vec<TypeToken> {
        vec![FixedClock::type_token()]
    }

    /// Endpoints are ISO-8601 instant strings; [`InRange::format`] is
    /// ignored. An unset endpoint stays at the domain's minimum or maximum.
    fn configure(&mut self, range: &InRange) -> Result<(), ConfigurationError> {
        self.range.configure(range)
    }

    fn generate(
        &self,
        random: &mut dyn SourceOfRandomness,
        _status: &GenerationStatus,
    ) -> FixedClock {
        FixedClock::new(self.range.sample(random))
    }
}

/// Produces UTC instants; same range rules as [`ClockGenerator`]
#[derive(Debug, Clone, Default)]
pub struct InstantGenerator {
    range: InstantRange,
}

impl InstantGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(&self) -> &InstantRange {
        &self.range
    }
}

impl Generator for InstantGenerator {
    type Output = DateTime<Utc>;

    fn types(&self) -> Vec<TypeToken> {
        vec![DateTime::<Utc>::type_token()]
    }

    fn configure(&mut self, range: &InRange) -> Result<(), ConfigurationError> {
        self.range.configure(range)
    }

    fn generate(
        &self,
        random: &mut dyn SourceOfRandomness,
        _status: &GenerationStatus,
    ) -> DateTime<Utc> {
        self.range.sample(random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoundParseError;
    use crate::rng::RngSource;
    use crate::types::type_of;
    use std::collections::HashSet;

    fn instant(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_unconfigured_range_is_whole_domain() {
        let generator = ClockGenerator::new();
        assert_eq!(generator.range().min(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(generator.range().max(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_unconfigured_generation_stays_in_domain() {
        let generator = ClockGenerator::new();
        let mut random = RngSource::seeded(17);
        for _ in 0..1_000 {
            let clock = generator.generate(&mut random, &GenerationStatus::default());
            assert!(clock.instant() >= DateTime::<Utc>::MIN_UTC);
            assert!(clock.instant() <= DateTime::<Utc>::MAX_UTC);
            assert_eq!(clock.zone(), Utc);
        }
    }

    #[test]
    fn test_ten_second_window() {
        let mut generator = ClockGenerator::new();
        generator
            .configure(
                &InRange::new()
                    .min("1970-01-01T00:00:00Z")
                    .max("1970-01-01T00:00:10Z"),
            )
            .unwrap();

        let mut random = RngSource::seeded(42);
        let seconds: HashSet<i64> = (0..1_000)
            .map(|_| generator.generate(&mut random, &GenerationStatus::default()))
            .map(|clock| {
                assert_eq!(clock.instant().timestamp_subsec_nanos(), 0);
                clock.instant().timestamp()
            })
            .collect();

        assert!(seconds.iter().all(|s| (0..=10).contains(s)));
        assert!(seconds.contains(&0));
        assert!(seconds.contains(&10));
    }

    #[test]
    fn test_bounds_hold_with_subsecond_endpoints() {
        let mut generator = InstantGenerator::new();
        let min = instant("2020-02-29T23:59:58.250Z");
        let max = instant("2020-03-01T00:00:01.750Z");
        generator
            .configure(&InRange::new().min(min.to_rfc3339()).max(max.to_rfc3339()))
            .unwrap();

        let mut random = RngSource::seeded(5);
        for _ in 0..10_000 {
            let value = generator.generate(&mut random, &GenerationStatus::default());
            assert!(value >= min && value <= max, "{} outside [{}, {}]", value, min, max);
        }
    }

    #[test]
    fn test_bounds_hold_when_min_nanos_exceed_max_nanos() {
        let mut generator = InstantGenerator::new();
        let min = instant("2001-01-01T00:00:00.900Z");
        let max = instant("2001-01-01T00:00:01.100Z");
        generator
            .configure(&InRange::new().min(min.to_rfc3339()).max(max.to_rfc3339()))
            .unwrap();

        let mut random = RngSource::seeded(6);
        for _ in 0..10_000 {
            let value = generator.generate(&mut random, &GenerationStatus::default());
            assert!(value >= min && value <= max);
        }
    }

    #[test]
    fn test_single_instant_range() {
        let mut generator = InstantGenerator::new();
        let only = "2015-06-30T12:34:56.789Z";
        generator
            .configure(&InRange::new().min(only).max(only))
            .unwrap();

        let mut random = RngSource::seeded(8);
        let value = generator.generate(&mut random, &GenerationStatus::default());
        assert_eq!(value, instant(only));
    }

    #[test]
    fn test_offsets_normalize_to_utc() {
        let mut generator = InstantGenerator::new();
        generator
            .configure(&InRange::new().min("1970-01-01T01:00:00+01:00"))
            .unwrap();
        assert_eq!(generator.range().min().timestamp(), 0);
    }

    #[test]
    fn test_only_min_set_keeps_domain_max() {
        let mut generator = ClockGenerator::new();
        generator
            .configure(&InRange::new().min("2000-01-01T00:00:00Z"))
            .unwrap();
        assert_eq!(generator.range().max(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_format_hint_is_ignored() {
        let mut generator = ClockGenerator::new();
        generator
            .configure(
                &InRange::new()
                    .min("1999-12-31T23:59:59Z")
                    .max("2000-01-01T00:00:00Z")
                    .format("MM/dd/yyyy"),
            )
            .unwrap();
        assert_eq!(generator.range().min(), instant("1999-12-31T23:59:59Z"));
    }

    #[test]
    fn test_inverted_range_reports_raw_endpoints() {
        let mut generator = ClockGenerator::new();
        let error = generator
            .configure(
                &InRange::new()
                    .min("2000-01-01T00:00:00Z")
                    .max("1999-01-01T00:00:00Z"),
            )
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "bad range, 2000-01-01T00:00:00Z > 1999-01-01T00:00:00Z"
        );
        assert_eq!(*generator.range(), InstantRange::default());
    }

    #[test]
    fn test_unparseable_endpoint_wraps_parse_error() {
        let mut generator = ClockGenerator::new();
        let error = generator
            .configure(&InRange::new().min("01/01/2000").max("2000-01-02T00:00:00Z"))
            .unwrap_err();

        match error {
            ConfigurationError::Unparseable {
                endpoint, source, ..
            } => {
                assert_eq!(endpoint, Endpoint::Min);
                assert!(matches!(source, BoundParseError::Instant(_)));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_clock_token_is_assignable_to_clock() {
        let generator = ClockGenerator::new();
        let clock = type_of::<dyn Clock>();
        assert!(generator.types().iter().all(|t| clock.is_assignable_from(t)));
        assert!(!type_of::<FixedClock>().is_assignable_from(&clock));
    }

    #[test]
    fn test_fixed_clock_reports_its_instant() {
        let at = instant("2024-02-29T12:00:00Z");
        let clock = FixedClock::new(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), clock.now());
    }
}
