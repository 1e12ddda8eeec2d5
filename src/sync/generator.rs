use crate::model::attendance::{Attendance, Presence};
use crate::utils::id::generate_id;
use chrono::{DateTime, Days, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use rand::Rng;

/// Days synthesized per run, counted back from the day before `now`.
pub const WINDOW_DAYS: u32 = 5;

const LOGIN_HOURS: std::ops::Range<u32> = 8..11;
const LOGOUT_HOURS: std::ops::Range<u32> = 17..20;

/// Weighted presence table sampled with a uniform draw in `0..100`.
///
/// Weights are walked cumulatively; a draw past the last boundary
/// (only possible when the weights sum to less than 100) yields full-day.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceDistribution {
    weights: [(Presence, u32); 3],
}

impl Default for PresenceDistribution {
    fn default() -> Self {
        Self::new(10, 20, 70)
    }
}

impl PresenceDistribution {
    pub fn new(absent: u32, half_day: u32, full_day: u32) -> Self {
        Self {
            weights: [
                (Presence::Absent, absent),
                (Presence::HalfDay, half_day),
                (Presence::FullDay, full_day),
            ],
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Presence {
        let draw = rng.gen_range(0..100u32);
        let mut boundary = 0;
        for (presence, weight) in self.weights {
            boundary += weight;
            if draw < boundary {
                return presence;
            }
        }
        Presence::FullDay
    }
}

/// Produces synthetic attendance for one vendor over the trailing window.
///
/// All randomness comes from the injected `R`, so a seeded generator
/// replays the same presence and clock values.
#[derive(Debug)]
pub struct AttendanceGenerator<R> {
    rng: R,
    distribution: PresenceDistribution,
}

impl<R: Rng> AttendanceGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            distribution: PresenceDistribution::default(),
        }
    }

    #[cfg(test)]
    pub fn with_distribution(mut self, distribution: PresenceDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// One record per day for `now - 1d` through `now - 5d`.
    ///
    /// Each record's `date` is `now` moved back whole calendar days, so it
    /// keeps the time of day of the invocation.
    pub fn generate(&mut self, vendor_id: &str, now: DateTime<Local>) -> Vec<Attendance> {
        (1..=WINDOW_DAYS)
            .map(|offset| {
                let date = days_before(now, offset);
                let day = date.date_naive();
                let present_day = self.distribution.sample(&mut self.rng);

                let login_time = at_local(
                    day,
                    self.rng.gen_range(LOGIN_HOURS),
                    self.rng.gen_range(0..60),
                );
                let logout_time = at_local(
                    day,
                    self.rng.gen_range(LOGOUT_HOURS),
                    self.rng.gen_range(0..60),
                );

                Attendance {
                    id: generate_id(),
                    vendor_id: vendor_id.to_string(),
                    date,
                    login_time,
                    logout_time,
                    duration: hours_between(login_time, logout_time),
                    present_day,
                }
            })
            .collect()
    }
}

fn days_before(now: DateTime<Local>, offset: u32) -> DateTime<Local> {
    now.checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or_else(|| now - Duration::days(i64::from(offset)))
}

/// Wall-clock time on `day`; on a DST gap falls back to reading it as UTC.
fn at_local(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Local> {
    let naive = day.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN));
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

fn hours_between(start: DateTime<Local>, end: DateTime<Local>) -> f32 {
    (end - start).num_seconds() as f32 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{HashMap, HashSet};

    fn reference_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 12, 12, 0, 0).earliest().unwrap()
    }

    fn seeded(seed: u64) -> AttendanceGenerator<StdRng> {
        AttendanceGenerator::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn produces_five_distinct_trailing_days() {
        let now = reference_now();
        let records = seeded(1).generate("v1", now);

        assert_eq!(records.len(), WINDOW_DAYS as usize);

        let days: HashSet<NaiveDate> = records.iter().map(|r| r.date.date_naive()).collect();
        let expected: HashSet<NaiveDate> = (1..=5)
            .map(|i| now.date_naive() - Duration::days(i))
            .collect();
        assert_eq!(days, expected);

        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.vendor_id, "v1");
            assert_eq!(r.date.time(), now.time());
            assert_eq!(r.date.date_naive(), now.date_naive() - Duration::days(i as i64 + 1));
        }
    }

    #[test]
    fn clock_values_stay_in_range() {
        let now = reference_now();
        let mut generator = seeded(7);

        for _ in 0..200 {
            for r in generator.generate("v1", now) {
                assert!((8..=10).contains(&r.login_time.hour()), "login {}", r.login_time);
                assert!((17..=19).contains(&r.logout_time.hour()), "logout {}", r.logout_time);
                assert_eq!(r.login_time.second(), 0);
                assert_eq!(r.logout_time.second(), 0);
                assert_eq!(r.login_time.date_naive(), r.date.date_naive());
                assert_eq!(r.logout_time.date_naive(), r.date.date_naive());

                let expected = (r.logout_time - r.login_time).num_seconds() as f32 / 3600.0;
                assert!((r.duration - expected).abs() < 1e-5);
                assert!(r.duration > 6.0 && r.duration < 12.0);
                assert!(Presence::ALL.contains(&r.present_day));
            }
        }
    }

    #[test]
    fn ids_are_unique_per_record() {
        let records = seeded(3).generate("v1", reference_now());
        let ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), records.len());
    }

    #[test]
    fn seeded_generators_replay_the_same_values() {
        let now = reference_now();
        let a = seeded(42).generate("v1", now);
        let b = seeded(42).generate("v1", now);

        let strip = |rs: &[Attendance]| {
            rs.iter()
                .map(|r| (r.date, r.login_time, r.logout_time, r.present_day))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&a), strip(&b));
    }

    #[test]
    fn presence_frequencies_match_weights() {
        let distribution = PresenceDistribution::default();
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 100_000;

        let mut counts: HashMap<Presence, u32> = HashMap::new();
        for _ in 0..n {
            *counts.entry(distribution.sample(&mut rng)).or_default() += 1;
        }

        let share = |p| f64::from(counts.get(&p).copied().unwrap_or(0)) / f64::from(n);
        assert!((share(Presence::Absent) - 0.10).abs() < 0.01);
        assert!((share(Presence::HalfDay) - 0.20).abs() < 0.01);
        assert!((share(Presence::FullDay) - 0.70).abs() < 0.01);
    }

    #[test]
    fn short_weight_table_falls_back_to_full_day() {
        let mut rng = StdRng::seed_from_u64(5);

        let empty = PresenceDistribution::new(0, 0, 0);
        assert!((0..1000).all(|_| empty.sample(&mut rng) == Presence::FullDay));

        // only draws in 0..10 can land on absent; everything past 10 falls through
        let partial = PresenceDistribution::new(10, 0, 0);
        let mut absent = 0;
        for _ in 0..10_000 {
            match partial.sample(&mut rng) {
                Presence::Absent => absent += 1,
                Presence::FullDay => {}
                Presence::HalfDay => panic!("half-day has zero weight"),
            }
        }
        assert!(absent > 700 && absent < 1300, "absent = {absent}");
    }

    #[test]
    fn custom_distribution_is_used_by_generator() {
        let mut generator =
            seeded(9).with_distribution(PresenceDistribution::new(0, 100, 0));
        let records = generator.generate("v1", reference_now());
        assert!(records.iter().all(|r| r.present_day == Presence::HalfDay));
    }
}
