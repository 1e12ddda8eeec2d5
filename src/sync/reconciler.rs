use crate::model::{attendance::Attendance, vendor::VendorStatus};
use crate::store::{AttendanceLedger, VendorDirectory};
use crate::sync::generator::AttendanceGenerator;
use crate::sync::scheduler::ScheduledJob;
use chrono::{DateTime, Local};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Regenerates the trailing attendance window for every active vendor.
///
/// Existing records whose `date` exactly equals one of the freshly generated
/// dates are superseded; everything else is carried over untouched. Note that
/// equality is on the full instant, not the calendar day, so a run at a
/// different time of day leaves earlier records for the same days in place.
pub struct Reconciler {
    vendors: Arc<dyn VendorDirectory>,
    ledger: Arc<dyn AttendanceLedger>,
    /// Also serializes runs: the scheduler and the admin trigger may overlap.
    generator: Mutex<AttendanceGenerator<StdRng>>,
}

impl Reconciler {
    pub fn new(
        vendors: Arc<dyn VendorDirectory>,
        ledger: Arc<dyn AttendanceLedger>,
        generator: AttendanceGenerator<StdRng>,
    ) -> Self {
        Self {
            vendors,
            ledger,
            generator: Mutex::new(generator),
        }
    }

    /// Production wiring with an entropy-seeded generator.
    pub fn from_entropy(
        vendors: Arc<dyn VendorDirectory>,
        ledger: Arc<dyn AttendanceLedger>,
    ) -> Self {
        Self::new(
            vendors,
            ledger,
            AttendanceGenerator::new(StdRng::from_entropy()),
        )
    }

    pub fn reconcile(&self) {
        self.reconcile_at(Local::now());
    }

    pub fn reconcile_at(&self, now: DateTime<Local>) {
        let mut generator = self
            .generator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut refreshed = 0usize;
        let mut skipped = 0usize;

        for (vendor_id, status) in self.vendors.vendor_statuses() {
            if status != VendorStatus::Active {
                skipped += 1;
                continue;
            }

            let existing = self.ledger.attendance_for(&vendor_id);
            let fresh = generator.generate(&vendor_id, now);
            let merged = merge(existing, fresh);

            debug!(vendor_id = %vendor_id, records = merged.len(), "Attendance regenerated");
            self.ledger.replace_attendance(&vendor_id, merged);
            refreshed += 1;
        }

        info!(refreshed, skipped, at = %now, "Attendance sync finished");
    }
}

/// Kept records first, then the new batch.
fn merge(existing: Vec<Attendance>, fresh: Vec<Attendance>) -> Vec<Attendance> {
    let mut merged: Vec<Attendance> = existing
        .into_iter()
        .filter(|old| !fresh.iter().any(|new| new.date == old.date))
        .collect();
    merged.extend(fresh);
    merged
}

impl ScheduledJob for Reconciler {
    fn name(&self) -> &'static str {
        "attendance-sync"
    }

    fn run(&self) {
        self.reconcile();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::Presence;
    use crate::store::Store;
    use crate::store::tests::vendor;
    use chrono::{Duration, NaiveDate, TimeZone, Timelike};
    use std::collections::HashSet;

    fn reference_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).earliest().unwrap()
    }

    fn reconciler(store: &Arc<Store>, seed: u64) -> Reconciler {
        Reconciler::new(
            store.clone(),
            store.clone(),
            AttendanceGenerator::new(StdRng::seed_from_u64(seed)),
        )
    }

    fn record(vendor_id: &str, id: &str, date: DateTime<Local>) -> Attendance {
        Attendance {
            id: id.to_string(),
            vendor_id: vendor_id.to_string(),
            date,
            login_time: date.with_hour(9).unwrap(),
            logout_time: date.with_hour(18).unwrap(),
            duration: 9.0,
            present_day: Presence::FullDay,
        }
    }

    fn assert_unique_dates(records: &[Attendance]) {
        let dates: HashSet<DateTime<Local>> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates.len(), records.len(), "duplicate dates in {records:?}");
    }

    #[test]
    fn empty_store_is_a_noop() {
        let store = Arc::new(Store::new());
        reconciler(&store, 1).reconcile_at(reference_now());
        assert!(store.all_attendance().is_empty());
    }

    #[test]
    fn fresh_vendor_gets_exactly_the_window() {
        let store = Arc::new(Store::new());
        let v = store.insert_vendor(vendor("Acme", VendorStatus::Active)).unwrap();
        let now = reference_now();

        reconciler(&store, 1).reconcile_at(now);

        let records = store.attendance_for(&v.id);
        assert_eq!(records.len(), 5);
        assert_unique_dates(&records);

        let days: HashSet<NaiveDate> = records.iter().map(|r| r.date.date_naive()).collect();
        let expected: HashSet<NaiveDate> =
            (1..=5).map(|i| now.date_naive() - Duration::days(i)).collect();
        assert_eq!(days, expected);

        for r in &records {
            assert_eq!(r.vendor_id, v.id);
            assert!(Presence::ALL.contains(&r.present_day));
            assert!((8..=10).contains(&r.login_time.hour()));
            assert!((17..=19).contains(&r.logout_time.hour()));
        }
    }

    #[test]
    fn superseded_day_is_replaced_and_history_survives() {
        let store = Arc::new(Store::new());
        let v = store.insert_vendor(vendor("Acme", VendorStatus::Active)).unwrap();
        let now = reference_now();

        let in_window = record(&v.id, "old-t3", now - Duration::days(3));
        let history = record(&v.id, "old-t30", now - Duration::days(30));
        store.replace_attendance(&v.id, vec![in_window.clone(), history.clone()]);

        reconciler(&store, 2).reconcile_at(now);

        let records = store.attendance_for(&v.id);
        assert_eq!(records.len(), 6);
        assert_unique_dates(&records);

        // kept entries come first
        assert_eq!(records[0], history);

        assert!(records.iter().all(|r| r.id != "old-t3"));
        let t3 = records
            .iter()
            .find(|r| r.date == in_window.date)
            .expect("T-3 regenerated");
        assert_ne!(t3.id, in_window.id);
    }

    #[test]
    fn inactive_vendor_is_left_alone() {
        let store = Arc::new(Store::new());
        let v = store.insert_vendor(vendor("Dormant", VendorStatus::Inactive)).unwrap();
        let now = reference_now();

        let before = vec![
            record(&v.id, "a", now - Duration::days(1)),
            record(&v.id, "b", now - Duration::days(12)),
        ];
        store.replace_attendance(&v.id, before.clone());

        reconciler(&store, 3).reconcile_at(now);

        assert_eq!(store.attendance_for(&v.id), before);
        assert_eq!(
            serde_json::to_vec(&store.attendance_for(&v.id)).unwrap(),
            serde_json::to_vec(&before).unwrap()
        );
    }

    #[test]
    fn inactive_vendor_without_records_gets_none() {
        let store = Arc::new(Store::new());
        let v = store.insert_vendor(vendor("Dormant", VendorStatus::Inactive)).unwrap();

        reconciler(&store, 3).reconcile_at(reference_now());

        assert!(store.attendance_for(&v.id).is_empty());
        assert!(!store.all_attendance().contains_key(&v.id));
    }

    #[test]
    fn repeated_runs_at_same_instant_keep_five_records() {
        let store = Arc::new(Store::new());
        let v = store.insert_vendor(vendor("Acme", VendorStatus::Active)).unwrap();
        let sync = reconciler(&store, 4);
        let now = reference_now();

        sync.reconcile_at(now);
        let first: Vec<String> = store.attendance_for(&v.id).into_iter().map(|r| r.id).collect();
        sync.reconcile_at(now);
        let second = store.attendance_for(&v.id);

        assert_eq!(second.len(), 5);
        assert_unique_dates(&second);
        assert!(second.iter().all(|r| !first.contains(&r.id)));
    }

    #[test]
    fn comparison_is_by_instant_not_calendar_day() {
        let store = Arc::new(Store::new());
        let v = store.insert_vendor(vendor("Acme", VendorStatus::Active)).unwrap();
        let sync = reconciler(&store, 5);
        let morning = reference_now().with_hour(9).unwrap();
        let noon = reference_now();

        sync.reconcile_at(morning);
        sync.reconcile_at(noon);

        // same five calendar days, different instants: nothing superseded
        let records = store.attendance_for(&v.id);
        assert_eq!(records.len(), 10);
        assert_unique_dates(&records);
        let days: HashSet<NaiveDate> = records.iter().map(|r| r.date.date_naive()).collect();
        assert_eq!(days.len(), 5);
    }

    #[test]
    fn only_active_vendors_are_touched() {
        let store = Arc::new(Store::new());
        let active = store.insert_vendor(vendor("Acme", VendorStatus::Active)).unwrap();
        let inactive = store.insert_vendor(vendor("Dormant", VendorStatus::Inactive)).unwrap();

        reconciler(&store, 6).reconcile_at(reference_now());

        assert_eq!(store.attendance_for(&active.id).len(), 5);
        assert!(store.attendance_for(&inactive.id).is_empty());
    }

    #[test]
    fn concurrent_runs_never_duplicate_dates() {
        let store = Arc::new(Store::new());
        let v = store.insert_vendor(vendor("Acme", VendorStatus::Active)).unwrap();
        let sync = Arc::new(reconciler(&store, 7));
        let now = reference_now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sync = sync.clone();
                std::thread::spawn(move || sync.reconcile_at(now))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let records = store.attendance_for(&v.id);
        assert_eq!(records.len(), 5);
        assert_unique_dates(&records);
    }

    #[test]
    fn runs_as_a_scheduled_job() {
        let store = Arc::new(Store::new());
        let v = store.insert_vendor(vendor("Acme", VendorStatus::Active)).unwrap();
        let job: Arc<dyn ScheduledJob> = Arc::new(reconciler(&store, 8));

        assert_eq!(job.name(), "attendance-sync");
        job.run();

        assert_eq!(store.attendance_for(&v.id).len(), 5);
    }
}
