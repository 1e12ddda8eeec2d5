use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use std::sync::Arc;
use tracing::{info, warn};

/// A zero-argument task the service runs on a recurring cadence.
pub trait ScheduledJob: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn run(&self);
}

/// Fires once a day at a fixed local wall-clock hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    hour: u32,
}

impl DailySchedule {
    /// `None` unless `hour` is in `0..=23`.
    pub fn at_hour(hour: u32) -> Option<Self> {
        (hour < 24).then_some(Self { hour })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Today's slot if it is still ahead of `from`, otherwise tomorrow's.
    pub fn next_run_after(&self, from: DateTime<Local>) -> DateTime<Local> {
        let slot = NaiveTime::from_hms_opt(self.hour, 0, 0).unwrap_or(NaiveTime::MIN);

        let today = from.date_naive().and_time(slot);
        if let Some(at) = Local.from_local_datetime(&today).earliest() {
            if at > from {
                return at;
            }
        }

        let mut day = from.date_naive();
        // a DST gap can swallow the slot, so keep walking forward
        for _ in 0..3 {
            day = day.succ_opt().unwrap_or(day);
            if let Some(at) = Local.from_local_datetime(&day.and_time(slot)).earliest() {
                return at;
            }
        }
        from + Duration::days(1)
    }
}

/// One run on the blocking pool; jobs take std locks and must not stall the runtime.
async fn run_job(job: &Arc<dyn ScheduledJob>) {
    info!(job = job.name(), "Running scheduled job");
    let task = job.clone();
    if let Err(e) = actix_web::web::block(move || task.run()).await {
        warn!(job = job.name(), error = %e, "Scheduled job did not complete");
    }
}

/// Spawns the job loop on the actix runtime.
pub fn spawn_daily(job: Arc<dyn ScheduledJob>, schedule: DailySchedule) {
    actix_web::rt::spawn(async move {
        info!(job = job.name(), hour = schedule.hour(), "Scheduled daily job");

        loop {
            let now = Local::now();
            let next = schedule.next_run_after(now);
            let wait = match (next - now).to_std() {
                Ok(wait) => wait,
                Err(e) => {
                    warn!(job = job.name(), error = %e, "Negative wait, running now");
                    std::time::Duration::ZERO
                }
            };

            info!(job = job.name(), next_run = %next, "Waiting for next run");
            actix_web::rt::time::sleep(wait).await;

            run_job(&job).await;
        }
    });
}
