use crate::{
    error::ApiError,
    model::attendance::Attendance,
    store::{AttendanceLedger, Store},
    sync::Reconciler,
    utils::dates::parse_optional_date,
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use tracing::info;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFilter {
    /// Inclusive lower bound, YYYY-MM-DD
    pub start_date: Option<String>,
    /// Inclusive upper bound, YYYY-MM-DD
    pub end_date: Option<String>,
}

/// Keeps records whose calendar day lies in `[start, end]`; vendors left
/// without records are dropped from the result.
fn filter_by_day(
    all: HashMap<String, Vec<Attendance>>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> BTreeMap<String, Vec<Attendance>> {
    all.into_iter()
        .filter_map(|(vendor_id, records)| {
            let kept: Vec<Attendance> = records
                .into_iter()
                .filter(|r| {
                    let day = r.date.date_naive();
                    start.is_none_or(|s| day >= s) && end.is_none_or(|e| day <= e)
                })
                .collect();
            (!kept.is_empty()).then_some((vendor_id, kept))
        })
        .collect()
}

/// Attendance for all vendors
#[utoipa::path(
    get,
    path = "/api/admin/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Records keyed by vendor id", body = Object, example = json!({
            "3f2a...": [{
                "id": "9c1b...",
                "vendorId": "3f2a...",
                "date": "2024-05-01T12:00:00+02:00",
                "loginTime": "2024-05-01T09:12:00+02:00",
                "logoutTime": "2024-05-01T18:40:00+02:00",
                "duration": 9.466667,
                "presentDay": 1.0
            }]
        })),
        (status = 400, description = "Bad date format")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_attendance(
    store: web::Data<Store>,
    query: web::Query<AttendanceFilter>,
) -> Result<HttpResponse, ApiError> {
    let start = parse_optional_date(query.start_date.as_deref(), "start date")?;
    let end = parse_optional_date(query.end_date.as_deref(), "end date")?;

    Ok(HttpResponse::Ok().json(filter_by_day(store.all_attendance(), start, end)))
}

/// Attendance for one vendor
#[utoipa::path(
    get,
    path = "/api/admin/attendance/{vendor_id}",
    params(
        ("vendor_id", Path, description = "Vendor ID")
    ),
    responses(
        (status = 200, description = "Vendor attendance", body = [Attendance]),
        (status = 404, description = "Vendor not found")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_vendor_attendance(
    store: web::Data<Store>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let vendor_id = path.into_inner();

    if !store.vendor_exists(&vendor_id) {
        return Err(ApiError::not_found("Vendor not found"));
    }

    Ok(HttpResponse::Ok().json(store.attendance_for(&vendor_id)))
}

/// Run the attendance sync now
#[utoipa::path(
    post,
    path = "/api/admin/attendance/sync",
    responses(
        (status = 200, description = "Sync finished", body = Object, example = json!({
            "message": "Attendance updated successfully"
        }))
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn sync_attendance(reconciler: web::Data<Reconciler>) -> Result<HttpResponse, ApiError> {
    info!("Manual attendance sync requested");

    web::block(move || reconciler.reconcile())
        .await
        .map_err(|e| ApiError::internal(format!("attendance sync failed: {e}")))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance updated successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::Presence;
    use chrono::{Datelike, Local, TimeZone};

    fn record(vendor_id: &str, y: i32, m: u32, d: u32, hour: u32) -> Attendance {
        let at = |h| Local.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap();
        Attendance {
            id: format!("{vendor_id}-{d}-{hour}"),
            vendor_id: vendor_id.into(),
            date: at(hour),
            login_time: at(9),
            logout_time: at(17),
            duration: 8.0,
            present_day: Presence::FullDay,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bounds_are_inclusive_calendar_days() {
        let mut all = HashMap::new();
        all.insert(
            "v1".to_string(),
            vec![
                record("v1", 2024, 5, 1, 23),
                record("v1", 2024, 5, 2, 12),
                record("v1", 2024, 5, 3, 1),
                record("v1", 2024, 5, 4, 12),
            ],
        );

        let out = filter_by_day(all, Some(day(2024, 5, 1)), Some(day(2024, 5, 3)));
        let days: Vec<u32> = out["v1"].iter().map(|r| r.date.day()).collect();

        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn vendors_without_matches_are_omitted() {
        let mut all = HashMap::new();
        all.insert("v1".to_string(), vec![record("v1", 2024, 5, 1, 12)]);
        all.insert("v2".to_string(), vec![record("v2", 2024, 6, 1, 12)]);
        all.insert("v3".to_string(), Vec::new());

        let out = filter_by_day(all, Some(day(2024, 6, 1)), None);

        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["v2"]);
    }

    #[test]
    fn no_bounds_keeps_every_non_empty_vendor() {
        let mut all = HashMap::new();
        all.insert("v1".to_string(), vec![record("v1", 2024, 5, 1, 12)]);
        all.insert("v2".to_string(), Vec::new());

        let out = filter_by_day(all, None, None);

        assert_eq!(out.len(), 1);
        assert_eq!(out["v1"].len(), 1);
    }
}
