//! Report fetching, submission and normalization. Backend records arrive
//! half-formed (string coordinates, absent images, no history); everything
//! leaving this module is a fully-populated `Report`.

use std::sync::Arc;

use anyhow::Result;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::client::services::gateway::{Backend, BackendProblem, SubmitPayload};
use crate::common::categories::{department_for_category, derive_priority};
use crate::common::models::{
    Geotag, ImageAttachment, Priority, Report, ReportDraft, ReportStatus, StatusEntry,
};
use crate::common::seed::PLACEHOLDER_IMAGE_URI;

/// City-center fallback for submissions until real capture is wired in.
const KANPUR_CENTER: (f64, f64) = (26.4499, 80.3319);
const COORD_JITTER: f64 = 0.05;

pub fn normalize_status(raw: &str) -> ReportStatus {
    match raw.trim().to_lowercase().as_str() {
        "completed" => ReportStatus::Resolved,
        "in-progress" | "in progress" => ReportStatus::InProgress,
        "not completed" => ReportStatus::Pending,
        _ => ReportStatus::Pending,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Jitter the city-center coordinate by up to ±0.05° in each axis. This is
/// a stand-in for device capture, not a real position.
pub fn synthesize_geotag(captured_by: Option<&str>) -> Geotag {
    let mut rng = rand::thread_rng();
    Geotag {
        latitude: KANPUR_CENTER.0 + rng.gen_range(-COORD_JITTER..=COORD_JITTER),
        longitude: KANPUR_CENTER.1 + rng.gen_range(-COORD_JITTER..=COORD_JITTER),
        accuracy_m: rng.gen_range(5.0..50.0),
        address: Some("Kanpur".to_string()),
        captured_by: captured_by.map(str::to_string),
        timestamp: Utc::now(),
        device: Some("simulated-capture".to_string()),
    }
}

/// Backend record -> client model. Never fails; every missing or malformed
/// field gets a defensible substitute.
pub fn normalize_problem(raw: BackendProblem) -> Report {
    let id = if raw.id.is_empty() { Uuid::new_v4().to_string() } else { raw.id };
    let status = raw
        .status
        .as_deref()
        .map(normalize_status)
        .unwrap_or(ReportStatus::Pending);
    let category = if raw.problem_categories.is_empty() {
        raw.others_text.clone().unwrap_or_else(|| "Others".to_string())
    } else {
        raw.problem_categories.join(", ")
    };
    let submitted_at = raw
        .created_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or_else(Utc::now);
    let image = match raw.user_image_base64 {
        Some(data) if !data.is_empty() => {
            if data.starts_with("data:") {
                data
            } else {
                let mime = raw
                    .user_image_mimetype
                    .as_deref()
                    .unwrap_or("image/jpeg");
                format!("data:{mime};base64,{data}")
            }
        }
        _ => PLACEHOLDER_IMAGE_URI.to_string(),
    };
    let geotag = match (raw.latitude, raw.longitude) {
        (Some(latitude), Some(longitude)) => Some(Geotag {
            latitude,
            longitude,
            accuracy_m: 0.0,
            address: raw.location.clone(),
            captured_by: raw.user_name.clone(),
            timestamp: submitted_at,
            device: None,
        }),
        _ => None,
    };
    let assigned_department = raw
        .assigned_department
        .filter(|d| !d.is_empty())
        .or_else(|| department_for_category(&category).map(str::to_string));
    let assigned_worker = if raw.assigned_worker_id.is_empty() {
        None
    } else {
        Some(raw.assigned_worker_id)
    };
    let submitted_by = raw.user_name.clone();
    // The backend keeps no transition log, so fabricate the one entry we
    // can vouch for: the record exists in its current status.
    let status_history = vec![StatusEntry {
        status,
        timestamp: submitted_at,
        updated_by: raw.user_name.unwrap_or_else(|| "system".to_string()),
        notes: Some(status.default_note().to_string()),
    }];

    Report {
        id,
        image,
        proof_image: None,
        description: raw.others_text.unwrap_or_default(),
        category,
        location: raw.location.unwrap_or_else(|| "Kanpur".to_string()),
        submitted_at,
        status,
        assigned_worker,
        assigned_department,
        priority: raw.priority.as_deref().and_then(Priority::parse),
        geotag,
        status_history,
        submitted_by,
    }
}

#[derive(Debug, Default)]
pub struct ReportsService;

impl ReportsService {
    /// Reports belonging to one citizen, normalized.
    pub async fn load_user<G: Backend>(
        gateway: &Arc<Mutex<G>>,
        user_id: &str,
    ) -> Result<Vec<Report>> {
        let guard = gateway.lock().await;
        let problems = guard.get_user_problems(user_id).await?;
        Ok(problems.into_iter().map(normalize_problem).collect())
    }

    /// Every report in the system, normalized. Used by staff roles.
    pub async fn load_all<G: Backend>(gateway: &Arc<Mutex<G>>) -> Result<Vec<Report>> {
        let guard = gateway.lock().await;
        let problems = guard.get_all_problems().await?;
        Ok(problems.into_iter().map(normalize_problem).collect())
    }

    /// Submit a draft. Categories come from the explicit form selection,
    /// else best-effort image analysis, else the draft's single category.
    /// Returns the normalized report plus the category list that was used
    /// (so the caller can surface the "AI detected" notice).
    pub async fn submit<G: Backend>(
        gateway: &Arc<Mutex<G>>,
        draft: &ReportDraft,
        image: &ImageAttachment,
        submitted_by: Option<&str>,
    ) -> Result<(Report, Vec<String>)> {
        let guard = gateway.lock().await;

        let mut categories = draft.categories.clone();
        if categories.is_empty() {
            match guard.analyze_image(image).await {
                Ok(detected) => categories = detected,
                Err(e) => log::warn!("[REPORTS] image analysis unavailable: {e}"),
            }
        }
        if categories.is_empty() {
            if let Some(single) = &draft.category {
                categories.push(single.clone());
            }
        }

        let priority = derive_priority(&draft.description, &categories);
        let geotag = synthesize_geotag(submitted_by);
        let payload = SubmitPayload {
            description: draft.description.clone(),
            problem_categories: categories.clone(),
            others_text: if draft.description.is_empty() {
                None
            } else {
                Some(draft.description.clone())
            },
            latitude: geotag.latitude,
            longitude: geotag.longitude,
            location: draft.location.clone(),
            user_image_base64: BASE64.encode(&image.bytes),
            user_image_mimetype: image.mimetype.clone(),
            priority: priority.as_str().to_string(),
        };

        let raw = guard.submit_problem(&payload).await?;
        let mut report = normalize_problem(raw);
        if report.geotag.is_none() {
            report.geotag = Some(geotag);
        }
        if report.priority.is_none() {
            report.priority = Some(priority);
        }
        if !draft.location.is_empty() && (report.location.is_empty() || report.location == "Kanpur") {
            report.location = draft.location.clone();
        }
        Ok((report, categories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_maps_to_resolved() {
        assert_eq!(normalize_status("completed"), ReportStatus::Resolved);
    }

    #[test]
    fn not_completed_maps_to_pending() {
        assert_eq!(normalize_status("not completed"), ReportStatus::Pending);
    }

    #[test]
    fn unknown_status_defaults_to_pending() {
        assert_eq!(normalize_status("half done maybe"), ReportStatus::Pending);
        assert_eq!(normalize_status(""), ReportStatus::Pending);
    }

    #[test]
    fn in_progress_survives_normalization() {
        assert_eq!(normalize_status("in-progress"), ReportStatus::InProgress);
        assert_eq!(normalize_status("In Progress"), ReportStatus::InProgress);
    }

    #[test]
    fn missing_image_gets_placeholder() {
        let report = normalize_problem(BackendProblem::default());
        assert_eq!(report.image, PLACEHOLDER_IMAGE_URI);
    }

    #[test]
    fn raw_base64_is_wrapped_into_data_uri() {
        let raw = BackendProblem {
            user_image_base64: Some("aGVsbG8=".to_string()),
            user_image_mimetype: Some("image/png".to_string()),
            ..Default::default()
        };
        assert_eq!(normalize_problem(raw).image, "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn history_is_fabricated_with_one_entry_matching_status() {
        let raw = BackendProblem {
            status: Some("completed".to_string()),
            user_name: Some("Ramesh Gupta".to_string()),
            created_at: Some("2025-06-01T08:30:00Z".to_string()),
            ..Default::default()
        };
        let report = normalize_problem(raw);
        assert_eq!(report.status, ReportStatus::Resolved);
        assert_eq!(report.status_history.len(), 1);
        assert_eq!(report.status_history[0].status, ReportStatus::Resolved);
        assert_eq!(report.status_history[0].timestamp, report.submitted_at);
        assert_eq!(report.status_history[0].updated_by, "Ramesh Gupta");
    }

    #[test]
    fn department_is_derived_from_category_when_backend_left_it_empty() {
        let raw = BackendProblem {
            problem_categories: vec!["Water Issues / जल समस्या".to_string()],
            ..Default::default()
        };
        let report = normalize_problem(raw);
        assert_eq!(report.assigned_department.as_deref(), Some("Jal Kal Vibhag"));
    }

    #[test]
    fn backend_department_wins_over_lookup() {
        let raw = BackendProblem {
            problem_categories: vec!["Water Issues".to_string()],
            assigned_department: Some("Special Task Cell".to_string()),
            ..Default::default()
        };
        let report = normalize_problem(raw);
        assert_eq!(report.assigned_department.as_deref(), Some("Special Task Cell"));
    }

    #[test]
    fn synthesized_geotag_stays_within_jitter_bounds() {
        for _ in 0..50 {
            let tag = synthesize_geotag(Some("tester"));
            assert!((tag.latitude - KANPUR_CENTER.0).abs() <= COORD_JITTER);
            assert!((tag.longitude - KANPUR_CENTER.1).abs() <= COORD_JITTER);
            assert!(tag.accuracy_m >= 5.0 && tag.accuracy_m < 50.0);
        }
    }

    #[test]
    fn empty_id_is_replaced_with_generated_one() {
        let report = normalize_problem(BackendProblem::default());
        assert!(!report.id.is_empty());
    }
}
