//! Demo data seeding the report cache before the first successful fetch.
//! Staff dashboards stay populated when the backend is unreachable or
//! returns nothing; an authoritative fetch replaces all of this wholesale.

use chrono::{Duration, Utc};

use crate::common::models::{
    Geotag, Priority, Report, ReportStatus, StatusEntry,
};

/// 1x1 transparent PNG used wherever a record carries no photo.
pub const PLACEHOLDER_IMAGE_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn geotag(lat: f64, lon: f64, address: &str, days_ago: i64) -> Geotag {
    Geotag {
        latitude: lat,
        longitude: lon,
        accuracy_m: 12.0,
        address: Some(address.to_string()),
        captured_by: None,
        timestamp: Utc::now() - Duration::days(days_ago),
        device: Some("seed-data".to_string()),
    }
}

pub fn sample_reports() -> Vec<Report> {
    let now = Utc::now();
    vec![
        Report {
            id: "VK-2025-0104".to_string(),
            image: PLACEHOLDER_IMAGE_URI.to_string(),
            proof_image: None,
            description: "Deep pothole in the middle of the carriageway, two-wheelers swerving into oncoming traffic".to_string(),
            category: "Road Damage / सड़क क्षति".to_string(),
            location: "Mall Road, near Phool Bagh".to_string(),
            submitted_at: now - Duration::days(6),
            status: ReportStatus::Pending,
            assigned_worker: None,
            assigned_department: Some("Public Works Department".to_string()),
            priority: Some(Priority::Medium),
            geotag: Some(geotag(26.4652, 80.3507, "Mall Road, Kanpur", 6)),
            status_history: vec![StatusEntry {
                status: ReportStatus::Pending,
                timestamp: now - Duration::days(6),
                updated_by: "Ramesh Gupta".to_string(),
                notes: Some("Report registered / शिकायत दर्ज".to_string()),
            }],
            submitted_by: Some("Ramesh Gupta".to_string()),
        },
        Report {
            id: "VK-2025-0097".to_string(),
            image: PLACEHOLDER_IMAGE_URI.to_string(),
            proof_image: None,
            description: "No water supply since Tuesday morning, whole lane affected".to_string(),
            category: "Water Issues / जल समस्या".to_string(),
            location: "W-2 Block, Swaroop Nagar".to_string(),
            submitted_at: now - Duration::days(4),
            status: ReportStatus::InProgress,
            assigned_worker: Some("Suresh Yadav".to_string()),
            assigned_department: Some("Jal Kal Vibhag".to_string()),
            priority: Some(Priority::High),
            geotag: Some(geotag(26.4837, 80.3204, "Swaroop Nagar, Kanpur", 4)),
            status_history: vec![
                StatusEntry {
                    status: ReportStatus::Pending,
                    timestamp: now - Duration::days(4),
                    updated_by: "Meena Srivastava".to_string(),
                    notes: Some("Report registered / शिकायत दर्ज".to_string()),
                },
                StatusEntry {
                    status: ReportStatus::InProgress,
                    timestamp: now - Duration::days(3),
                    updated_by: "Control Room".to_string(),
                    notes: Some("Work started / काम शुरू हुआ".to_string()),
                },
            ],
            submitted_by: Some("Meena Srivastava".to_string()),
        },
        Report {
            id: "VK-2025-0089".to_string(),
            image: PLACEHOLDER_IMAGE_URI.to_string(),
            proof_image: Some(PLACEHOLDER_IMAGE_URI.to_string()),
            description: "Garbage heap not lifted for a week, stray cattle gathering".to_string(),
            category: "Garbage & Sanitation / कचरा और सफाई".to_string(),
            location: "Kidwai Nagar, K Block market".to_string(),
            submitted_at: now - Duration::days(9),
            status: ReportStatus::Resolved,
            assigned_worker: Some("Anil Kumar".to_string()),
            assigned_department: Some("Nagar Nigam Sanitation Wing".to_string()),
            priority: Some(Priority::Medium),
            geotag: Some(geotag(26.4281, 80.3405, "Kidwai Nagar, Kanpur", 9)),
            status_history: vec![
                StatusEntry {
                    status: ReportStatus::Pending,
                    timestamp: now - Duration::days(9),
                    updated_by: "Farhan Ali".to_string(),
                    notes: Some("Report registered / शिकायत दर्ज".to_string()),
                },
                StatusEntry {
                    status: ReportStatus::InProgress,
                    timestamp: now - Duration::days(8),
                    updated_by: "Ward Supervisor".to_string(),
                    notes: Some("Work started / काम शुरू हुआ".to_string()),
                },
                StatusEntry {
                    status: ReportStatus::Resolved,
                    timestamp: now - Duration::days(7),
                    updated_by: "Anil Kumar".to_string(),
                    notes: Some("Issue resolved / समस्या हल हुई".to_string()),
                },
            ],
            submitted_by: Some("Farhan Ali".to_string()),
        },
        Report {
            id: "VK-2025-0110".to_string(),
            image: PLACEHOLDER_IMAGE_URI.to_string(),
            proof_image: None,
            description: "Street light pole sparking during rain, urgent danger for school children".to_string(),
            category: "Electricity Issues / बिजली समस्या".to_string(),
            location: "Govind Nagar, near primary school".to_string(),
            submitted_at: now - Duration::days(1),
            status: ReportStatus::Pending,
            assigned_worker: None,
            assigned_department: Some("KESCO".to_string()),
            priority: Some(Priority::High),
            geotag: Some(geotag(26.4235, 80.2980, "Govind Nagar, Kanpur", 1)),
            status_history: vec![StatusEntry {
                status: ReportStatus::Pending,
                timestamp: now - Duration::days(1),
                updated_by: "Sunita Devi".to_string(),
                notes: Some("Report registered / शिकायत दर्ज".to_string()),
            }],
            submitted_by: Some("Sunita Devi".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_histories_end_on_current_status() {
        for report in sample_reports() {
            let last = report.status_history.last().expect("seed history never empty");
            assert_eq!(last.status, report.status, "report {}", report.id);
        }
    }

    #[test]
    fn seed_histories_are_time_ordered() {
        for report in sample_reports() {
            let mut prev = None;
            for entry in &report.status_history {
                if let Some(p) = prev {
                    assert!(entry.timestamp >= p, "report {}", report.id);
                }
                prev = Some(entry.timestamp);
            }
        }
    }
}
