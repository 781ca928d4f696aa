// Domain models shared between the portal core and its services
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Citizen,
    FieldWorker,
    DepartmentHead,
    DistrictMagistrate,
}

impl Role {
    /// Parse a backend role string. Unknown strings are treated as absent
    /// rather than rejected so a malformed record cannot poison a login.
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "citizen" => Some(Role::Citizen),
            "field-worker" | "field_worker" | "fieldworker" => Some(Role::FieldWorker),
            "department-head" | "department_head" => Some(Role::DepartmentHead),
            "district-magistrate" | "district_magistrate" | "admin" => {
                Some(Role::DistrictMagistrate)
            }
            _ => None,
        }
    }

    pub fn is_staff(self) -> bool {
        matches!(
            self,
            Role::FieldWorker | Role::DepartmentHead | Role::DistrictMagistrate
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::FieldWorker => "field-worker",
            Role::DepartmentHead => "department-head",
            Role::DistrictMagistrate => "district-magistrate",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Authentication descriptor: the method the account was created with
    /// ("email", "phone", "aadhaar") plus the number it is bound to.
    pub auth_method: Option<String>,
    pub auth_number: Option<String>,
    pub role: Option<Role>,
    /// Coarse partition key for staff accounts ("Jal Kal Vibhag", ...).
    pub department: Option<String>,
    pub address: Option<String>,
    pub avatar: Option<String>,
}

impl User {
    /// Accounts created through citizen registration carry no role field.
    pub fn effective_role(&self) -> Role {
        self.role.unwrap_or(Role::Citizen)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::InProgress => "in-progress",
            ReportStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<ReportStatus> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(ReportStatus::Pending),
            "in-progress" | "in progress" => Some(ReportStatus::InProgress),
            "resolved" => Some(ReportStatus::Resolved),
            _ => None,
        }
    }

    /// Bilingual note recorded in the status log when no explicit note is
    /// given for a transition.
    pub fn default_note(self) -> &'static str {
        match self {
            ReportStatus::Pending => "Report registered / शिकायत दर्ज",
            ReportStatus::InProgress => "Work started / काम शुरू हुआ",
            ReportStatus::Resolved => "Issue resolved / समस्या हल हुई",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// One entry of a report's append-only status log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: ReportStatus,
    pub timestamp: DateTime<Utc>,
    pub updated_by: String,
    pub notes: Option<String>,
}

/// Capture metadata attached to a submission. Coordinates are synthesized
/// client-side until real device capture is wired in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geotag {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
    pub address: Option<String>,
    pub captured_by: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub device: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    /// Data-URI or URL of the citizen's photo; never empty after
    /// normalization (a placeholder is substituted when missing).
    pub image: String,
    pub proof_image: Option<String>,
    pub description: String,
    /// Free text, possibly a bilingual composite like
    /// "Water Issues / जल समस्या". Split defensively, never index blindly.
    pub category: String,
    pub location: String,
    pub submitted_at: DateTime<Utc>,
    pub status: ReportStatus,
    pub assigned_worker: Option<String>,
    pub assigned_department: Option<String>,
    pub priority: Option<Priority>,
    pub geotag: Option<Geotag>,
    pub status_history: Vec<StatusEntry>,
    pub submitted_by: Option<String>,
}

/// Partial update applied to a cached report. Only present fields change.
#[derive(Debug, Clone, Default)]
pub struct ReportPatch {
    pub status: Option<ReportStatus>,
    pub priority: Option<Priority>,
    pub assigned_worker: Option<String>,
    pub assigned_department: Option<String>,
    pub proof_image: Option<String>,
}

/// What the submission form collects before the gateway call.
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub description: String,
    /// Explicit category selection from the form, if any.
    pub categories: Vec<String>,
    /// Single fallback category when no explicit selection was made.
    pub category: Option<String>,
    pub location: String,
}

/// Image attachment for a submission; required before any network call.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    pub mimetype: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub auth_method: Option<String>,
    pub auth_number: Option<String>,
    pub address: Option<String>,
}

/// Partial profile update; only present fields are sent to the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
