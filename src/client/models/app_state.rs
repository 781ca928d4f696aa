use anyhow::{anyhow, Result};
use chrono::Utc;

use crate::client::models::notice::Notice;
use crate::client::router::Page;
use crate::common::models::{Report, ReportPatch, ReportStatus, StatusEntry, User};
use crate::common::seed;

/// Everything a screen can read. All writes go through `Portal::dispatch`;
/// the methods here are the state-local mutations it delegates to.
#[derive(Debug, Clone)]
pub struct PortalState {
    pub page: Page,
    pub user: Option<User>,
    pub session_token: Option<String>,
    /// Report cache, newest-first for user submissions. Owned exclusively
    /// here; a successful fetch replaces it wholesale.
    pub reports: Vec<Report>,
    /// Directory of all known users, populated for staff roles.
    pub directory: Vec<User>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

impl Default for PortalState {
    fn default() -> Self {
        PortalState {
            page: Page::Login,
            user: None,
            session_token: None,
            reports: Vec::new(),
            directory: Vec::new(),
            notices: Vec::new(),
        }
    }
}

impl PortalState {
    /// Initial state with the demo report set, as shown before any fetch.
    pub fn seeded() -> Self {
        PortalState { reports: seed::sample_reports(), ..Default::default() }
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn clear_notices(&mut self) {
        self.notices.clear();
    }

    pub fn current_user_name(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "system".to_string())
    }

    /// Patch a cached report in place. A status change appends exactly one
    /// entry to the status log; its timestamp never goes backwards even if
    /// the last entry came from a server clock ahead of ours.
    pub fn apply_report_patch(
        &mut self,
        report_id: &str,
        patch: ReportPatch,
        updated_by: &str,
    ) -> Result<()> {
        let report = self
            .reports
            .iter_mut()
            .find(|r| r.id == report_id)
            .ok_or_else(|| anyhow!("report {report_id} not found"))?;

        if let Some(priority) = patch.priority {
            report.priority = Some(priority);
        }
        if let Some(worker) = patch.assigned_worker {
            report.assigned_worker = Some(worker);
        }
        if let Some(department) = patch.assigned_department {
            report.assigned_department = Some(department);
        }
        if let Some(proof) = patch.proof_image {
            report.proof_image = Some(proof);
        }
        if let Some(status) = patch.status {
            let mut timestamp = Utc::now();
            if let Some(last) = report.status_history.last() {
                if timestamp < last.timestamp {
                    timestamp = last.timestamp;
                }
            }
            report.status = status;
            report.status_history.push(StatusEntry {
                status,
                timestamp,
                updated_by: updated_by.to_string(),
                notes: Some(status.default_note().to_string()),
            });
        }
        Ok(())
    }

    pub fn find_report(&self, report_id: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == report_id)
    }

    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        self.directory.iter().find(|u| u.id == user_id)
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for report in &self.reports {
            match report.status {
                ReportStatus::Pending => counts.pending += 1,
                ReportStatus::InProgress => counts.in_progress += 1,
                ReportStatus::Resolved => counts.resolved += 1,
            }
        }
        counts
    }

    pub fn reports_for_department<'a>(&'a self, department: &'a str) -> impl Iterator<Item = &'a Report> {
        self.reports
            .iter()
            .filter(move |r| r.assigned_department.as_deref() == Some(department))
    }

    pub fn reports_for_worker<'a>(&'a self, worker: &'a str) -> impl Iterator<Item = &'a Report> {
        self.reports
            .iter()
            .filter(move |r| r.assigned_worker.as_deref() == Some(worker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::models::Priority;

    #[test]
    fn status_patch_appends_exactly_one_history_entry() {
        let mut state = PortalState::seeded();
        let id = state.reports[0].id.clone();
        let before = state.reports[0].status_history.len();

        let patch = ReportPatch { status: Some(ReportStatus::InProgress), ..Default::default() };
        state.apply_report_patch(&id, patch, "Ward Supervisor").unwrap();

        let report = state.find_report(&id).unwrap();
        assert_eq!(report.status_history.len(), before + 1);
        let last = report.status_history.last().unwrap();
        assert_eq!(last.status, ReportStatus::InProgress);
        assert_eq!(report.status, ReportStatus::InProgress);
        assert!(report
            .status_history
            .iter()
            .all(|e| e.timestamp <= last.timestamp));
    }

    #[test]
    fn non_status_patch_leaves_history_untouched() {
        let mut state = PortalState::seeded();
        let id = state.reports[0].id.clone();
        let before = state.reports[0].status_history.len();

        let patch = ReportPatch { priority: Some(Priority::High), ..Default::default() };
        state.apply_report_patch(&id, patch, "system").unwrap();

        let report = state.find_report(&id).unwrap();
        assert_eq!(report.status_history.len(), before);
        assert_eq!(report.priority, Some(Priority::High));
    }

    #[test]
    fn patching_unknown_report_is_an_error() {
        let mut state = PortalState::seeded();
        let err = state
            .apply_report_patch("VK-0000-0000", ReportPatch::default(), "system")
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn status_counts_cover_all_reports() {
        let state = PortalState::seeded();
        let counts = state.status_counts();
        assert_eq!(
            counts.pending + counts.in_progress + counts.resolved,
            state.reports.len()
        );
    }
}
