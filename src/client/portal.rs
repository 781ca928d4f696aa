//! The portal core: one dispatcher owning all state transitions. Screens
//! (or the CLI) build `Action`s; every mutation, gateway round-trip and
//! notice happens here. Operations that chain network calls await each one
//! in turn instead of guessing with timers.

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use tokio::sync::Mutex;

use crate::client::models::actions::Action;
use crate::client::models::app_state::PortalState;
use crate::client::models::notice::Notice;
use crate::client::router::{select_view, Page, View};
use crate::client::services::auth_service::AuthService;
use crate::client::services::gateway::Backend;
use crate::client::services::reports_service::ReportsService;
use crate::client::services::users_service::{merge_user, UsersService};
use crate::client::utils::session_store;
use crate::common::models::{
    ImageAttachment, ProfileUpdate, RegisterData, ReportDraft, ReportPatch, ReportStatus, Role,
};

pub struct Portal<G: Backend> {
    pub state: PortalState,
    gateway: Arc<Mutex<G>>,
}

impl<G: Backend> Portal<G> {
    pub fn new(gateway: G) -> Self {
        Portal { state: PortalState::seeded(), gateway: Arc::new(Mutex::new(gateway)) }
    }

    pub fn gateway(&self) -> Arc<Mutex<G>> {
        self.gateway.clone()
    }

    /// The screen the rendering layer should show right now.
    pub fn view(&self) -> View {
        select_view(self.state.page, self.state.user.as_ref())
    }

    /// Single entry point for every mutation. Failures become notices and
    /// leave the rest of the state as it was; nothing here panics.
    pub async fn dispatch(&mut self, action: Action) {
        let outcome = match action {
            Action::Login { email, password } => self.login(&email, &password).await,
            Action::AdminLogin { email, password, requested_role, department } => {
                self.admin_login(&email, &password, requested_role, department).await
            }
            Action::Register(data) => self.register(&data).await,
            Action::UpdateProfile(update) => self.update_profile(&update).await,
            Action::Logout => self.logout().await,
            Action::Navigate(page) => {
                self.navigate(page);
                Ok(())
            }
            Action::Back => {
                self.navigate(self.state.page.back_target());
                Ok(())
            }
            Action::LoadUserReports => self.load_user_reports().await,
            Action::LoadAllReports => self.load_all_reports().await,
            Action::LoadAllUsers => self.load_all_users().await,
            Action::SubmitReport { draft, image } => self.submit_report(&draft, image).await,
            Action::UpdateReport { report_id, patch } => self.update_report(&report_id, patch),
            Action::AssignWorker { report_id, worker_id } => {
                self.assign_worker(&report_id, &worker_id)
            }
            Action::ClearNotices => {
                self.state.clear_notices();
                Ok(())
            }
        };
        if let Err(e) = outcome {
            log::warn!("[PORTAL] action failed: {e:#}");
            self.state.notify(Notice::error(e.to_string()));
        }
    }

    fn navigate(&mut self, page: Page) {
        self.state.clear_notices();
        self.state.page = page;
    }

    fn store_session(&mut self, token: &str) {
        if let Err(e) = session_store::save_session_token(token) {
            log::warn!("[PORTAL] could not persist session token: {e}");
        }
        self.state.session_token = Some(token.to_string());
    }

    async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let session = AuthService::login(&self.gateway, email, password)
            .await
            .map_err(|e| anyhow!("login failed: {e}"))?;
        self.gateway.lock().await.set_token(Some(session.token.clone()));
        self.store_session(&session.token);
        let name = session.user.name.clone();
        self.state.user = Some(session.user);
        self.navigate(Page::Dashboard);
        self.state.notify(Notice::success(format!("Welcome back, {name}")));
        Ok(())
    }

    async fn admin_login(
        &mut self,
        email: &str,
        password: &str,
        requested_role: Role,
        department: Option<String>,
    ) -> Result<()> {
        let mut session = AuthService::admin_login(&self.gateway, email, password)
            .await
            .map_err(|e| anyhow!("staff login failed: {e}"))?;

        // The backend's role is authoritative; a missing staff role is a
        // soft rejection, not an exception.
        let Some(role) = session.user.role else {
            self.state.notify(Notice::error("This account has no staff access"));
            return Ok(());
        };
        if !role.is_staff() {
            self.state.notify(Notice::error("This account has no staff access"));
            return Ok(());
        }
        if role != requested_role {
            log::warn!(
                "[PORTAL] staff login requested {requested_role} but backend says {role}"
            );
        }
        if session.user.department.is_none() {
            session.user.department = department;
        }

        self.gateway.lock().await.set_token(Some(session.token.clone()));
        self.store_session(&session.token);
        let name = session.user.name.clone();
        self.state.user = Some(session.user);
        self.navigate(Page::landing_for(role));
        self.state.notify(Notice::success(format!("Signed in as {name} ({role})")));

        // Bulk refresh, sequenced on completion of the login round-trip.
        // Each load surfaces its own failure without undoing the login.
        if let Err(e) = self.load_all_reports().await {
            log::warn!("[PORTAL] bulk report load failed: {e:#}");
            self.state.notify(Notice::error(e.to_string()));
        }
        if let Err(e) = self.load_all_users().await {
            log::warn!("[PORTAL] user directory load failed: {e:#}");
            self.state.notify(Notice::error(e.to_string()));
        }
        Ok(())
    }

    async fn register(&mut self, data: &RegisterData) -> Result<()> {
        let session = AuthService::register(&self.gateway, data)
            .await
            .map_err(|e| anyhow!("registration failed: {e}"))?;
        self.gateway.lock().await.set_token(Some(session.token.clone()));
        self.store_session(&session.token);
        let name = session.user.name.clone();
        self.state.user = Some(session.user);
        self.navigate(Page::Dashboard);
        self.state.notify(Notice::success(format!("Account created. Welcome, {name}")));
        Ok(())
    }

    async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<()> {
        let existing = self.state.user.clone().ok_or_else(|| anyhow!("not signed in"))?;
        let fresh = AuthService::update_profile(&self.gateway, &existing.id, update)
            .await
            .map_err(|e| anyhow!("profile update failed: {e}"))?;
        self.state.user = Some(merge_user(&existing, fresh));
        self.state.notify(Notice::success("Profile updated"));
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        let _ = session_store::clear_session_token();
        self.gateway.lock().await.set_token(None);
        self.state.user = None;
        self.state.session_token = None;
        self.navigate(Page::Login);
        self.state.notify(Notice::info("Logged out"));
        Ok(())
    }

    async fn load_user_reports(&mut self) -> Result<()> {
        let user_id = self
            .state
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or_else(|| anyhow!("not signed in"))?;
        let reports = ReportsService::load_user(&self.gateway, &user_id)
            .await
            .map_err(|e| anyhow!("could not load your reports: {e}"))?;
        self.state.reports = reports;
        Ok(())
    }

    async fn load_all_reports(&mut self) -> Result<()> {
        let reports = ReportsService::load_all(&self.gateway)
            .await
            .map_err(|e| anyhow!("could not load reports: {e}"))?;
        if reports.is_empty() {
            // Stale-but-available: keep whatever we were showing.
            self.state.notify(Notice::info(
                "No reports returned by the server; showing cached data",
            ));
            return Ok(());
        }
        self.state.reports = reports;
        Ok(())
    }

    async fn load_all_users(&mut self) -> Result<()> {
        let users = UsersService::load_all(&self.gateway)
            .await
            .map_err(|e| anyhow!("could not load users: {e}"))?;
        self.state.directory = users;
        Ok(())
    }

    async fn submit_report(
        &mut self,
        draft: &ReportDraft,
        image: Option<ImageAttachment>,
    ) -> Result<()> {
        if self.state.user.is_none() {
            bail!("sign in before submitting a report");
        }
        let Some(image) = image else {
            bail!("a photo of the problem is required");
        };
        let submitted_by = self.state.user.as_ref().map(|u| u.name.clone());
        let (report, categories) =
            ReportsService::submit(&self.gateway, draft, &image, submitted_by.as_deref())
                .await
                .map_err(|e| anyhow!("report submission failed: {e}"))?;
        let id = report.id.clone();
        self.state.reports.insert(0, report);
        self.state.notify(Notice::success(format!(
            "Report {id} submitted / शिकायत दर्ज हो गई"
        )));
        if !categories.is_empty() {
            self.state.notify(Notice::info(format!(
                "AI detected: {}",
                categories.join(", ")
            )));
        }
        Ok(())
    }

    fn update_report(&mut self, report_id: &str, patch: ReportPatch) -> Result<()> {
        let updated_by = self.state.current_user_name();
        self.state.apply_report_patch(report_id, patch, &updated_by)?;
        Ok(())
    }

    fn assign_worker(&mut self, report_id: &str, worker_id: &str) -> Result<()> {
        let worker = self
            .state
            .find_user(worker_id)
            .cloned()
            .ok_or_else(|| anyhow!("worker {worker_id} not found in directory"))?;
        let patch = ReportPatch {
            status: Some(ReportStatus::InProgress),
            assigned_worker: Some(worker.name.clone()),
            assigned_department: worker.department.clone(),
            ..Default::default()
        };
        let updated_by = self.state.current_user_name();
        self.state.apply_report_patch(report_id, patch, &updated_by)?;
        self.state.notify(Notice::success(format!(
            "Report {report_id} assigned to {}",
            worker.name
        )));
        // Simulated push to the worker; there is no real delivery channel.
        self.state.notify(Notice::info(format!(
            "Work order sent to {}{}",
            worker.name,
            worker
                .department
                .as_deref()
                .map(|d| format!(" ({d})"))
                .unwrap_or_default()
        )));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::client::models::notice::NoticeLevel;
    use crate::client::services::gateway::{
        AuthResponse, BackendProblem, BackendUser, SubmitPayload,
    };
    use crate::common::models::Priority;

    #[derive(Default)]
    struct MockBackend {
        login_fails: bool,
        admin_role: Option<String>,
        all_problems: Vec<BackendProblem>,
        users: Vec<BackendUser>,
        analyze_categories: Vec<String>,
        all_problems_calls: AtomicUsize,
        users_calls: AtomicUsize,
        submit_calls: AtomicUsize,
    }

    fn staff_user(role: &str, department: Option<&str>) -> BackendUser {
        BackendUser {
            id: "staff-1".to_string(),
            name: "Pradeep Mishra".to_string(),
            email: "pradeep@kanpur.gov.in".to_string(),
            role: Some(role.to_string()),
            department: department.map(str::to_string),
            ..Default::default()
        }
    }

    #[async_trait]
    impl Backend for MockBackend {
        async fn login(&self, _email: &str, _password: &str) -> Result<AuthResponse> {
            if self.login_fails {
                bail!("invalid credentials");
            }
            Ok(AuthResponse {
                user: BackendUser {
                    id: "u-1".to_string(),
                    name: "Asha Verma".to_string(),
                    email: "asha@example.com".to_string(),
                    ..Default::default()
                },
                token: "tok-citizen".to_string(),
            })
        }

        async fn admin_login(&self, _email: &str, _password: &str) -> Result<AuthResponse> {
            let role = self.admin_role.clone().ok_or_else(|| anyhow!("no staff account"))?;
            Ok(AuthResponse {
                user: staff_user(&role, Some("Jal Kal Vibhag")),
                token: "tok-staff".to_string(),
            })
        }

        async fn register(&self, data: &RegisterData) -> Result<AuthResponse> {
            Ok(AuthResponse {
                user: BackendUser {
                    id: "u-2".to_string(),
                    name: data.name.clone(),
                    email: data.email.clone(),
                    ..Default::default()
                },
                token: "tok-new".to_string(),
            })
        }

        async fn get_user_problems(&self, _user_id: &str) -> Result<Vec<BackendProblem>> {
            Ok(self.all_problems.clone())
        }

        async fn get_all_problems(&self) -> Result<Vec<BackendProblem>> {
            self.all_problems_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.all_problems.clone())
        }

        async fn get_all_users(&self) -> Result<Vec<BackendUser>> {
            self.users_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.users.clone())
        }

        async fn submit_problem(&self, payload: &SubmitPayload) -> Result<BackendProblem> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            Ok(BackendProblem {
                id: "P-NEW".to_string(),
                problem_categories: payload.problem_categories.clone(),
                others_text: Some(payload.description.clone()),
                latitude: Some(payload.latitude),
                longitude: Some(payload.longitude),
                location: Some(payload.location.clone()),
                status: Some("not completed".to_string()),
                priority: Some(payload.priority.clone()),
                user_image_base64: Some(payload.user_image_base64.clone()),
                user_image_mimetype: Some(payload.user_image_mimetype.clone()),
                ..Default::default()
            })
        }

        async fn update_user(&self, user_id: &str, update: &ProfileUpdate) -> Result<BackendUser> {
            Ok(BackendUser {
                id: user_id.to_string(),
                name: update.name.clone().unwrap_or_default(),
                ..Default::default()
            })
        }

        async fn analyze_image(&self, _image: &ImageAttachment) -> Result<Vec<String>> {
            Ok(self.analyze_categories.clone())
        }

        fn set_token(&mut self, _token: Option<String>) {}
    }

    fn one_problem(id: &str) -> BackendProblem {
        BackendProblem {
            id: id.to_string(),
            problem_categories: vec!["Road Damage".to_string()],
            status: Some("not completed".to_string()),
            ..Default::default()
        }
    }

    fn attachment() -> ImageAttachment {
        ImageAttachment { bytes: vec![0xFF, 0xD8, 0xFF], mimetype: "image/jpeg".to_string() }
    }

    #[tokio::test]
    async fn admin_login_routes_and_bulk_loads_once() {
        let mock = MockBackend {
            admin_role: Some("department-head".to_string()),
            all_problems: vec![one_problem("P-1"), one_problem("P-2")],
            users: vec![staff_user("field-worker", Some("Jal Kal Vibhag"))],
            ..Default::default()
        };
        let mut portal = Portal::new(mock);
        portal
            .dispatch(Action::AdminLogin {
                email: "pradeep@kanpur.gov.in".to_string(),
                password: "pw".to_string(),
                requested_role: Role::DepartmentHead,
                department: None,
            })
            .await;

        assert_eq!(portal.state.page, Page::DepartmentHeadDashboard);
        assert_eq!(portal.state.reports.len(), 2);
        assert_eq!(portal.state.directory.len(), 1);
        let gw = portal.gateway();
        let guard = gw.lock().await;
        assert_eq!(guard.all_problems_calls.load(Ordering::SeqCst), 1);
        assert_eq!(guard.users_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn admin_login_soft_rejects_non_staff_role() {
        let mock = MockBackend { admin_role: Some("citizen".to_string()), ..Default::default() };
        let mut portal = Portal::new(mock);
        portal
            .dispatch(Action::AdminLogin {
                email: "x@x.com".to_string(),
                password: "pw".to_string(),
                requested_role: Role::DepartmentHead,
                department: None,
            })
            .await;

        assert_eq!(portal.state.page, Page::Login);
        assert!(portal.state.user.is_none());
        assert!(portal
            .state
            .notices
            .iter()
            .any(|n| n.level == NoticeLevel::Error && n.message.contains("staff")));
    }

    #[tokio::test]
    async fn failed_login_leaves_state_unchanged() {
        let mock = MockBackend { login_fails: true, ..Default::default() };
        let mut portal = Portal::new(mock);
        let reports_before = portal.state.reports.len();
        portal
            .dispatch(Action::Login { email: "a@b.c".to_string(), password: "no".to_string() })
            .await;

        assert_eq!(portal.state.page, Page::Login);
        assert!(portal.state.user.is_none());
        assert!(portal.state.session_token.is_none());
        assert_eq!(portal.state.reports.len(), reports_before);
        assert!(portal.state.notices.iter().any(|n| n.level == NoticeLevel::Error));
    }

    #[tokio::test]
    async fn empty_fetch_keeps_cached_reports() {
        let mock = MockBackend::default();
        let mut portal = Portal::new(mock);
        let seeded = portal.state.reports.len();
        assert!(seeded > 0);

        portal.dispatch(Action::LoadAllReports).await;
        assert_eq!(portal.state.reports.len(), seeded);
        assert!(portal
            .state
            .notices
            .iter()
            .any(|n| n.level == NoticeLevel::Info && n.message.contains("cached")));
    }

    #[tokio::test]
    async fn submit_prepends_report_and_derives_high_priority() {
        let mock = MockBackend::default();
        let mut portal = Portal::new(mock);
        portal
            .dispatch(Action::Login { email: "asha@example.com".to_string(), password: "pw".to_string() })
            .await;

        let draft = ReportDraft {
            description: "EMERGENCY: water main burst, street flooding".to_string(),
            categories: vec!["Water Issues / जल समस्या".to_string()],
            category: None,
            location: "W-2 Block, Swaroop Nagar".to_string(),
        };
        portal
            .dispatch(Action::SubmitReport { draft, image: Some(attachment()) })
            .await;

        let first = &portal.state.reports[0];
        assert_eq!(first.id, "P-NEW");
        assert_eq!(first.priority, Some(Priority::High));
        assert_eq!(first.status, ReportStatus::Pending);
        assert!(portal
            .state
            .notices
            .iter()
            .any(|n| n.level == NoticeLevel::Success && n.message.contains("P-NEW")));
        assert!(portal
            .state
            .notices
            .iter()
            .any(|n| n.level == NoticeLevel::Info && n.message.contains("AI detected")));
    }

    #[tokio::test]
    async fn submit_without_photo_never_reaches_the_gateway() {
        let mock = MockBackend::default();
        let mut portal = Portal::new(mock);
        portal
            .dispatch(Action::Login { email: "asha@example.com".to_string(), password: "pw".to_string() })
            .await;

        portal
            .dispatch(Action::SubmitReport { draft: ReportDraft::default(), image: None })
            .await;

        assert!(portal
            .state
            .notices
            .iter()
            .any(|n| n.level == NoticeLevel::Error && n.message.contains("photo")));
        let gw = portal.gateway();
        assert_eq!(gw.lock().await.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn assign_worker_sets_department_and_forces_in_progress() {
        let mock = MockBackend::default();
        let mut portal = Portal::new(mock);
        portal.state.directory = vec![crate::client::services::users_service::normalize_user(
            BackendUser {
                id: "w-7".to_string(),
                name: "Suresh Yadav".to_string(),
                role: Some("field-worker".to_string()),
                department: Some("Jal Kal Vibhag".to_string()),
                ..Default::default()
            },
        )];
        // pick the resolved seed report: assignment must still move it to in-progress
        let report_id = portal
            .state
            .reports
            .iter()
            .find(|r| r.status == ReportStatus::Resolved)
            .map(|r| r.id.clone())
            .expect("seed data contains a resolved report");

        portal
            .dispatch(Action::AssignWorker {
                report_id: report_id.clone(),
                worker_id: "w-7".to_string(),
            })
            .await;

        let report = portal.state.find_report(&report_id).unwrap();
        assert_eq!(report.status, ReportStatus::InProgress);
        assert_eq!(report.assigned_worker.as_deref(), Some("Suresh Yadav"));
        assert_eq!(report.assigned_department.as_deref(), Some("Jal Kal Vibhag"));
        assert_eq!(portal.state.notices.len(), 2);
    }

    #[tokio::test]
    async fn navigation_is_unconditional_but_view_is_gated() {
        let mock = MockBackend::default();
        let mut portal = Portal::new(mock);
        portal
            .dispatch(Action::Login { email: "asha@example.com".to_string(), password: "pw".to_string() })
            .await;

        portal.dispatch(Action::Navigate(Page::AdminDashboard)).await;
        assert_eq!(portal.state.page, Page::AdminDashboard);
        assert_eq!(portal.view(), View::Unauthorized(Page::AdminDashboard));

        portal.dispatch(Action::Back).await;
        assert_eq!(portal.state.page, Page::AdminDashboard.back_target());
    }

    #[tokio::test]
    async fn logout_clears_session_and_returns_to_login() {
        let mock = MockBackend::default();
        let mut portal = Portal::new(mock);
        portal
            .dispatch(Action::Login { email: "asha@example.com".to_string(), password: "pw".to_string() })
            .await;
        assert!(portal.state.user.is_some());

        portal.dispatch(Action::Logout).await;
        assert!(portal.state.user.is_none());
        assert!(portal.state.session_token.is_none());
        assert_eq!(portal.state.page, Page::Login);
    }
}
