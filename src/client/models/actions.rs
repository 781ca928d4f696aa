use crate::client::router::Page;
use crate::common::models::{
    ImageAttachment, ProfileUpdate, RegisterData, ReportDraft, ReportPatch, Role,
};

/// Every mutation of portal state flows through one of these variants via
/// `Portal::dispatch`. Screens build actions; they never write state.
#[derive(Debug, Clone)]
pub enum Action {
    Login {
        email: String,
        password: String,
    },
    AdminLogin {
        email: String,
        password: String,
        /// Role selected on the staff login form. The backend's answer is
        /// authoritative; this only fills a missing field in the response.
        requested_role: Role,
        department: Option<String>,
    },
    Register(RegisterData),
    UpdateProfile(ProfileUpdate),
    Logout,
    Navigate(Page),
    Back,
    LoadUserReports,
    LoadAllReports,
    LoadAllUsers,
    SubmitReport {
        draft: ReportDraft,
        image: Option<ImageAttachment>,
    },
    UpdateReport {
        report_id: String,
        patch: ReportPatch,
    },
    AssignWorker {
        report_id: String,
        worker_id: String,
    },
    ClearNotices,
}
