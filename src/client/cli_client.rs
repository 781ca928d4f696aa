//! Interactive command-line front end for the portal core. Each command is
//! translated into a dispatched `Action`; the selected view and any new
//! notices are printed after every dispatch.

use std::io::Write as _;

use tokio::io::{stdin, AsyncBufReadExt, BufReader};

use crate::client::models::actions::Action;
use crate::client::models::notice::NoticeLevel;
use crate::client::portal::Portal;
use crate::client::router::{Page, View};
use crate::client::services::gateway::{Backend, HttpGateway};
use crate::client::utils::session_store;
use crate::common::config::ClientConfig;
use crate::common::models::{
    ImageAttachment, ProfileUpdate, RegisterData, ReportDraft, ReportPatch, ReportStatus, Role,
};

/// Tiny built-in JPEG stub so `/attach demo` works without a file on disk.
const DEMO_IMAGE: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    let mut gateway = HttpGateway::new(&config)?;
    if let Some(token) = session_store::load_session_token() {
        log::info!("[CLI] found saved session token (redacted)");
        gateway.set_token(Some(token));
    }
    let mut portal = Portal::new(gateway);
    let mut attachment: Option<ImageAttachment> = None;

    println!("VIKSIT KANPUR portal — type /help for commands");
    let mut input = BufReader::new(stdin());
    let mut line = String::new();
    loop {
        line.clear();
        print!("> ");
        std::io::stdout().flush()?;
        let n = input.read_line(&mut line).await?;
        if n == 0 {
            break;
        }
        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }
        let mut parts = cmd.split_whitespace();
        let command = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();

        let notices_before = portal.state.notices.len();
        match command {
            "/help" => {
                print_help();
                continue;
            }
            "/quit" => {
                println!("[CLI] bye");
                break;
            }
            "/login" if args.len() == 2 => {
                portal
                    .dispatch(Action::Login {
                        email: args[0].to_string(),
                        password: args[1].to_string(),
                    })
                    .await;
            }
            "/admin_login" if args.len() >= 3 => {
                let Some(role) = Role::parse(args[2]).filter(|r| r.is_staff()) else {
                    println!(
                        "[CLI] role must be field-worker, department-head or district-magistrate"
                    );
                    continue;
                };
                portal
                    .dispatch(Action::AdminLogin {
                        email: args[0].to_string(),
                        password: args[1].to_string(),
                        requested_role: role,
                        department: args.get(3).map(|d| d.to_string()),
                    })
                    .await;
            }
            "/register" if args.len() >= 3 => {
                portal
                    .dispatch(Action::Register(RegisterData {
                        name: args[0].to_string(),
                        email: args[1].to_string(),
                        password: args[2].to_string(),
                        phone: args.get(3).map(|p| p.to_string()),
                        ..Default::default()
                    }))
                    .await;
            }
            "/logout" => portal.dispatch(Action::Logout).await,
            "/open" if args.len() == 1 => {
                let Some(page) = Page::from_slug(args[0]) else {
                    println!("[CLI] unknown page '{}'", args[0]);
                    continue;
                };
                portal.dispatch(Action::Navigate(page)).await;
            }
            "/back" => portal.dispatch(Action::Back).await,
            "/attach" if args.len() == 1 => {
                attachment = match load_attachment(args[0]) {
                    Ok(att) => {
                        println!("[CLI] attached {} bytes ({})", att.bytes.len(), att.mimetype);
                        Some(att)
                    }
                    Err(e) => {
                        println!("[CLI] could not attach: {e}");
                        None
                    }
                };
                continue;
            }
            "/submit" if !args.is_empty() => {
                let joined = args.join(" ");
                let mut fields = joined.splitn(3, '|').map(str::trim);
                let category = fields.next().unwrap_or("").to_string();
                let location = fields.next().unwrap_or("").to_string();
                let description = fields.next().unwrap_or("").to_string();
                let draft = ReportDraft {
                    description,
                    categories: if category.is_empty() { vec![] } else { vec![category] },
                    category: None,
                    location,
                };
                portal
                    .dispatch(Action::SubmitReport { draft, image: attachment.take() })
                    .await;
            }
            "/reports" => portal.dispatch(Action::LoadUserReports).await,
            "/all_reports" => portal.dispatch(Action::LoadAllReports).await,
            "/users" => portal.dispatch(Action::LoadAllUsers).await,
            "/assign" if args.len() == 2 => {
                portal
                    .dispatch(Action::AssignWorker {
                        report_id: args[0].to_string(),
                        worker_id: args[1].to_string(),
                    })
                    .await;
            }
            "/status" if args.len() == 2 => {
                let Some(status) = ReportStatus::parse(args[1]) else {
                    println!("[CLI] status must be pending, in-progress or resolved");
                    continue;
                };
                portal
                    .dispatch(Action::UpdateReport {
                        report_id: args[0].to_string(),
                        patch: ReportPatch { status: Some(status), ..Default::default() },
                    })
                    .await;
            }
            "/profile" if !args.is_empty() => {
                portal
                    .dispatch(Action::UpdateProfile(ProfileUpdate {
                        name: Some(args.join(" ")),
                        ..Default::default()
                    }))
                    .await;
            }
            "/whoami" => {
                match &portal.state.user {
                    Some(u) => println!(
                        "[CLI] {} <{}> role={} department={}",
                        u.name,
                        u.email,
                        u.effective_role(),
                        u.department.as_deref().unwrap_or("-")
                    ),
                    None => println!("[CLI] not signed in"),
                }
                continue;
            }
            "/view" => {
                render(&portal);
                continue;
            }
            _ => {
                println!("[CLI] unknown or malformed command, see /help");
                continue;
            }
        }

        for notice in &portal.state.notices[notices_before.min(portal.state.notices.len())..] {
            let tag = match notice.level {
                NoticeLevel::Info => "INFO",
                NoticeLevel::Success => "OK",
                NoticeLevel::Error => "ERR",
            };
            println!("[{tag}] {}", notice.message);
        }
        render(&portal);
    }
    Ok(())
}

fn load_attachment(arg: &str) -> anyhow::Result<ImageAttachment> {
    if arg == "demo" {
        return Ok(ImageAttachment {
            bytes: DEMO_IMAGE.to_vec(),
            mimetype: "image/jpeg".to_string(),
        });
    }
    let bytes = std::fs::read(arg)?;
    let mimetype = match arg.rsplit('.').next().unwrap_or("").to_lowercase().as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "image/jpeg",
    };
    Ok(ImageAttachment { bytes, mimetype: mimetype.to_string() })
}

fn render<G: Backend>(portal: &Portal<G>) {
    match portal.view() {
        View::Unauthorized(page) => {
            println!("-- {page} --");
            println!("Access denied: your account cannot view this screen.");
        }
        View::Screen(page) => {
            println!("-- {page} --");
            render_screen(portal, page);
        }
    }
}

fn render_screen<G: Backend>(portal: &Portal<G>, page: Page) {
    let state = &portal.state;
    match page {
        Page::Login => println!("Sign in with /login or /admin_login, or /register"),
        Page::Register => println!("Create an account: /register <name> <email> <password>"),
        Page::Dashboard | Page::AdminDashboard => {
            let counts = state.status_counts();
            println!(
                "{} reports | pending {} | in-progress {} | resolved {}",
                state.reports.len(),
                counts.pending,
                counts.in_progress,
                counts.resolved
            );
            for report in state.reports.iter().take(5) {
                println!(
                    "  {}  [{}]  {}  ({})",
                    report.id,
                    report.status,
                    report.category,
                    report.assigned_department.as_deref().unwrap_or("unassigned")
                );
            }
        }
        Page::FieldWorkerDashboard => {
            let worker = state.current_user_name();
            let mut any = false;
            for report in state.reports_for_worker(&worker) {
                any = true;
                println!("  {}  [{}]  {}", report.id, report.status, report.location);
            }
            if !any {
                println!("no reports assigned to {worker}");
            }
        }
        Page::DepartmentHeadDashboard => {
            let department = state
                .user
                .as_ref()
                .and_then(|u| u.department.clone())
                .unwrap_or_default();
            let mut any = false;
            for report in state.reports_for_department(&department) {
                any = true;
                println!("  {}  [{}]  {}  priority={}", report.id, report.status, report.category,
                    report.priority.map(|p| p.as_str()).unwrap_or("-"));
            }
            if !any {
                println!("no reports routed to {department}");
            }
        }
        Page::History => {
            for report in &state.reports {
                println!("  {}  submitted {}", report.id, report.submitted_at.format("%Y-%m-%d"));
                for entry in &report.status_history {
                    println!(
                        "    {}  {}  by {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M"),
                        entry.status,
                        entry.updated_by
                    );
                }
            }
        }
        Page::MapView => {
            for report in &state.reports {
                if let Some(tag) = &report.geotag {
                    println!(
                        "  {}  {:.4},{:.4}  {}",
                        report.id, tag.latitude, tag.longitude, report.category
                    );
                }
            }
        }
        Page::Profile
        | Page::FieldWorkerProfile
        | Page::DepartmentHeadProfile
        | Page::AdminProfile => match &state.user {
            Some(u) => println!(
                "{} <{}> phone={} address={}",
                u.name,
                u.email,
                u.phone.as_deref().unwrap_or("-"),
                u.address.as_deref().unwrap_or("-")
            ),
            None => println!("not signed in"),
        },
        Page::Notifications
        | Page::FieldWorkerNotifications
        | Page::DepartmentHeadNotifications
        | Page::AdminNotifications => {
            if state.notices.is_empty() {
                println!("no notifications");
            }
            for notice in &state.notices {
                println!("  {}", notice.message);
            }
        }
        Page::HelpCenter => println!("Helpline 1533 | Nagar Nigam Kanpur | /help for commands"),
        Page::AdminAnalytics => {
            let counts = state.status_counts();
            let total = state.reports.len().max(1);
            println!(
                "resolution rate {:.0}% | high-priority {}",
                counts.resolved as f64 * 100.0 / total as f64,
                state
                    .reports
                    .iter()
                    .filter(|r| r.priority == Some(crate::common::models::Priority::High))
                    .count()
            );
        }
        Page::AdminUserManagement => {
            for user in &state.directory {
                println!(
                    "  {}  {}  role={}  department={}",
                    user.id,
                    user.name,
                    user.effective_role(),
                    user.department.as_deref().unwrap_or("-")
                );
            }
        }
        Page::SubmitReport => println!(
            "Attach a photo with /attach, then /submit <category> | <location> | <description>"
        ),
    }
}

fn print_help() {
    println!(
        "commands:\n  \
         /register <name> <email> <password> [phone]\n  \
         /login <email> <password>\n  \
         /admin_login <email> <password> <role> [department]\n  \
         /logout\n  \
         /open <page-slug>    /back    /view    /whoami\n  \
         /attach <path|demo>\n  \
         /submit <category> | <location> | <description>\n  \
         /reports    /all_reports    /users\n  \
         /assign <report-id> <worker-id>\n  \
         /status <report-id> <pending|in-progress|resolved>\n  \
         /profile <new display name>\n  \
         /quit"
    );
}
