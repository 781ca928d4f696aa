use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::client::services::gateway::{Backend, BackendUser};
use crate::common::models::{Role, User};

/// Turn a backend user record into the client model. Unknown role strings
/// become "no role" (treated as citizen), never an error.
pub fn normalize_user(raw: BackendUser) -> User {
    let id = if raw.id.is_empty() { Uuid::new_v4().to_string() } else { raw.id };
    User {
        id,
        name: raw.name,
        email: raw.email,
        phone: raw.phone,
        auth_method: raw.auth_method,
        auth_number: raw.auth_number,
        role: raw.role.as_deref().and_then(Role::parse),
        department: raw.department,
        address: raw.address,
        avatar: raw.avatar,
    }
}

/// Server response merged over the fields we already hold: the server wins
/// wherever it answered, existing values fill the gaps.
pub fn merge_user(existing: &User, fresh: User) -> User {
    User {
        id: if fresh.id.is_empty() { existing.id.clone() } else { fresh.id },
        name: if fresh.name.is_empty() { existing.name.clone() } else { fresh.name },
        email: if fresh.email.is_empty() { existing.email.clone() } else { fresh.email },
        phone: fresh.phone.or_else(|| existing.phone.clone()),
        auth_method: fresh.auth_method.or_else(|| existing.auth_method.clone()),
        auth_number: fresh.auth_number.or_else(|| existing.auth_number.clone()),
        role: fresh.role.or(existing.role),
        department: fresh.department.or_else(|| existing.department.clone()),
        address: fresh.address.or_else(|| existing.address.clone()),
        avatar: fresh.avatar.or_else(|| existing.avatar.clone()),
    }
}

#[derive(Debug, Default)]
pub struct UsersService;

impl UsersService {
    /// Fetch the full user directory (staff screens and worker assignment).
    pub async fn load_all<G: Backend>(gateway: &Arc<Mutex<G>>) -> Result<Vec<User>> {
        let guard = gateway.lock().await;
        let users = guard.get_all_users().await?;
        Ok(users.into_iter().map(normalize_user).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_maps_known_roles_and_drops_unknown() {
        let raw = BackendUser {
            id: "w-9".to_string(),
            name: "Suresh Yadav".to_string(),
            role: Some("field-worker".to_string()),
            department: Some("Jal Kal Vibhag".to_string()),
            ..Default::default()
        };
        let user = normalize_user(raw);
        assert_eq!(user.role, Some(Role::FieldWorker));

        let odd = BackendUser { role: Some("galactic-overlord".to_string()), ..Default::default() };
        assert_eq!(normalize_user(odd).role, None);
    }

    #[test]
    fn merge_prefers_fresh_fields_and_keeps_existing_gaps() {
        let existing = User {
            id: "u-1".to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: Some("9876500000".to_string()),
            auth_method: Some("email".to_string()),
            auth_number: None,
            role: None,
            department: None,
            address: Some("Swaroop Nagar".to_string()),
            avatar: None,
        };
        let fresh = User {
            id: String::new(),
            name: "Asha Verma".to_string(),
            email: String::new(),
            phone: None,
            auth_method: None,
            auth_number: None,
            role: None,
            department: None,
            address: None,
            avatar: Some("https://cdn.example/avatar.png".to_string()),
        };
        let merged = merge_user(&existing, fresh);
        assert_eq!(merged.id, "u-1");
        assert_eq!(merged.name, "Asha Verma");
        assert_eq!(merged.email, "asha@example.com");
        assert_eq!(merged.phone.as_deref(), Some("9876500000"));
        assert_eq!(merged.address.as_deref(), Some("Swaroop Nagar"));
        assert_eq!(merged.avatar.as_deref(), Some("https://cdn.example/avatar.png"));
    }
}
