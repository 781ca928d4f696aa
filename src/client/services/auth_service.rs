use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::client::services::gateway::Backend;
use crate::client::services::users_service::normalize_user;
use crate::common::models::{ProfileUpdate, RegisterData, User};

/// A successfully authenticated session: the normalized user plus the
/// bearer token the gateway will attach from now on.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Default)]
pub struct AuthService;

impl AuthService {
    pub async fn login<G: Backend>(
        gateway: &Arc<Mutex<G>>,
        email: &str,
        password: &str,
    ) -> Result<AuthSession> {
        let guard = gateway.lock().await;
        let response = guard.login(email, password).await?;
        Ok(AuthSession { user: normalize_user(response.user), token: response.token })
    }

    pub async fn admin_login<G: Backend>(
        gateway: &Arc<Mutex<G>>,
        email: &str,
        password: &str,
    ) -> Result<AuthSession> {
        let guard = gateway.lock().await;
        let response = guard.admin_login(email, password).await?;
        Ok(AuthSession { user: normalize_user(response.user), token: response.token })
    }

    pub async fn register<G: Backend>(
        gateway: &Arc<Mutex<G>>,
        data: &RegisterData,
    ) -> Result<AuthSession> {
        let guard = gateway.lock().await;
        let response = guard.register(data).await?;
        Ok(AuthSession { user: normalize_user(response.user), token: response.token })
    }

    pub async fn update_profile<G: Backend>(
        gateway: &Arc<Mutex<G>>,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<User> {
        let guard = gateway.lock().await;
        let response = guard.update_user(user_id, update).await?;
        Ok(normalize_user(response))
    }
}
