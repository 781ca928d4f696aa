//! HTTP gateway to the grievance backend. The wire format is owned by the
//! backend; everything here deserializes leniently (numbers arriving as
//! strings, absent arrays) so one malformed record cannot sink a whole
//! fetch. The `Backend` trait is the seam the rest of the client talks to.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::common::config::ClientConfig;
use crate::common::models::{ImageAttachment, ProfileUpdate, RegisterData};

fn de_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

fn de_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendUser {
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub auth_method: Option<String>,
    #[serde(default)]
    pub auth_number: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendProblem {
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub id: String,
    #[serde(default)]
    pub problem_categories: Vec<String>,
    #[serde(default)]
    pub others_text: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_image_base64: Option<String>,
    #[serde(default)]
    pub user_image_mimetype: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub assigned_department: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_string")]
    pub assigned_worker_id: String,
    #[serde(default)]
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: BackendUser,
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ProblemsResponse {
    #[serde(default)]
    problems: Vec<BackendProblem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<BackendUser>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProblemResponse {
    problem: BackendProblem,
}

#[derive(Debug, Clone, Deserialize)]
struct UserResponse {
    user: BackendUser,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitPayload {
    pub description: String,
    pub problem_categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub others_text: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub location: String,
    pub user_image_base64: String,
    pub user_image_mimetype: String,
    pub priority: String,
}

/// The backend contract consumed by the portal. `HttpGateway` is the real
/// thing; tests substitute an in-memory implementation.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse>;
    async fn admin_login(&self, email: &str, password: &str) -> Result<AuthResponse>;
    async fn register(&self, data: &RegisterData) -> Result<AuthResponse>;
    async fn get_user_problems(&self, user_id: &str) -> Result<Vec<BackendProblem>>;
    async fn get_all_problems(&self) -> Result<Vec<BackendProblem>>;
    async fn get_all_users(&self) -> Result<Vec<BackendUser>>;
    async fn submit_problem(&self, payload: &SubmitPayload) -> Result<BackendProblem>;
    async fn update_user(&self, user_id: &str, update: &ProfileUpdate) -> Result<BackendUser>;
    /// Best-effort category detection; callers treat failure as "none".
    async fn analyze_image(&self, image: &ImageAttachment) -> Result<Vec<String>>;
    /// Attach (or drop) the bearer token sent with subsequent calls.
    fn set_token(&mut self, token: Option<String>);
}

pub struct HttpGateway {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut base = config.api_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .with_context(|| format!("invalid API base url: {}", config.api_base_url))?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(HttpGateway { http, base, token: None })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("invalid endpoint path: {path}"))
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let mut request = self.http.request(method, url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = detail.trim();
            if detail.is_empty() {
                return Err(anyhow!("backend returned {status}"));
            }
            return Err(anyhow!("backend returned {status}: {detail}"));
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("unexpected response shape from {url}"))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_json(Method::GET, path, None).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        self.request_json(Method::POST, path, Some(body)).await
    }
}

#[async_trait]
impl Backend for HttpGateway {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.post_json(
            "auth/login",
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn admin_login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        self.post_json(
            "auth/admin-login",
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn register(&self, data: &RegisterData) -> Result<AuthResponse> {
        self.post_json(
            "auth/register",
            &serde_json::json!({
                "name": data.name,
                "email": data.email,
                "phone": data.phone,
                "password": data.password,
                "auth_method": data.auth_method,
                "auth_number": data.auth_number,
                "address": data.address,
            }),
        )
        .await
    }

    async fn get_user_problems(&self, user_id: &str) -> Result<Vec<BackendProblem>> {
        let response: ProblemsResponse =
            self.get_json(&format!("problems/user/{user_id}")).await?;
        Ok(response.problems)
    }

    async fn get_all_problems(&self) -> Result<Vec<BackendProblem>> {
        let response: ProblemsResponse = self.get_json("problems").await?;
        Ok(response.problems)
    }

    async fn get_all_users(&self) -> Result<Vec<BackendUser>> {
        let response: UsersResponse = self.get_json("users").await?;
        Ok(response.users)
    }

    async fn submit_problem(&self, payload: &SubmitPayload) -> Result<BackendProblem> {
        let body = serde_json::to_value(payload).context("failed to encode submission")?;
        let response: ProblemResponse = self.post_json("problems", &body).await?;
        Ok(response.problem)
    }

    async fn update_user(&self, user_id: &str, update: &ProfileUpdate) -> Result<BackendUser> {
        let body = serde_json::to_value(update).context("failed to encode profile update")?;
        let response: UserResponse = self
            .request_json(Method::PUT, &format!("users/{user_id}"), Some(&body))
            .await?;
        Ok(response.user)
    }

    async fn analyze_image(&self, image: &ImageAttachment) -> Result<Vec<String>> {
        let response: AnalyzeResponse = self
            .post_json(
                "analyze-image",
                &serde_json::json!({
                    "image_base64": BASE64.encode(&image.bytes),
                    "mimetype": image.mimetype,
                }),
            )
            .await?;
        Ok(response.categories)
    }

    fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_parses_string_coordinates() {
        let raw = r#"{
            "id": 42,
            "problem_categories": ["Water Issues / जल समस्या"],
            "latitude": "26.4499",
            "longitude": 80.3319,
            "status": "not completed"
        }"#;
        let problem: BackendProblem = serde_json::from_str(raw).unwrap();
        assert_eq!(problem.id, "42");
        assert_eq!(problem.latitude, Some(26.4499));
        assert_eq!(problem.longitude, Some(80.3319));
        assert_eq!(problem.status.as_deref(), Some("not completed"));
    }

    #[test]
    fn problem_tolerates_missing_fields() {
        let problem: BackendProblem = serde_json::from_str("{}").unwrap();
        assert!(problem.id.is_empty());
        assert!(problem.problem_categories.is_empty());
        assert_eq!(problem.latitude, None);
        assert_eq!(problem.user_image_base64, None);
    }

    #[test]
    fn problem_ignores_garbage_coordinates() {
        let raw = r#"{ "latitude": "not-a-number", "longitude": null }"#;
        let problem: BackendProblem = serde_json::from_str(raw).unwrap();
        assert_eq!(problem.latitude, None);
        assert_eq!(problem.longitude, None);
    }

    #[test]
    fn user_id_accepts_numbers() {
        let user: BackendUser = serde_json::from_str(r#"{ "id": 7, "name": "A" }"#).unwrap();
        assert_eq!(user.id, "7");
    }
}
