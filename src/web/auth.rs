use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::collector::{Collector, RunReport};
use crate::config::{Config, Permission};

/// Shared server state: the run pipeline and its latest result.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub collector: Arc<Collector>,
    /// Most recent completed run; `None` until the first refresh finishes.
    pub latest: Arc<RwLock<Option<RunReport>>>,
    /// Held for the duration of a run so refreshes never overlap.
    pub refreshing: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config, collector: Collector) -> Self {
        Self {
            config: Arc::new(config),
            collector: Arc::new(collector),
            latest: Arc::new(RwLock::new(None)),
            refreshing: Arc::new(Mutex::new(())),
        }
    }
}

/// Dashboard or script holding one of the configured API keys.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub name: String,
    pub permissions: HashSet<Permission>,
}

impl ApiClient {
    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn require(&self, permission: Permission) -> Result<(), PermissionError> {
        if self.can(permission) {
            Ok(())
        } else {
            log::warn!("api key '{}' lacks {}", self.name, permission);
            Err(PermissionError(permission))
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingKey,
    NotBearer,
    UnknownKey,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingKey => "Missing Authorization header",
            AuthError::NotBearer => "Expected 'Authorization: Bearer <api key>'",
            AuthError::UnknownKey => "Invalid API key",
        };
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}

/// The key is valid but not allowed to perform this operation.
#[derive(Debug)]
pub struct PermissionError(pub Permission);

impl IntoResponse for PermissionError {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "Insufficient permissions",
                "required": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for ApiClient {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingKey)?
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(AuthError::NotBearer)?;

        let Some(api_key) = state.config.find_api_key(key) else {
            log::warn!("rejected unknown API key on {}", parts.uri.path());
            return Err(AuthError::UnknownKey);
        };

        Ok(ApiClient {
            name: api_key.name.clone(),
            permissions: api_key.permissions.clone(),
        })
    }
}
