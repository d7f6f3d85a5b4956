// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Service HTTP Adapter
//!
//! The only module that performs network I/O. One [`IdentityClient`] wraps a
//! single `reqwest` client with a bounded timeout and turns each endpoint's
//! status/body combinations into typed results. There are no retries: every
//! failure surfaces immediately and callers decide what degrades.
//!
//! ## Endpoints
//!
//! | Call | Route |
//! |------|-------|
//! | `register` | `POST /auth/register/` |
//! | `login` | `POST /auth/login/` |
//! | `refresh` | `POST /auth/refresh/` |
//! | `current_user` | `GET /auth/user/` |
//! | `fetch_roles` | `GET /auth/roles/` |
//! | `fetch_bases` | `GET /bases/` |
//!
//! Raw wire shapes never escape this module; success bodies are converted to
//! domain types at the boundary.

use std::collections::BTreeMap;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::auth::roles::Role;
use crate::config::ClientConfig;
use crate::models::{
    Base, Principal, RegistrationRequest, RoleOption, Session, TokenPair, TokenRefresh,
};

/// Typed outcome of an Identity Service call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Login was rejected. Deliberately generic: the message never discloses
    /// whether the username exists.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The service rejected a registration payload; per-field messages are
    /// aggregated so a form can show all of them at once.
    #[error("registration rejected: {0}")]
    Rejected(FieldErrors),

    /// The presented token is no longer accepted (expired or revoked).
    #[error("identity service rejected the credentials")]
    Unauthorized,

    /// Authenticated but not allowed.
    #[error("identity service denied access")]
    Forbidden,

    /// Transport-level failure (DNS, refused connection, timeout). Strictly
    /// distinct from a rejection: the service never said no.
    #[error("identity service unreachable: {0}")]
    Network(String),

    /// Any other non-success status.
    #[error("identity service returned {status}: {detail}")]
    Unexpected { status: u16, detail: String },

    /// A success status with a body the engine cannot interpret.
    #[error("identity service response was invalid: {0}")]
    InvalidResponse(String),
}

/// Aggregated server-side validation failures, field name to messages.
///
/// Mirrors the service's rejection body; values arriving as single strings
/// are promoted to one-element lists, and a non-object body collapses to a
/// single `detail` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Build from a rejection body of any shape the service produces.
    pub fn from_value(body: &Value) -> Self {
        let mut map = BTreeMap::new();
        match body.as_object() {
            Some(object) => {
                for (field, messages) in object {
                    let collected = match messages {
                        Value::Array(items) => items.iter().map(message_text).collect(),
                        other => vec![message_text(other)],
                    };
                    map.insert(field.clone(), collected);
                }
            }
            None => {
                map.insert("detail".to_string(), vec![message_text(body)]);
            }
        }
        FieldErrors(map)
    }

    /// Messages attached to one field, if the service reported any.
    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Iterate fields in stable (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no detail provided");
        }
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {}", messages.join(", "))?;
            first = false;
        }
        Ok(())
    }
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Wire Shapes (private to this module)
// =============================================================================

#[derive(Debug, Deserialize)]
struct WireAuthResponse {
    user: WireUser,
    tokens: TokenPair,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: i64,
    username: String,
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    /// Nested role claim; `null` for accounts with no assignment.
    #[serde(default)]
    role: Option<WireRoleClaim>,
    #[serde(default)]
    assigned_base: Option<Base>,
}

#[derive(Debug, Deserialize)]
struct WireRoleClaim {
    role: Role,
}

fn principal_from_wire(user: WireUser) -> Result<Principal, ApiError> {
    let role = user.role.map(|claim| claim.role).ok_or_else(|| {
        ApiError::InvalidResponse(format!("user '{}' has no role assignment", user.username))
    })?;
    Ok(Principal {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        role,
        assigned_base: user.assigned_base,
    })
}

fn session_from_wire(body: WireAuthResponse) -> Result<Session, ApiError> {
    let principal = principal_from_wire(body.user)?;
    Ok(Session::issue(principal, body.tokens))
}

/// Read the role catalog out of a `{ "roles": [...] }` body. A missing or
/// null `roles` key is an empty catalog, not an error.
fn parse_role_catalog(body: &Value) -> Result<Vec<RoleOption>, ApiError> {
    match body.get("roles") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(list) => serde_json::from_value(list.clone())
            .map_err(|e| ApiError::InvalidResponse(format!("unrecognized role catalog: {e}"))),
    }
}

/// Read the base list from either shape the service produces: a bare JSON
/// array, or a paginated `{ "results": [...] }` envelope.
fn parse_base_list(body: &Value) -> Result<Vec<Base>, ApiError> {
    let entries = body
        .as_array()
        .or_else(|| body.get("results").and_then(Value::as_array))
        .ok_or_else(|| {
            ApiError::InvalidResponse("no organizational base list in response".to_string())
        })?;
    entries
        .iter()
        .map(|entry| serde_json::from_value(entry.clone()))
        .collect::<Result<Vec<Base>, _>>()
        .map_err(|e| ApiError::InvalidResponse(format!("unrecognized base entry: {e}")))
}

fn transport_error(path: &str, error: reqwest::Error) -> ApiError {
    ApiError::Network(format!("{path}: {error}"))
}

fn invalid_body(path: &str, error: reqwest::Error) -> ApiError {
    ApiError::InvalidResponse(format!("{path} returned invalid JSON: {error}"))
}

/// A 401/403 on a public endpoint is an anomaly worth flagging, not a normal
/// token-expiry outcome.
fn anomalous_rejection(path: &str, status: StatusCode) -> ApiError {
    warn!(%status, path, "unexpected auth rejection on a public endpoint");
    if status == StatusCode::FORBIDDEN {
        ApiError::Forbidden
    } else {
        ApiError::Unauthorized
    }
}

async fn unexpected_status(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let detail = response.text().await.unwrap_or_default();
    ApiError::Unexpected {
        status: status.as_u16(),
        detail,
    }
}

// =============================================================================
// Client
// =============================================================================

/// Typed adapter over the Identity Service endpoints.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    base_url: String,
    http: Client,
}

impl IdentityClient {
    /// Build a client from configuration. The configured timeout bounds
    /// every request this client ever makes.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.base_url.clone(),
            http,
        })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit a validated registration. Success establishes an account and
    /// returns its first session.
    pub async fn register(&self, request: RegistrationRequest) -> Result<Session, ApiError> {
        let path = "/auth/register/";
        debug!(username = %request.username, role = %request.role, "submitting registration");
        let response = self
            .http
            .post(self.url(path))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;

        let status = response.status();
        if status.is_success() {
            let body: WireAuthResponse =
                response.json().await.map_err(|e| invalid_body(path, e))?;
            return session_from_wire(body);
        }
        match status {
            StatusCode::BAD_REQUEST => {
                let body: Value = response.json().await.map_err(|e| invalid_body(path, e))?;
                Err(ApiError::Rejected(FieldErrors::from_value(&body)))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(anomalous_rejection(path, status))
            }
            _ => Err(unexpected_status(response).await),
        }
    }

    /// Exchange credentials for a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let path = "/auth/login/";
        let payload = json!({ "username": username, "password": password });
        let response = self
            .http
            .post(self.url(path))
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;

        let status = response.status();
        if status.is_success() {
            let body: WireAuthResponse =
                response.json().await.map_err(|e| invalid_body(path, e))?;
            return session_from_wire(body);
        }
        if status == StatusCode::UNAUTHORIZED {
            // Expected outcome for bad credentials; the body detail is
            // ignored so nothing about the account leaks.
            debug!(path, "login rejected");
            return Err(ApiError::InvalidCredentials);
        }
        if status == StatusCode::FORBIDDEN {
            return Err(anomalous_rejection(path, status));
        }
        Err(unexpected_status(response).await)
    }

    /// Trade a refresh token for a new access token (and possibly a rotated
    /// refresh token).
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenRefresh, ApiError> {
        let path = "/auth/refresh/";
        let payload = json!({ "refresh": refresh_token });
        let response = self
            .http
            .post(self.url(path))
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|e| invalid_body(path, e));
        }
        if status == StatusCode::UNAUTHORIZED {
            debug!(path, "refresh token rejected");
            return Err(ApiError::Unauthorized);
        }
        Err(unexpected_status(response).await)
    }

    /// Ask the service who the access token belongs to.
    pub async fn current_user(&self, access_token: &str) -> Result<Principal, ApiError> {
        let path = "/auth/user/";
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;

        let status = response.status();
        if status.is_success() {
            let body: WireUser = response.json().await.map_err(|e| invalid_body(path, e))?;
            return principal_from_wire(body);
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden),
            _ => Err(unexpected_status(response).await),
        }
    }

    /// Fetch the selectable role catalog (public endpoint).
    pub async fn fetch_roles(&self) -> Result<Vec<RoleOption>, ApiError> {
        let path = "/auth/roles/";
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;

        let status = response.status();
        if status.is_success() {
            let body: Value = response.json().await.map_err(|e| invalid_body(path, e))?;
            return parse_role_catalog(&body);
        }
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(anomalous_rejection(path, status))
            }
            _ => Err(unexpected_status(response).await),
        }
    }

    /// Fetch the organizational base directory (public endpoint).
    pub async fn fetch_bases(&self) -> Result<Vec<Base>, ApiError> {
        let path = "/bases/";
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;

        let status = response.status();
        if status.is_success() {
            let body: Value = response.json().await.map_err(|e| invalid_body(path, e))?;
            return parse_base_list(&body);
        }
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(anomalous_rejection(path, status))
            }
            _ => Err(unexpected_status(response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_promote_string_values_to_lists() {
        let errors = FieldErrors::from_value(&json!({
            "username": ["A user with that username already exists."],
            "role_code": "Invalid role code for the selected role."
        }));
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.messages("username"),
            Some(&["A user with that username already exists.".to_string()][..])
        );
        assert_eq!(errors.messages("role_code").map(<[String]>::len), Some(1));
    }

    #[test]
    fn field_errors_collapse_non_object_bodies_to_detail() {
        let errors = FieldErrors::from_value(&json!("registration closed"));
        assert_eq!(
            errors.messages("detail"),
            Some(&["registration closed".to_string()][..])
        );
    }

    #[test]
    fn field_errors_display_joins_fields_and_messages() {
        let errors = FieldErrors::from_value(&json!({
            "password": ["too common", "too short"],
            "email": ["invalid"]
        }));
        assert_eq!(
            errors.to_string(),
            "email: invalid; password: too common, too short"
        );
        assert_eq!(FieldErrors::default().to_string(), "no detail provided");
    }

    #[test]
    fn role_catalog_tolerates_missing_or_null_key() {
        assert_eq!(parse_role_catalog(&json!({})).unwrap(), Vec::new());
        assert_eq!(
            parse_role_catalog(&json!({ "roles": null })).unwrap(),
            Vec::new()
        );
    }

    #[test]
    fn role_catalog_parses_entries() {
        let catalog = parse_role_catalog(&json!({
            "roles": [
                { "value": "admin", "label": "Administrator" },
                { "value": "base_commander", "label": "Base Commander" }
            ]
        }))
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].value, "admin");
        assert_eq!(catalog[1].label, "Base Commander");
    }

    #[test]
    fn role_catalog_rejects_malformed_entries() {
        let result = parse_role_catalog(&json!({ "roles": [{ "value": 7 }] }));
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn base_list_accepts_bare_array() {
        let bases = parse_base_list(&json!([
            { "id": 1, "name": "Fort Meridian", "code": "FTM", "location": "north" }
        ]))
        .unwrap();
        assert_eq!(bases.len(), 1);
        assert_eq!(bases[0].code, "FTM");
    }

    #[test]
    fn base_list_accepts_results_envelope() {
        let bases = parse_base_list(&json!({
            "count": 2,
            "results": [
                { "id": 1, "name": "Fort Meridian", "code": "FTM" },
                { "id": 2, "name": "Camp Halcyon", "code": "CHN" }
            ]
        }))
        .unwrap();
        assert_eq!(bases.len(), 2);
        assert_eq!(bases[1].id, 2);
    }

    #[test]
    fn base_list_rejects_unrecognized_shapes() {
        let result = parse_base_list(&json!({ "bases": [] }));
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn wire_user_with_role_claim_becomes_principal() {
        let user: WireUser = serde_json::from_value(json!({
            "id": 7,
            "username": "jordan",
            "email": "jordan@example.mil",
            "first_name": "Jordan",
            "last_name": "Reyes",
            "role": { "role": "base_commander", "role_display": "Base Commander" },
            "assigned_base": { "id": 3, "name": "Fort Meridian", "code": "FTM" }
        }))
        .unwrap();
        let principal = principal_from_wire(user).unwrap();
        assert_eq!(principal.role, Role::BaseCommander);
        assert_eq!(principal.assigned_base.as_ref().map(|b| b.id), Some(3));
    }

    #[test]
    fn wire_user_without_role_is_invalid() {
        let user: WireUser = serde_json::from_value(json!({
            "id": 8,
            "username": "drifter",
            "email": "drifter@example.mil",
            "role": null
        }))
        .unwrap();
        let result = principal_from_wire(user);
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn auth_response_becomes_session() {
        let body: WireAuthResponse = serde_json::from_value(json!({
            "user": {
                "id": 9,
                "username": "sam",
                "email": "sam@example.mil",
                "role": { "role": "logistics_officer", "role_display": "Logistics Officer" },
                "assigned_base": null
            },
            "tokens": { "access": "acc-1", "refresh": "ref-1" }
        }))
        .unwrap();
        let session = session_from_wire(body).unwrap();
        assert_eq!(session.access_token, "acc-1");
        assert_eq!(session.role(), Role::LogisticsOfficer);
    }

    #[test]
    fn client_builds_from_config() {
        let config = ClientConfig::new("http://localhost:8000/api/v1/", "/tmp/ams").unwrap();
        let client = IdentityClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/v1");
        assert_eq!(client.url("/auth/login/"), "http://localhost:8000/api/v1/auth/login/");
    }
}
