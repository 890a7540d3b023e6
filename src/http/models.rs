use serde::{Deserialize, Serialize};

use crate::catalog::UserRecord;
use crate::tabular::{parse_filters, ChartSpec, ColumnProfile, InvalidFilter, QuerySpec, SortOrder};

/// Request body for POST /auth/register
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Request body for POST /auth/login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body for POST /auth/register and POST /auth/login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Public view of an account. The password hash never leaves the catalog.
#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub role: String,
}

impl From<UserRecord> for UserInfoResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Request body for PUT /auth/me
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Request body for POST /auth/change-password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Single account entry in the admin listing
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
}

/// Response body for GET /auth/users
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserSummary>,
}

/// Query parameters for GET /datasets/{id}/view
#[derive(Debug, Deserialize)]
pub struct ViewParams {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub sort_column: Option<String>,
    pub sort_order: Option<String>,
    pub filters: Option<String>,
    pub search: Option<String>,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

impl ViewParams {
    /// Decodes the JSON `filters` parameter and assembles the query spec.
    pub fn into_query_spec(self) -> Result<QuerySpec, InvalidFilter> {
        let filters = match self.filters.as_deref() {
            Some(raw) => parse_filters(raw)?,
            None => Vec::new(),
        };
        Ok(QuerySpec {
            page: self.page,
            limit: self.limit,
            sort_column: self.sort_column,
            sort_order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            filters,
            search: self.search.filter(|s| !s.is_empty()),
        })
    }
}

/// Response body for GET /datasets/{id}/view
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub data: Vec<serde_json::Map<String, serde_json::Value>>,
    pub total: usize,
    pub columns: Vec<ColumnProfile>,
}

/// Query parameters for GET /datasets/{id}/charts
#[derive(Debug, Deserialize)]
pub struct ChartParams {
    #[serde(default = "default_chart_type")]
    pub chart_type: String,
    pub group_by: Option<String>,
}

fn default_chart_type() -> String {
    "bar".to_string()
}

impl From<ChartParams> for ChartSpec {
    fn from(params: ChartParams) -> Self {
        Self {
            chart_type: params.chart_type,
            group_by: params.group_by,
        }
    }
}

/// Response body for POST /datasets/upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: String,
    pub message: String,
}
