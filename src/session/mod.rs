// Session model shared by every protected screen
pub mod context;
pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use context::SessionContext;
pub use store::{FileBackend, KeyValueBackend, MemoryBackend, SessionKey, TokenStore};

/// Opaque bearer credential. Never printed in full.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // keep a short prefix so two tokens can be told apart in debug output
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "BearerToken({prefix}…)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "MEMBER",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    /// Accepts both the bare and the `ROLE_` prefixed forms the backend emits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(&upper) {
            "MEMBER" | "USER" => Ok(Role::Member),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("unknown role '{s}'")),
        }
    }
}

/// Staff-controlled approval state of a member.
///
/// `None` means the member has not yet submitted the additional-information
/// step after first login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApprovalStatus {
    None,
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::None => "NONE",
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }

    /// Transitions the client itself may perform. Staff decisions arrive only
    /// through a fresh session.
    pub fn can_advance_to(&self, next: ApprovalStatus) -> bool {
        matches!(
            (self, next),
            (ApprovalStatus::None, ApprovalStatus::Pending)
        )
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(ApprovalStatus::None),
            "PENDING" => Ok(ApprovalStatus::Pending),
            "APPROVED" => Ok(ApprovalStatus::Approved),
            "REJECTED" => Ok(ApprovalStatus::Rejected),
            _ => Err(format!("unknown approval status '{s}'")),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated identity held client-side. All four fields exist together or
/// not at all; "anonymous" is represented as `Option<Session>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: BearerToken,
    pub member_id: String,
    pub role: Role,
    pub approval_status: ApprovalStatus,
}

impl Session {
    pub fn new(
        token: impl Into<String>,
        member_id: impl Into<String>,
        role: Role,
        approval_status: ApprovalStatus,
    ) -> Self {
        Self {
            token: BearerToken::new(token),
            member_id: member_id.into(),
            role,
            approval_status,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.member_id.clone(),
            is_admin: self.is_admin(),
        }
    }

    pub fn with_status(&self, approval_status: ApprovalStatus) -> Self {
        Self {
            approval_status,
            ..self.clone()
        }
    }
}

/// View of the session a screen may use for display and local decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub is_admin: bool,
}

/// Raw session fields as delivered by the backend, before validation.
///
/// Used for both the password-login response body and the OAuth redirect
/// query, which carry the same four keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionFields {
    pub token: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
}

impl SessionFields {
    /// Names of the fields that are absent or blank.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("token", &self.token),
            ("id", &self.id),
            ("role", &self.role),
            ("status", &self.status),
        ] {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                missing.push(name);
            }
        }
        missing
    }

    /// All-or-nothing conversion. Unparseable role or status count as missing.
    pub fn into_session(self) -> Result<Session, Vec<&'static str>> {
        let mut missing = self.missing();
        let role = self.role.as_deref().map(Role::from_str);
        let status = self.status.as_deref().map(ApprovalStatus::from_str);
        if matches!(role, Some(Err(_))) && !missing.contains(&"role") {
            missing.push("role");
        }
        if matches!(status, Some(Err(_))) && !missing.contains(&"status") {
            missing.push("status");
        }

        match (self.token, self.id, role, status) {
            (Some(token), Some(id), Some(Ok(role)), Some(Ok(status))) if missing.is_empty() => {
                Ok(Session::new(token, id, role, status))
            }
            _ => Err(missing),
        }
    }
}

/// Member ids arrive as JSON numbers from the login endpoint and as strings
/// from query parameters.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
