// Member profile endpoints, including the NONE -> PENDING completion step
use std::collections::BTreeMap;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ImageRef, PortalClient};
use crate::error::{PortalError, PortalResult};
use crate::routes::Destination;
use crate::session::{ApprovalStatus, Session};

const PASSWORD_SPECIALS: &str = "@$!%*#?&";

/// Additional information a member submits after first login.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCompletion {
    /// Optional new password; empty keeps the current one.
    pub pwd: String,
    pub name: String,
    pub phone_number: String,
    pub gender: String,
    pub company: String,
}

impl ProfileCompletion {
    /// Submission gating. Returns every offending field at once.
    pub fn validate(&self) -> PortalResult<()> {
        let mut fields = BTreeMap::new();

        for (name, value) in [
            ("name", &self.name),
            ("phoneNumber", &self.phone_number),
            ("gender", &self.gender),
            ("company", &self.company),
        ] {
            if value.trim().is_empty() {
                fields.insert(name.to_string(), "required".to_string());
            }
        }

        if !self.pwd.is_empty() && !password_is_acceptable(&self.pwd) {
            fields.insert(
                "pwd".to_string(),
                format!(
                    "8-20 characters of lowercase letters, digits and {PASSWORD_SPECIALS}, \
                     with at least one of each"
                ),
            );
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(PortalError::validation(fields))
        }
    }
}

fn password_is_acceptable(pwd: &str) -> bool {
    let len = pwd.chars().count();
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || PASSWORD_SPECIALS.contains(c);

    (8..=20).contains(&len)
        && pwd.chars().all(allowed)
        && pwd.chars().any(|c| c.is_ascii_lowercase())
        && pwd.chars().any(|c| c.is_ascii_digit())
        && pwd.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

impl PortalClient {
    fn require_session(&self) -> PortalResult<Session> {
        self.context().session()?.ok_or(PortalError::Anonymous)
    }

    pub async fn my_profile(&self) -> PortalResult<MemberProfile> {
        let session = self.require_session()?;
        self.get_json(&format!("member/detail/me?memberId={}", session.member_id))
            .await
    }

    /// Submit the additional-information step.
    ///
    /// Only a 2xx response moves the member from NONE to PENDING; any failure
    /// leaves the stored status as it was.
    pub async fn complete_profile(&self, form: &ProfileCompletion) -> PortalResult<Session> {
        let session = self.require_session()?;
        form.validate()?;

        let dto = serde_json::to_string(form)?;
        let multipart = Form::new().part(
            "memberDetailRequestDto",
            Part::text(dto).mime_str("application/json")?,
        );

        let builder = self
            .request(Method::POST, &format!("member/detail/{}", session.member_id))?
            .multipart(multipart);
        self.send(builder).await?;

        if !session.approval_status.can_advance_to(ApprovalStatus::Pending) {
            tracing::debug!(
                "Profile updated for member {} (status stays {})",
                session.member_id,
                session.approval_status
            );
            return Ok(session);
        }

        let ctx = self.context();
        // the session may have been replaced or cleared while the request was in flight
        match ctx.session()? {
            Some(current) if current.token == session.token => {
                let advanced = current.with_status(ApprovalStatus::Pending);
                ctx.store().write(&advanced)?;
                tracing::info!("Member {} submitted profile, now PENDING", advanced.member_id);
                ctx.navigator().navigate(Destination::PendingApproval);
                Ok(advanced)
            }
            _ => Err(PortalError::Anonymous),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ProfileCompletion {
        ProfileCompletion {
            pwd: String::new(),
            name: "Kim".into(),
            phone_number: "010-1234-5678".into(),
            gender: "FEMALE".into(),
            company: "Acme".into(),
        }
    }

    #[test]
    fn complete_form_passes() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn blank_required_fields_are_all_reported() {
        let form = ProfileCompletion {
            name: "  ".into(),
            company: String::new(),
            ..complete()
        };
        match form.validate() {
            Err(PortalError::Validation { fields }) => {
                assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["company", "name"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn password_rules() {
        assert!(password_is_acceptable("abcd123!"));
        assert!(!password_is_acceptable("abcd1234"));
        assert!(!password_is_acceptable("Abcd123!"));
        assert!(!password_is_acceptable("a1!"));
        assert!(!password_is_acceptable("abcdefghij1234567890!"));
    }

    #[test]
    fn serializes_backend_field_names() {
        let value = serde_json::to_value(complete()).unwrap();
        assert_eq!(value["phoneNumber"], "010-1234-5678");
        assert_eq!(value["pwd"], "");
    }
}
