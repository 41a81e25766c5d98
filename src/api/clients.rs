// Client (candidate profile) listings consumed by the list and detail screens
use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{format, Page, PortalClient};
use crate::error::PortalResult;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageRef {
    pub id: i64,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub client_id: i64,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub member_id: Option<i64>,
    #[serde(default)]
    pub member_name: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub current_job: Option<String>,
    #[serde(default)]
    pub client_image: Option<ImageRef>,
    #[serde(default)]
    pub member_image: Option<ImageRef>,
}

/// Candidate profile detail. Only the fields the portal core reads are typed;
/// the rest is carried through for display.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetail {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub profile_images: Vec<ImageRef>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PortalClient {
    /// One page of the client listing. `page` is zero-based.
    pub async fn list_clients(&self, page: u32) -> PortalResult<Page<ClientSummary>> {
        let builder = self
            .request(Method::GET, "client")?
            .query(&[("page", page)]);
        let response = self.send(builder).await?;
        let body = response.text().await?;
        format::decode_page(serde_json::from_str(&body)?)
    }

    pub async fn client_detail(&self, client_id: &str) -> PortalResult<ClientDetail> {
        self.get_json(&format!("client/{client_id}")).await
    }
}
