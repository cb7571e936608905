use serde::{Deserialize, Serialize};

use super::state::{map_status, CommitState};
use crate::cloudbuild::BuildEvent;

/// Literal sent in `type` and `key`
const PLACEHOLDER: &str = "string";

/// Body of `POST .../commit/{node}/statuses/build`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatusUpdate {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    pub description: String,
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refname: Option<String>,
    pub state: CommitState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub uuid: String,
}

impl CommitStatusUpdate {
    pub fn from_build(event: &BuildEvent, name: &str) -> Self {
        Self {
            kind: PLACEHOLDER.to_string(),
            created_on: event.create_time.clone(),
            description: format!("Status: {}", event.status),
            key: PLACEHOLDER.to_string(),
            name: name.to_string(),
            refname: event
                .build_trigger_id
                .as_ref()
                .map(|id| format!("buildTriggerId: {}", id)),
            state: map_status(&event.status),
            updated_on: event.finish_time.clone(),
            url: event.log_url.clone(),
            uuid: event.id.clone(),
        }
    }
}
