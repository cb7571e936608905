use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Build resource published on the `cloud-builds` topic.
///
/// Only the fields the relay reads are modelled; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildEvent {
    /// Build ID
    pub id: String,
    /// Build status, e.g. "QUEUED", "WORKING", "SUCCESS", "FAILURE"
    pub status: String,
    /// RFC 3339 creation time
    #[serde(default)]
    pub create_time: Option<String>,
    /// RFC 3339 finish time, absent until the build ends
    #[serde(default)]
    pub finish_time: Option<String>,
    /// Console URL of the build log
    #[serde(default)]
    pub log_url: Option<String>,
    #[serde(default)]
    pub build_trigger_id: Option<String>,
    pub source_provenance: SourceProvenance,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceProvenance {
    pub resolved_repo_source: RepoSource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSource {
    /// Mirrored repository name, e.g. "bitbucket_acme_widgets"
    pub repo_name: String,
    pub commit_sha: String,
}

impl BuildEvent {
    pub fn repo_name(&self) -> &str {
        &self.source_provenance.resolved_repo_source.repo_name
    }

    pub fn commit_sha(&self) -> &str {
        &self.source_provenance.resolved_repo_source.commit_sha
    }

    /// Parse a Build Event from its JSON text
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Body of a Pub/Sub push request
#[derive(Debug, Clone, Deserialize)]
pub struct PushEnvelope {
    pub message: PubSubMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

/// A single Pub/Sub message carrying a base64-encoded Build Event
#[derive(Debug, Clone, Deserialize)]
pub struct PubSubMessage {
    /// Base64-encoded JSON
    pub data: String,
    #[serde(default, rename = "messageId")]
    pub message_id: Option<String>,
    #[serde(default, rename = "publishTime")]
    pub publish_time: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl PubSubMessage {
    /// Wrap a Build Event JSON document the way Pub/Sub delivers it
    pub fn from_event_json(json: &str) -> Self {
        Self {
            data: BASE64.encode(json),
            message_id: None,
            publish_time: None,
            attributes: HashMap::new(),
        }
    }

    /// Decode `data` into the Build Event it carries
    pub fn decode_build_event(&self) -> Result<BuildEvent> {
        let bytes = BASE64
            .decode(self.data.trim())
            .map_err(|e| AppError::Decode(e.to_string()))?;
        BuildEvent::from_json(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUILD_JSON: &str = r#"{
        "id": "build-1",
        "projectId": "acme-ci",
        "status": "SUCCESS",
        "createTime": "2024-03-01T10:00:00.123456Z",
        "finishTime": "2024-03-01T10:04:12.000001Z",
        "logUrl": "https://console.cloud.google.com/cloud-build/builds/build-1",
        "buildTriggerId": "trigger-9",
        "sourceProvenance": {
            "resolvedRepoSource": {
                "projectId": "acme-ci",
                "repoName": "bitbucket_acme_widgets",
                "commitSha": "deadbeef"
            }
        }
    }"#;

    #[test]
    fn test_parse_build_event() {
        let event = BuildEvent::from_json(BUILD_JSON.as_bytes()).unwrap();
        assert_eq!(event.id, "build-1");
        assert_eq!(event.status, "SUCCESS");
        assert_eq!(event.repo_name(), "bitbucket_acme_widgets");
        assert_eq!(event.commit_sha(), "deadbeef");
        assert_eq!(event.build_trigger_id.as_deref(), Some("trigger-9"));
        assert_eq!(
            event.finish_time.as_deref(),
            Some("2024-03-01T10:04:12.000001Z")
        );
    }

    #[test]
    fn test_parse_queued_build_without_finish_time() {
        let json = r#"{
            "id": "build-2",
            "status": "QUEUED",
            "createTime": "2024-03-01T10:00:00Z",
            "sourceProvenance": {
                "resolvedRepoSource": {"repoName": "bitbucket_acme_widgets", "commitSha": "abc"}
            }
        }"#;

        let event = BuildEvent::from_json(json.as_bytes()).unwrap();
        assert!(event.finish_time.is_none());
        assert!(event.log_url.is_none());
    }

    #[test]
    fn test_missing_source_provenance_is_rejected() {
        let json = r#"{"id": "build-3", "status": "SUCCESS"}"#;
        let err = BuildEvent::from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::InvalidEvent(_)));
    }

    #[test]
    fn test_decode_pubsub_message() {
        let message = PubSubMessage::from_event_json(BUILD_JSON);
        let event = message.decode_build_event().unwrap();
        assert_eq!(event.id, "build-1");
    }

    #[test]
    fn test_decode_invalid_base64() {
        let message = PubSubMessage {
            data: "!!not-base64!!".to_string(),
            message_id: None,
            publish_time: None,
            attributes: HashMap::new(),
        };
        let err = message.decode_build_event().unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_decode_base64_of_non_json() {
        let message = PubSubMessage::from_event_json("plain text");
        let err = message.decode_build_event().unwrap_err();
        assert!(matches!(err, AppError::InvalidEvent(_)));
    }

    #[test]
    fn test_parse_push_envelope() {
        let json = r#"{
            "message": {
                "data": "e30=",
                "messageId": "136969346945",
                "message_id": "136969346945",
                "publishTime": "2024-03-01T10:04:13Z",
                "attributes": {"buildId": "build-1", "status": "SUCCESS"}
            },
            "subscription": "projects/acme-ci/subscriptions/cloud-builds-relay"
        }"#;

        let envelope: PushEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.message.message_id.as_deref(), Some("136969346945"));
        assert_eq!(
            envelope.message.attributes.get("status").map(String::as_str),
            Some("SUCCESS")
        );
        assert!(envelope.subscription.is_some());
    }
}
