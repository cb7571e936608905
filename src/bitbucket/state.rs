use serde::{Deserialize, Serialize};

/// Bitbucket build state for a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommitState {
    Successful,
    #[serde(rename = "INPROGRESS")]
    InProgress,
    Failed,
}

impl CommitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitState::Successful => "SUCCESSFUL",
            CommitState::InProgress => "INPROGRESS",
            CommitState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a Cloud Build status onto a Bitbucket state.
///
/// Case-insensitive and total: anything other than a success or a pending
/// build (FAILURE, TIMEOUT, CANCELLED, unknown text, "") is `Failed`.
pub fn map_status(status: &str) -> CommitState {
    match status.to_ascii_lowercase().as_str() {
        "success" => CommitState::Successful,
        "queued" | "working" => CommitState::InProgress,
        _ => CommitState::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_maps_to_successful() {
        assert_eq!(map_status("SUCCESS"), CommitState::Successful);
        assert_eq!(map_status("success"), CommitState::Successful);
    }

    #[test]
    fn test_pending_statuses_map_to_in_progress() {
        assert_eq!(map_status("queued"), CommitState::InProgress);
        assert_eq!(map_status("QUEUED"), CommitState::InProgress);
        assert_eq!(map_status("Working"), CommitState::InProgress);
    }

    #[test]
    fn test_everything_else_maps_to_failed() {
        for status in [
            "failure",
            "FAILURE",
            "INTERNAL_ERROR",
            "TIMEOUT",
            "CANCELLED",
            "EXPIRED",
            "STATUS_UNKNOWN",
            "",
            "anything-unrecognized",
            " success",
        ] {
            assert_eq!(map_status(status), CommitState::Failed, "status {status:?}");
        }
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&CommitState::Successful).unwrap(),
            "\"SUCCESSFUL\""
        );
        assert_eq!(
            serde_json::to_string(&CommitState::InProgress).unwrap(),
            "\"INPROGRESS\""
        );
        assert_eq!(serde_json::to_string(&CommitState::Failed).unwrap(), "\"FAILED\"");
        assert_eq!(CommitState::InProgress.to_string(), "INPROGRESS");
    }
}
