//! Rotation run configuration.
//!
//! Values are plain data so callers can load them from JSON or build them in
//! code. Every field has a default.

use crate::rotation::engine::MissingAssigneePolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for one rotation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotationConfig {
    /// Handling of a latest assignee who left the family.
    pub missing_assignee_policy: MissingAssigneePolicy,
    /// Wall-clock budget for one run in milliseconds. Tasks not started
    /// before it runs out are reported as not run.
    pub max_run_duration_ms: Option<u64>,
}

impl RotationConfig {
    pub fn with_policy(mut self, policy: MissingAssigneePolicy) -> Self {
        self.missing_assignee_policy = policy;
        self
    }

    pub fn with_max_run_duration(mut self, limit: Duration) -> Self {
        self.max_run_duration_ms = Some(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn max_run_duration(&self) -> Option<Duration> {
        self.max_run_duration_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::RotationConfig;
    use crate::rotation::engine::MissingAssigneePolicy;
    use std::time::Duration;

    #[test]
    fn default_uses_oldest_member_without_deadline() {
        let config = RotationConfig::default();
        assert_eq!(
            config.missing_assignee_policy,
            MissingAssigneePolicy::OldestMember
        );
        assert_eq!(config.max_run_duration(), None);
    }

    #[test]
    fn builders_override_fields() {
        let config = RotationConfig::default()
            .with_policy(MissingAssigneePolicy::FailTask)
            .with_max_run_duration(Duration::from_secs(2));
        assert_eq!(config.missing_assignee_policy, MissingAssigneePolicy::FailTask);
        assert_eq!(config.max_run_duration_ms, Some(2000));
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let config: RotationConfig =
            serde_json::from_str(r#"{"missing_assignee_policy":"restart_cycle"}"#).unwrap();
        assert_eq!(
            config.missing_assignee_policy,
            MissingAssigneePolicy::RestartCycle
        );
        assert_eq!(config.max_run_duration_ms, None);

        let err = serde_json::from_str::<RotationConfig>(r#"{"unknown":1}"#);
        assert!(err.is_err());
    }
}
