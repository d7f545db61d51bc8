//! Rollup group configuration.
//!
//! Each group gets its own column between `Totals` and the per-location
//! columns. A location joins the group that lists its state; states no group
//! lists only count toward `Totals`.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateGroup {
    pub key: String,
    /// Header text for the group column.
    pub label: String,
    pub states: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub groups: Vec<StateGroup>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            groups: vec![
                StateGroup {
                    key: "ILL".into(),
                    label: "ILL".into(),
                    states: vec!["ILL".into()],
                },
                StateGroup {
                    key: "GA".into(),
                    label: "GA / SC".into(),
                    states: vec!["GA".into()],
                },
            ],
        }
    }
}

impl ReportConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading group configuration");
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        let mut keys = HashSet::new();
        let mut states = HashSet::new();
        for group in &self.groups {
            if group.key.trim().is_empty() {
                return Err(ReportError::InvalidConfig("group key is empty".into()));
            }
            if !keys.insert(group.key.as_str()) {
                return Err(ReportError::InvalidConfig(format!(
                    "duplicate group key {}",
                    group.key
                )));
            }
            for state in &group.states {
                if !states.insert(state.as_str()) {
                    return Err(ReportError::InvalidConfig(format!(
                        "state {} is assigned to more than one group",
                        state
                    )));
                }
            }
        }
        Ok(())
    }

    /// Index into `groups` of the group a state rolls up into.
    pub fn group_for_state(&self, state: &str) -> Option<usize> {
        let state = state.trim();
        self.groups
            .iter()
            .position(|g| g.states.iter().any(|s| s == state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_groups_match_the_two_regions() {
        let config = ReportConfig::default();
        config.validate().unwrap();
        assert_eq!(config.group_for_state("ILL"), Some(0));
        assert_eq!(config.group_for_state("GA"), Some(1));
        assert_eq!(config.group_for_state("SC"), None);
        assert_eq!(config.groups[1].label, "GA / SC");
    }

    #[test]
    fn groups_can_cover_several_states() {
        let config = ReportConfig::from_json(
            r#"{"groups": [
                {"key": "MW", "label": "Midwest", "states": ["ILL", "IN"]},
                {"key": "SE", "label": "Southeast", "states": ["GA", "SC"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(config.group_for_state("IN"), Some(0));
        assert_eq!(config.group_for_state("SC"), Some(1));
        assert_eq!(config.group_for_state(" GA "), Some(1));
    }

    #[test]
    fn state_in_two_groups_is_rejected() {
        let err = ReportConfig::from_json(
            r#"{"groups": [
                {"key": "A", "label": "A", "states": ["GA"]},
                {"key": "B", "label": "B", "states": ["GA"]}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig(_)));
    }

    fn group(key: &str, label: &str) -> StateGroup {
        StateGroup {
            key: key.into(),
            label: label.into(),
            states: vec![],
        }
    }

    #[test]
    fn duplicate_or_blank_keys_are_rejected() {
        let dup = ReportConfig {
            groups: vec![group("A", "A"), group("A", "B")],
        };
        assert!(dup.validate().is_err());

        let blank = ReportConfig {
            groups: vec![group(" ", "A")],
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn load_reads_a_file() {
        let path = std::env::temp_dir().join("weekly_ops_report_groups_test.json");
        std::fs::write(&path, serde_json::to_string(&ReportConfig::default()).unwrap()).unwrap();
        let config = ReportConfig::load(&path).unwrap();
        assert_eq!(config, ReportConfig::default());
        std::fs::remove_file(&path).unwrap();
    }
}
