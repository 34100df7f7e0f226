//! Persisted record of which "linter library missing" notices were shown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where a missing-library notice applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DismissalScope {
    /// No workspace is open; the notice is about a global install.
    Global,
    /// Keyed by the workspace root path.
    Workspace(String),
}

/// Stored under the profile's `dismissal_key`. Fields are optional on the
/// wire so records written by older installs still parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DismissalState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspaces: Option<BTreeMap<String, bool>>,
}

impl DismissalState {
    /// Parse a stored value, treating anything unreadable as "nothing shown yet".
    #[must_use]
    pub fn from_value(value: Option<serde_json::Value>) -> Self {
        value
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_recorded(&self, scope: &DismissalScope) -> bool {
        match scope {
            DismissalScope::Global => self.global.unwrap_or(false),
            DismissalScope::Workspace(root) => self
                .workspaces
                .as_ref()
                .and_then(|roots| roots.get(root).copied())
                .unwrap_or(false),
        }
    }

    /// Mark `scope` as shown. Returns `true` if it was not recorded before.
    pub fn record(&mut self, scope: &DismissalScope) -> bool {
        if self.is_recorded(scope) {
            return false;
        }
        match scope {
            DismissalScope::Global => self.global = Some(true),
            DismissalScope::Workspace(root) => {
                self.workspaces
                    .get_or_insert_with(BTreeMap::new)
                    .insert(root.clone(), true);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_records_nothing() {
        let state = DismissalState::default();
        assert!(!state.is_recorded(&DismissalScope::Global));
        assert!(!state.is_recorded(&DismissalScope::Workspace("/w".into())));
    }

    #[test]
    fn record_is_once_per_scope() {
        let mut state = DismissalState::default();
        assert!(state.record(&DismissalScope::Global));
        assert!(!state.record(&DismissalScope::Global));

        let a = DismissalScope::Workspace("/a".into());
        let b = DismissalScope::Workspace("/b".into());
        assert!(state.record(&a));
        assert!(!state.record(&a));
        assert!(state.record(&b));
    }

    #[test]
    fn global_and_workspace_are_independent() {
        let mut state = DismissalState::default();
        state.record(&DismissalScope::Workspace("/a".into()));
        assert!(!state.is_recorded(&DismissalScope::Global));
    }

    #[test]
    fn wire_format_matches_stored_records() {
        let mut state = DismissalState::default();
        state.record(&DismissalScope::Workspace("/repo".into()));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json, serde_json::json!({ "workspaces": { "/repo": true } }));

        let parsed = DismissalState::from_value(Some(serde_json::json!({ "global": true })));
        assert!(parsed.is_recorded(&DismissalScope::Global));
    }

    #[test]
    fn unreadable_value_is_default() {
        let parsed = DismissalState::from_value(Some(serde_json::json!("garbage")));
        assert_eq!(parsed, DismissalState::default());
        assert_eq!(DismissalState::from_value(None), DismissalState::default());
    }
}
