//! Logical input actions and per-tick snapshots
//!
//! Raw device key codes are mapped to a stable action vocabulary through a
//! configurable bindings table (many-to-one: several keys can drive one
//! action). The snapshot is level-triggered only — it reports what is held
//! right now and keeps no history. Edge detection (jump, shoot, toggles)
//! belongs to the consumer, which compares against the previous tick.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Logical gameplay actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBackward,
    TurnLeft,
    TurnRight,
    Jump,
    Shoot,
    ToggleCamera,
    SwitchPlayer,
}

/// Action → key-code list table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputBindings {
    bindings: Vec<(Action, Vec<String>)>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let bind = |action: Action, keys: &[&str]| -> (Action, Vec<String>) {
            (action, keys.iter().map(|k| (*k).to_string()).collect())
        };
        Self {
            bindings: vec![
                bind(Action::MoveForward, &["KeyW", "ArrowUp"]),
                bind(Action::MoveBackward, &["KeyS", "ArrowDown"]),
                bind(Action::TurnLeft, &["KeyA", "ArrowLeft"]),
                bind(Action::TurnRight, &["KeyD", "ArrowRight"]),
                bind(Action::Jump, &["Space"]),
                bind(Action::Shoot, &["KeyF", "Mouse0"]),
                bind(Action::ToggleCamera, &["KeyC"]),
                bind(Action::SwitchPlayer, &["KeyP"]),
            ],
        }
    }
}

impl InputBindings {
    /// Key codes bound to an action (empty if unbound)
    pub fn keys_for(&self, action: Action) -> &[String] {
        self.bindings
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, keys)| keys.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the key list for an action
    pub fn rebind(&mut self, action: Action, keys: Vec<String>) {
        if let Some(entry) = self.bindings.iter_mut().find(|(a, _)| *a == action) {
            entry.1 = keys;
        } else {
            self.bindings.push((action, keys));
        }
    }
}

/// The set of key codes held during one tick
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    held: HashSet<String>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from the device layer's currently-held set
    pub fn from_held<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            held: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn press(&mut self, key: &str) {
        self.held.insert(key.to_string());
    }

    pub fn release(&mut self, key: &str) {
        self.held.remove(key);
    }

    /// True iff any key bound to `action` is currently held
    pub fn is_action_active(&self, bindings: &InputBindings, action: Action) -> bool {
        bindings
            .keys_for(action)
            .iter()
            .any(|key| self.held.contains(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_bound_key_activates_action() {
        let bindings = InputBindings::default();
        let snap = InputSnapshot::from_held(["ArrowUp"]);
        assert!(snap.is_action_active(&bindings, Action::MoveForward));

        let snap = InputSnapshot::from_held(["KeyW"]);
        assert!(snap.is_action_active(&bindings, Action::MoveForward));

        let snap = InputSnapshot::from_held(["KeyX"]);
        assert!(!snap.is_action_active(&bindings, Action::MoveForward));
    }

    #[test]
    fn snapshot_is_level_triggered_only() {
        let bindings = InputBindings::default();
        let mut snap = InputSnapshot::new();
        snap.press("Space");
        assert!(snap.is_action_active(&bindings, Action::Jump));
        // Holding across queries reports held every time; no edge state
        assert!(snap.is_action_active(&bindings, Action::Jump));
        snap.release("Space");
        assert!(!snap.is_action_active(&bindings, Action::Jump));
    }

    #[test]
    fn rebinding_replaces_keys() {
        let mut bindings = InputBindings::default();
        bindings.rebind(Action::Shoot, vec!["KeyJ".to_string()]);
        let snap = InputSnapshot::from_held(["KeyF"]);
        assert!(!snap.is_action_active(&bindings, Action::Shoot));
        let snap = InputSnapshot::from_held(["KeyJ"]);
        assert!(snap.is_action_active(&bindings, Action::Shoot));
    }
}
