use crate::action::{Action, Movement};
use crate::key::Key;
use std::collections::HashMap;

/// What a key is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Action(Action),
    Movement(Movement),
}

/// Key binding table.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<Key, Binding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind(Key::Escape, Binding::Action(Action::Quit))
            .bind(Key::F1, Binding::Action(Action::ToggleWireframe))
            .bind(Key::F2, Binding::Action(Action::ToggleMouseFollow))
            .bind(Key::Digit1, Binding::Action(Action::ToggleBloom))
            .bind(Key::Digit2, Binding::Action(Action::ToggleSsao))
            .bind(Key::F5, Binding::Action(Action::ReloadShaders))
            .bind(Key::F6, Binding::Action(Action::ToggleHelpers))
            .bind(Key::F8, Binding::Action(Action::SaveCamera))
            .bind(Key::W, Binding::Movement(Movement::Forward))
            .bind(Key::S, Binding::Movement(Movement::Back))
            .bind(Key::A, Binding::Movement(Movement::Left))
            .bind(Key::D, Binding::Movement(Movement::Right))
            .bind(Key::Space, Binding::Movement(Movement::Up))
            .bind(Key::ControlLeft, Binding::Movement(Movement::Down))
            .bind(Key::ShiftLeft, Binding::Movement(Movement::Sprint))
            .bind(Key::ArrowUp, Binding::Movement(Movement::LookUp))
            .bind(Key::ArrowDown, Binding::Movement(Movement::LookDown))
            .bind(Key::ArrowLeft, Binding::Movement(Movement::LookLeft))
            .bind(Key::ArrowRight, Binding::Movement(Movement::LookRight));
        map
    }
}

impl KeyMap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `key`, replacing any previous binding.
    pub fn bind(&mut self, key: Key, binding: Binding) -> &mut Self {
        if let Some(old) = self.bindings.insert(key, binding) {
            tracing::debug!(?key, ?old, ?binding, "key rebound");
        }
        self
    }

    pub fn unbind(&mut self, key: Key) -> Option<Binding> {
        self.bindings.remove(&key)
    }

    pub fn get(&self, key: Key) -> Option<Binding> {
        self.bindings.get(&key).copied()
    }

    pub fn is_bound(&self, key: Key) -> bool {
        self.bindings.contains_key(&key)
    }

    /// Keys bound to `action`, for help text.
    pub fn keys_for(&self, action: Action) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .bindings
            .iter()
            .filter(|(_, b)| **b == Binding::Action(action))
            .map(|(k, _)| *k)
            .collect();
        keys.sort_by_key(|k| format!("{k:?}"));
        keys
    }
}
