use crate::action::{Action, Movement};
use crate::key::InputEvent;
use crate::map::{Binding, KeyMap};
use glam::{Vec2, Vec3};
use std::collections::HashSet;

/// Movement keys currently held down.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Movement>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Returns the action a press triggers, if any.
    pub fn handle(&mut self, map: &KeyMap, event: InputEvent) -> Option<Action> {
        match map.get(event.key)? {
            Binding::Action(action) => event.pressed.then_some(action),
            Binding::Movement(m) => {
                if event.pressed {
                    self.held.insert(m);
                } else {
                    self.held.remove(&m);
                }
                None
            }
        }
    }

    pub fn is_held(&self, m: Movement) -> bool {
        self.held.contains(&m)
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Requested translation in camera space: x right, y up, z forward.
    /// Each component is -1, 0 or 1.
    pub fn move_axes(&self) -> Vec3 {
        Vec3::new(
            self.axis(Movement::Right, Movement::Left),
            self.axis(Movement::Up, Movement::Down),
            self.axis(Movement::Forward, Movement::Back),
        )
    }

    /// Requested rotation from the look keys: x yaw, y pitch.
    pub fn look_axes(&self) -> Vec2 {
        Vec2::new(
            self.axis(Movement::LookRight, Movement::LookLeft),
            self.axis(Movement::LookUp, Movement::LookDown),
        )
    }

    pub fn sprinting(&self) -> bool {
        self.is_held(Movement::Sprint)
    }

    fn axis(&self, pos: Movement, neg: Movement) -> f32 {
        f32::from(u8::from(self.is_held(pos))) - f32::from(u8::from(self.is_held(neg)))
    }
}
