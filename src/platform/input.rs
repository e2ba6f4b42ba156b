//! Keyboard and touch input merging
//!
//! Each source keeps its own held flags so releasing a key never cancels a
//! finger still on the touch button. Jump and pause are edge-triggered: a press
//! is latched on the transition from released to held and consumed by the next
//! poll, so auto-repeat and long holds never produce a second jump.

use crate::sim::TickInput;

/// A logical control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
    Jump,
    Pause,
}

impl Control {
    /// Map a `KeyboardEvent.code` to a control
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Control::Left),
            "ArrowRight" | "KeyD" => Some(Control::Right),
            "ArrowUp" | "KeyW" | "Space" => Some(Control::Jump),
            "Escape" => Some(Control::Pause),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Held {
    left: bool,
    right: bool,
    jump: bool,
}

impl Held {
    fn set(&mut self, control: Control, down: bool) {
        match control {
            Control::Left => self.left = down,
            Control::Right => self.right = down,
            Control::Jump => self.jump = down,
            Control::Pause => {}
        }
    }
}

/// Merged input from every source
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keyboard: Held,
    touch: Held,
    jump_latched: bool,
    pause_latched: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    fn jump_held(&self) -> bool {
        self.keyboard.jump || self.touch.jump
    }

    fn press(&mut self, control: Control) {
        match control {
            Control::Jump if !self.jump_held() => self.jump_latched = true,
            Control::Pause => self.pause_latched = true,
            _ => {}
        }
    }

    /// Key pressed; returns true if the key is one of ours
    pub fn key_down(&mut self, code: &str) -> bool {
        let Some(control) = Control::from_key_code(code) else {
            return false;
        };
        self.press(control);
        self.keyboard.set(control, true);
        true
    }

    /// Key released; returns true if the key is one of ours
    pub fn key_up(&mut self, code: &str) -> bool {
        let Some(control) = Control::from_key_code(code) else {
            return false;
        };
        self.keyboard.set(control, false);
        true
    }

    /// On-screen button pressed or released
    pub fn touch(&mut self, control: Control, down: bool) {
        if down {
            self.press(control);
        }
        self.touch.set(control, down);
    }

    /// Release everything (window blur)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Control state for the next tick; consumes latched presses
    pub fn poll(&mut self) -> TickInput {
        let input = TickInput {
            left: self.keyboard.left || self.touch.left,
            right: self.keyboard.right || self.touch.right,
            jump_pressed: self.jump_latched,
            pause: self.pause_latched,
        };
        self.jump_latched = false;
        self.pause_latched = false;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Control::from_key_code("KeyA"), Some(Control::Left));
        assert_eq!(Control::from_key_code("ArrowRight"), Some(Control::Right));
        assert_eq!(Control::from_key_code("Space"), Some(Control::Jump));
        assert_eq!(Control::from_key_code("Escape"), Some(Control::Pause));
        assert_eq!(Control::from_key_code("KeyQ"), None);
    }

    #[test]
    fn test_jump_is_edge_triggered() {
        let mut input = InputState::new();
        input.key_down("Space");
        assert!(input.poll().jump_pressed);

        // Auto-repeat keydowns while held
        input.key_down("Space");
        assert!(!input.poll().jump_pressed);
        assert!(!input.poll().jump_pressed);

        input.key_up("Space");
        input.key_down("Space");
        assert!(input.poll().jump_pressed);
    }

    #[test]
    fn test_quick_tap_between_polls_is_kept() {
        let mut input = InputState::new();
        input.key_down("ArrowUp");
        input.key_up("ArrowUp");
        assert!(input.poll().jump_pressed);
        assert!(!input.poll().jump_pressed);
    }

    #[test]
    fn test_sources_are_merged() {
        let mut input = InputState::new();
        input.key_down("KeyA");
        input.touch(Control::Left, true);
        input.key_up("KeyA");
        assert!(input.poll().left);

        input.touch(Control::Left, false);
        assert!(!input.poll().left);
    }

    #[test]
    fn test_touch_jump_while_key_held_does_not_retrigger() {
        let mut input = InputState::new();
        input.key_down("KeyW");
        assert!(input.poll().jump_pressed);
        input.touch(Control::Jump, true);
        assert!(!input.poll().jump_pressed);
    }

    #[test]
    fn test_pause_latch() {
        let mut input = InputState::new();
        assert!(input.key_down("Escape"));
        assert!(input.poll().pause);
        assert!(!input.poll().pause);
        assert!(!input.key_down("KeyZ"));
    }
}
