/// One runtime-registered button. Scripts address buttons by the index they
/// were registered at, not by name.
#[derive(Debug, Clone)]
struct ButtonState {
    name: String,
    held: bool,
    edge: bool,
    pressed_at: u64,
    last_fire: u64,
}

/// Input facade: named button registry with press/repeat gating against an
/// advancing millisecond clock, plus mouse position.
pub struct Input {
    buttons: Vec<ButtonState>,
    now_ms: u64,
    mouse: (i32, i32),
}

impl Input {
    pub fn new() -> Self {
        Self { buttons: Vec::new(), now_ms: 0, mouse: (0, 0) }
    }

    /// Replaces the button set. Existing state is discarded; scripts
    /// re-register on scene changes.
    pub fn register_buttons(&mut self, names: &[String]) {
        self.buttons = names
            .iter()
            .map(|name| ButtonState {
                name: name.clone(),
                held: false,
                edge: false,
                pressed_at: 0,
                last_fire: 0,
            })
            .collect();
    }

    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    pub fn button_name(&self, index: usize) -> Option<&str> {
        self.buttons.get(index).map(|b| b.name.as_str())
    }

    pub fn advance(&mut self, dt_ms: u64) {
        self.now_ms += dt_ms;
    }

    pub fn press(&mut self, index: usize) {
        let now = self.now_ms;
        if let Some(button) = self.buttons.get_mut(index) {
            if !button.held {
                button.held = true;
                button.edge = true;
                button.pressed_at = now;
                button.last_fire = now;
            }
        }
    }

    pub fn release(&mut self, index: usize) {
        if let Some(button) = self.buttons.get_mut(index) {
            button.held = false;
            button.edge = false;
        }
    }

    pub fn button_down(&self, index: usize) -> bool {
        self.buttons.get(index).is_some_and(|b| b.held)
    }

    /// Edge-triggered press with optional key repeat: fires once on the
    /// press edge, then (when `repeat_ms > 0`) every `repeat_ms` once the
    /// button has been held for `delay_ms`.
    pub fn button_pressed(&mut self, index: usize, delay_ms: u32, repeat_ms: u32) -> bool {
        let now = self.now_ms;
        let Some(button) = self.buttons.get_mut(index) else {
            return false;
        };
        if !button.held {
            return false;
        }
        if button.edge {
            button.edge = false;
            button.last_fire = now;
            return true;
        }
        if repeat_ms == 0 {
            return false;
        }
        if now.saturating_sub(button.pressed_at) < u64::from(delay_ms) {
            return false;
        }
        if now.saturating_sub(button.last_fire) >= u64::from(repeat_ms) {
            button.last_fire = now;
            return true;
        }
        false
    }

    pub fn set_mouse_position(&mut self, x: i32, y: i32) {
        self.mouse = (x, y);
    }

    pub fn mouse_position(&self) -> (i32, i32) {
        self.mouse
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}
