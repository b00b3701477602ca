/// Platform-agnostic input handling system
use std::collections::HashSet;

use glam::Vec2;

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Mouse events
    MouseMove { dx: f32, dy: f32 },
    MouseButton { button: MouseButton, is_down: bool },
    /// Positive = wheel rolled away from the user (zoom in)
    MouseWheel { delta: f32 },

    // Window events
    FocusLost,
    PointerLockChanged { locked: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A key (by its `KeyboardEvent.key`-style name) or a mouse button.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Binding {
    Key(String),
    Mouse(MouseButton),
}

impl Binding {
    pub fn key(name: &str) -> Self { Binding::Key(name.to_string()) }
}

/// Held buttons plus everything that happened since the last `sample`.
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub pressed_buttons: HashSet<MouseButton>,
    /// Keys/buttons that went down since the last frame (edges)
    pub down_this_frame: HashSet<Binding>,
    pub look_delta: (f32, f32),
    pub scroll_delta: f32,
    pub pointer_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            pressed_buttons: HashSet::new(),
            down_this_frame: HashSet::new(),
            look_delta: (0.0, 0.0),
            scroll_delta: 0.0,
            pointer_locked: false,
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                // auto-repeat is not an edge
                if self.pressed_keys.insert(key.clone()) {
                    self.down_this_frame.insert(Binding::Key(key.clone()));
                }
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(key.as_str());
            }
            InputEvent::MouseMove { dx, dy } => {
                self.look_delta.0 += dx;
                self.look_delta.1 += dy;
            }
            InputEvent::MouseButton { button, is_down } => {
                if *is_down {
                    if self.pressed_buttons.insert(*button) {
                        self.down_this_frame.insert(Binding::Mouse(*button));
                    }
                } else {
                    self.pressed_buttons.remove(button);
                }
            }
            InputEvent::MouseWheel { delta } => {
                self.scroll_delta += delta;
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn is_held(&self, binding: &Binding) -> bool {
        match binding {
            Binding::Key(key) => self.pressed_keys.contains(key.as_str()),
            Binding::Mouse(button) => self.pressed_buttons.contains(button),
        }
    }

    pub fn went_down(&self, binding: &Binding) -> bool {
        self.down_this_frame.contains(binding)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
        self.pressed_buttons.clear();
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        let result = self.look_delta;
        self.look_delta = (0.0, 0.0);
        result
    }

    pub fn consume_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll_delta)
    }

    /// Forget this frame's edges; held state is kept.
    pub fn end_frame(&mut self) {
        self.down_this_frame.clear();
    }
}

impl Default for InputState {
    fn default() -> Self { Self::new() }
}

/// Key mapping configuration
#[derive(Clone)]
pub struct KeyBindings {
    pub forward: Binding,
    pub backward: Binding,
    pub left: Binding,
    pub right: Binding,
    pub jump: Binding,
    pub run: Binding,
    pub toggle_view: Binding,
    pub rotate: Binding,
    pub throw: Binding,
    pub pick: Binding,
    pub escape: Binding,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: Binding::key("w"),
            backward: Binding::key("s"),
            left: Binding::key("a"),
            right: Binding::key("d"),
            jump: Binding::key(" "),
            run: Binding::key("Shift"),
            toggle_view: Binding::key("v"),
            rotate: Binding::Mouse(MouseButton::Left),
            throw: Binding::Mouse(MouseButton::Left),
            pick: Binding::key("e"),
            escape: Binding::key("Escape"),
        }
    }
}

/// One tick's worth of input, already mapped to rig actions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// x = strafe (right positive), y = forward (forward positive)
    pub movement: Vec2,
    pub run: bool,
    pub jump: bool,
    /// Raw mouse delta; x right, y down (screen convention)
    pub look: Vec2,
    pub scroll: f32,
    pub toggle_view: bool,
    pub rotate: bool,
    pub throw: bool,
    pub pick: bool,
    pub toggle_cursor: bool,
}

/// High-level input processor
#[derive(Clone)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn is_moving_forward(&self, input: &InputState) -> bool {
        input.is_held(&self.bindings.forward) || input.is_key_pressed("ArrowUp")
    }

    pub fn is_moving_backward(&self, input: &InputState) -> bool {
        input.is_held(&self.bindings.backward) || input.is_key_pressed("ArrowDown")
    }

    pub fn is_moving_left(&self, input: &InputState) -> bool {
        input.is_held(&self.bindings.left) || input.is_key_pressed("ArrowLeft")
    }

    pub fn is_moving_right(&self, input: &InputState) -> bool {
        input.is_held(&self.bindings.right) || input.is_key_pressed("ArrowRight")
    }

    pub fn is_running(&self, input: &InputState) -> bool {
        input.is_held(&self.bindings.run)
    }

    /// Digital movement axes in [-1, 1]
    pub fn movement_axes(&self, input: &InputState) -> Vec2 {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(
            axis(self.is_moving_right(input), self.is_moving_left(input)),
            axis(self.is_moving_forward(input), self.is_moving_backward(input)),
        )
    }

    /// Map the current state to actions and consume this frame's deltas and edges.
    pub fn sample(&self, input: &mut InputState) -> FrameInput {
        let (dx, dy) = input.consume_look();
        let scroll = input.consume_scroll();
        let frame = FrameInput {
            movement: self.movement_axes(input),
            run: self.is_running(input),
            jump: input.went_down(&self.bindings.jump),
            look: Vec2::new(dx, dy),
            scroll,
            toggle_view: input.went_down(&self.bindings.toggle_view),
            rotate: input.is_held(&self.bindings.rotate),
            throw: input.went_down(&self.bindings.throw),
            pick: input.went_down(&self.bindings.pick),
            toggle_cursor: input.went_down(&self.bindings.escape),
        };
        input.end_frame();
        frame
    }
}

impl Default for InputProcessor {
    fn default() -> Self { Self::new(KeyBindings::default()) }
}
