/// Pointer interaction state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Idle,
    Dragging { last_x: f64, last_y: f64 },
    /// Reserved for an editing tool; pointer input neither pans nor hovers.
    Drawing,
}

/// What the engine should do in response to one input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    None,
    Select(String),
    Pan { dx: f64, dy: f64 },
    Hover(Option<String>),
    Zoom { screen_x: f64, screen_y: f64, factor: f64 },
}

impl InputOutcome {
    pub fn needs_redraw(&self) -> bool {
        !matches!(self, InputOutcome::None)
    }
}

/// Translates raw pointer/wheel events into viewport and selection changes.
/// Hit-testing is supplied by the caller so this stays free of map state.
#[derive(Debug, Clone)]
pub struct InputController {
    mode: InputMode,
    hovered: Option<String>,
    zoom_in: f64,
    zoom_out: f64,
}

impl InputController {
    pub fn new(zoom_in: f64, zoom_out: f64) -> Self {
        Self {
            mode: InputMode::Idle,
            hovered: None,
            zoom_in,
            zoom_out,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, InputMode::Dragging { .. })
    }

    pub fn set_drawing(&mut self, drawing: bool) {
        self.mode = if drawing {
            InputMode::Drawing
        } else {
            InputMode::Idle
        };
    }

    pub fn pointer_down(&mut self, sx: f64, sy: f64, hit: Option<&str>) -> InputOutcome {
        if self.mode == InputMode::Drawing {
            return InputOutcome::None;
        }
        match hit {
            Some(id) => {
                self.mode = InputMode::Idle;
                InputOutcome::Select(id.to_string())
            }
            None => {
                self.mode = InputMode::Dragging {
                    last_x: sx,
                    last_y: sy,
                };
                if self.hovered.take().is_some() {
                    InputOutcome::Hover(None)
                } else {
                    InputOutcome::None
                }
            }
        }
    }

    /// `hit_test` is only consulted while idle.
    pub fn pointer_move(
        &mut self,
        sx: f64,
        sy: f64,
        hit_test: impl FnOnce() -> Option<String>,
    ) -> InputOutcome {
        match self.mode {
            InputMode::Dragging { last_x, last_y } => {
                self.mode = InputMode::Dragging {
                    last_x: sx,
                    last_y: sy,
                };
                InputOutcome::Pan {
                    dx: sx - last_x,
                    dy: sy - last_y,
                }
            }
            InputMode::Idle => {
                let hit = hit_test();
                if hit == self.hovered {
                    InputOutcome::None
                } else {
                    self.hovered = hit.clone();
                    InputOutcome::Hover(hit)
                }
            }
            InputMode::Drawing => InputOutcome::None,
        }
    }

    /// Ends any drag. Returns whether a drag was in progress.
    pub fn pointer_up(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        if was_dragging {
            self.mode = InputMode::Idle;
        }
        was_dragging
    }

    pub fn pointer_leave(&mut self) -> InputOutcome {
        self.pointer_up();
        if self.hovered.take().is_some() {
            InputOutcome::Hover(None)
        } else {
            InputOutcome::None
        }
    }

    /// Positive `delta_y` (scroll down) zooms out.
    pub fn wheel(&self, delta_y: f64, sx: f64, sy: f64) -> InputOutcome {
        let factor = if delta_y > 0.0 {
            self.zoom_out
        } else {
            self.zoom_in
        };
        InputOutcome::Zoom {
            screen_x: sx,
            screen_y: sy,
            factor,
        }
    }

    /// Forget the hovered point (e.g. after a floor switch).
    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }
}
