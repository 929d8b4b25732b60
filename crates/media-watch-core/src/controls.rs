use std::time::{Duration, Instant};

pub const CONTROLS_HIDE_DELAY: Duration = Duration::from_secs(3);

/// Auto-hide timer for the transport controls.
///
/// Each pointer move shows the controls and replaces any pending hide with a
/// new one `delay` later. There is only ever one deadline.
#[derive(Debug, Clone)]
pub struct ControlsVisibility {
    delay: Duration,
    hide_at: Option<Instant>,
}

impl Default for ControlsVisibility {
    fn default() -> Self {
        Self::new(CONTROLS_HIDE_DELAY)
    }
}

impl ControlsVisibility {
    pub fn new(delay: Duration) -> Self {
        Self { delay, hide_at: None }
    }

    pub fn on_pointer_move(&mut self, now: Instant) {
        self.hide_at = Some(now + self.delay);
    }

    /// Pointer left the player surface: hide right away
    pub fn on_pointer_leave(&mut self) {
        self.hide_at = None;
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.hide_at.is_some_and(|deadline| now < deadline)
    }

    pub fn hide_deadline(&self) -> Option<Instant> {
        self.hide_at
    }
}
