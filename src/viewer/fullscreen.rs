//! Fullscreen view of one image with zoom and pan locked.

use std::time::{Duration, Instant};

/// Two lifts closer than this count as a double tap
const DOUBLE_TAP: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fullscreen {
    url: Option<String>,
}

impl Fullscreen {
    pub fn open(&mut self, url: &str) {
        self.url = Some(url.to_string());
    }

    pub fn close(&mut self) {
        self.url = None;
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.url.is_some()
    }
}

/// Pointer input reaching the fullscreen image
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LockInput {
    Wheel,
    MousePress,
    FingerDown,
    FingerUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// Consumed without effect
    Swallow,
    Close,
}

/// Touch bookkeeping of the zoom lock: pinches and double taps never do
/// anything, a lone tap or click closes.
#[derive(Debug, Clone, Default)]
pub struct ZoomLock {
    fingers: usize,
    pinched: bool,
    last_lift: Option<Instant>,
}

impl ZoomLock {
    pub fn input(&mut self, input: LockInput, now: Instant) -> LockOutcome {
        match input {
            LockInput::Wheel => LockOutcome::Swallow,
            LockInput::MousePress => LockOutcome::Close,
            LockInput::FingerDown => {
                self.fingers += 1;
                if self.fingers > 1 {
                    self.pinched = true;
                }
                LockOutcome::Swallow
            }
            LockInput::FingerUp => {
                self.fingers = self.fingers.saturating_sub(1);
                let double_tap = self
                    .last_lift
                    .is_some_and(|last| now.duration_since(last) <= DOUBLE_TAP);
                self.last_lift = Some(now);
                if self.fingers > 0 {
                    return LockOutcome::Swallow;
                }
                let pinched = std::mem::take(&mut self.pinched);
                if pinched || double_tap {
                    LockOutcome::Swallow
                } else {
                    LockOutcome::Close
                }
            }
        }
    }
}
