//! Idle detection for the showcase: after a quiet period a prompt counts
//! down and then sends the viewer back to its initial state.

use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Watching { idle_since: Instant },
    Prompt { shown_at: Instant },
}

/// What a clock tick changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleEvent {
    None,
    PromptShown,
    /// Countdown reached zero; the viewer must be reset
    Expired,
}

#[derive(Debug, Clone)]
pub struct InactivityTimer {
    delay: Duration,
    countdown: u64,
    phase: Phase,
}

impl InactivityTimer {
    pub fn new(delay: Duration, countdown_secs: u64, now: Instant) -> Self {
        Self {
            delay,
            countdown: countdown_secs,
            phase: Phase::Watching { idle_since: now },
        }
    }

    /// User input. Restarts the idle delay unless the prompt is up.
    pub fn activity(&mut self, now: Instant) {
        if let Phase::Watching { .. } = self.phase {
            self.phase = Phase::Watching { idle_since: now };
        }
    }

    /// Advance the clock. `at_initial_state` suppresses the prompt when
    /// there is nothing to reset.
    pub fn tick(&mut self, now: Instant, at_initial_state: bool) -> IdleEvent {
        match self.phase {
            Phase::Watching { idle_since } => {
                if now.saturating_duration_since(idle_since) < self.delay {
                    return IdleEvent::None;
                }
                if at_initial_state {
                    self.phase = Phase::Watching { idle_since: now };
                    return IdleEvent::None;
                }
                debug!(countdown = self.countdown, "inactivity prompt shown");
                self.phase = Phase::Prompt { shown_at: now };
                IdleEvent::PromptShown
            }
            Phase::Prompt { shown_at } => {
                if now.saturating_duration_since(shown_at).as_secs() >= self.countdown {
                    debug!("inactivity countdown expired");
                    self.phase = Phase::Watching { idle_since: now };
                    IdleEvent::Expired
                } else {
                    IdleEvent::None
                }
            }
        }
    }

    /// "Continue": hide the prompt and start a new idle period
    pub fn dismiss(&mut self, now: Instant) {
        self.phase = Phase::Watching { idle_since: now };
    }

    pub fn prompt_visible(&self) -> bool {
        matches!(self.phase, Phase::Prompt { .. })
    }

    /// Seconds left on the prompt countdown
    pub fn remaining(&self, now: Instant) -> Option<u64> {
        match self.phase {
            Phase::Prompt { shown_at } => {
                let elapsed = now.saturating_duration_since(shown_at).as_secs();
                Some(self.countdown.saturating_sub(elapsed))
            }
            Phase::Watching { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn timer(t0: Instant) -> InactivityTimer {
        InactivityTimer::new(secs(60), 15, t0)
    }

    #[test]
    fn prompt_waits_for_full_delay() {
        let t0 = Instant::now();
        let mut timer = timer(t0);
        assert_eq!(timer.tick(t0 + secs(59), false), IdleEvent::None);
        assert_eq!(timer.tick(t0 + secs(60), false), IdleEvent::PromptShown);
        assert!(timer.prompt_visible());
        assert_eq!(timer.remaining(t0 + secs(64)), Some(11));
    }

    #[test]
    fn activity_restarts_delay() {
        let t0 = Instant::now();
        let mut timer = timer(t0);
        timer.activity(t0 + secs(50));
        assert_eq!(timer.tick(t0 + secs(100), false), IdleEvent::None);
        assert_eq!(timer.tick(t0 + secs(110), false), IdleEvent::PromptShown);
    }

    #[test]
    fn initial_state_never_prompts() {
        let t0 = Instant::now();
        let mut timer = timer(t0);
        assert_eq!(timer.tick(t0 + secs(61), true), IdleEvent::None);
        assert!(!timer.prompt_visible());
        // The delay starts over from that tick
        assert_eq!(timer.tick(t0 + secs(100), false), IdleEvent::None);
        assert_eq!(timer.tick(t0 + secs(121), false), IdleEvent::PromptShown);
    }

    #[test]
    fn countdown_expiry_resets() {
        let t0 = Instant::now();
        let mut timer = timer(t0);
        timer.tick(t0 + secs(60), false);
        // Input while the prompt is open does not dismiss it
        timer.activity(t0 + secs(65));
        assert_eq!(timer.tick(t0 + secs(74), false), IdleEvent::None);
        assert_eq!(timer.tick(t0 + secs(75), false), IdleEvent::Expired);
        assert!(!timer.prompt_visible());
    }

    #[test]
    fn continue_dismisses_prompt() {
        let t0 = Instant::now();
        let mut timer = timer(t0);
        timer.tick(t0 + secs(60), false);
        timer.dismiss(t0 + secs(62));
        assert_eq!(timer.remaining(t0 + secs(62)), None);
        assert_eq!(timer.tick(t0 + secs(121), false), IdleEvent::None);
        assert_eq!(timer.tick(t0 + secs(122), false), IdleEvent::PromptShown);
    }
}
