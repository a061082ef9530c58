use iced::mouse::{self, Cursor};
use iced::touch;
use iced::widget::canvas::{self, Program};
use iced::{Point, Rectangle, Renderer, Theme};
use std::time::Instant;

use super::carousel::{classify_release, Release};
use super::fullscreen::{LockInput, LockOutcome, ZoomLock};

/// Transparent layer over the active carousel slide turning presses into
/// taps and swipes
pub struct SwipeSurface;

impl Program<Release> for SwipeSurface {
    type State = DragState;

    fn draw(
        &self,
        _state: &Self::State,
        _renderer: &Renderer,
        _theme: &Theme,
        _bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        // Nothing to paint, the slide image sits underneath
        vec![]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Release>) {
        let now = Instant::now();
        match event {
            // Press - start tracking
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(pos) = cursor.position_over(bounds) {
                    state.press(pos, now);
                    return (canvas::event::Status::Captured, None);
                }
            }
            canvas::Event::Touch(touch::Event::FingerPressed { position, .. }) => {
                if bounds.contains(position) {
                    state.press(position, now);
                    return (canvas::event::Status::Captured, None);
                }
            }

            // Move - measure velocity while pressed
            canvas::Event::Mouse(mouse::Event::CursorMoved { position })
            | canvas::Event::Touch(touch::Event::FingerMoved { position, .. }) => {
                if state.is_dragging() {
                    state.track(position, now);
                    return (canvas::event::Status::Captured, None);
                }
            }

            // Release - classify the gesture
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let position = cursor.position().or(state.last_position());
                if let Some(release) = position.and_then(|pos| state.release(pos, now)) {
                    return (canvas::event::Status::Captured, Some(release));
                }
            }
            canvas::Event::Touch(touch::Event::FingerLifted { position, .. }) => {
                if let Some(release) = state.release(position, now) {
                    return (canvas::event::Status::Captured, Some(release));
                }
            }
            canvas::Event::Touch(touch::Event::FingerLost { .. }) => {
                *state = DragState::default();
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }
}

/// State for drag interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    start: Option<(Point, Instant)>,
    last: Option<(Point, Instant)>,
    /// Horizontal speed in pixels per millisecond
    velocity: f32,
}

impl DragState {
    fn is_dragging(&self) -> bool {
        self.start.is_some()
    }

    fn last_position(&self) -> Option<Point> {
        self.last.map(|(pos, _)| pos)
    }

    fn press(&mut self, pos: Point, now: Instant) {
        self.start = Some((pos, now));
        self.last = Some((pos, now));
        self.velocity = 0.0;
    }

    fn track(&mut self, pos: Point, now: Instant) {
        if let Some((last_pos, last_time)) = self.last {
            let dt = now.duration_since(last_time).as_secs_f32() * 1000.0;
            if dt > 0.0 {
                self.velocity = (pos.x - last_pos.x) / dt;
            }
        }
        self.last = Some((pos, now));
    }

    fn release(&mut self, pos: Point, now: Instant) -> Option<Release> {
        let (start_pos, start_time) = self.start.take()?;
        self.last = None;
        let release = classify_release(
            pos.x - start_pos.x,
            now.duration_since(start_time),
            self.velocity,
        );
        (release != Release::Nothing).then_some(release)
    }
}

/// Emitted when the fullscreen image should close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseRequested;

/// Layer over the fullscreen image that swallows zoom and pan gestures
pub struct ZoomLockSurface;

impl Program<CloseRequested> for ZoomLockSurface {
    type State = ZoomLock;

    fn draw(
        &self,
        _state: &Self::State,
        _renderer: &Renderer,
        _theme: &Theme,
        _bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        vec![]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        _bounds: Rectangle,
        _cursor: Cursor,
    ) -> (canvas::event::Status, Option<CloseRequested>) {
        let input = match event {
            canvas::Event::Mouse(mouse::Event::WheelScrolled { .. }) => LockInput::Wheel,
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                LockInput::MousePress
            }
            canvas::Event::Touch(touch::Event::FingerPressed { .. }) => LockInput::FingerDown,
            canvas::Event::Touch(
                touch::Event::FingerLifted { .. } | touch::Event::FingerLost { .. },
            ) => LockInput::FingerUp,
            canvas::Event::Touch(touch::Event::FingerMoved { .. }) => {
                return (canvas::event::Status::Captured, None);
            }
            _ => return (canvas::event::Status::Ignored, None),
        };
        match state.input(input, Instant::now()) {
            LockOutcome::Close => (canvas::event::Status::Captured, Some(CloseRequested)),
            LockOutcome::Swallow => (canvas::event::Status::Captured, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn drag_to_the_left_goes_forward() {
        let t0 = Instant::now();
        let mut state = DragState::default();
        state.press(Point::new(300.0, 100.0), t0);
        state.track(Point::new(250.0, 100.0), t0 + Duration::from_millis(200));
        state.track(Point::new(200.0, 100.0), t0 + Duration::from_millis(400));
        let release = state.release(Point::new(200.0, 100.0), t0 + Duration::from_millis(500));
        assert_eq!(release, Some(Release::SwipeNext));
        assert!(!state.is_dragging());
    }

    #[test]
    fn short_press_is_a_tap() {
        let t0 = Instant::now();
        let mut state = DragState::default();
        state.press(Point::new(10.0, 10.0), t0);
        assert_eq!(
            state.release(Point::new(12.0, 11.0), t0 + Duration::from_millis(80)),
            Some(Release::Tap)
        );
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut state = DragState::default();
        assert_eq!(state.release(Point::ORIGIN, Instant::now()), None);
    }
}
