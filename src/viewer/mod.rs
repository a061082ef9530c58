/// Showcase viewers
///
/// This module handles:
/// - The color image carousel (carousel.rs)
/// - Fullscreen display with zoom locked (fullscreen.rs)
/// - Press, swipe and pinch handling on canvas layers (gestures.rs)
/// - Idle detection and the "still there?" countdown (inactivity.rs)

pub mod carousel;
pub mod fullscreen;
pub mod gestures;
pub mod inactivity;
