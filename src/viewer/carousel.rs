//! Image carousel of one color: wrap-around navigation over its gallery.

use std::time::Duration;

use crate::state::data::ColorImages;

/// Role of a visible slide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideRole {
    Prev,
    Active,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide<'a> {
    pub role: SlideRole,
    pub index: usize,
    pub url: &'a str,
}

/// URL without query string or fragment, for "same file" checks
fn bare_url(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Gallery URLs to show, minus the cover and minus duplicates
pub fn carousel_urls(images: &ColorImages) -> Vec<String> {
    let cover = images.presentation.as_ref().map(|p| bare_url(&p.url));
    let mut seen: Vec<&str> = Vec::new();
    let mut urls = Vec::new();
    for image in &images.gallery {
        let bare = bare_url(&image.url);
        if image.url.is_empty() || Some(bare) == cover || seen.contains(&bare) {
            continue;
        }
        seen.push(bare);
        urls.push(image.url.clone());
    }
    urls
}

#[derive(Debug, Clone, Default)]
pub struct Carousel {
    title: String,
    color_id: Option<i64>,
    urls: Vec<String>,
    index: usize,
}

impl Carousel {
    /// Open on the first image. An empty list leaves the carousel closed.
    pub fn open(&mut self, title: &str, color_id: i64, urls: Vec<String>) -> bool {
        if urls.is_empty() {
            return false;
        }
        self.title = title.to_string();
        self.color_id = Some(color_id);
        self.urls = urls;
        self.index = 0;
        true
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        !self.urls.is_empty()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn color_id(&self) -> Option<i64> {
        self.color_id
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&str> {
        self.urls.get(self.index).map(String::as_str)
    }

    pub fn next(&mut self) {
        if self.is_open() {
            self.index = (self.index + 1) % self.urls.len();
        }
    }

    pub fn prev(&mut self) {
        if self.is_open() {
            self.index = (self.index + self.urls.len() - 1) % self.urls.len();
        }
    }

    pub fn go_to(&mut self, index: usize) {
        if index < self.urls.len() {
            self.index = index;
        }
    }

    /// Previous, active and next slides around the current index
    pub fn slides(&self) -> Vec<Slide<'_>> {
        let n = self.urls.len();
        if n == 0 {
            return Vec::new();
        }
        [
            (SlideRole::Prev, (self.index + n - 1) % n),
            (SlideRole::Active, self.index),
            (SlideRole::Next, (self.index + 1) % n),
        ]
        .into_iter()
        .map(|(role, index)| Slide { role, index, url: &self.urls[index] })
        .collect()
    }

    /// `i / n` label of the slide at `index`
    pub fn counter(&self, index: usize) -> String {
        format!("{} / {}", index + 1, self.urls.len())
    }
}

/// What a released press on the carousel amounts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Tap,
    SwipePrev,
    SwipeNext,
    Nothing,
}

const MAX_TAP_DISTANCE: f32 = 10.0;
const MAX_TAP_TIME: Duration = Duration::from_millis(300);
const MIN_SWIPE_DISTANCE: f32 = 30.0;
/// Pixels per millisecond
const MIN_SWIPE_VELOCITY: f32 = 0.5;

/// Classify a press/release pair by horizontal travel, duration and the
/// last measured velocity
pub fn classify_release(delta_x: f32, elapsed: Duration, velocity: f32) -> Release {
    let distance = delta_x.abs();
    if distance <= MAX_TAP_DISTANCE && elapsed <= MAX_TAP_TIME {
        return Release::Tap;
    }
    if velocity.abs() > MIN_SWIPE_VELOCITY || distance > MIN_SWIPE_DISTANCE {
        if delta_x > 0.0 {
            Release::SwipePrev
        } else {
            Release::SwipeNext
        }
    } else {
        Release::Nothing
    }
}
