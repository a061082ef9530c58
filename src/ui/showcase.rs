//! Public-facing showcase: section tabs, color bubbles, the image carousel
//! and the fullscreen viewer, reset to the facades after inactivity.
//!
//! `Showcase::update` returns the side effects to run instead of running
//! them, so the screen can be driven without a backend.

use std::time::{Duration, Instant};

use iced::widget::{
    button, canvas, column, container, horizontal_space, image, mouse_area, opaque, row,
    scrollable, stack, text,
};
use iced::{Alignment, Color, ContentFit, Element, Length};
use iced_aw::Wrap;
use tracing::{debug, warn};

use super::{dialog, modal, section_tabs, thumbnail, Thumbnails};
use crate::analytics::TrackEvent;
use crate::error::ApiResult;
use crate::state::data::{ColorImages, Group, Section};
use crate::viewer::carousel::{carousel_urls, Carousel, Release, SlideRole};
use crate::viewer::fullscreen::Fullscreen;
use crate::viewer::gestures::{SwipeSurface, ZoomLockSurface};
use crate::viewer::inactivity::{IdleEvent, InactivityTimer};

const BUBBLE_SIZE: f32 = 120.0;
const ACTIVE_SLIDE: (f32, f32) = (560.0, 380.0);
const SIDE_SLIDE: (f32, f32) = (180.0, 130.0);

#[derive(Debug, Clone)]
pub enum ShowcaseMessage {
    SelectSection(Section),
    Loaded(Section, ApiResult<Vec<Group>>),
    OpenBubble { color_id: i64, name: String },
    BubbleImages { color_id: i64, name: String, result: ApiResult<ColorImages> },
    Next,
    Prev,
    GoTo(usize),
    Swipe(Release),
    CloseCarousel,
    OpenFullscreen,
    CloseFullscreen,
    Escape,
    /// Dismiss the inactivity prompt
    Continue,
    /// Reset button on the inactivity prompt
    Reset,
    Home,
}

/// Work the application runs on behalf of the showcase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Load(Section),
    FetchImages { color_id: i64, name: String },
    FetchThumbnails(Vec<String>),
    Track(TrackEvent),
    StopBeacon,
}

#[derive(Debug)]
pub struct Showcase {
    section: Section,
    groups: Vec<Group>,
    loading: bool,
    carousel: Carousel,
    fullscreen: Fullscreen,
    idle: InactivityTimer,
    clock: Instant,
    /// Color whose images are being fetched for the carousel
    opening: Option<i64>,
    notice: Option<String>,
}

impl Showcase {
    pub fn new(idle_delay: Duration, countdown_secs: u64, now: Instant) -> Self {
        Self {
            section: Section::Facades,
            groups: Vec::new(),
            loading: false,
            carousel: Carousel::default(),
            fullscreen: Fullscreen::default(),
            idle: InactivityTimer::new(idle_delay, countdown_secs, now),
            clock: now,
            opening: None,
            notice: None,
        }
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    #[cfg(test)]
    pub fn fullscreen(&self) -> &Fullscreen {
        &self.fullscreen
    }

    pub fn prompt_visible(&self) -> bool {
        self.idle.prompt_visible()
    }

    /// Facades tab with nothing open
    pub fn at_initial_state(&self) -> bool {
        self.section == Section::Facades && !self.carousel.is_open() && !self.fullscreen.is_open()
    }

    /// Effects to run when the screen is entered
    pub fn enter(&mut self, now: Instant) -> Vec<Effect> {
        self.idle.dismiss(now);
        self.clock = now;
        self.loading = true;
        vec![Effect::Load(self.section)]
    }

    pub fn activity(&mut self, now: Instant) {
        self.clock = now;
        self.idle.activity(now);
    }

    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        self.clock = now;
        match self.idle.tick(now, self.at_initial_state()) {
            IdleEvent::Expired => {
                debug!("showcase reset after inactivity");
                self.reset(now)
            }
            IdleEvent::PromptShown | IdleEvent::None => Vec::new(),
        }
    }

    /// Back to the facades with everything closed
    fn reset(&mut self, now: Instant) -> Vec<Effect> {
        self.carousel.close();
        self.fullscreen.close();
        self.opening = None;
        self.notice = None;
        self.idle.dismiss(now);
        if self.section == Section::Facades {
            return Vec::new();
        }
        self.section = Section::Facades;
        self.groups.clear();
        self.loading = true;
        vec![Effect::Load(Section::Facades)]
    }

    pub fn update(&mut self, message: ShowcaseMessage, now: Instant) -> Vec<Effect> {
        self.clock = now;
        match message {
            ShowcaseMessage::SelectSection(section) => {
                self.section = section;
                self.groups.clear();
                self.loading = true;
                self.notice = None;
                vec![Effect::Track(TrackEvent::Tab(section)), Effect::Load(section)]
            }
            ShowcaseMessage::Loaded(section, result) => {
                if section != self.section {
                    return Vec::new();
                }
                self.loading = false;
                match result {
                    Ok(groups) => {
                        let urls = groups
                            .iter()
                            .flat_map(|g| &g.colors)
                            .filter_map(|c| c.presentation.as_ref().map(|p| p.url.clone()))
                            .collect();
                        self.groups = groups;
                        vec![Effect::FetchThumbnails(urls)]
                    }
                    Err(e) => {
                        warn!(section = section.slug(), "showcase load failed: {e}");
                        self.notice = Some(format!("Could not load {}: {e}", section.label()));
                        Vec::new()
                    }
                }
            }
            ShowcaseMessage::OpenBubble { color_id, name } => {
                self.opening = Some(color_id);
                self.notice = None;
                vec![
                    Effect::Track(TrackEvent::Bubble(color_id)),
                    Effect::FetchImages { color_id, name },
                ]
            }
            ShowcaseMessage::BubbleImages { color_id, name, result } => {
                if self.opening != Some(color_id) {
                    return Vec::new();
                }
                self.opening = None;
                match result {
                    Ok(images) => {
                        let urls = carousel_urls(&images);
                        if self.carousel.open(&name, color_id, urls.clone()) {
                            vec![Effect::FetchThumbnails(urls)]
                        } else {
                            self.notice = Some(format!("No images for {name} yet."));
                            Vec::new()
                        }
                    }
                    Err(e) => {
                        warn!(color_id, "carousel images failed: {e}");
                        self.notice = Some(format!("Could not load images: {e}"));
                        Vec::new()
                    }
                }
            }
            ShowcaseMessage::Next => {
                self.carousel.next();
                Vec::new()
            }
            ShowcaseMessage::Prev => {
                self.carousel.prev();
                Vec::new()
            }
            ShowcaseMessage::GoTo(index) => {
                self.carousel.go_to(index);
                Vec::new()
            }
            ShowcaseMessage::Swipe(release) => match release {
                Release::SwipeNext => self.update(ShowcaseMessage::Next, now),
                Release::SwipePrev => self.update(ShowcaseMessage::Prev, now),
                Release::Tap => self.update(ShowcaseMessage::OpenFullscreen, now),
                Release::Nothing => Vec::new(),
            },
            ShowcaseMessage::CloseCarousel => {
                self.fullscreen.close();
                self.carousel.close();
                Vec::new()
            }
            ShowcaseMessage::OpenFullscreen => match self.carousel.current() {
                Some(url) => {
                    self.fullscreen.open(url);
                    vec![Effect::Track(TrackEvent::Image(self.carousel.color_id()))]
                }
                None => Vec::new(),
            },
            ShowcaseMessage::CloseFullscreen => {
                self.fullscreen.close();
                Vec::new()
            }
            ShowcaseMessage::Escape => {
                if self.fullscreen.is_open() {
                    self.fullscreen.close();
                } else {
                    self.carousel.close();
                }
                Vec::new()
            }
            ShowcaseMessage::Continue => {
                self.idle.dismiss(now);
                Vec::new()
            }
            ShowcaseMessage::Reset | ShowcaseMessage::Home => {
                let mut effects = self.reset(now);
                effects.push(Effect::StopBeacon);
                effects
            }
        }
    }

    pub fn view<'a>(&'a self, thumbnails: &'a Thumbnails) -> Element<'a, ShowcaseMessage> {
        let header = row![
            section_tabs(self.section, ShowcaseMessage::SelectSection),
            horizontal_space(),
            button(text("Home")).style(button::secondary).on_press(ShowcaseMessage::Home),
        ]
        .align_y(Alignment::Center);

        let mut content = column![header].spacing(20).padding(24);
        if let Some(notice) = &self.notice {
            content = content.push(text(notice).size(14));
        }
        if self.loading {
            content = content.push(text("Loading...").size(14));
        }
        let mut groups = column![].spacing(28);
        for group in &self.groups {
            groups = groups.push(self.group_view(group, thumbnails));
        }
        content = content.push(scrollable(groups).height(Length::Fill));

        let mut screen: Element<'a, ShowcaseMessage> = content.into();
        if self.carousel.is_open() {
            screen = modal(screen, self.carousel_view(thumbnails), ShowcaseMessage::CloseCarousel);
        }
        if let Some(url) = self.fullscreen.url() {
            screen = stack![screen, fullscreen_view(thumbnails.get(url))].into();
        }
        if self.prompt_visible() {
            let seconds = self.idle.remaining(self.clock).unwrap_or(0);
            let prompt = dialog(
                format!("Still there? The showcase resets in {seconds} s."),
                vec![
                    button(text("Continue"))
                        .style(button::primary)
                        .on_press(ShowcaseMessage::Continue)
                        .into(),
                    button(text("Reset"))
                        .style(button::secondary)
                        .on_press(ShowcaseMessage::Reset)
                        .into(),
                ],
            );
            screen = modal(screen, prompt, ShowcaseMessage::Continue);
        }
        screen
    }

    fn group_view<'a>(&'a self, group: &'a Group, thumbnails: &'a Thumbnails) -> Element<'a, ShowcaseMessage> {
        let bubbles = group
            .colors
            .iter()
            .map(|color| {
                let handle = color.presentation.as_ref().and_then(|p| thumbnails.get(&p.url));
                let bubble = column![thumbnail(handle, BUBBLE_SIZE), text(&color.name).size(14)]
                    .spacing(6)
                    .align_x(Alignment::Center);
                mouse_area(bubble)
                    .on_press(ShowcaseMessage::OpenBubble {
                        color_id: color.id,
                        name: color.name.clone(),
                    })
                    .into()
            })
            .collect();
        column![
            text(&group.name).size(22),
            Wrap::with_elements(bubbles).spacing(16.0).line_spacing(16.0),
        ]
        .spacing(12)
        .into()
    }

    fn carousel_view<'a>(&'a self, thumbnails: &'a Thumbnails) -> Element<'a, ShowcaseMessage> {
        let slides = self.carousel.slides();
        let single = self.carousel.urls().len() == 1;
        let mut strip = row![].spacing(16).align_y(Alignment::Center);
        for slide in slides {
            let handle = thumbnails.get(slide.url);
            let counter = text(self.carousel.counter(slide.index)).size(12);
            let tile: Element<'a, ShowcaseMessage> = match slide.role {
                SlideRole::Active => {
                    let (w, h) = ACTIVE_SLIDE;
                    let surface: Element<'a, Release> = canvas(SwipeSurface)
                        .width(Length::Fixed(w))
                        .height(Length::Fixed(h))
                        .into();
                    column![
                        stack![slide_image(handle, w, h), surface.map(ShowcaseMessage::Swipe)],
                        counter
                    ]
                    .spacing(6)
                    .align_x(Alignment::Center)
                    .into()
                }
                SlideRole::Prev | SlideRole::Next if single => continue,
                SlideRole::Prev | SlideRole::Next => {
                    let (w, h) = SIDE_SLIDE;
                    mouse_area(
                        column![slide_image(handle, w, h), counter]
                            .spacing(6)
                            .align_x(Alignment::Center),
                    )
                    .on_press(ShowcaseMessage::GoTo(slide.index))
                    .into()
                }
            };
            strip = strip.push(tile);
        }

        let controls = row![
            button(text("‹")).on_press_maybe((!single).then_some(ShowcaseMessage::Prev)),
            button(text("Fullscreen")).on_press(ShowcaseMessage::OpenFullscreen),
            button(text("›")).on_press_maybe((!single).then_some(ShowcaseMessage::Next)),
            horizontal_space(),
            button(text("Close"))
                .style(button::secondary)
                .on_press(ShowcaseMessage::CloseCarousel),
        ]
        .spacing(10);

        container(
            column![text(self.carousel.title()).size(24), strip, controls]
                .spacing(16)
                .align_x(Alignment::Center),
        )
        .padding(20)
        .style(container::rounded_box)
        .into()
    }
}

fn slide_image<'a>(handle: Option<&image::Handle>, width: f32, height: f32) -> Element<'a, ShowcaseMessage> {
    match handle {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .content_fit(ContentFit::Contain)
            .into(),
        None => container(text("Loading...").size(12))
            .center_x(Length::Fixed(width))
            .center_y(Length::Fixed(height))
            .style(container::bordered_box)
            .into(),
    }
}

/// Black full-window layer with the image and the zoom lock on top
fn fullscreen_view<'a>(handle: Option<&image::Handle>) -> Element<'a, ShowcaseMessage> {
    let picture: Element<'a, ShowcaseMessage> = match handle {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Contain)
            .into(),
        None => container(text("Loading...")).center(Length::Fill).into(),
    };
    let lock: Element<'a, _> = canvas(ZoomLockSurface)
        .width(Length::Fill)
        .height(Length::Fill)
        .into();
    opaque(
        container(stack![picture, lock.map(|_| ShowcaseMessage::CloseFullscreen)])
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Color::BLACK.into()),
                ..container::Style::default()
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::state::data::fixtures::{self, image};

    fn showcase(now: Instant) -> Showcase {
        let mut showcase = Showcase::new(Duration::from_secs(60), 15, now);
        showcase.enter(now);
        showcase.update(ShowcaseMessage::Loaded(Section::Facades, Ok(fixtures::catalog())), now);
        showcase
    }

    fn gallery(ids: &[i64]) -> ColorImages {
        ColorImages {
            presentation: Some(image(100, true)),
            gallery: ids.iter().map(|id| image(*id, false)).collect(),
        }
    }

    fn open_carousel(showcase: &mut Showcase, now: Instant, ids: &[i64]) {
        let open = ShowcaseMessage::OpenBubble { color_id: 1, name: "Chêne".into() };
        showcase.update(open, now);
        showcase.update(
            ShowcaseMessage::BubbleImages {
                color_id: 1,
                name: "Chêne".into(),
                result: Ok(gallery(ids)),
            },
            now,
        );
    }

    #[test]
    fn starts_in_initial_state() {
        let now = Instant::now();
        let mut showcase = Showcase::new(Duration::from_secs(60), 15, now);
        assert!(showcase.at_initial_state());
        assert_eq!(showcase.enter(now), vec![Effect::Load(Section::Facades)]);
    }

    #[test]
    fn section_tab_is_tracked_and_loaded() {
        let now = Instant::now();
        let mut showcase = showcase(now);
        let effects = showcase.update(ShowcaseMessage::SelectSection(Section::Plans), now);
        assert_eq!(
            effects,
            vec![Effect::Track(TrackEvent::Tab(Section::Plans)), Effect::Load(Section::Plans)]
        );
        assert!(!showcase.at_initial_state());
    }

    #[test]
    fn stale_section_load_is_dropped() {
        let now = Instant::now();
        let mut showcase = showcase(now);
        showcase.update(ShowcaseMessage::SelectSection(Section::Plans), now);
        let late = showcase.update(ShowcaseMessage::Loaded(Section::Facades, Ok(fixtures::catalog())), now);
        assert!(late.is_empty());
        assert!(showcase.groups.is_empty());
    }

    #[test]
    fn bubble_opens_carousel_with_gallery() {
        let now = Instant::now();
        let mut showcase = showcase(now);
        let effects =
            showcase.update(ShowcaseMessage::OpenBubble { color_id: 1, name: "Chêne".into() }, now);
        assert_eq!(
            effects,
            vec![
                Effect::Track(TrackEvent::Bubble(1)),
                Effect::FetchImages { color_id: 1, name: "Chêne".into() },
            ]
        );
        let effects = showcase.update(
            ShowcaseMessage::BubbleImages {
                color_id: 1,
                name: "Chêne".into(),
                result: Ok(gallery(&[5, 6])),
            },
            now,
        );
        assert!(showcase.carousel().is_open());
        assert_eq!(showcase.carousel().title(), "Chêne");
        assert!(matches!(&effects[..], [Effect::FetchThumbnails(urls)] if urls.len() == 2));
    }

    #[test]
    fn color_without_gallery_never_opens_carousel() {
        let now = Instant::now();
        let mut showcase = showcase(now);
        open_carousel(&mut showcase, now, &[]);
        assert!(!showcase.carousel().is_open());
        assert!(showcase.notice.is_some());
    }

    #[test]
    fn images_for_another_bubble_are_ignored() {
        let now = Instant::now();
        let mut showcase = showcase(now);
        showcase.update(ShowcaseMessage::OpenBubble { color_id: 2, name: "Noyer".into() }, now);
        showcase.update(
            ShowcaseMessage::BubbleImages {
                color_id: 1,
                name: "Chêne".into(),
                result: Ok(gallery(&[5])),
            },
            now,
        );
        assert!(!showcase.carousel().is_open());
    }

    #[test]
    fn failed_image_fetch_shows_notice() {
        let now = Instant::now();
        let mut showcase = showcase(now);
        showcase.update(ShowcaseMessage::OpenBubble { color_id: 1, name: "Chêne".into() }, now);
        showcase.update(
            ShowcaseMessage::BubbleImages {
                color_id: 1,
                name: "Chêne".into(),
                result: Err(ApiError::Network("offline".into())),
            },
            now,
        );
        assert!(!showcase.carousel().is_open());
        assert!(showcase.notice.as_deref().is_some_and(|n| n.contains("offline")));
    }

    #[test]
    fn swipes_navigate_and_tap_goes_fullscreen() {
        let now = Instant::now();
        let mut showcase = showcase(now);
        open_carousel(&mut showcase, now, &[5, 6, 7]);

        showcase.update(ShowcaseMessage::Swipe(Release::SwipePrev), now);
        assert_eq!(showcase.carousel().index(), 2);
        showcase.update(ShowcaseMessage::Swipe(Release::SwipeNext), now);
        assert_eq!(showcase.carousel().index(), 0);

        let effects = showcase.update(ShowcaseMessage::Swipe(Release::Tap), now);
        assert_eq!(effects, vec![Effect::Track(TrackEvent::Image(Some(1)))]);
        assert_eq!(showcase.fullscreen().url(), showcase.carousel().current());
    }

    #[test]
    fn escape_closes_fullscreen_before_carousel() {
        let now = Instant::now();
        let mut showcase = showcase(now);
        open_carousel(&mut showcase, now, &[5]);
        showcase.update(ShowcaseMessage::OpenFullscreen, now);

        showcase.update(ShowcaseMessage::Escape, now);
        assert!(!showcase.fullscreen().is_open());
        assert!(showcase.carousel().is_open());
        showcase.update(ShowcaseMessage::Escape, now);
        assert!(showcase.at_initial_state());
    }

    #[test]
    fn home_resets_and_stops_beacon() {
        let now = Instant::now();
        let mut showcase = showcase(now);
        showcase.update(ShowcaseMessage::SelectSection(Section::Espaces), now);
        open_carousel(&mut showcase, now, &[5]);

        let effects = showcase.update(ShowcaseMessage::Home, now);

        assert_eq!(effects, vec![Effect::Load(Section::Facades), Effect::StopBeacon]);
        assert!(showcase.at_initial_state());
    }

    #[test]
    fn countdown_expiry_resets_without_stopping_beacon() {
        let t0 = Instant::now();
        let mut showcase = showcase(t0);
        open_carousel(&mut showcase, t0, &[5, 6]);

        assert!(showcase.tick(t0 + Duration::from_secs(61)).is_empty());
        assert!(showcase.prompt_visible());
        // Input does not restart the delay while the prompt is up
        showcase.activity(t0 + Duration::from_secs(65));
        assert!(showcase.prompt_visible());

        let effects = showcase.tick(t0 + Duration::from_secs(77));
        assert!(effects.is_empty());
        assert!(showcase.at_initial_state());
        assert!(!showcase.prompt_visible());
    }

    #[test]
    fn no_prompt_in_initial_state() {
        let t0 = Instant::now();
        let mut showcase = showcase(t0);
        showcase.tick(t0 + Duration::from_secs(120));
        assert!(!showcase.prompt_visible());
    }

    #[test]
    fn continue_dismisses_prompt() {
        let t0 = Instant::now();
        let mut showcase = showcase(t0);
        open_carousel(&mut showcase, t0, &[5]);
        showcase.tick(t0 + Duration::from_secs(60));
        assert!(showcase.prompt_visible());

        showcase.update(ShowcaseMessage::Continue, t0 + Duration::from_secs(62));

        assert!(!showcase.prompt_visible());
        assert!(showcase.carousel().is_open());
    }
}
