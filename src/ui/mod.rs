/// User interface
///
/// This module handles:
/// - The sorted catalog view model and inline editor (tree.rs)
/// - The editable catalog (library.rs)
/// - The color image modal (color_modal.rs)
/// - The add-color form (add_color.rs)
/// - User administration (users.rs)
/// - The public-facing showcase (showcase.rs)

pub mod add_color;
pub mod color_modal;
pub mod library;
pub mod showcase;
pub mod tree;
pub mod users;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use iced::widget::{button, center, container, image, mouse_area, opaque, row, stack, text};
use iced::{Color, ContentFit, Element, Length};

use crate::state::data::Section;
use tree::EditTarget;

/// Second press on the same target within this counts as a double click
const DOUBLE_PRESS: Duration = Duration::from_millis(300);

/// Top-level pages of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Library,
    Showcase,
    Users,
    Performance,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Screen::Library => "Catalog",
            Screen::Showcase => "Showcase",
            Screen::Users => "Users",
            Screen::Performance => "Performance",
        }
    }
}

/// Destructive action waiting for a yes/no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    DeleteImage { color_id: i64, image_id: i64 },
    ResetPassword(i64),
    DeleteUser(i64),
}

impl Confirmation {
    pub fn prompt(self) -> &'static str {
        match self {
            Confirmation::DeleteImage { .. } => "Delete this image?",
            Confirmation::ResetPassword(_) => "Send a password reset to this user?",
            Confirmation::DeleteUser(_) => "Delete this user?",
        }
    }
}

/// What a press landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressTarget {
    Name(EditTarget),
    Image(i64),
}

/// Turns single presses from mouse areas into double clicks
#[derive(Debug, Default)]
pub struct DoublePress {
    last: Option<(PressTarget, Instant)>,
}

impl DoublePress {
    /// Record a press, returning true when it completes a double click.
    /// A completed double click is forgotten so a third press starts over.
    pub fn press(&mut self, target: PressTarget, now: Instant) -> bool {
        match self.last.take() {
            Some((last, at)) if last == target && now.duration_since(at) <= DOUBLE_PRESS => true,
            _ => {
                self.last = Some((target, now));
                false
            }
        }
    }
}

/// Thumbnails fetched from the backend, keyed by URL
pub type Thumbnails = HashMap<String, image::Handle>;

/// Lay `content` over `base`, dimming it. Pressing the backdrop emits
/// `on_blur`.
pub fn modal<'a, Message>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
    on_blur: Message,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    stack![
        base.into(),
        opaque(
            mouse_area(center(opaque(content)).style(|_theme| {
                container::Style {
                    background: Some(
                        Color {
                            a: 0.8,
                            ..Color::BLACK
                        }
                        .into(),
                    ),
                    ..container::Style::default()
                }
            }))
            .on_press(on_blur)
        )
    ]
    .into()
}

/// Square thumbnail, or a placeholder while the image is missing
pub fn thumbnail<'a, Message: 'a>(handle: Option<&image::Handle>, size: f32) -> Element<'a, Message> {
    match handle {
        Some(handle) => image(handle.clone())
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .content_fit(ContentFit::Cover)
            .into(),
        None => container(text("No image").size(12))
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .center_x(Length::Fixed(size))
            .center_y(Length::Fixed(size))
            .style(container::bordered_box)
            .into(),
    }
}

/// Row of section tabs, the active one highlighted
pub fn section_tabs<'a, Message: Clone + 'a>(
    active: Section,
    on_select: impl Fn(Section) -> Message,
) -> Element<'a, Message> {
    row(Section::ALL.into_iter().map(|section| {
        let tab = button(text(section.label()).size(14)).padding([6, 12]);
        let tab = if section == active {
            tab.style(button::primary)
        } else {
            tab.style(button::secondary).on_press(on_select(section))
        };
        tab.into()
    }))
    .spacing(6)
    .into()
}

/// Modal dialog body with a message and buttons
pub fn dialog<'a, Message: Clone + 'a>(
    body: String,
    buttons: Vec<Element<'a, Message>>,
) -> Element<'a, Message> {
    container(
        iced::widget::column![text(body).size(16), row(buttons).spacing(10)]
            .spacing(20)
            .max_width(420),
    )
    .padding(24)
    .style(container::rounded_box)
    .into()
}
