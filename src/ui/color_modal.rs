//! Modal editing the images of one color.

use iced::widget::{button, column, container, mouse_area, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use super::thumbnail;
use super::tree::{EditTarget, EditorExit, InlineEditor};
use super::Thumbnails;
use crate::state::data::ColorImages;
use crate::state::gallery::{ColorGallery, PresentationState};
use crate::state::queue::PendingQueue;
use crate::Message;

const COVER_SIZE: f32 = 200.0;
const TILE_SIZE: f32 = 110.0;

#[derive(Debug)]
pub struct ColorModal {
    pub color_id: i64,
    gallery: Option<ColorGallery>,
    /// A presentation or upload request is in flight
    busy: bool,
}

impl ColorModal {
    pub fn new(color_id: i64) -> Self {
        Self { color_id, gallery: None, busy: false }
    }

    #[cfg(test)]
    pub fn gallery(&self) -> Option<&ColorGallery> {
        self.gallery.as_ref()
    }

    pub fn gallery_mut(&mut self) -> Option<&mut ColorGallery> {
        self.gallery.as_mut()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Current cover id, passed along so the server call can drop it
    pub fn presentation(&self) -> PresentationState {
        self.gallery
            .as_ref()
            .map_or(PresentationState::Missing, ColorGallery::state)
    }

    /// Take fresh images for `color_id`. Returns false when they belong to
    /// a color that is no longer open.
    pub fn accept(&mut self, color_id: i64, images: ColorImages, queue: &PendingQueue) -> bool {
        if color_id != self.color_id {
            return false;
        }
        self.busy = false;
        self.gallery
            .get_or_insert_with(|| ColorGallery::new(color_id, ColorImages::default()))
            .refresh(images, queue);
        true
    }

    /// URLs the view wants thumbnails for
    pub fn image_urls(&self) -> Vec<String> {
        let Some(gallery) = &self.gallery else {
            return Vec::new();
        };
        gallery
            .presentation()
            .into_iter()
            .cloned()
            .chain(gallery.visible())
            .map(|image| image.url)
            .collect()
    }

    pub fn view<'a>(
        &'a self,
        name: &'a str,
        editor: Option<&'a InlineEditor>,
        thumbnails: &'a Thumbnails,
    ) -> Element<'a, Message> {
        let target = EditTarget::Color(self.color_id);
        let title: Element<'a, Message> = match editor {
            Some(editor) if editor.target == target => text_input("Color name", &editor.draft)
                .on_input(Message::EditDraft)
                .on_submit(Message::FinishEdit(EditorExit::Enter))
                .size(22)
                .into(),
            _ => mouse_area(text(name).size(22))
                .on_press(Message::NamePressed(target, name.to_string()))
                .into(),
        };

        let body: Element<'a, Message> = match &self.gallery {
            None => text("Loading images...").into(),
            Some(gallery) => self.gallery_view(gallery, thumbnails),
        };

        let close = button(text("Close"))
            .style(button::secondary)
            .on_press(Message::CloseColorModal);

        container(column![title, body, close].spacing(16).max_width(760))
            .padding(24)
            .style(container::rounded_box)
            .into()
    }

    fn gallery_view<'a>(&'a self, gallery: &'a ColorGallery, thumbnails: &'a Thumbnails) -> Element<'a, Message> {
        let busy = self.busy;
        let cover: Element<'a, Message> = match gallery.presentation() {
            Some(image) => column![
                thumbnail(thumbnails.get(&image.url), COVER_SIZE),
                button(text("Replace cover").size(13))
                    .style(button::secondary)
                    .on_press_maybe((!busy).then_some(Message::ReplacePresentation)),
            ]
            .spacing(6)
            .align_x(Alignment::Center)
            .into(),
            None => button(
                container(text("+ Add cover"))
                    .center_x(Length::Fixed(COVER_SIZE))
                    .center_y(Length::Fixed(COVER_SIZE)),
            )
            .style(button::secondary)
            .on_press_maybe((!busy).then_some(Message::ReplacePresentation))
            .into(),
        };

        let visible = gallery.visible();
        let count = visible.len();
        let tiles = visible
            .iter()
            .enumerate()
            .map(|(index, image)| {
                let picture = mouse_area(thumbnail(thumbnails.get(&image.url), TILE_SIZE))
                    .on_press(Message::ImagePressed(image.id));
                let controls = row![
                    button(text("←").size(11))
                        .style(button::text)
                        .on_press_maybe((index > 0).then(|| Message::MoveImage { from: index, to: index - 1 })),
                    text(gallery.counter(index)).size(11),
                    button(text("→").size(11)).style(button::text).on_press_maybe(
                        (index + 1 < count).then(|| Message::MoveImage { from: index, to: index + 1 })
                    ),
                    button(text("✕").size(11))
                        .style(button::text)
                        .on_press(Message::AskDeleteImage(image.id)),
                ]
                .spacing(2)
                .align_y(Alignment::Center);
                column![picture, controls].spacing(4).align_x(Alignment::Center).into()
            })
            .collect();

        let add = button(text(if busy { "Uploading..." } else { "Add images" }))
            .on_press_maybe((!busy).then_some(Message::AddGalleryImages));

        column![
            row![cover, text("Double-click an image to make it the cover.").size(12)]
                .spacing(20)
                .align_y(Alignment::Center),
            text(format!("Gallery ({count})")).size(16),
            scrollable(Wrap::with_elements(tiles).spacing(10.0).line_spacing(10.0))
                .height(Length::Fixed(320.0)),
            add,
        ]
        .spacing(12)
        .into()
    }
}
