//! Editable catalog: save banner, group cards and color bubbles.

use iced::widget::{button, column, container, horizontal_space, mouse_area, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use super::tree::{CatalogTree, ColorNode, EditTarget, EditorExit, GroupNode, InlineEditor};
use super::{section_tabs, thumbnail, Thumbnails};
use crate::{FacadeAdmin, Message};

const BUBBLE_SIZE: f32 = 96.0;

pub fn view(app: &FacadeAdmin) -> Element<'_, Message> {
    let tree = CatalogTree::build(app.session.groups());
    let editor = app.editor.as_ref();

    let mut content = column![section_tabs(app.session.section(), Message::SelectSection)]
        .spacing(16)
        .padding(20);

    let banner = app.session.banner();
    if banner.visible {
        content = content.push(save_banner(banner.text, app.saving));
    }

    let group_count = tree.groups.len();
    let mut groups = column![].spacing(24);
    for (index, group) in tree.groups.iter().enumerate() {
        groups = groups.push(group_card(group, index, group_count, editor, &app.thumbnails));
    }
    groups = groups.push(new_group_row(editor));

    if tree.groups.is_empty() && !app.loading {
        groups = groups.push(text("No groups in this section yet.").size(14));
    }

    content = content.push(scrollable(groups).height(Length::Fill));
    if !app.status.is_empty() {
        content = content.push(text(&app.status).size(12));
    }
    content.into()
}

fn save_banner<'a>(label: String, saving: bool) -> Element<'a, Message> {
    let save = button(text(if saving { "Saving..." } else { "Save" }))
        .style(button::success)
        .on_press_maybe((!saving).then_some(Message::Save));
    let cancel = button(text("Cancel"))
        .style(button::secondary)
        .on_press_maybe((!saving).then_some(Message::Cancel));
    container(
        row![text(label).size(16), horizontal_space(), save, cancel]
            .spacing(10)
            .align_y(Alignment::Center),
    )
    .padding(12)
    .style(container::rounded_box)
    .into()
}

/// Either the plain name or, while it is being edited, a text field
fn editable_name<'a>(
    target: EditTarget,
    name: String,
    size: u16,
    editor: Option<&'a InlineEditor>,
) -> Element<'a, Message> {
    match editor {
        Some(editor) if editor.target == target => text_input("Name", &editor.draft)
            .on_input(Message::EditDraft)
            .on_submit(Message::FinishEdit(EditorExit::Enter))
            .size(size)
            .width(Length::Fixed(220.0))
            .into(),
        _ => mouse_area(text(name.clone()).size(size))
            .on_press(Message::NamePressed(target, name))
            .into(),
    }
}

fn group_card<'a>(
    group: &GroupNode,
    index: usize,
    count: usize,
    editor: Option<&'a InlineEditor>,
    thumbnails: &'a Thumbnails,
) -> Element<'a, Message> {
    let target = EditTarget::Group(group.slug.clone());
    let header = row![
        editable_name(target.clone(), group.name.clone(), 20, editor),
        button(text("Rename").size(12))
            .style(button::text)
            .on_press(Message::StartEdit(target, group.name.clone())),
        horizontal_space(),
        button(text("↑").size(14))
            .style(button::secondary)
            .on_press_maybe((index > 0).then(|| Message::MoveGroup { from: index, to: index - 1 })),
        button(text("↓").size(14))
            .style(button::secondary)
            .on_press_maybe(
                (index + 1 < count).then(|| Message::MoveGroup { from: index, to: index + 1 })
            ),
        button(text("Delete").size(12))
            .style(button::danger)
            .on_press(Message::DeleteGroup(group.slug.clone())),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let color_count = group.colors.len();
    let bubbles: Vec<Element<'a, Message>> = group
        .colors
        .iter()
        .enumerate()
        .map(|(position, color)| bubble(&group.slug, color, position, color_count, editor, thumbnails))
        .collect();

    let add = button(text("+ Add color").size(13))
        .style(button::secondary)
        .on_press(Message::OpenAddColor(group.slug.clone()));

    container(
        column![
            header,
            Wrap::with_elements(bubbles).spacing(12.0).line_spacing(12.0),
            add
        ]
        .spacing(12),
    )
    .padding(16)
    .width(Length::Fill)
    .style(container::bordered_box)
    .into()
}

fn bubble<'a>(
    group_slug: &str,
    color: &ColorNode,
    position: usize,
    count: usize,
    editor: Option<&'a InlineEditor>,
    thumbnails: &'a Thumbnails,
) -> Element<'a, Message> {
    let handle = color.thumbnail_url.as_ref().and_then(|url| thumbnails.get(url));
    let picture = mouse_area(thumbnail(handle, BUBBLE_SIZE)).on_press(Message::OpenColor(color.id));

    let move_to = |to: usize| Message::MoveColor {
        group: group_slug.to_string(),
        from: position,
        to,
    };
    let controls = row![
        button(text("←").size(12))
            .style(button::text)
            .on_press_maybe((position > 0).then(|| move_to(position - 1))),
        button(text("→").size(12))
            .style(button::text)
            .on_press_maybe((position + 1 < count).then(|| move_to(position + 1))),
        button(text("✕").size(12))
            .style(button::text)
            .on_press(Message::DeleteColor(color.id)),
    ]
    .spacing(2);

    column![
        picture,
        editable_name(EditTarget::Color(color.id), color.name.clone(), 13, editor),
        text(format!("{} images", color.gallery_count)).size(11),
        controls,
    ]
    .spacing(4)
    .width(Length::Fixed(BUBBLE_SIZE + 24.0))
    .align_x(Alignment::Center)
    .into()
}

fn new_group_row(editor: Option<&InlineEditor>) -> Element<'_, Message> {
    match editor {
        Some(editor) if editor.target == EditTarget::NewGroup => row![
            text_input("New group name", &editor.draft)
                .on_input(Message::EditDraft)
                .on_submit(Message::FinishEdit(EditorExit::Enter))
                .width(Length::Fixed(260.0)),
            button(text("Create")).on_press(Message::FinishEdit(EditorExit::Enter)),
            button(text("Cancel"))
                .style(button::secondary)
                .on_press(Message::FinishEdit(EditorExit::Escape)),
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .into(),
        _ => button(text("+ Add group"))
            .style(button::secondary)
            .on_press(Message::StartEdit(EditTarget::NewGroup, String::new()))
            .into(),
    }
}
