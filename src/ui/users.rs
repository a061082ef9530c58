//! User administration table and "add user" form.

use iced::widget::{button, column, container, pick_list, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length};

use crate::state::data::Role;
use crate::state::users::{NewUserForm, UserDirectory};
use crate::Message;

/// Text fields of the add form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    FirstName,
    LastName,
    Email,
}

impl UserField {
    pub fn apply(self, form: &mut NewUserForm, value: String) {
        match self {
            UserField::FirstName => form.first_name = value,
            UserField::LastName => form.last_name = value,
            UserField::Email => form.email = value,
        }
    }
}

pub fn view(directory: &UserDirectory, busy: bool) -> Element<'_, Message> {
    let header = row![
        text("Name").width(Length::FillPortion(3)),
        text("Email").width(Length::FillPortion(4)),
        text("Role").width(Length::FillPortion(2)),
        text("").width(Length::FillPortion(4)),
    ]
    .spacing(10);

    let mut table = column![header].spacing(8);
    for user in directory.users() {
        let id = user.id;
        let full_name = format!("{} {}", user.first_name, user.last_name);
        table = table.push(
            row![
                text(full_name.trim().to_string()).width(Length::FillPortion(3)),
                text(&user.email).width(Length::FillPortion(4)),
                pick_list(Role::ALL, Some(user.role), move |role| Message::ChangeRole(id, role))
                    .width(Length::FillPortion(2)),
                row![
                    button(text("Reset password").size(13))
                        .style(button::secondary)
                        .on_press(Message::AskResetPassword(id)),
                    button(text("Delete").size(13))
                        .style(button::danger)
                        .on_press(Message::AskDeleteUser(id)),
                ]
                .spacing(6)
                .width(Length::FillPortion(4)),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
        );
    }
    if directory.users().is_empty() {
        table = table.push(text("No users.").size(14));
    }

    let form = &directory.form;
    let add = container(
        column![
            text("Add a user").size(18),
            row![
                text_input("First name", &form.first_name)
                    .on_input(|v| Message::NewUserField(UserField::FirstName, v)),
                text_input("Last name", &form.last_name)
                    .on_input(|v| Message::NewUserField(UserField::LastName, v)),
                text_input("Email", &form.email)
                    .on_input(|v| Message::NewUserField(UserField::Email, v))
                    .on_submit(Message::CreateUser),
                pick_list(Role::ALL, Some(form.role), Message::NewUserRole),
                button(text("Create"))
                    .style(button::primary)
                    .on_press_maybe((!busy).then_some(Message::CreateUser)),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        ]
        .spacing(10),
    )
    .padding(16)
    .style(container::bordered_box);

    column![text("Users").size(24), scrollable(table).height(Length::Fill), add]
        .spacing(16)
        .padding(20)
        .into()
}
