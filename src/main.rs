use iced::event::{self, Event};
use iced::keyboard::{self, key};
use iced::widget::{button, center, column, image, row, text};
use iced::{mouse, time, window, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod analytics;
mod api;
mod config;
mod error;
mod state;
mod ui;
mod uploads;
mod viewer;

use analytics::Beacon;
use api::{CatalogApi, RemoteClient, UserApi};
use config::AppConfig;
use error::{ApiResult, CommitError, EditError};
use state::data::{find_color, ColorImages, Group, Role, Section, User};
use state::edit::{EditSession, RenameAction};
use state::users::{AccessChange, RoleChange, UserDirectory};
use state::{commit, gallery, users};
use ui::add_color::{AddColorForm, PreviewTarget};
use ui::color_modal::ColorModal;
use ui::showcase::{Effect, Showcase, ShowcaseMessage};
use ui::tree::{CatalogTree, EditTarget, EditorExit, EditorOutcome, InlineEditor};
use ui::users::UserField;
use ui::{Confirmation, DoublePress, PressTarget, Screen, Thumbnails};
use uploads::preview::{load_preview, PreviewImage};
use uploads::scan::{scan_folder_async, IMAGE_EXTENSIONS};

/// Main application state
pub struct FacadeAdmin {
    api: Arc<RemoteClient>,
    beacon: Beacon,
    screen: Screen,
    /// Catalog being edited, with its staged operations
    session: EditSession,
    loading: bool,
    editor: Option<InlineEditor>,
    presses: DoublePress,
    saving: bool,
    color_modal: Option<ColorModal>,
    add_color: Option<AddColorForm>,
    users: UserDirectory,
    users_busy: bool,
    is_admin: bool,
    showcase: Showcase,
    thumbnails: Thumbnails,
    /// URLs already fetched or being fetched
    requested: HashSet<String>,
    confirm: Option<Confirmation>,
    alert: Option<String>,
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    Navigate(Screen),
    SelectSection(Section),
    CatalogLoaded(Section, ApiResult<Vec<Group>>),
    /// Reload that follows an immediate change (rename, new group)
    CatalogReloaded(ApiResult<Vec<Group>>),
    ThumbnailFetched(String, ApiResult<Vec<u8>>),

    /// Press on a name; the second one in quick succession starts a rename
    NamePressed(EditTarget, String),
    StartEdit(EditTarget, String),
    EditDraft(String),
    FinishEdit(EditorExit),

    MoveGroup { from: usize, to: usize },
    MoveColor { group: String, from: usize, to: usize },
    DeleteGroup(String),
    DeleteColor(i64),
    Save,
    Cancel,
    Saved(Result<Vec<Group>, CommitError>),

    OpenColor(i64),
    CloseColorModal,
    GalleryUpdated(i64, ApiResult<ColorImages>),
    ReplacePresentation,
    /// Press on a gallery tile; a double press promotes it
    ImagePressed(i64),
    PromoteImage(i64),
    MoveImage { from: usize, to: usize },
    AskDeleteImage(i64),
    AddGalleryImages,

    OpenAddColor(String),
    AddColorName(String),
    PickFiles(PreviewTarget),
    PickFolder,
    FilesChosen(PreviewTarget, Vec<PathBuf>),
    PreviewReady(PathBuf, Option<PreviewImage>),
    RemovePreview(PreviewTarget, usize),
    SubmitAddColor,
    AddColorDone(ApiResult<Vec<Group>>),
    CloseAddColor,

    UsersLoaded(ApiResult<Vec<User>>),
    NewUserField(UserField, String),
    NewUserRole(Role),
    CreateUser,
    UserCreated(ApiResult<Vec<User>>),
    ChangeRole(i64, Role),
    RoleChanged(RoleChange),
    AskResetPassword(i64),
    AskDeleteUser(i64),
    PasswordReset(ApiResult<()>),
    UserDeleted(ApiResult<Vec<User>>),

    Showcase(ShowcaseMessage),

    Confirm,
    DismissConfirm,
    DismissAlert,
    Tick(Instant),
    Activity,
    Escape,
    ArrowLeft,
    ArrowRight,
    WindowCloseRequested(window::Id),
    Ignore,
}

impl Message {
    /// Gestures that end an open inline rename the way leaving the field
    /// would
    fn blurs_editor(&self) -> bool {
        matches!(
            self,
            Message::Navigate(_)
                | Message::SelectSection(_)
                | Message::StartEdit(..)
                | Message::MoveGroup { .. }
                | Message::MoveColor { .. }
                | Message::DeleteGroup(_)
                | Message::DeleteColor(_)
                | Message::Save
                | Message::Cancel
                | Message::OpenColor(_)
                | Message::CloseColorModal
                | Message::OpenAddColor(_)
                | Message::ReplacePresentation
                | Message::PromoteImage(_)
                | Message::MoveImage { .. }
                | Message::AskDeleteImage(_)
                | Message::AddGalleryImages
        )
    }

    /// Local edits refused while a save is replaying
    fn is_edit_gesture(&self) -> bool {
        matches!(
            self,
            Message::StartEdit(..)
                | Message::MoveGroup { .. }
                | Message::MoveColor { .. }
                | Message::DeleteGroup(_)
                | Message::DeleteColor(_)
                | Message::MoveImage { .. }
                | Message::SelectSection(_)
        )
    }
}

impl FacadeAdmin {
    /// Create a new instance of the application
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        // The app cannot talk to anything without its HTTP client
        let api = Arc::new(
            RemoteClient::new(&config)
                .expect("Failed to build the HTTP client. Check the configured base URL."),
        );
        let beacon = Beacon::new(api.clone(), config.client_id.clone().unwrap_or_default());
        let now = Instant::now();
        let showcase = Showcase::new(
            Duration::from_secs(config.inactivity_delay_secs),
            config.countdown_secs,
            now,
        );
        info!(base_url = %config.base_url, section = config.section.slug(), "facade admin started");

        let mut app = FacadeAdmin {
            api,
            beacon,
            screen: Screen::Library,
            session: EditSession::new(config.section, config.edit_policy()),
            loading: false,
            editor: None,
            presses: DoublePress::default(),
            saving: false,
            color_modal: None,
            add_color: None,
            users: UserDirectory::new(config.current_user_id),
            users_busy: false,
            is_admin: config.is_admin,
            showcase,
            thumbnails: Thumbnails::new(),
            requested: HashSet::new(),
            confirm: None,
            alert: None,
            status: String::from("Loading catalog..."),
        };
        let task = app.load_catalog();
        (app, task)
    }

    fn catalog(&self) -> Arc<dyn CatalogApi> {
        self.api.clone()
    }

    fn user_api(&self) -> Arc<dyn UserApi> {
        self.api.clone()
    }

    fn load_catalog(&mut self) -> Task<Message> {
        let section = self.session.section();
        self.loading = true;
        Task::perform(commit::load(self.catalog(), section), move |result| {
            Message::CatalogLoaded(section, result)
        })
    }

    /// Install a fresh catalog and fetch the cover thumbnails it shows
    fn install_catalog(&mut self, groups: Vec<Group>) -> Task<Message> {
        self.loading = false;
        self.session.load(groups);
        let urls: Vec<String> = self
            .session
            .groups()
            .iter()
            .flat_map(|g| &g.colors)
            .filter_map(|c| c.presentation.as_ref().map(|p| p.url.clone()))
            .collect();
        self.fetch_thumbnails(urls)
    }

    fn fetch_thumbnails(&mut self, urls: Vec<String>) -> Task<Message> {
        let fresh: Vec<String> = urls
            .into_iter()
            .filter(|url| !url.is_empty() && self.requested.insert(url.clone()))
            .collect();
        if fresh.is_empty() {
            return Task::none();
        }
        debug!(count = fresh.len(), "fetching thumbnails");
        Task::batch(fresh.into_iter().map(|url| {
            let api = self.catalog();
            Task::perform(
                async move {
                    let bytes = api.fetch_image(&url).await;
                    (url, bytes)
                },
                |(url, bytes)| Message::ThumbnailFetched(url, bytes),
            )
        }))
    }

    fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("{message}");
        self.alert = Some(message);
    }

    /// Close the inline editor and act on its contents
    fn finish_edit(&mut self, exit: EditorExit) -> Task<Message> {
        let Some(editor) = self.editor.take() else {
            return Task::none();
        };
        let section = self.session.section();
        match (editor.target.clone(), editor.finish(exit)) {
            (EditTarget::NewGroup, EditorOutcome::Submit(name)) => Task::perform(
                commit::create_group(self.catalog(), name, section),
                Message::CatalogReloaded,
            ),
            (EditTarget::NewGroup, EditorOutcome::Revert) => {
                if exit == EditorExit::Enter {
                    self.show_error(EditError::EmptyName.to_string());
                }
                Task::none()
            }
            (_, EditorOutcome::Revert) => Task::none(),
            (EditTarget::Group(slug), EditorOutcome::Submit(name)) => {
                let action = self.session.rename_group(&slug, &name);
                self.route_rename(action)
            }
            (EditTarget::Color(id), EditorOutcome::Submit(name)) => {
                let action = self.session.rename_color(id, &name);
                self.route_rename(action)
            }
        }
    }

    fn route_rename(&mut self, action: Result<RenameAction, EditError>) -> Task<Message> {
        match action {
            Ok(RenameAction::Remote(op)) => Task::perform(
                commit::apply_immediate(self.catalog(), op, self.session.section()),
                Message::CatalogReloaded,
            ),
            Ok(RenameAction::Queued | RenameAction::Revert) => Task::none(),
            Err(e) => {
                self.show_error(e.to_string());
                Task::none()
            }
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> Task<Message> {
        let mut tasks = Vec::with_capacity(effects.len());
        for effect in effects {
            let task = match effect {
                Effect::Load(section) => {
                    Task::perform(commit::load(self.catalog(), section), move |result| {
                        Message::Showcase(ShowcaseMessage::Loaded(section, result))
                    })
                }
                Effect::FetchImages { color_id, name } => {
                    Task::perform(gallery::load(self.catalog(), color_id), move |result| {
                        Message::Showcase(ShowcaseMessage::BubbleImages {
                            color_id,
                            name: name.clone(),
                            result,
                        })
                    })
                }
                Effect::FetchThumbnails(urls) => self.fetch_thumbnails(urls),
                Effect::Track(event) => {
                    let beacon = self.beacon.clone();
                    Task::perform(async move { beacon.track(event).await }, |_| Message::Ignore)
                }
                Effect::StopBeacon => {
                    let beacon = self.beacon.clone();
                    Task::perform(async move { beacon.stop().await }, |_| Message::Ignore)
                }
            };
            tasks.push(task);
        }
        Task::batch(tasks)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        if self.saving && message.is_edit_gesture() {
            debug!("edit ignored while saving");
            return Task::none();
        }
        let blur = if self.editor.is_some() && message.blurs_editor() {
            self.finish_edit(EditorExit::Blur)
        } else {
            Task::none()
        };
        let task = self.handle(message);
        Task::batch([blur, task])
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Navigate(screen) => {
                if screen == Screen::Users && !self.is_admin {
                    return Task::none();
                }
                self.screen = screen;
                match screen {
                    Screen::Showcase => {
                        let effects = self.showcase.enter(Instant::now());
                        self.run_effects(effects)
                    }
                    Screen::Users => Task::perform(users::load(self.user_api()), Message::UsersLoaded),
                    Screen::Library | Screen::Performance => Task::none(),
                }
            }
            Message::SelectSection(section) => match self.session.switch_section(section) {
                Ok(()) => self.load_catalog(),
                Err(e) => {
                    self.show_error(e.to_string());
                    Task::none()
                }
            },
            Message::CatalogLoaded(section, result) => {
                if section != self.session.section() {
                    debug!(section = section.slug(), "stale catalog dropped");
                    return Task::none();
                }
                match result {
                    Ok(groups) => {
                        self.status.clear();
                        self.install_catalog(groups)
                    }
                    Err(e) => {
                        self.loading = false;
                        self.status = format!("Could not load the catalog: {e}");
                        self.show_error(self.status.clone());
                        Task::none()
                    }
                }
            }
            Message::CatalogReloaded(result) => match result {
                Ok(groups) => self.install_catalog(groups),
                Err(e) => {
                    self.show_error(e.to_string());
                    Task::none()
                }
            },
            Message::ThumbnailFetched(url, result) => {
                match result {
                    Ok(bytes) => {
                        self.thumbnails.insert(url, image::Handle::from_bytes(bytes));
                    }
                    Err(e) => warn!(%url, "thumbnail fetch failed: {e}"),
                }
                Task::none()
            }

            Message::NamePressed(target, name) => {
                if self.presses.press(PressTarget::Name(target.clone()), Instant::now()) {
                    self.update(Message::StartEdit(target, name))
                } else {
                    Task::none()
                }
            }
            Message::ImagePressed(image_id) => {
                if self.presses.press(PressTarget::Image(image_id), Instant::now()) {
                    self.update(Message::PromoteImage(image_id))
                } else {
                    Task::none()
                }
            }
            Message::StartEdit(target, original) => {
                self.editor = Some(InlineEditor::start(target, &original));
                Task::none()
            }
            Message::EditDraft(draft) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.set_draft(draft);
                }
                Task::none()
            }
            Message::FinishEdit(exit) => self.finish_edit(exit),

            Message::MoveGroup { from, to } => {
                let tree = CatalogTree::build(self.session.groups());
                if let Some(slugs) = tree.group_order_after_move(from, to) {
                    self.session.reorder_groups(slugs);
                }
                Task::none()
            }
            Message::MoveColor { group, from, to } => {
                let tree = CatalogTree::build(self.session.groups());
                if let Some(ids) = tree.color_order_after_move(&group, from, to) {
                    if let Err(e) = self.session.reorder_colors(&group, ids) {
                        self.show_error(e.to_string());
                    }
                }
                Task::none()
            }
            Message::DeleteGroup(slug) => {
                if let Err(e) = self.session.delete_group(&slug) {
                    self.show_error(e.to_string());
                }
                Task::none()
            }
            Message::DeleteColor(id) => {
                if let Err(e) = self.session.delete_color(id) {
                    self.show_error(e.to_string());
                }
                Task::none()
            }
            Message::Save => {
                if self.saving || self.session.is_clean() {
                    return Task::none();
                }
                self.saving = true;
                self.status = String::from("Saving...");
                Task::perform(
                    commit::commit(self.catalog(), self.session.pending_ops(), self.session.section()),
                    Message::Saved,
                )
            }
            Message::Saved(outcome) => {
                self.saving = false;
                match self.session.settle_commit(outcome) {
                    None => {
                        self.status = String::from("Changes saved.");
                        let groups = self.session.groups().to_vec();
                        self.install_catalog(groups)
                    }
                    Some(err) => {
                        self.status.clear();
                        self.show_error(err.to_string());
                        Task::none()
                    }
                }
            }
            Message::Cancel => {
                if self.saving {
                    return Task::none();
                }
                self.session.cancel();
                self.status = String::from("Changes discarded.");
                // The open gallery may show a reverted order
                match self.color_modal.as_ref().map(|modal| modal.color_id) {
                    Some(id) => Task::perform(gallery::load(self.catalog(), id), move |result| {
                        Message::GalleryUpdated(id, result)
                    }),
                    None => Task::none(),
                }
            }

            Message::OpenColor(id) => {
                self.color_modal = Some(ColorModal::new(id));
                Task::perform(gallery::load(self.catalog(), id), move |result| {
                    Message::GalleryUpdated(id, result)
                })
            }
            Message::CloseColorModal => {
                if self.color_modal.take().is_none() {
                    return Task::none();
                }
                // Covers and image counts may have changed
                self.load_catalog()
            }
            Message::GalleryUpdated(id, result) => {
                let Some(modal) = self.color_modal.as_mut() else {
                    debug!(color_id = id, "images for a closed modal dropped");
                    return Task::none();
                };
                match result {
                    Ok(images) => {
                        if !modal.accept(id, images, self.session.queue()) {
                            debug!(color_id = id, "images for another color dropped");
                            return Task::none();
                        }
                        let urls = modal.image_urls();
                        self.fetch_thumbnails(urls)
                    }
                    Err(e) => {
                        if modal.color_id == id {
                            modal.set_busy(false);
                            self.show_error(e.to_string());
                        }
                        Task::none()
                    }
                }
            }
            Message::ReplacePresentation => {
                let Some(modal) = self.color_modal.as_mut() else {
                    return Task::none();
                };
                if modal.is_busy() {
                    return Task::none();
                }
                let Some(file) = FileDialog::new()
                    .set_title("Choose the presentation image")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file()
                else {
                    return Task::none();
                };
                modal.set_busy(true);
                let (id, previous) = (modal.color_id, modal.presentation().id());
                Task::perform(
                    gallery::replace_presentation(self.catalog(), id, file, previous),
                    move |result| Message::GalleryUpdated(id, result),
                )
            }
            Message::PromoteImage(image_id) => {
                let Some(modal) = self.color_modal.as_mut() else {
                    return Task::none();
                };
                if modal.is_busy() {
                    return Task::none();
                }
                modal.set_busy(true);
                let (id, previous) = (modal.color_id, modal.presentation().id());
                Task::perform(
                    gallery::promote(self.catalog(), id, image_id, previous),
                    move |result| Message::GalleryUpdated(id, result),
                )
            }
            Message::MoveImage { from, to } => {
                let Some(modal) = self.color_modal.as_mut() else {
                    return Task::none();
                };
                let id = modal.color_id;
                if let Some(ids) = modal.gallery_mut().and_then(|g| g.move_image(from, to)) {
                    self.session.reorder_gallery(id, ids);
                }
                Task::none()
            }
            Message::AskDeleteImage(image_id) => {
                if let Some(modal) = &self.color_modal {
                    self.confirm = Some(Confirmation::DeleteImage { color_id: modal.color_id, image_id });
                }
                Task::none()
            }
            Message::AddGalleryImages => {
                let Some(modal) = self.color_modal.as_mut() else {
                    return Task::none();
                };
                if modal.is_busy() {
                    return Task::none();
                }
                let Some(files) = FileDialog::new()
                    .set_title("Add gallery images")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_files()
                else {
                    return Task::none();
                };
                modal.set_busy(true);
                let id = modal.color_id;
                Task::perform(gallery::upload_gallery(self.catalog(), id, files), move |result| {
                    Message::GalleryUpdated(id, result)
                })
            }

            Message::OpenAddColor(group_slug) => {
                self.add_color = Some(AddColorForm::new(group_slug));
                Task::none()
            }
            Message::AddColorName(name) => {
                if let Some(form) = self.add_color.as_mut() {
                    form.name = name;
                }
                Task::none()
            }
            Message::PickFiles(target) => {
                let dialog = FileDialog::new().add_filter("Images", &IMAGE_EXTENSIONS);
                let files = match target {
                    PreviewTarget::Presentation => dialog.pick_file().map(|file| vec![file]),
                    PreviewTarget::Gallery => dialog.pick_files(),
                };
                match files {
                    Some(files) => self.handle(Message::FilesChosen(target, files)),
                    None => Task::none(),
                }
            }
            Message::PickFolder => match FileDialog::new().set_title("Add a folder of images").pick_folder() {
                Some(folder) => Task::perform(scan_folder_async(folder), |files| {
                    Message::FilesChosen(PreviewTarget::Gallery, files)
                }),
                None => Task::none(),
            },
            Message::FilesChosen(target, files) => {
                let Some(form) = self.add_color.as_mut() else {
                    return Task::none();
                };
                let to_render = form.add_files(target, files);
                Task::batch(to_render.into_iter().map(|path| {
                    Task::perform(load_preview(path), |(path, preview)| {
                        Message::PreviewReady(path, preview)
                    })
                }))
            }
            Message::PreviewReady(path, preview) => {
                if let Some(form) = self.add_color.as_mut() {
                    form.set_preview(&path, preview);
                }
                Task::none()
            }
            Message::RemovePreview(target, index) => {
                if let Some(form) = self.add_color.as_mut() {
                    form.remove(target, index);
                }
                Task::none()
            }
            Message::SubmitAddColor => {
                let Some(form) = self.add_color.as_mut() else {
                    return Task::none();
                };
                match form.begin_submit(self.session.groups()) {
                    Err(e) => {
                        self.show_error(e.to_string());
                        Task::none()
                    }
                    Ok(None) => Task::none(),
                    Ok(Some(submission)) => {
                        let deletes = self.session.take_color_deletes();
                        Task::perform(
                            ui::add_color::submit(self.catalog(), deletes, submission, self.session.section()),
                            Message::AddColorDone,
                        )
                    }
                }
            }
            Message::AddColorDone(result) => match result {
                Ok(groups) => {
                    self.add_color = None;
                    self.status = String::from("Color created.");
                    self.install_catalog(groups)
                }
                Err(e) => {
                    if let Some(form) = self.add_color.as_mut() {
                        form.submit_failed();
                    }
                    self.show_error(format!("Could not create the color: {e}"));
                    Task::none()
                }
            },
            Message::CloseAddColor => {
                if self.add_color.as_ref().is_some_and(|form| !form.is_submitting()) {
                    self.add_color = None;
                }
                Task::none()
            }

            Message::UsersLoaded(result) => {
                match result {
                    Ok(list) => self.users.set_users(list),
                    Err(e) => self.show_error(format!("Could not load users: {e}")),
                }
                Task::none()
            }
            Message::NewUserField(field, value) => {
                field.apply(&mut self.users.form, value);
                Task::none()
            }
            Message::NewUserRole(role) => {
                self.users.form.role = role;
                Task::none()
            }
            Message::CreateUser => {
                if self.users_busy {
                    return Task::none();
                }
                match self.users.form.to_request() {
                    Ok(request) => {
                        self.users_busy = true;
                        Task::perform(users::create(self.user_api(), request), Message::UserCreated)
                    }
                    Err(e) => {
                        self.show_error(e.to_string());
                        Task::none()
                    }
                }
            }
            Message::UserCreated(result) => {
                self.users_busy = false;
                match result {
                    Ok(list) => {
                        self.users.set_users(list);
                        self.users.reset_form();
                    }
                    Err(e) => {
                        let reason = e.detail().map(str::to_string).unwrap_or_else(|| e.to_string());
                        self.show_error(format!("Could not create the user: {reason}"));
                    }
                }
                Task::none()
            }
            Message::ChangeRole(user_id, role) => {
                if !self.users.select_role(user_id, role) {
                    return Task::none();
                }
                Task::perform(users::change_role(self.user_api(), user_id, role), Message::RoleChanged)
            }
            Message::RoleChanged(change) => {
                match change {
                    RoleChange::Applied { user_id, role } => match self.users.role_applied(user_id, role) {
                        AccessChange::Revoked => {
                            info!("signed-in user is no longer an administrator");
                            self.is_admin = false;
                            self.screen = Screen::Library;
                        }
                        AccessChange::Granted => self.is_admin = true,
                        AccessChange::None => {}
                    },
                    RoleChange::Rejected { error, users } => {
                        if let Some(list) = users {
                            self.users.set_users(list);
                        }
                        self.show_error(format!("Could not change the role: {error}"));
                    }
                }
                Task::none()
            }
            Message::AskResetPassword(user_id) => {
                self.confirm = Some(Confirmation::ResetPassword(user_id));
                Task::none()
            }
            Message::AskDeleteUser(user_id) => {
                self.confirm = Some(Confirmation::DeleteUser(user_id));
                Task::none()
            }
            Message::PasswordReset(result) => {
                match result {
                    Ok(()) => self.status = String::from("Password reset sent."),
                    Err(e) => self.show_error(format!("Could not reset the password: {e}")),
                }
                Task::none()
            }
            Message::UserDeleted(result) => {
                match result {
                    Ok(list) => self.users.set_users(list),
                    Err(e) => self.show_error(format!("Could not delete the user: {e}")),
                }
                Task::none()
            }

            Message::Showcase(message) => {
                let effects = self.showcase.update(message, Instant::now());
                self.run_effects(effects)
            }

            Message::Confirm => match self.confirm.take() {
                Some(Confirmation::DeleteImage { color_id, image_id }) => {
                    if let Some(modal) = self.color_modal.as_mut() {
                        modal.set_busy(true);
                    }
                    Task::perform(gallery::delete_image(self.catalog(), color_id, image_id), move |result| {
                        Message::GalleryUpdated(color_id, result)
                    })
                }
                Some(Confirmation::ResetPassword(user_id)) => {
                    Task::perform(users::reset_password(self.user_api(), user_id), Message::PasswordReset)
                }
                Some(Confirmation::DeleteUser(user_id)) => {
                    Task::perform(users::delete(self.user_api(), user_id), Message::UserDeleted)
                }
                None => Task::none(),
            },
            Message::DismissConfirm => {
                self.confirm = None;
                Task::none()
            }
            Message::DismissAlert => {
                self.alert = None;
                Task::none()
            }
            Message::Tick(now) => {
                if self.screen != Screen::Showcase {
                    return Task::none();
                }
                let effects = self.showcase.tick(now);
                self.run_effects(effects)
            }
            Message::Activity => {
                self.showcase.activity(Instant::now());
                Task::none()
            }
            Message::Escape => {
                if self.alert.take().is_some() || self.confirm.take().is_some() {
                    return Task::none();
                }
                if self.editor.is_some() {
                    return self.finish_edit(EditorExit::Escape);
                }
                if self.screen == Screen::Showcase {
                    return self.handle(Message::Showcase(ShowcaseMessage::Escape));
                }
                if self.add_color.is_some() {
                    return self.handle(Message::CloseAddColor);
                }
                self.handle(Message::CloseColorModal)
            }
            Message::ArrowLeft => self.carousel_key(ShowcaseMessage::Prev),
            Message::ArrowRight => self.carousel_key(ShowcaseMessage::Next),
            Message::WindowCloseRequested(id) => {
                let beacon = self.beacon.clone();
                Task::perform(async move { beacon.stop().await }, |_| Message::Ignore)
                    .chain(window::close(id))
            }
            Message::Ignore => Task::none(),
        }
    }

    /// Arrow keys only drive an open showcase carousel
    fn carousel_key(&mut self, step: ShowcaseMessage) -> Task<Message> {
        if self.screen != Screen::Showcase || !self.showcase.carousel().is_open() {
            return Task::none();
        }
        self.handle(Message::Showcase(step))
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let page: Element<Message> = match self.screen {
            Screen::Library => ui::library::view(self),
            Screen::Showcase => self.showcase.view(&self.thumbnails).map(Message::Showcase),
            Screen::Users => ui::users::view(&self.users, self.users_busy),
            Screen::Performance => center(text("No data yet.").size(20)).into(),
        };

        let mut screens = vec![Screen::Library, Screen::Showcase];
        if self.is_admin {
            screens.push(Screen::Users);
        }
        screens.push(Screen::Performance);
        let nav = row(screens.into_iter().map(|screen| {
            let tab = button(text(screen.label()).size(14)).padding([6, 14]);
            if screen == self.screen {
                tab.style(button::primary).into()
            } else {
                tab.style(button::text).on_press(Message::Navigate(screen)).into()
            }
        }))
        .spacing(4)
        .padding(8);

        let mut content: Element<Message> = column![nav, page].height(Length::Fill).into();

        if let Some(modal) = &self.color_modal {
            let name = find_color(self.session.groups(), modal.color_id)
                .map(|(_, color)| color.name.as_str())
                .unwrap_or_default();
            content = ui::modal(
                content,
                modal.view(name, self.editor.as_ref(), &self.thumbnails),
                Message::CloseColorModal,
            );
        }
        if let Some(form) = &self.add_color {
            content = ui::modal(content, form.view(), Message::CloseAddColor);
        }
        if let Some(confirm) = self.confirm {
            let buttons = vec![
                button(text("Yes")).style(button::danger).on_press(Message::Confirm).into(),
                button(text("No")).style(button::secondary).on_press(Message::DismissConfirm).into(),
            ];
            content = ui::modal(content, ui::dialog(confirm.prompt().to_string(), buttons), Message::DismissConfirm);
        }
        if let Some(alert) = &self.alert {
            let buttons = vec![button(text("OK")).on_press(Message::DismissAlert).into()];
            content = ui::modal(content, ui::dialog(alert.clone(), buttons), Message::DismissAlert);
        }
        content
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            keyboard::on_key_press(key_message),
            window::close_requests().map(Message::WindowCloseRequested),
        ];
        if self.screen == Screen::Showcase {
            subscriptions.push(time::every(Duration::from_secs(1)).map(Message::Tick));
            subscriptions.push(event::listen_with(activity_message));
        }
        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn key_message(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    match key.as_ref() {
        keyboard::Key::Named(key::Named::Escape) => Some(Message::Escape),
        keyboard::Key::Named(key::Named::ArrowLeft) => Some(Message::ArrowLeft),
        keyboard::Key::Named(key::Named::ArrowRight) => Some(Message::ArrowRight),
        _ => None,
    }
}

/// Any user input counts as showcase activity
fn activity_message(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Mouse(
            mouse::Event::ButtonPressed(_)
            | mouse::Event::CursorMoved { .. }
            | mouse::Event::WheelScrolled { .. },
        )
        | Event::Keyboard(_)
        | Event::Touch(_) => Some(Message::Activity),
        _ => None,
    }
}

fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> iced::Result {
    let path = AppConfig::default_path();
    let loaded = AppConfig::load_from(&path);
    let mut config = loaded.as_ref().cloned().unwrap_or_default();
    init_logging(&config.log_filter);
    if let Err(e) = &loaded {
        warn!("{e}; using default settings");
    }

    config.apply_env(|key| std::env::var(key).ok());
    if config.ensure_client_id() {
        match config.save_to(&path) {
            Ok(()) => info!(path = %path.display(), "analytics client id saved"),
            Err(e) => warn!("could not save the config: {e}"),
        }
    }

    iced::application("Facade Admin", FacadeAdmin::update, FacadeAdmin::view)
        .theme(FacadeAdmin::theme)
        .subscription(FacadeAdmin::subscription)
        .exit_on_close_request(false)
        .centered()
        .run_with(move || FacadeAdmin::new(config))
}
