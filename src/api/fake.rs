//! In-memory backend for async tests.
//!
//! Records every call in order and can be told to fail calls matching a
//! predicate, which is enough to check replay order and halt-on-failure.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AnalyticsApi, CatalogApi, GroupPatch, NewUser, SessionKey, TrackBody, UserApi};
use crate::error::{ApiError, ApiResult};
use crate::state::data::{Color, ColorImages, Group, Image, Role, Section, User};

/// One recorded request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListGroups(Section),
    CreateGroup(String),
    PatchGroup(String, GroupPatch),
    DeleteGroup(String),
    ReorderColors(String, Vec<i64>),
    CreateColor(String, String),
    RenameColor(i64, String),
    DeleteColor(i64),
    ColorImages(i64),
    Upload { color_id: i64, files: usize, is_presentation: bool },
    SetPresentation(i64, i64),
    ReorderGallery(i64, Vec<i64>),
    DeleteImage(i64, i64),
    FetchImage(String),
    ListUsers,
    CreateUser(String),
    SetRole(i64, Role),
    ResetPassword(i64),
    DeleteUser(i64),
    SessionStart(String),
    SessionStop(SessionKey),
    Track(TrackBody),
}

type FailRule = Box<dyn Fn(&Call) -> bool + Send>;

#[derive(Default)]
struct Inner {
    groups: Vec<Group>,
    images: HashMap<i64, ColorImages>,
    users: Vec<User>,
    calls: Vec<Call>,
    fail_rules: Vec<FailRule>,
    next_id: i64,
}

pub struct FakeBackend {
    inner: Mutex<Inner>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { next_id: 1000, ..Inner::default() }),
        }
    }

    pub fn with_groups(groups: Vec<Group>) -> Self {
        let backend = Self::new();
        backend.inner.lock().unwrap().groups = groups;
        backend
    }

    pub fn set_images(&self, color_id: i64, images: ColorImages) {
        self.inner.lock().unwrap().images.insert(color_id, images);
    }

    pub fn set_users(&self, users: Vec<User>) {
        self.inner.lock().unwrap().users = users;
    }

    /// Fail every call for which `rule` returns true with a 500
    pub fn fail_when<F>(&self, rule: F)
    where
        F: Fn(&Call) -> bool + Send + 'static,
    {
        self.inner.lock().unwrap().fail_rules.push(Box::new(rule));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Calls other than reads, which is what ordering tests care about
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                !matches!(
                    c,
                    Call::ListGroups(_) | Call::ColorImages(_) | Call::ListUsers | Call::FetchImage(_)
                )
            })
            .collect()
    }

    pub fn groups(&self) -> Vec<Group> {
        self.inner.lock().unwrap().groups.clone()
    }

    pub fn images(&self, color_id: i64) -> ColorImages {
        self.inner
            .lock()
            .unwrap()
            .images
            .get(&color_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Log the call and run `effect` unless a failure rule matches
    fn handle<T>(&self, call: Call, effect: impl FnOnce(&mut Inner) -> ApiResult<T>) -> ApiResult<T> {
        let mut inner = self.inner.lock().unwrap();
        let failing = inner.fail_rules.iter().any(|rule| rule(&call));
        inner.calls.push(call.clone());
        if failing {
            return Err(ApiError::Status {
                method: "FAKE",
                path: format!("{call:?}"),
                status: 500,
                detail: Some("injected failure".to_string()),
            });
        }
        effect(&mut inner)
    }
}

fn not_found<T>(what: String) -> ApiResult<T> {
    Err(ApiError::Status { method: "FAKE", path: what, status: 404, detail: None })
}

impl Inner {
    fn fresh_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn color_mut(&mut self, color_id: i64) -> Option<&mut Color> {
        self.groups
            .iter_mut()
            .flat_map(|g| g.colors.iter_mut())
            .find(|c| c.id == color_id)
    }
}

#[async_trait]
impl CatalogApi for FakeBackend {
    async fn list_groups(&self, section: Section) -> ApiResult<Vec<Group>> {
        self.handle(Call::ListGroups(section), |inner| Ok(inner.groups.clone()))
    }

    async fn create_group(&self, name: &str, section: Section) -> ApiResult<Group> {
        self.handle(Call::CreateGroup(name.to_string()), |inner| {
            let group = Group {
                slug: name.to_lowercase().replace(' ', "-"),
                name: name.to_string(),
                position: inner.groups.len() as i64,
                colors: Vec::new(),
                id: Some(inner.fresh_id()),
                section: Some(section),
            };
            inner.groups.push(group.clone());
            Ok(group)
        })
    }

    async fn patch_group(&self, slug: &str, patch: &GroupPatch) -> ApiResult<Group> {
        self.handle(Call::PatchGroup(slug.to_string(), patch.clone()), |inner| {
            let Some(group) = inner.groups.iter_mut().find(|g| g.slug == slug) else {
                return not_found(slug.to_string());
            };
            if let Some(name) = &patch.name {
                group.name = name.clone();
            }
            if let Some(position) = patch.position {
                group.position = position;
            }
            Ok(group.clone())
        })
    }

    async fn delete_group(&self, slug: &str) -> ApiResult<()> {
        self.handle(Call::DeleteGroup(slug.to_string()), |inner| {
            let before = inner.groups.len();
            inner.groups.retain(|g| g.slug != slug);
            if inner.groups.len() == before {
                return not_found(slug.to_string());
            }
            Ok(())
        })
    }

    async fn reorder_colors(&self, group_slug: &str, ids: &[i64]) -> ApiResult<()> {
        self.handle(Call::ReorderColors(group_slug.to_string(), ids.to_vec()), |inner| {
            let Some(group) = inner.groups.iter_mut().find(|g| g.slug == group_slug) else {
                return not_found(group_slug.to_string());
            };
            for (position, id) in ids.iter().enumerate() {
                if let Some(color) = group.colors.iter_mut().find(|c| c.id == *id) {
                    color.position = position as i64;
                }
            }
            Ok(())
        })
    }

    async fn create_color(&self, group_slug: &str, name: &str) -> ApiResult<Color> {
        let call = Call::CreateColor(group_slug.to_string(), name.to_string());
        self.handle(call, |inner| {
            let id = inner.fresh_id();
            let Some(group) = inner.groups.iter_mut().find(|g| g.slug == group_slug) else {
                return not_found(group_slug.to_string());
            };
            let color = Color {
                id,
                slug: name.to_lowercase(),
                name: name.to_string(),
                position: group.colors.len() as i64,
                group_slug: Some(group_slug.to_string()),
                presentation: None,
                gallery_count: 0,
            };
            group.colors.push(color.clone());
            Ok(color)
        })
    }

    async fn rename_color(&self, color_id: i64, name: &str) -> ApiResult<Color> {
        self.handle(Call::RenameColor(color_id, name.to_string()), |inner| {
            match inner.color_mut(color_id) {
                Some(color) => {
                    color.name = name.to_string();
                    Ok(color.clone())
                }
                None => not_found(format!("color {color_id}")),
            }
        })
    }

    async fn delete_color(&self, color_id: i64) -> ApiResult<()> {
        self.handle(Call::DeleteColor(color_id), |inner| {
            if inner.color_mut(color_id).is_none() {
                return not_found(format!("color {color_id}"));
            }
            for group in inner.groups.iter_mut() {
                group.colors.retain(|c| c.id != color_id);
            }
            inner.images.remove(&color_id);
            Ok(())
        })
    }

    async fn color_images(&self, color_id: i64) -> ApiResult<ColorImages> {
        self.handle(Call::ColorImages(color_id), |inner| {
            Ok(inner.images.get(&color_id).cloned().unwrap_or_default())
        })
    }

    async fn upload_images(
        &self,
        color_id: i64,
        files: &[PathBuf],
        is_presentation: bool,
    ) -> ApiResult<Vec<Image>> {
        let call = Call::Upload { color_id, files: files.len(), is_presentation };
        self.handle(call, |inner| {
            let mut created = Vec::with_capacity(files.len());
            for _ in files {
                let id = inner.fresh_id();
                created.push(Image {
                    id,
                    url: format!("http://catalog.test/media/{id}.jpg"),
                    is_presentation,
                    position: 0,
                    alt: String::new(),
                });
            }
            let images = inner.images.entry(color_id).or_default();
            for image in &created {
                if is_presentation {
                    // The superseded cover stays around until the client deletes it
                    if let Some(mut old) = images.presentation.replace(image.clone()) {
                        old.is_presentation = false;
                        images.gallery.push(old);
                    }
                } else {
                    images.gallery.push(image.clone());
                }
            }
            Ok(created)
        })
    }

    async fn set_presentation(&self, color_id: i64, image_id: i64) -> ApiResult<()> {
        self.handle(Call::SetPresentation(color_id, image_id), |inner| {
            let images = inner.images.entry(color_id).or_default();
            let Some(index) = images.gallery.iter().position(|i| i.id == image_id) else {
                return not_found(format!("image {image_id}"));
            };
            let mut promoted = images.gallery.remove(index);
            promoted.is_presentation = true;
            if let Some(mut old) = images.presentation.replace(promoted) {
                old.is_presentation = false;
                images.gallery.push(old);
            }
            Ok(())
        })
    }

    async fn reorder_gallery(&self, color_id: i64, ids: &[i64]) -> ApiResult<()> {
        self.handle(Call::ReorderGallery(color_id, ids.to_vec()), |inner| {
            let images = inner.images.entry(color_id).or_default();
            images
                .gallery
                .sort_by_key(|i| ids.iter().position(|id| *id == i.id).unwrap_or(usize::MAX));
            Ok(())
        })
    }

    async fn delete_image(&self, color_id: i64, image_id: i64) -> ApiResult<()> {
        self.handle(Call::DeleteImage(color_id, image_id), |inner| {
            let images = inner.images.entry(color_id).or_default();
            if images.presentation.as_ref().is_some_and(|p| p.id == image_id) {
                images.presentation = None;
                return Ok(());
            }
            let before = images.gallery.len();
            images.gallery.retain(|i| i.id != image_id);
            if images.gallery.len() == before {
                return not_found(format!("image {image_id}"));
            }
            Ok(())
        })
    }

    async fn fetch_image(&self, url: &str) -> ApiResult<Vec<u8>> {
        self.handle(Call::FetchImage(url.to_string()), |_| Ok(Vec::new()))
    }
}

#[async_trait]
impl UserApi for FakeBackend {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.handle(Call::ListUsers, |inner| Ok(inner.users.clone()))
    }

    async fn create_user(&self, user: &NewUser) -> ApiResult<User> {
        self.handle(Call::CreateUser(user.email.clone()), |inner| {
            let created = User {
                id: inner.fresh_id(),
                email: user.email.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                role: user.role,
                is_active: true,
            };
            inner.users.push(created.clone());
            Ok(created)
        })
    }

    async fn set_role(&self, user_id: i64, role: Role) -> ApiResult<()> {
        self.handle(Call::SetRole(user_id, role), |inner| {
            match inner.users.iter_mut().find(|u| u.id == user_id) {
                Some(user) => {
                    user.role = role;
                    Ok(())
                }
                None => not_found(format!("user {user_id}")),
            }
        })
    }

    async fn reset_password(&self, user_id: i64) -> ApiResult<()> {
        self.handle(Call::ResetPassword(user_id), |_| Ok(()))
    }

    async fn delete_user(&self, user_id: i64) -> ApiResult<()> {
        self.handle(Call::DeleteUser(user_id), |inner| {
            inner.users.retain(|u| u.id != user_id);
            Ok(())
        })
    }
}

#[async_trait]
impl AnalyticsApi for FakeBackend {
    async fn session_start(&self, client_id: &str) -> ApiResult<SessionKey> {
        self.handle(Call::SessionStart(client_id.to_string()), |inner| {
            Ok(SessionKey::Number(inner.fresh_id()))
        })
    }

    async fn session_stop(&self, session: &SessionKey) -> ApiResult<()> {
        self.handle(Call::SessionStop(session.clone()), |_| Ok(()))
    }

    async fn track(&self, body: &TrackBody) -> ApiResult<()> {
        self.handle(Call::Track(body.clone()), |_| Ok(()))
    }
}
