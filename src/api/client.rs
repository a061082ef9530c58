//! HTTP implementation of the API traits.
//!
//! Owns the transport details only: base URL, CSRF and cookie headers,
//! and which status codes count as success.

use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, REFERER};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::wire::{
    Created, CreateGroup, ErrorBody, GroupList, GroupPatch, NameBody, NewUser, OrderBody,
    PresentationBody, ResetPasswordBody, RoleBody, SessionKey, SessionStart, SessionStarted,
    SessionStop, TrackBody, UserList,
};
use super::{AnalyticsApi, CatalogApi, UserApi};
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::state::data::{Color, ColorImages, Group, Image, Role, Section, User};

const CSRF_HEADER: &str = "X-CSRFToken";

/// Whether `status` means success for a `method` call.
///
/// DELETE must answer exactly 204; everything else accepts any 2xx.
pub fn accepts(method: &Method, status: StatusCode) -> bool {
    if *method == Method::DELETE {
        status == StatusCode::NO_CONTENT
    } else {
        status.is_success()
    }
}

fn method_name(method: &Method) -> &'static str {
    [
        (Method::GET, "GET"),
        (Method::POST, "POST"),
        (Method::PATCH, "PATCH"),
        (Method::DELETE, "DELETE"),
    ]
    .into_iter()
    .find(|(m, _)| m == method)
    .map(|(_, name)| name)
    .unwrap_or("REQUEST")
}

/// Cookie header carrying the session and the CSRF cookie Django checks
/// against the header value.
/// Escape one path segment so a slug can never add or break path parts
fn segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

fn cookie_header(session_cookie: Option<&str>, csrf: Option<&str>) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(session) = session_cookie.filter(|s| !s.is_empty()) {
        parts.push(session.to_string());
    }
    if let Some(token) = csrf.filter(|s| !s.is_empty()) {
        parts.push(format!("csrftoken={token}"));
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}

/// Authenticated client for the catalog backend
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: Client,
    base_url: String,
    csrf_token: Option<String>,
    cookie: Option<String>,
}

impl RemoteClient {
    pub fn new(config: &AppConfig) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            csrf_token: config.csrf_token.clone(),
            cookie: cookie_header(config.session_cookie.as_deref(), config.csrf_token.as_deref()),
        })
    }

    /// Absolute URL for an API path or a media URL returned by the server
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        if method != Method::GET {
            request = request.header(REFERER, &self.base_url);
            if let Some(token) = &self.csrf_token {
                request = request.header(CSRF_HEADER, token);
            }
        }
        request
    }

    async fn send(&self, method: Method, path: &str, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(method = method_name(&method), path, status = status.as_u16(), "api response");

        if !accepts(&method, status) {
            let detail = response.json::<ErrorBody>().await.ok().map(|body| body.error);
            warn!(method = method_name(&method), path, status = status.as_u16(), ?detail, "api call rejected");
            return Err(ApiError::Status {
                method: method_name(&method),
                path: path.to_string(),
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> ApiResult<T> {
        response.json::<T>().await.map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self
            .send(Method::GET, path, self.request(Method::GET, path))
            .await?;
        Self::decode(path, response).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<Response> {
        let request = self
            .request(method.clone(), path)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        self.send(method, path, request).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(Method::DELETE, path, self.request(Method::DELETE, path))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogApi for RemoteClient {
    async fn list_groups(&self, section: Section) -> ApiResult<Vec<Group>> {
        let path = format!("/api/groups/?section={}", section.slug());
        let list: GroupList = self.get_json(&path).await?;
        Ok(list.results)
    }

    async fn create_group(&self, name: &str, section: Section) -> ApiResult<Group> {
        let path = "/api/groups/";
        let body = CreateGroup { name, section: section.slug() };
        let response = self.send_json(Method::POST, path, &body).await?;
        Self::decode(path, response).await
    }

    async fn patch_group(&self, slug: &str, patch: &GroupPatch) -> ApiResult<Group> {
        let path = format!("/api/groups/{}/", segment(slug));
        let response = self.send_json(Method::PATCH, &path, patch).await?;
        Self::decode(&path, response).await
    }

    async fn delete_group(&self, slug: &str) -> ApiResult<()> {
        self.delete(&format!("/api/groups/{}/", segment(slug))).await
    }

    async fn reorder_colors(&self, group_slug: &str, ids: &[i64]) -> ApiResult<()> {
        let path = format!("/api/groups/{}/colors/reorder", segment(group_slug));
        self.send_json(Method::PATCH, &path, &OrderBody { order: ids })
            .await?;
        Ok(())
    }

    async fn create_color(&self, group_slug: &str, name: &str) -> ApiResult<Color> {
        let path = format!("/api/groups/{}/colors/", segment(group_slug));
        let response = self.send_json(Method::POST, &path, &NameBody { name }).await?;
        Self::decode(&path, response).await
    }

    async fn rename_color(&self, color_id: i64, name: &str) -> ApiResult<Color> {
        let path = format!("/api/colors/{color_id}/");
        let response = self.send_json(Method::PATCH, &path, &NameBody { name }).await?;
        Self::decode(&path, response).await
    }

    async fn delete_color(&self, color_id: i64) -> ApiResult<()> {
        self.delete(&format!("/api/colors/{color_id}/")).await
    }

    async fn color_images(&self, color_id: i64) -> ApiResult<ColorImages> {
        self.get_json(&format!("/api/colors/{color_id}/images/")).await
    }

    async fn upload_images(
        &self,
        color_id: i64,
        files: &[PathBuf],
        is_presentation: bool,
    ) -> ApiResult<Vec<Image>> {
        let path = format!("/api/colors/{color_id}/images/");
        let mut form = Form::new();
        for file in files {
            let bytes = tokio::fs::read(file).await.map_err(|e| ApiError::Upload {
                path: file.clone(),
                message: e.to_string(),
            })?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "upload".to_string());
            form = form.part("files", Part::bytes(bytes).file_name(name));
        }
        form = form.text("is_presentation", if is_presentation { "true" } else { "false" });

        let request = self.request(Method::POST, &path).multipart(form);
        let response = self.send(Method::POST, &path, request).await?;
        let created: Created = Self::decode(&path, response).await?;
        Ok(created.created)
    }

    async fn set_presentation(&self, color_id: i64, image_id: i64) -> ApiResult<()> {
        let path = format!("/api/colors/{color_id}/images/");
        self.send_json(Method::PATCH, &path, &PresentationBody { presentation_id: image_id })
            .await?;
        Ok(())
    }

    async fn reorder_gallery(&self, color_id: i64, ids: &[i64]) -> ApiResult<()> {
        let path = format!("/api/colors/{color_id}/images/");
        self.send_json(Method::PATCH, &path, &OrderBody { order: ids })
            .await?;
        Ok(())
    }

    async fn delete_image(&self, color_id: i64, image_id: i64) -> ApiResult<()> {
        self.delete(&format!("/api/colors/{color_id}/images/{image_id}/"))
            .await
    }

    async fn fetch_image(&self, url: &str) -> ApiResult<Vec<u8>> {
        let response = self
            .send(Method::GET, url, self.request(Method::GET, url))
            .await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl UserApi for RemoteClient {
    async fn list_users(&self) -> ApiResult<Vec<User>> {
        let list: UserList = self.get_json("/api/users/").await?;
        Ok(list.results)
    }

    async fn create_user(&self, user: &NewUser) -> ApiResult<User> {
        let path = "/api/users/";
        let response = self.send_json(Method::POST, path, user).await?;
        Self::decode(path, response).await
    }

    async fn set_role(&self, user_id: i64, role: Role) -> ApiResult<()> {
        let path = format!("/api/users/{user_id}/");
        self.send_json(Method::PATCH, &path, &RoleBody { role }).await?;
        Ok(())
    }

    async fn reset_password(&self, user_id: i64) -> ApiResult<()> {
        let path = format!("/api/users/{user_id}/");
        self.send_json(Method::PATCH, &path, &ResetPasswordBody { reset_password: true })
            .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> ApiResult<()> {
        self.delete(&format!("/api/users/{user_id}/")).await
    }
}

#[async_trait]
impl AnalyticsApi for RemoteClient {
    async fn session_start(&self, client_id: &str) -> ApiResult<SessionKey> {
        let path = "/api/perf/session-start/";
        let response = self
            .send_json(Method::POST, path, &SessionStart { client_id })
            .await?;
        let started: SessionStarted = Self::decode(path, response).await?;
        Ok(started.session_id)
    }

    async fn session_stop(&self, session: &SessionKey) -> ApiResult<()> {
        self.send_json(Method::POST, "/api/perf/session-stop/", &SessionStop { session_id: session })
            .await?;
        Ok(())
    }

    async fn track(&self, body: &TrackBody) -> ApiResult<()> {
        self.send_json(Method::POST, "/api/perf/track/", body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RemoteClient {
        let config = AppConfig {
            base_url: "https://catalog.test/".into(),
            csrf_token: Some("tok".into()),
            session_cookie: Some("sessionid=abc".into()),
            ..AppConfig::default()
        };
        RemoteClient::new(&config).unwrap()
    }

    #[test]
    fn delete_requires_exactly_no_content() {
        assert!(accepts(&Method::DELETE, StatusCode::NO_CONTENT));
        assert!(!accepts(&Method::DELETE, StatusCode::OK));
        assert!(!accepts(&Method::DELETE, StatusCode::ACCEPTED));
    }

    #[test]
    fn other_methods_accept_any_success() {
        assert!(accepts(&Method::PATCH, StatusCode::OK));
        assert!(accepts(&Method::POST, StatusCode::CREATED));
        assert!(accepts(&Method::GET, StatusCode::OK));
        assert!(!accepts(&Method::PATCH, StatusCode::BAD_REQUEST));
        assert!(!accepts(&Method::POST, StatusCode::FOUND));
    }

    #[test]
    fn url_joins_paths_and_keeps_absolute_media() {
        let client = client();
        assert_eq!(client.url("/api/groups/"), "https://catalog.test/api/groups/");
        assert_eq!(client.url("media/a.jpg"), "https://catalog.test/media/a.jpg");
        assert_eq!(client.url("http://cdn.test/x.jpg"), "http://cdn.test/x.jpg");
    }

    #[test]
    fn slugs_are_escaped_as_one_segment() {
        assert_eq!(segment("bois-clair"), "bois-clair");
        assert_eq!(segment("a/b"), "a%2Fb");
        assert_eq!(segment("érable doré"), "%C3%A9rable%20dor%C3%A9");
        assert_eq!(segment("x?y#z"), "x%3Fy%23z");
    }

    #[test]
    fn cookie_header_combines_session_and_csrf() {
        assert_eq!(
            cookie_header(Some("sessionid=abc"), Some("tok")).as_deref(),
            Some("sessionid=abc; csrftoken=tok")
        );
        assert_eq!(cookie_header(None, Some("tok")).as_deref(), Some("csrftoken=tok"));
        assert_eq!(cookie_header(Some(""), None), None);
    }

    #[test]
    fn mutating_requests_carry_csrf_header() {
        let client = client();
        let request = client.request(Method::PATCH, "/api/colors/1/").build().unwrap();
        assert_eq!(request.headers()[CSRF_HEADER], "tok");
        assert_eq!(request.headers()[COOKIE], "sessionid=abc; csrftoken=tok");

        let request = client.request(Method::GET, "/api/groups/").build().unwrap();
        assert!(request.headers().get(CSRF_HEADER).is_none());
    }
}
