//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the REST layer and the UI layer. They deserialize straight from
//! the backend's JSON and serialize back for snapshots and config.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog partition a group belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Facades,
    Plans,
    Espaces,
    Ambiances,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Facades,
        Section::Plans,
        Section::Espaces,
        Section::Ambiances,
    ];

    /// Value sent in `?section=` and in create payloads
    pub fn slug(self) -> &'static str {
        match self {
            Section::Facades => "facades",
            Section::Plans => "plans",
            Section::Espaces => "espaces",
            Section::Ambiances => "ambiances",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Facades => "Façades",
            Section::Plans => "Plans de travail",
            Section::Espaces => "Espaces de la maison",
            Section::Ambiances => "Ambiances",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named, ordered category of colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Stable identity, globally unique on the backend
    pub slug: String,
    pub name: String,
    /// Sort key; ties fall back to the folded name
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub colors: Vec<Color>,
    /// Database id, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
}

/// A catalog item owned by exactly one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Stable identity used by every `/api/colors/<id>/` call
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub position: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation: Option<Image>,
    #[serde(default)]
    pub gallery_count: u32,
}

/// An uploaded image attached to a color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub is_presentation: bool,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub alt: String,
}

/// Images of one color as returned by `GET /api/colors/<id>/images/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorImages {
    #[serde(default)]
    pub presentation: Option<Image>,
    #[serde(default)]
    pub gallery: Vec<Image>,
}

/// Back-office roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Manager];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
        })
    }
}

/// A back-office account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Group {
    pub fn color(&self, color_id: i64) -> Option<&Color> {
        self.colors.iter().find(|c| c.id == color_id)
    }
}

/// Find a color anywhere in the catalog, with the slug of its group
pub fn find_color(groups: &[Group], color_id: i64) -> Option<(&Group, &Color)> {
    groups
        .iter()
        .find_map(|g| g.color(color_id).map(|c| (g, c)))
}


#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;

    #[test]
    fn group_list_deserializes_backend_payload() {
        let json = r#"{
            "id": 3, "name": "Bois", "slug": "bois", "position": 1, "section": "facades",
            "colors": [
                {"id": 7, "name": "Chêne", "slug": "chene", "position": 0,
                 "group_slug": "bois", "presentation": null, "gallery_count": 2}
            ]
        }"#;
        let group: Group = serde_json::from_str(json).unwrap();
        assert_eq!(group.slug, "bois");
        assert_eq!(group.section, Some(Section::Facades));
        assert_eq!(group.colors[0].id, 7);
        assert_eq!(group.colors[0].gallery_count, 2);
    }

    #[test]
    fn color_images_accepts_null_presentation() {
        let json = r#"{"color": {"id": 1}, "presentation": null,
            "gallery": [{"id": 4, "url": "http://x/4.jpg", "is_presentation": false}]}"#;
        let images: ColorImages = serde_json::from_str(json).unwrap();
        assert!(images.presentation.is_none());
        assert_eq!(images.gallery.len(), 1);
    }

    #[test]
    fn role_uses_uppercase_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"MANAGER\"");
        let user: User = serde_json::from_str(
            r#"{"id": 1, "email": "a@b.c", "role": "ADMIN"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.is_active);
    }

    #[test]
    fn find_color_reports_owning_group() {
        let groups = fixtures::catalog();
        let (group, color) = find_color(&groups, 4).unwrap();
        assert_eq!(group.slug, "uni");
        assert_eq!(color.name, "Rouge");
        assert!(find_color(&groups, 99).is_none());
    }
}
