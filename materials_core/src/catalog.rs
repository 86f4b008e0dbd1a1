//! The set of materials offered on the page.
//!
//! The server answers from this table and the CLI renders one button per
//! entry. Clients never validate ids against it: an id the deployed backend
//! doesn't know is rejected there.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::types::{DownloadRequest, MaterialId, MaterialMetadata};

/// Message the backend attaches to every metadata response.
pub const READY_MESSAGE: &str = "Материал готов к скачиванию";

/// Icons shown next to material buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Icon {
    FileText,
    BookOpen,
    Music,
    Pencil,
    Wind,
}

impl Icon {
    /// Terminal rendering of the icon.
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::FileText => "📄",
            Icon::BookOpen => "📖",
            Icon::Music => "🎵",
            Icon::Pencil => "✏️",
            Icon::Wind => "🌬️",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Material {
    #[serde(skip)]
    pub id: &'static str,
    pub name: &'static str,
    pub filename: &'static str,
    pub size: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub icon: Icon,
}

impl Material {
    /// The click that this material's button produces.
    pub fn download_request(&self) -> DownloadRequest {
        DownloadRequest::new(MaterialId::from_static(self.id), self.name)
    }

    /// Body served by the backend under the metadata contract.
    pub fn metadata(&self) -> MaterialMetadata {
        MaterialMetadata {
            name: self.name.to_string(),
            size: self.size.to_string(),
            message: READY_MESSAGE.to_string(),
            id: Some(self.id.to_string()),
            filename: Some(self.filename.to_string()),
            description: Some(self.description.to_string()),
            download_url: Some(format!("/api/download?id={}", self.id)),
        }
    }
}

pub static MATERIALS: [Material; 5] = [
    Material {
        id: "articulation",
        name: "Артикуляционная гимнастика",
        filename: "artikulyacionnaya-gimnastika.pdf",
        size: "2.4 MB",
        description: "Комплекс упражнений для развития речевого аппарата",
        icon: Icon::FileText,
    },
    Material {
        id: "games",
        name: "Логопедические игры",
        filename: "logopedicheskie-igry.pdf",
        size: "3.8 MB",
        description: "30+ игр для развития речи детей 3-7 лет",
        icon: Icon::BookOpen,
    },
    Material {
        id: "tongue-twisters",
        name: "Чистоговорки и скороговорки",
        filename: "chistogovorki-skorogovorki.pdf",
        size: "1.2 MB",
        description: "Подборка для автоматизации всех звуков",
        icon: Icon::Music,
    },
    Material {
        id: "workbooks",
        name: "Рабочие тетради",
        filename: "rabochie-tetradi.pdf",
        size: "4.5 MB",
        description: "Задания для развития фонематического слуха",
        icon: Icon::Pencil,
    },
    Material {
        id: "breathing",
        name: "Дыхательная гимнастика",
        filename: "dykhatelnaya-gimnastika.pdf",
        size: "1.8 MB",
        description: "Упражнения для развития речевого дыхания",
        icon: Icon::Wind,
    },
];

pub fn find(id: &str) -> Option<&'static Material> {
    MATERIALS.iter().find(|m| m.id == id)
}

/// Body of the catalog listing (`GET` without an id).
#[derive(Debug, Serialize)]
pub struct CatalogListing {
    pub materials: BTreeMap<&'static str, &'static Material>,
    pub total: usize,
}

pub fn listing() -> CatalogListing {
    let materials: BTreeMap<_, _> = MATERIALS.iter().map(|m| (m.id, m)).collect();
    CatalogListing {
        total: materials.len(),
        materials,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let listing = listing();
        assert_eq!(listing.total, MATERIALS.len());
    }

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(find("games").map(|m| m.filename), Some("logopedicheskie-igry.pdf"));
        assert!(find("unknown-id").is_none());
    }

    #[test]
    fn metadata_carries_download_url() {
        let meta = find("breathing").unwrap().metadata();
        assert_eq!(meta.download_url.as_deref(), Some("/api/download?id=breathing"));
        assert_eq!(meta.message, READY_MESSAGE);
        assert_eq!(meta.size, "1.8 MB");
    }

    #[test]
    fn button_request_uses_display_name() {
        let req = find("workbooks").unwrap().download_request();
        assert_eq!(req.id.as_str(), "workbooks");
        assert_eq!(req.display_name, "Рабочие тетради");
    }

    #[test]
    fn listing_serializes_without_internal_fields() {
        let json = serde_json::to_value(listing()).unwrap();
        assert_eq!(json["total"], 5);
        assert_eq!(json["materials"]["articulation"]["size"], "2.4 MB");
        assert!(json["materials"]["articulation"].get("icon").is_none());
    }
}
