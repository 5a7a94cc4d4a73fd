//! Default structure of the public landing page.
//!
//! The built-in [`LandingConfig::default`] describes which sections the home
//! page shows and in which order. A JSON file named by `LANDING_CONFIG` can
//! replace any part of it; fields it leaves out keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Announcements,
    Gallery,
    Authorities,
    Research,
    Teachers,
    Calendar,
    Offices,
    Documents,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Announcements => "announcements",
            SectionKind::Gallery => "gallery",
            SectionKind::Authorities => "authorities",
            SectionKind::Research => "research",
            SectionKind::Teachers => "teachers",
            SectionKind::Calendar => "calendar",
            SectionKind::Offices => "offices",
            SectionKind::Documents => "documents",
        }
    }

    /// Anchor used by the navigation bar.
    pub fn anchor(&self) -> &'static str {
        match self {
            SectionKind::Announcements => "comunicados",
            SectionKind::Gallery => "galeria",
            SectionKind::Authorities => "autoridades",
            SectionKind::Research => "investigacion",
            SectionKind::Teachers => "docentes",
            SectionKind::Calendar => "calendario",
            SectionKind::Offices => "oficinas",
            SectionKind::Documents => "documentos",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroConfig {
    pub title: String,
    pub subtitle: String,
    pub cta_label: String,
    pub cta_href: String,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            title: "Instituto de Investigación FINESI".to_string(),
            subtitle: "Investigación, innovación y transferencia tecnológica al servicio de la región"
                .to_string(),
            cta_label: "Conoce nuestras líneas de investigación".to_string(),
            cta_href: "#investigacion".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionConfig {
    pub kind: SectionKind,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_enabled() -> bool {
    true
}

fn default_limit() -> i64 {
    6
}

impl SectionConfig {
    fn new(kind: SectionKind, title: &str, subtitle: &str, limit: i64) -> Self {
        Self {
            kind,
            title: title.to_string(),
            subtitle: Some(subtitle.to_string()),
            enabled: true,
            limit,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactConfig {
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LandingConfig {
    pub site_name: String,
    pub hero: HeroConfig,
    pub sections: Vec<SectionConfig>,
    pub contact: ContactConfig,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            site_name: "FINESI".to_string(),
            hero: HeroConfig::default(),
            sections: vec![
                SectionConfig::new(SectionKind::Announcements, "Comunicados", "Novedades y convocatorias", 6),
                SectionConfig::new(SectionKind::Research, "Líneas de investigación", "Áreas en las que trabajamos", 12),
                SectionConfig::new(SectionKind::Authorities, "Autoridades", "Equipo directivo", 8),
                SectionConfig::new(SectionKind::Teachers, "Docentes investigadores", "Nuestro equipo", 12),
                SectionConfig::new(SectionKind::Gallery, "Galería", "Actividades y eventos", 8),
                SectionConfig::new(SectionKind::Calendar, "Calendario", "Próximas actividades", 6),
                SectionConfig::new(SectionKind::Documents, "Documentos", "Reglamentos y formatos", 10),
                SectionConfig::new(SectionKind::Offices, "Oficinas", "Dónde encontrarnos", 6),
            ],
            contact: ContactConfig {
                address: Some("Ciudad Universitaria".to_string()),
                email: Some("finesi@universidad.edu.pe".to_string()),
                phone: None,
            },
        }
    }
}

impl LandingConfig {
    /// Load from `path`, or fall back to the built-in structure.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::LandingRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::LandingParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn enabled_sections(&self) -> impl Iterator<Item = &SectionConfig> {
        self.sections.iter().filter(|s| s.enabled && s.limit > 0)
    }

    pub fn section(&self, kind: SectionKind) -> Option<&SectionConfig> {
        self.enabled_sections().find(|s| s.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_every_section_once() {
        let config = LandingConfig::default();
        let kinds: Vec<SectionKind> = config.sections.iter().map(|s| s.kind).collect();
        for kind in [
            SectionKind::Announcements,
            SectionKind::Gallery,
            SectionKind::Authorities,
            SectionKind::Research,
            SectionKind::Teachers,
            SectionKind::Calendar,
            SectionKind::Offices,
            SectionKind::Documents,
        ] {
            assert_eq!(kinds.iter().filter(|k| **k == kind).count(), 1, "{:?}", kind);
        }
        assert_eq!(config.enabled_sections().count(), 8);
    }

    #[test]
    fn test_json_override_keeps_missing_defaults() {
        let config = LandingConfig::from_json(
            r#"{
                "hero": { "title": "FINESI 2026" },
                "sections": [
                    { "kind": "gallery", "title": "Fotos", "limit": 3 },
                    { "kind": "offices", "title": "Oficinas", "enabled": false }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.site_name, "FINESI");
        assert_eq!(config.hero.title, "FINESI 2026");
        assert_eq!(config.hero.cta_href, "#investigacion");

        let enabled: Vec<&str> = config.enabled_sections().map(|s| s.title.as_str()).collect();
        assert_eq!(enabled, vec!["Fotos"]);
        assert_eq!(config.section(SectionKind::Gallery).unwrap().limit, 3);
        assert!(config.section(SectionKind::Offices).is_none());
    }

    #[test]
    fn test_load_without_path_uses_default() {
        let config = LandingConfig::load(None).unwrap();
        assert_eq!(config.sections.len(), 8);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = LandingConfig::load(Some(Path::new("/nonexistent/landing.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::LandingRead { .. }));
    }

    #[test]
    fn test_unknown_section_kind_is_rejected() {
        assert!(LandingConfig::from_json(r#"{ "sections": [{ "kind": "blog", "title": "x" }] }"#).is_err());
    }
}
