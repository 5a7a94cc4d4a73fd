//! Field checks for create/update payloads, shared by the JSON API and the
//! admin forms.

use super::*;
use crate::models::calendar_event::event_range_is_valid;

pub trait Validate {
    /// Returns a user-facing message for the first problem found.
    fn validate(&self) -> Result<(), String>;
}

fn required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("El campo «{}» es obligatorio", label));
    }
    Ok(())
}

fn not_blank(value: Option<&String>, label: &str) -> Result<(), String> {
    match value {
        Some(v) => required(v, label),
        None => Ok(()),
    }
}

fn email(value: Option<&String>) -> Result<(), String> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() && !looks_like_email(v) => {
            Err(format!("Correo electrónico inválido: {}", v))
        }
        _ => Ok(()),
    }
}

pub fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((user, domain)) => {
            !user.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

impl Validate for CreateAnnouncement {
    fn validate(&self) -> Result<(), String> {
        required(&self.title, "título")?;
        required(&self.content, "contenido")
    }
}

impl Validate for UpdateAnnouncement {
    fn validate(&self) -> Result<(), String> {
        not_blank(self.title.as_ref(), "título")?;
        not_blank(self.content.as_ref(), "contenido")
    }
}

impl Validate for CreateAuthority {
    fn validate(&self) -> Result<(), String> {
        required(&self.name, "nombre")?;
        required(&self.position, "cargo")?;
        email(self.email.as_ref())
    }
}

impl Validate for UpdateAuthority {
    fn validate(&self) -> Result<(), String> {
        not_blank(self.name.as_ref(), "nombre")?;
        not_blank(self.position.as_ref(), "cargo")?;
        email(patched(&self.email))
    }
}

impl Validate for CreateCalendarEvent {
    fn validate(&self) -> Result<(), String> {
        required(&self.title, "título")?;
        if !event_range_is_valid(self.starts_at, self.ends_at) {
            return Err("La fecha de fin no puede ser anterior a la de inicio".to_string());
        }
        Ok(())
    }
}

impl Validate for UpdateCalendarEvent {
    fn validate(&self) -> Result<(), String> {
        not_blank(self.title.as_ref(), "título")?;
        if let Some(starts_at) = self.starts_at {
            if !event_range_is_valid(starts_at, patched(&self.ends_at).copied()) {
                return Err("La fecha de fin no puede ser anterior a la de inicio".to_string());
            }
        }
        Ok(())
    }
}

impl Validate for CreateDocument {
    fn validate(&self) -> Result<(), String> {
        required(&self.title, "título")?;
        required(&self.file_path, "archivo")?;
        required(&self.file_name, "nombre de archivo")?;
        if self.file_size < 0 {
            return Err("El tamaño del archivo no puede ser negativo".to_string());
        }
        Ok(())
    }
}

impl Validate for UpdateDocument {
    fn validate(&self) -> Result<(), String> {
        not_blank(self.title.as_ref(), "título")?;
        not_blank(self.file_path.as_ref(), "archivo")?;
        if self.file_size.is_some_and(|s| s < 0) {
            return Err("El tamaño del archivo no puede ser negativo".to_string());
        }
        Ok(())
    }
}

impl Validate for CreateGalleryImage {
    fn validate(&self) -> Result<(), String> {
        required(&self.title, "título")?;
        required(&self.image_path, "imagen")
    }
}

impl Validate for UpdateGalleryImage {
    fn validate(&self) -> Result<(), String> {
        not_blank(self.title.as_ref(), "título")?;
        not_blank(self.image_path.as_ref(), "imagen")
    }
}

impl Validate for CreateOffice {
    fn validate(&self) -> Result<(), String> {
        required(&self.name, "nombre")?;
        email(self.email.as_ref())
    }
}

impl Validate for UpdateOffice {
    fn validate(&self) -> Result<(), String> {
        not_blank(self.name.as_ref(), "nombre")?;
        email(patched(&self.email))
    }
}

impl Validate for CreateResearchLine {
    fn validate(&self) -> Result<(), String> {
        required(&self.title, "título")?;
        if resolve_slug(self.slug.as_deref(), &self.title).is_empty() {
            return Err("El título debe contener letras o números".to_string());
        }
        Ok(())
    }
}

impl Validate for UpdateResearchLine {
    fn validate(&self) -> Result<(), String> {
        not_blank(self.title.as_ref(), "título")
    }
}

impl Validate for CreateTeacher {
    fn validate(&self) -> Result<(), String> {
        required(&self.full_name, "nombre completo")?;
        email(self.email.as_ref())
    }
}

impl Validate for UpdateTeacher {
    fn validate(&self) -> Result<(), String> {
        not_blank(self.full_name.as_ref(), "nombre completo")?;
        email(patched(&self.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields() {
        let announcement = CreateAnnouncement {
            title: "  ".to_string(),
            summary: None,
            content: "Texto".to_string(),
            image_path: None,
            link: None,
            publish_date: None,
            published: false,
            sort_order: 0,
        };
        let err = announcement.validate().unwrap_err();
        assert!(err.contains("título"), "{}", err);
    }

    #[test]
    fn test_update_allows_missing_but_not_blank() {
        assert!(UpdateOffice::default().validate().is_ok());
        let update = UpdateOffice { name: Some(String::new()), ..Default::default() };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("finesi@unap.edu.pe"));
        assert!(!looks_like_email("finesi"));
        assert!(!looks_like_email("@unap.edu.pe"));
        assert!(!looks_like_email("a@localhost"));

        let teacher = UpdateTeacher { email: Some(Some("no-es-correo".to_string())), ..Default::default() };
        assert!(teacher.validate().unwrap_err().contains("Correo"));
        let teacher = UpdateTeacher { email: Some(Some(String::new())), ..Default::default() };
        assert!(teacher.validate().is_ok());
        let teacher = UpdateTeacher { email: Some(None), ..Default::default() };
        assert!(teacher.validate().is_ok());
    }

    #[test]
    fn test_research_line_title_needs_slug_material() {
        let line = CreateResearchLine {
            title: "???".to_string(),
            slug: None,
            description: None,
            image_path: None,
            coordinator: None,
            members: None,
            published: false,
            sort_order: 0,
        };
        assert!(line.validate().is_err());
    }
}
