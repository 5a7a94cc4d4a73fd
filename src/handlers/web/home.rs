use std::sync::Arc;

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use sqlx::PgPool;

use super::render;
use crate::landing::{LandingConfig, SectionConfig, SectionKind};
use crate::models::{
    Announcement, Authority, CalendarEvent, Document, GalleryImage, ListQuery, Office, ResearchAssignment,
    ResearchLine, ResearchRole, Teacher,
};
use crate::storage::public_url;
use crate::utils::format_file_size;

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    site_name: String,
    hero_title: String,
    hero_subtitle: String,
    cta_label: String,
    cta_href: String,
    nav: Vec<NavLink>,
    sections: Vec<SectionView>,
    contact_address: String,
    contact_email: String,
    contact_phone: String,
}

struct NavLink {
    anchor: &'static str,
    title: String,
}

struct SectionView {
    anchor: &'static str,
    title: String,
    subtitle: String,
    cards: Vec<Card>,
    more_href: Option<&'static str>,
}

/// One item on the landing page, whatever its entity.
struct Card {
    title: String,
    subtitle: String,
    body: String,
    meta: String,
    image_url: Option<String>,
    link: Option<String>,
    link_label: String,
}

impl Card {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            body: String::new(),
            meta: String::new(),
            image_url: None,
            link: None,
            link_label: String::new(),
        }
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn log_db_error(section: SectionKind) -> impl Fn(sqlx::Error) -> StatusCode {
    move |e| {
        tracing::error!("Database error loading landing section {}: {}", section.as_str(), e);
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn announcement_cards(pool: &PgPool, limit: i64) -> Result<Vec<Card>, sqlx::Error> {
    let items = Announcement::list(pool, &ListQuery::published(limit)).await?;
    Ok(items
        .into_iter()
        .map(|a| {
            let mut card = Card::new(a.title);
            card.body = a.summary.unwrap_or(a.content);
            card.meta = a.publish_date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default();
            card.image_url = a.image_path.as_deref().map(public_url);
            if let Some(link) = a.link {
                card.link = Some(link);
                card.link_label = "Ver más".to_string();
            }
            card
        })
        .collect())
}

async fn authority_cards(pool: &PgPool, limit: i64) -> Result<Vec<Card>, sqlx::Error> {
    let items = Authority::list(pool, &ListQuery::published(limit)).await?;
    Ok(items
        .into_iter()
        .map(|a| {
            let mut card = Card::new(a.name);
            card.subtitle = a.position;
            card.body = text(&a.bio);
            card.meta = text(&a.email);
            if a.image_path.is_some() {
                card.image_url = Some(format!("/api/authorities/image/{}", a.id));
            }
            card
        })
        .collect())
}

async fn calendar_cards(pool: &PgPool, limit: i64) -> Result<Vec<Card>, sqlx::Error> {
    let items = CalendarEvent::upcoming(pool, limit).await?;
    Ok(items
        .into_iter()
        .map(|e| {
            let mut card = Card::new(e.title);
            card.subtitle = e.starts_at.format("%d/%m/%Y %H:%M").to_string();
            card.body = text(&e.description);
            card.meta = [e.location, e.category].into_iter().flatten().collect::<Vec<_>>().join(" · ");
            card
        })
        .collect())
}

async fn document_cards(pool: &PgPool, limit: i64) -> Result<Vec<Card>, sqlx::Error> {
    let items = Document::list(pool, &ListQuery::published(limit)).await?;
    Ok(items
        .into_iter()
        .map(|d| {
            let mut card = Card::new(d.title);
            card.subtitle = text(&d.category);
            card.body = text(&d.description);
            card.meta = format!("{} · {}", d.file_name, format_file_size(d.file_size.max(0) as u64));
            card.link = Some(format!("/api/download/{}", d.id));
            card.link_label = "Descargar".to_string();
            card
        })
        .collect())
}

async fn gallery_cards(pool: &PgPool, limit: i64) -> Result<Vec<Card>, sqlx::Error> {
    let items = GalleryImage::list(pool, &ListQuery::published(limit)).await?;
    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, g)| {
            let mut card = Card::new(g.title);
            card.subtitle = text(&g.category);
            card.image_url = Some(format!("/api/gallery/image/{}", g.id));
            card.link = Some(format!("/galeria?imagen={}", index));
            card
        })
        .collect())
}

async fn office_cards(pool: &PgPool, limit: i64) -> Result<Vec<Card>, sqlx::Error> {
    let items = Office::list(pool, &ListQuery::published(limit)).await?;
    Ok(items
        .into_iter()
        .map(|o| {
            let mut card = Card::new(o.name);
            card.subtitle = text(&o.location);
            card.body = text(&o.description);
            card.meta = [o.schedule, o.email, o.phone].into_iter().flatten().collect::<Vec<_>>().join(" · ");
            card
        })
        .collect())
}

async fn research_cards(pool: &PgPool, limit: i64) -> Result<Vec<Card>, sqlx::Error> {
    let lines = ResearchLine::list(pool, &ListQuery::published(limit)).await?;
    let mut cards = Vec::with_capacity(lines.len());

    for line in lines {
        let team: Vec<_> = ResearchAssignment::teachers_of(pool, line.id)
            .await?
            .into_iter()
            .filter(|t| t.published)
            .collect();
        let coordinators: Vec<&str> = team
            .iter()
            .filter(|t| t.role == ResearchRole::Coordinator)
            .map(|t| t.full_name.as_str())
            .collect();

        let mut card = Card::new(line.title);
        card.body = text(&line.description);
        card.image_url = line.image_path.as_deref().map(public_url);
        card.subtitle = if coordinators.is_empty() {
            // Lines created before assignments existed only have the free-text field.
            text(&line.coordinator)
        } else {
            format!("{}: {}", ResearchRole::Coordinator.label(), coordinators.join(", "))
        };
        card.meta = match team.len() {
            0 => text(&line.members),
            1 => "1 integrante".to_string(),
            n => format!("{} integrantes", n),
        };
        cards.push(card);
    }

    Ok(cards)
}

async fn teacher_cards(pool: &PgPool, limit: i64) -> Result<Vec<Card>, sqlx::Error> {
    let items = Teacher::list(pool, &ListQuery::published(limit), None).await?;
    Ok(items
        .into_iter()
        .map(|t| {
            let mut card = Card::new(t.display_name());
            card.subtitle = text(&t.specialty);
            card.body = text(&t.bio);
            card.meta = text(&t.email);
            card.image_url = t.photo_path.as_deref().map(public_url);
            card
        })
        .collect())
}

async fn section_view(pool: &PgPool, section: &SectionConfig) -> Result<SectionView, StatusCode> {
    let limit = section.limit;
    let cards = match section.kind {
        SectionKind::Announcements => announcement_cards(pool, limit).await,
        SectionKind::Authorities => authority_cards(pool, limit).await,
        SectionKind::Calendar => calendar_cards(pool, limit).await,
        SectionKind::Documents => document_cards(pool, limit).await,
        SectionKind::Gallery => gallery_cards(pool, limit).await,
        SectionKind::Offices => office_cards(pool, limit).await,
        SectionKind::Research => research_cards(pool, limit).await,
        SectionKind::Teachers => teacher_cards(pool, limit).await,
    }
    .map_err(log_db_error(section.kind))?;

    Ok(SectionView {
        anchor: section.kind.anchor(),
        title: section.title.clone(),
        subtitle: section.subtitle.clone().unwrap_or_default(),
        cards,
        more_href: (section.kind == SectionKind::Gallery).then_some("/galeria"),
    })
}

pub async fn home(
    State(pool): State<PgPool>,
    State(landing): State<Arc<LandingConfig>>,
) -> Result<Response, StatusCode> {
    let mut sections = Vec::new();
    for section in landing.enabled_sections() {
        let view = section_view(&pool, section).await?;
        if !view.cards.is_empty() {
            sections.push(view);
        }
    }

    let nav = sections
        .iter()
        .map(|s| NavLink { anchor: s.anchor, title: s.title.clone() })
        .collect();

    let template = HomeTemplate {
        site_name: landing.site_name.clone(),
        hero_title: landing.hero.title.clone(),
        hero_subtitle: landing.hero.subtitle.clone(),
        cta_label: landing.hero.cta_label.clone(),
        cta_href: landing.hero.cta_href.clone(),
        nav,
        sections,
        contact_address: text(&landing.contact.address),
        contact_email: text(&landing.contact.email),
        contact_phone: text(&landing.contact.phone),
    };

    render(&template)
}
