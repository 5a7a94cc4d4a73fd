use std::sync::Arc;

use askama::Template;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Deserialize;
use sqlx::PgPool;

use super::render;
use crate::landing::LandingConfig;
use crate::models::{GalleryImage, ListQuery, MAX_LIMIT};
use crate::utils::lightbox::ALL_CATEGORIES;
use crate::utils::{categories, filter_by_category, loosely_equal, Lightbox, LightboxKey};

#[derive(Debug, Default, Deserialize)]
pub struct GalleryPageQuery {
    pub categoria: Option<String>,
    /// Index into the filtered list of the image shown in the lightbox
    pub imagen: Option<usize>,
}

#[derive(Template)]
#[template(path = "gallery.html")]
struct GalleryTemplate {
    site_name: String,
    categories: Vec<CategoryLink>,
    images: Vec<GalleryCard>,
    lightbox: Option<LightboxView>,
}

struct CategoryLink {
    label: String,
    href: String,
    active: bool,
}

struct GalleryCard {
    title: String,
    category: String,
    url: String,
    href: String,
}

struct LightboxView {
    title: String,
    description: String,
    url: String,
    position: String,
    previous_href: Option<String>,
    next_href: Option<String>,
    close_href: String,
}

/// `/galeria` link for a category filter and an optional open image.
pub fn gallery_href(category: Option<&str>, image: Option<usize>) -> String {
    let mut params = Vec::new();
    if let Some(category) = category {
        params.push(format!("categoria={}", urlencoding::encode(category)));
    }
    if let Some(index) = image {
        params.push(format!("imagen={}", index));
    }
    if params.is_empty() {
        "/galeria".to_string()
    } else {
        format!("/galeria?{}", params.join("&"))
    }
}

/// Links reachable from `lightbox` with the keyboard, as (previous, next).
pub fn navigation_targets(lightbox: &Lightbox) -> (Option<usize>, Option<usize>) {
    let step = |key| {
        let moved = lightbox.after_key(key);
        (moved != *lightbox).then(|| moved.current()).flatten()
    };
    (step(LightboxKey::ArrowLeft), step(LightboxKey::ArrowRight))
}

pub async fn gallery_page(
    State(pool): State<PgPool>,
    State(landing): State<Arc<LandingConfig>>,
    Query(query): Query<GalleryPageQuery>,
) -> Result<Response, StatusCode> {
    let all = GalleryImage::list(&pool, &ListQuery::published(MAX_LIMIT))
        .await
        .map_err(|e| {
            tracing::error!("Database error fetching gallery: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let selected = query
        .categoria
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !loosely_equal(c, ALL_CATEGORIES));
    let filtered = filter_by_category(&all, selected);

    let mut categories_nav = vec![CategoryLink {
        label: "Todas".to_string(),
        href: gallery_href(None, None),
        active: selected.is_none(),
    }];
    categories_nav.extend(categories(&all).into_iter().map(|c| CategoryLink {
        href: gallery_href(Some(&c), None),
        active: selected.is_some_and(|s| loosely_equal(s, &c)),
        label: c,
    }));

    let images = filtered
        .iter()
        .enumerate()
        .map(|(index, image)| GalleryCard {
            title: image.title.clone(),
            category: image.category.clone().unwrap_or_default(),
            url: format!("/api/gallery/image/{}", image.id),
            href: gallery_href(selected, Some(index)),
        })
        .collect();

    let mut lightbox = Lightbox::new(filtered.len());
    if let Some(index) = query.imagen {
        lightbox.open(index);
    }

    let lightbox = lightbox.current().map(|index| {
        let image = filtered[index];
        let (previous, next) = navigation_targets(&lightbox);
        LightboxView {
            title: image.title.clone(),
            description: image.description.clone().unwrap_or_default(),
            url: format!("/api/gallery/image/{}", image.id),
            position: format!("{} / {}", index + 1, lightbox.len()),
            previous_href: previous.map(|i| gallery_href(selected, Some(i))),
            next_href: next.map(|i| gallery_href(selected, Some(i))),
            close_href: gallery_href(selected, None),
        }
    });

    let template = GalleryTemplate {
        site_name: landing.site_name.clone(),
        categories: categories_nav,
        images,
        lightbox,
    };

    render(&template)
}
