//! Gallery lightbox state: category filtering and bounded navigation.

use crate::utils::normalize::{loosely_equal, normalize_text};

/// Query value that selects every category.
pub const ALL_CATEGORIES: &str = "todas";

pub trait Categorized {
    fn category(&self) -> Option<&str>;
}

/// Distinct, non-empty categories sorted alphabetically (accent-insensitive).
pub fn categories<T: Categorized>(items: &[T]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for category in items.iter().filter_map(|i| i.category()) {
        let category = category.trim();
        if category.is_empty() {
            continue;
        }
        if !found.iter().any(|c| loosely_equal(c, category)) {
            found.push(category.to_string());
        }
    }
    found.sort_by_key(|c| normalize_text(c));
    found
}

/// Items in `category`, or all of them when no category (or "todas") is given.
pub fn filter_by_category<'a, T: Categorized>(items: &'a [T], category: Option<&str>) -> Vec<&'a T> {
    match category.map(str::trim).filter(|c| !c.is_empty()) {
        None => items.iter().collect(),
        Some(c) if loosely_equal(c, ALL_CATEGORIES) => items.iter().collect(),
        Some(c) => items
            .iter()
            .filter(|i| i.category().is_some_and(|ic| loosely_equal(ic, c)))
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxKey {
    ArrowLeft,
    ArrowRight,
    Escape,
}

impl LightboxKey {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(LightboxKey::ArrowLeft),
            "ArrowRight" => Some(LightboxKey::ArrowRight),
            "Escape" | "Esc" => Some(LightboxKey::Escape),
            _ => None,
        }
    }
}

/// Open/closed state over a list of `len` images. Navigation clamps at both
/// ends instead of wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lightbox {
    len: usize,
    current: Option<usize>,
}

impl Lightbox {
    pub fn new(len: usize) -> Self {
        Self { len, current: None }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn open(&mut self, index: usize) {
        self.current = if self.len == 0 {
            None
        } else {
            Some(index.min(self.len - 1))
        };
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn next(&mut self) {
        if let Some(i) = self.current {
            self.current = Some((i + 1).min(self.len - 1));
        }
    }

    pub fn previous(&mut self) {
        if let Some(i) = self.current {
            self.current = Some(i.saturating_sub(1));
        }
    }

    pub fn has_next(&self) -> bool {
        self.current.is_some_and(|i| i + 1 < self.len)
    }

    pub fn has_previous(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    /// Apply a key press; returns whether the state changed.
    pub fn handle_key(&mut self, key: LightboxKey) -> bool {
        let before = *self;
        match key {
            LightboxKey::ArrowLeft => self.previous(),
            LightboxKey::ArrowRight => self.next(),
            LightboxKey::Escape => self.close(),
        }
        before != *self
    }

    /// The state a key press would lead to, without mutating this one.
    pub fn after_key(&self, key: LightboxKey) -> Lightbox {
        let mut next = *self;
        next.handle_key(key);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Img(Option<&'static str>);

    impl Categorized for Img {
        fn category(&self) -> Option<&str> {
            self.0
        }
    }

    fn images() -> Vec<Img> {
        vec![
            Img(Some("Eventos")),
            Img(Some("Laboratorios")),
            Img(None),
            Img(Some("eventos")),
            Img(Some("  ")),
            Img(Some("Ceremonias")),
        ]
    }

    #[test]
    fn test_categories_are_distinct_and_sorted() {
        assert_eq!(categories(&images()), vec!["Ceremonias", "Eventos", "Laboratorios"]);
    }

    #[test]
    fn test_filter_by_category() {
        let items = images();
        assert_eq!(filter_by_category(&items, None).len(), 6);
        assert_eq!(filter_by_category(&items, Some("")).len(), 6);
        assert_eq!(filter_by_category(&items, Some("Todas")).len(), 6);
        assert_eq!(filter_by_category(&items, Some("EVENTOS")).len(), 2);
        assert!(filter_by_category(&items, Some("Deportes")).is_empty());
    }

    #[test]
    fn test_open_clamps_index() {
        let mut lightbox = Lightbox::new(3);
        lightbox.open(10);
        assert_eq!(lightbox.current(), Some(2));

        let mut empty = Lightbox::new(0);
        empty.open(0);
        assert!(!empty.is_open());
    }

    #[test]
    fn test_navigation_clamps_at_bounds() {
        let mut lightbox = Lightbox::new(3);
        lightbox.open(0);
        lightbox.previous();
        assert_eq!(lightbox.current(), Some(0));
        assert!(!lightbox.has_previous());

        lightbox.next();
        lightbox.next();
        lightbox.next();
        assert_eq!(lightbox.current(), Some(2));
        assert!(!lightbox.has_next());
    }

    #[test]
    fn test_navigation_is_noop_when_closed() {
        let mut lightbox = Lightbox::new(3);
        lightbox.next();
        lightbox.previous();
        assert_eq!(lightbox.current(), None);
    }

    #[test]
    fn test_keyboard() {
        let mut lightbox = Lightbox::new(2);
        lightbox.open(0);

        assert!(!lightbox.handle_key(LightboxKey::ArrowLeft));
        assert!(lightbox.handle_key(LightboxKey::ArrowRight));
        assert_eq!(lightbox.current(), Some(1));
        assert!(!lightbox.handle_key(LightboxKey::ArrowRight));
        assert!(lightbox.handle_key(LightboxKey::Escape));
        assert!(!lightbox.is_open());
    }

    #[test]
    fn test_after_key_does_not_mutate() {
        let mut lightbox = Lightbox::new(4);
        lightbox.open(1);
        assert_eq!(lightbox.after_key(LightboxKey::ArrowRight).current(), Some(2));
        assert_eq!(lightbox.after_key(LightboxKey::Escape).current(), None);
        assert_eq!(lightbox.current(), Some(1));
    }

    #[test]
    fn test_dom_key_mapping() {
        assert_eq!(LightboxKey::from_dom_key("ArrowLeft"), Some(LightboxKey::ArrowLeft));
        assert_eq!(LightboxKey::from_dom_key("Esc"), Some(LightboxKey::Escape));
        assert_eq!(LightboxKey::from_dom_key("Enter"), None);
    }
}
