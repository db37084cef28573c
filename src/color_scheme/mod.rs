//! Color schemes decide the color of every drawn primitive.
//!
//! A scheme is built once, started when a recording session begins and
//! stopped when it ends. `color_for` runs on the render thread but takes
//! `&self`, so schemes keep any mutable state (timers, random generators)
//! behind their own locks and stay safe to share between engines.

mod classic;
mod rainbow;

pub use classic::{ClassicScheme, STAMP_GRAY_LIMIT, TRAIL_GRAY};
pub use rainbow::RainbowScheme;

use std::collections::BTreeMap;
use std::sync::Arc;

use egui::{Color32, Pos2};

use crate::draw_event::DrawEvent;

/// Capability every palette variant provides
pub trait ColorScheme: Send + Sync {
    /// Variant name shown in the scheme menu
    fn name(&self) -> &str;

    /// Called when a recording session starts
    fn start(&self) {}

    /// Called when a recording session ends
    fn stop(&self) {}

    /// Color for a primitive triggered by `event` at `location`
    fn color_for(&self, event: DrawEvent, location: Pos2) -> Color32;
}

/// Builds a fresh instance of a scheme variant
pub type SchemeFactory = Arc<dyn Fn() -> Arc<dyn ColorScheme> + Send + Sync>;

#[derive(Clone)]
struct SchemeEntry {
    variant: String,
    factory: SchemeFactory,
}

/// Scheme variants grouped under family names, for the scheme menu.
///
/// The caller owns the registry and decides what goes in it; nothing
/// registers itself.
#[derive(Clone, Default)]
pub struct ColorSchemeRegistry {
    families: BTreeMap<String, Vec<SchemeEntry>>,
}

impl std::fmt::Debug for ColorSchemeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (family, entries) in &self.families {
            let variants: Vec<&str> = entries.iter().map(|e| e.variant.as_str()).collect();
            map.entry(family, &variants);
        }
        map.finish()
    }
}

impl ColorSchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the schemes that ship with the crate
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("Classic", ClassicScheme::NAME, || Arc::new(ClassicScheme::new()));
        registry.register("Rainbow", RainbowScheme::NAME, || Arc::new(RainbowScheme::new()));
        registry
    }

    /// Add a variant to a family. A variant already registered under the same
    /// family and name is replaced.
    pub fn register<F>(&mut self, family: &str, variant: &str, factory: F)
    where
        F: Fn() -> Arc<dyn ColorScheme> + Send + Sync + 'static,
    {
        let entries = self.families.entry(family.to_string()).or_default();
        let entry = SchemeEntry {
            variant: variant.to_string(),
            factory: Arc::new(factory),
        };
        match entries.iter_mut().find(|e| e.variant == variant) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }

    /// Family names in sorted order
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(String::as_str)
    }

    /// Variant names within a family, in registration order
    pub fn variants(&self, family: &str) -> Vec<&str> {
        self.families
            .get(family)
            .map(|entries| entries.iter().map(|e| e.variant.as_str()).collect())
            .unwrap_or_default()
    }

    /// Build a new instance of the named variant
    pub fn create(&self, variant: &str) -> Option<Arc<dyn ColorScheme>> {
        self.find(variant).map(|entry| (entry.factory)())
    }

    fn find(&self, variant: &str) -> Option<&SchemeEntry> {
        self.families
            .values()
            .flat_map(|entries| entries.iter())
            .find(|e| e.variant == variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat(Color32);

    impl ColorScheme for Flat {
        fn name(&self) -> &str {
            "Flat"
        }

        fn color_for(&self, _event: DrawEvent, _location: Pos2) -> Color32 {
            self.0
        }
    }

    #[test]
    fn test_builtin_families() {
        let registry = ColorSchemeRegistry::with_builtin();
        let families: Vec<&str> = registry.families().collect();
        assert_eq!(families, vec!["Classic", "Rainbow"]);
        assert_eq!(registry.variants("Rainbow"), vec![RainbowScheme::NAME]);
        assert!(registry.variants("Missing").is_empty());
    }

    #[test]
    fn test_create_builds_named_variant() {
        let registry = ColorSchemeRegistry::with_builtin();
        let scheme = registry.create(ClassicScheme::NAME).unwrap();
        assert_eq!(scheme.name(), ClassicScheme::NAME);
        assert!(registry.create("Sepia").is_none());
    }

    #[test]
    fn test_register_replaces_same_variant() {
        let mut registry = ColorSchemeRegistry::new();
        registry.register("Flat", "Flat", || Arc::new(Flat(Color32::RED)));
        registry.register("Flat", "Flat", || Arc::new(Flat(Color32::BLUE)));
        assert_eq!(registry.variants("Flat").len(), 1);

        let scheme = registry.create("Flat").unwrap();
        assert_eq!(scheme.color_for(DrawEvent::MouseMove, Pos2::ZERO), Color32::BLUE);
    }
}
