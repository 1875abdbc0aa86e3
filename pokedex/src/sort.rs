use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::catalog::CatalogStore;
use crate::model::EntitySummary;

/// Alphabetical ordering key for names.
///
/// Primary level: letters with accents and case removed (`"Éevee"` sorts
/// with `"eevee"`, before `"zubat"`). Secondary level: the lower-cased name,
/// so accented forms follow their plain spelling.
pub fn collation_key(name: &str) -> (String, String) {
    let lowered = name.to_lowercase();
    let base = lowered
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect();
    (base, lowered)
}

/// New name-ordered sequence; `raw` is left untouched. Equal keys keep their
/// relative order.
pub fn sorted(raw: &[EntitySummary]) -> Vec<EntitySummary> {
    let mut list = raw.to_vec();
    list.sort_by_cached_key(|summary| collation_key(&summary.name));
    list
}

/// Sort toggle plus a cached sorted view keyed by catalog generation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SortIndex {
    enabled: bool,
    #[serde(skip)]
    cache: Option<(u64, Vec<EntitySummary>)>,
}

impl SortIndex {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            cache: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// The active base view: raw order when disabled, sorted otherwise.
    pub fn base<'a>(&'a mut self, catalog: &'a CatalogStore) -> &'a [EntitySummary] {
        if !self.enabled {
            return catalog.raw();
        }
        let generation = catalog.generation();
        let stale = !matches!(&self.cache, Some((cached, _)) if *cached == generation);
        if stale {
            tracing::debug!(generation, entries = catalog.len(), "rebuilding sorted view");
            self.cache = Some((generation, sorted(catalog.raw())));
        }
        match &self.cache {
            Some((_, list)) => list,
            None => catalog.raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn list(names: &[&str]) -> Vec<EntitySummary> {
        names
            .iter()
            .map(|name| EntitySummary::new(*name, format!("u/{name}")))
            .collect()
    }

    fn names(view: &[EntitySummary]) -> Vec<&str> {
        view.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn sorts_case_insensitively() {
        let raw = list(&["squirtle", "Pikachu", "bulbasaur", "charmander"]);
        let view = sorted(&raw);
        assert_eq!(
            names(&view),
            vec!["bulbasaur", "charmander", "Pikachu", "squirtle"]
        );
        assert_eq!(
            names(&raw),
            vec!["squirtle", "Pikachu", "bulbasaur", "charmander"]
        );
    }

    #[test]
    fn accented_names_sort_alphabetically() {
        let raw = list(&["zubat", "Éevee", "abra", "eevee", "Flabébé", "flaaffy"]);
        assert_eq!(
            names(&sorted(&raw)),
            vec!["abra", "eevee", "Éevee", "flaaffy", "Flabébé", "zubat"]
        );
    }

    #[test]
    fn already_sorted_input_is_unchanged() {
        let raw = list(&["bulbasaur", "charmander", "squirtle"]);
        assert_eq!(sorted(&raw), raw);
    }

    #[test]
    fn sorting_is_idempotent() {
        let raw = list(&["mew", "Abra", "eevee", "abra", "Mew", "zubat"]);
        let once = sorted(&raw);
        assert_eq!(sorted(&once), once);
    }

    #[test]
    fn equal_keys_keep_original_order() {
        let raw = vec![
            EntitySummary::new("Eevee", "first"),
            EntitySummary::new("ditto", "x"),
            EntitySummary::new("eevee", "second"),
        ];
        let view = sorted(&raw);
        let urls: Vec<_> = view.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["x", "first", "second"]);
    }

    #[test]
    fn toggle_on_then_off_restores_raw_order() {
        let catalog = CatalogStore::new(list(&["squirtle", "bulbasaur", "charmander"]));
        let mut index = SortIndex::default();

        let raw = index.base(&catalog).to_vec();
        assert!(index.toggle());
        assert_eq!(
            names(index.base(&catalog)),
            vec!["bulbasaur", "charmander", "squirtle"]
        );
        assert!(!index.toggle());
        assert_eq!(index.base(&catalog), raw.as_slice());
    }

    #[test]
    fn cache_is_rebuilt_after_catalog_replace() {
        let mut catalog = CatalogStore::new(list(&["squirtle", "bulbasaur"]));
        let mut index = SortIndex::new(true);
        assert_eq!(names(index.base(&catalog)), vec!["bulbasaur", "squirtle"]);

        catalog.replace(list(&["zubat", "abra"]));
        assert_eq!(names(index.base(&catalog)), vec!["abra", "zubat"]);
    }
}
