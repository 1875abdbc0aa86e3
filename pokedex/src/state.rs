use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::model::{EntityDetail, EntitySummary, SpriteVariant};
use crate::resolver::{CardDeck, CardState};
use crate::search;
use crate::sort::SortIndex;

/// Rows taken by header, footer and list borders.
const LIST_CHROME_ROWS: u16 = 8;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub config: Config,
    pub terminal_size: (u16, u16),

    pub catalog: CatalogStore,
    pub sort: SortIndex,
    pub search: SearchState,
    /// Active view: filtered over whichever base the sort toggle selects.
    pub view: Vec<EntitySummary>,
    pub selected_index: usize,

    pub details: HashMap<String, DataResource<EntityDetail>>,
    pub cards: CardDeck,

    pub catalog_loading: bool,
    pub prefetch_loading: bool,
    pub message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sort = SortIndex::new(config.sorted);
        Self {
            config,
            terminal_size: (80, 24),
            catalog: CatalogStore::default(),
            sort,
            search: SearchState::default(),
            view: Vec::new(),
            selected_index: 0,
            details: HashMap::new(),
            cards: CardDeck::default(),
            catalog_loading: false,
            prefetch_loading: false,
            message: None,
        }
    }

    /// Re-derive the active view from the catalog, sort toggle and query.
    /// The selection follows the previously selected entity when it survives.
    pub fn rebuild_view(&mut self) {
        let previous = self.selected_name();
        let base = self.sort.base(&self.catalog);
        self.view = search::filter(base, &self.search.query, &self.details);

        self.selected_index = previous
            .and_then(|name| self.view.iter().position(|entry| entry.name == name))
            .unwrap_or(0);
    }

    pub fn selected_entry(&self) -> Option<&EntitySummary> {
        self.view.get(self.selected_index)
    }

    pub fn selected_name(&self) -> Option<String> {
        self.selected_entry().map(|entry| entry.name.clone())
    }

    pub fn set_selected_index(&mut self, index: usize) -> bool {
        if self.view.is_empty() {
            self.selected_index = 0;
            return false;
        }
        let bounded = index.min(self.view.len() - 1);
        if bounded != self.selected_index {
            self.selected_index = bounded;
            return true;
        }
        false
    }

    pub fn page_size(&self) -> usize {
        self.terminal_size.1.saturating_sub(LIST_CHROME_ROWS).max(1) as usize
    }

    /// Rows of `view` currently on screen: the page holding the selection.
    pub fn page_range(&self) -> Range<usize> {
        let page = self.page_size();
        let start = (self.selected_index / page) * page;
        let end = (start + page).min(self.view.len());
        start.min(end)..end
    }

    pub fn visible_names(&self) -> Vec<String> {
        self.view[self.page_range()]
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    pub fn detail(&self, name: &str) -> Option<&EntityDetail> {
        self.details.get(name).and_then(DataResource::data)
    }

    pub fn resolution(&self, name: &str) -> &DataResource<EntityDetail> {
        const EMPTY: &DataResource<EntityDetail> = &DataResource::Empty;
        self.details.get(name).unwrap_or(EMPTY)
    }

    pub fn card(&self, name: &str) -> Option<&CardState> {
        self.cards.card(name)
    }

    pub fn sprite_variant(&self, name: &str) -> SpriteVariant {
        self.card(name).map(CardState::variant).unwrap_or_default()
    }

    pub fn resolved_count(&self) -> usize {
        self.details
            .values()
            .filter(|resource| resource.is_loaded())
            .count()
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Catalog")
                .entry("total", ron_string(&self.catalog.len()))
                .entry("generation", ron_string(&self.catalog.generation()))
                .entry("view", ron_string(&self.view.len()))
                .entry("selected", ron_string(&self.selected_index))
                .entry("page", ron_string(&self.page_range())),
            DebugSection::new("Filters")
                .entry("search", ron_string(&self.search.query))
                .entry("search_active", ron_string(&self.search.active))
                .entry("sorted", ron_string(&self.sort.enabled())),
            DebugSection::new("Details")
                .entry("resolved", ron_string(&self.resolved_count()))
                .entry("mounted", ron_string(&self.cards.len()))
                .entry("prefetch", ron_string(&self.config.prefetch)),
            DebugSection::new("Status")
                .entry("catalog_loading", ron_string(&self.catalog_loading))
                .entry("prefetch_loading", ron_string(&self.prefetch_loading))
                .entry("message", ron_string(&self.message)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;

    fn loaded_state(names: &[&str]) -> AppState {
        let mut state = AppState::default();
        let summaries = names
            .iter()
            .enumerate()
            .map(|(idx, name)| FakeSource::summary(idx as u32 + 1, name))
            .collect();
        state.catalog.replace(summaries);
        state.rebuild_view();
        state
    }

    #[test]
    fn page_range_follows_selection() {
        let names: Vec<String> = (0..30).map(|i| format!("mon{i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut state = loaded_state(&refs);
        state.terminal_size = (80, 18);
        assert_eq!(state.page_size(), 10);
        assert_eq!(state.page_range(), 0..10);

        state.set_selected_index(14);
        assert_eq!(state.page_range(), 10..20);
        state.set_selected_index(29);
        assert_eq!(state.page_range(), 20..30);
        assert_eq!(state.visible_names().len(), 10);
    }

    #[test]
    fn empty_view_has_empty_page() {
        let state = AppState::default();
        assert_eq!(state.page_range(), 0..0);
        assert!(state.visible_names().is_empty());
    }

    #[test]
    fn rebuild_keeps_selected_entity() {
        let mut state = loaded_state(&["squirtle", "bulbasaur", "charmander"]);
        state.set_selected_index(0);
        state.sort.toggle();
        state.rebuild_view();
        assert_eq!(state.selected_name().as_deref(), Some("squirtle"));
        assert_eq!(state.selected_index, 2);
    }

    #[test]
    fn unknown_names_resolve_to_empty() {
        let state = AppState::default();
        assert!(state.resolution("mew").is_empty());
        assert_eq!(state.sprite_variant("mew"), SpriteVariant::default());
    }
}
