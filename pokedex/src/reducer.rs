use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::state::AppState;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.catalog_loading = true;
            state.message = None;
            let mut effects = vec![Effect::LoadCatalog {
                limit: state.config.limit,
            }];
            if let Some(path) = state.config.music.clone() {
                effects.push(Effect::PlayMusic { path });
            }
            DispatchResult::changed_with_many(effects)
        }

        Action::CatalogReload => {
            if state.catalog_loading {
                return DispatchResult::unchanged();
            }
            state.catalog_loading = true;
            state.message = None;
            DispatchResult::changed_with(Effect::LoadCatalog {
                limit: state.config.limit,
            })
        }

        Action::CatalogDidLoad(summaries) => {
            state.catalog_loading = false;
            state.message = None;
            state.catalog.replace(summaries);
            state.sort.invalidate();
            state.rebuild_view();
            state.selected_index = 0;
            let mut effects = sync_visible(state);
            if state.config.prefetch && !state.catalog.is_empty() {
                state.prefetch_loading = true;
                effects.push(Effect::PrefetchDetails {
                    names: state.catalog.names(),
                });
            }
            DispatchResult::changed_with_many(effects)
        }

        Action::CatalogDidError(error) => {
            state.catalog_loading = false;
            state.message = Some(format!("Catalog error: {error}"));
            DispatchResult::changed()
        }

        Action::PrefetchDidLoad { details, failures } => {
            state.prefetch_loading = false;
            for detail in details {
                let name = detail.name.clone();
                if !state.resolution(&name).is_loaded() {
                    state.details.insert(name, DataResource::Loaded(detail));
                }
            }
            for (name, error) in failures {
                state
                    .details
                    .entry(name)
                    .or_insert_with(|| DataResource::Failed(error.to_string()));
            }
            refresh_after_details(state)
        }

        Action::DetailDidLoad { name, detail } => {
            if state.resolution(&name).is_loaded() {
                return DispatchResult::unchanged();
            }
            state.details.insert(name.clone(), DataResource::Loaded(detail));
            state.cards.reset_swap(&name);
            refresh_after_details(state)
        }

        Action::DetailDidError { name, error } => {
            if state.resolution(&name).is_loaded() {
                return DispatchResult::unchanged();
            }
            state.message = Some(format!("{name}: {error}"));
            state
                .details
                .insert(name, DataResource::Failed(error.to_string()));
            DispatchResult::changed()
        }

        Action::DetailRetry => {
            let Some(name) = state.selected_name() else {
                return DispatchResult::unchanged();
            };
            if !state.resolution(&name).is_failed() {
                return DispatchResult::unchanged();
            }
            state.details.insert(name.clone(), DataResource::Loading);
            state.message = None;
            DispatchResult::changed_with(Effect::ResolveDetail { name })
        }

        Action::SortToggle => {
            state.sort.toggle();
            state.rebuild_view();
            DispatchResult::changed_with_many(sync_visible(state))
        }

        Action::SearchStart => {
            state.search.active = true;
            state.search.query.clear();
            state.rebuild_view();
            DispatchResult::changed_with_many(sync_visible(state))
        }

        Action::SearchCancel => {
            if !state.search.active && state.search.query.is_empty() {
                return DispatchResult::unchanged();
            }
            state.search.active = false;
            state.search.query.clear();
            state.rebuild_view();
            DispatchResult::changed_with_many(sync_visible(state))
        }

        Action::SearchSubmit => {
            state.search.active = false;
            DispatchResult::changed()
        }

        Action::SearchInput(ch) => {
            state.search.query.push(ch);
            state.rebuild_view();
            DispatchResult::changed_with_many(sync_visible(state))
        }

        Action::SearchBackspace => {
            if state.search.query.pop().is_none() {
                return DispatchResult::unchanged();
            }
            state.rebuild_view();
            DispatchResult::changed_with_many(sync_visible(state))
        }

        Action::SelectionMove(delta) => {
            let index = clamp_index(state.selected_index, state.view.len(), delta);
            select(state, index)
        }

        Action::SelectionPage(delta) => {
            let page = state.page_size() as i16;
            let index = clamp_index(state.selected_index, state.view.len(), delta * page);
            select(state, index)
        }

        Action::SelectionJumpTop => select(state, 0),

        Action::SelectionJumpBottom => {
            let last = state.view.len().saturating_sub(1);
            select(state, last)
        }

        Action::PageSelect(row) => {
            let index = state.page_range().start + row;
            select(state, index)
        }

        Action::CardSwapToggle => {
            let Some(name) = state.selected_name() else {
                return DispatchResult::unchanged();
            };
            if state.cards.toggle_back(&name) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::MusicDidFinish => DispatchResult::unchanged(),

        Action::MusicDidError(error) => {
            tracing::warn!(%error, "opening theme failed");
            DispatchResult::unchanged()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            DispatchResult::changed_with_many(sync_visible(state))
        }

        Action::Tick => {
            let interval = state.config.tick_interval();
            if state.cards.advance(interval) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

fn select(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if !state.set_selected_index(index) {
        return DispatchResult::unchanged();
    }
    DispatchResult::changed_with_many(sync_visible(state))
}

/// New details can change which entries match a type query.
fn refresh_after_details(state: &mut AppState) -> DispatchResult<Effect> {
    if state.search.query.trim().is_empty() {
        return DispatchResult::changed();
    }
    state.rebuild_view();
    DispatchResult::changed_with_many(sync_visible(state))
}

/// Mount cards for entities that scrolled into view and unmount the rest.
/// Newly mounted entities without a detail start resolving; unmounted ones
/// with a fetch still in flight are cancelled.
fn sync_visible(state: &mut AppState) -> Vec<Effect> {
    let visible = state.visible_names();
    let change = state.cards.sync_visible(&visible);
    let mut effects = Vec::new();

    for name in change.unmounted {
        if state.resolution(&name).is_loading() {
            state.details.remove(&name);
            effects.push(Effect::CancelDetail { name });
        }
    }

    for name in change.mounted {
        let resource = state.resolution(&name);
        if resource.is_loaded() || resource.is_loading() {
            continue;
        }
        state.details.insert(name.clone(), DataResource::Loading);
        effects.push(Effect::ResolveDetail { name });
    }
    effects
}

fn clamp_index(current: usize, len: usize, delta: i16) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as i64 + delta as i64;
    next.clamp(0, len as i64 - 1) as usize
}
