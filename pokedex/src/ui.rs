use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{
    Component, DataResource, EventContext, EventKind, EventRoutingState, HandlerResponse,
    RenderContext,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::model::{EntityDetail, EntitySummary};
use crate::state::AppState;

const BG_BASE: Color = Color::Rgb(12, 18, 28);
const BG_PANEL: Color = Color::Rgb(20, 32, 46);
const BG_CARD: Color = Color::Rgb(255, 240, 245);
const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
const TEXT_CARD: Color = Color::Rgb(20, 20, 20);
const ACCENT_RED: Color = Color::Rgb(255, 35, 35);
const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DexComponentId {
    Header,
    DexList,
    Card,
    Search,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DexContext {
    DexList,
    Search,
}

impl EventRoutingState<DexComponentId, DexContext> for AppState {
    fn focused(&self) -> Option<DexComponentId> {
        if self.search.active {
            Some(DexComponentId::Search)
        } else {
            Some(DexComponentId::DexList)
        }
    }

    fn modal(&self) -> Option<DexComponentId> {
        if self.search.active {
            Some(DexComponentId::Search)
        } else {
            None
        }
    }

    fn binding_context(&self, id: DexComponentId) -> DexContext {
        match id {
            DexComponentId::Search => DexContext::Search,
            _ => DexContext::DexList,
        }
    }

    fn default_context(&self) -> DexContext {
        DexContext::DexList
    }
}

pub struct DexUi {
    dex_list: SelectList,
    status_bar: StatusBar,
}

impl Default for DexUi {
    fn default() -> Self {
        Self::new()
    }
}

impl DexUi {
    pub fn new() -> Self {
        Self {
            dex_list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<DexComponentId>,
    ) {
        let layout = app_layout(area);
        event_ctx.set_component_area(DexComponentId::Header, layout[0]);
        if state.search.active {
            event_ctx.set_component_area(DexComponentId::Search, layout[0]);
        }
        let body = body_layout(layout[1]);
        event_ctx.set_component_area(DexComponentId::DexList, body[0]);
        event_ctx.set_component_area(DexComponentId::Card, body[1]);

        self.render_frame(frame, area, state);
    }

    /// Draw without event routing; used by the render tests.
    pub fn render_frame(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let base = Block::default().style(Style::default().bg(BG_BASE));
        frame.render_widget(base, area);
        let layout = app_layout(area);
        render_header(frame, layout[0], state);
        let body = body_layout(layout[1]);
        render_list(frame, body[0], state, &mut self.dex_list);
        render_card(frame, body[1], state);
        render_footer(frame, layout[2], state, &mut self.status_bar);
    }

    pub fn handle_list_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_list_event(event, state, &mut self.dex_list)
    }

    pub fn handle_search_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        handle_search_event(event, state)
    }
}

fn app_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area)
}

fn body_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area)
}

pub fn handle_list_event(
    event: &EventKind,
    state: &AppState,
    dex_list: &mut SelectList,
) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Up => vec![Action::SelectionMove(-1)],
            crossterm::event::KeyCode::Down => vec![Action::SelectionMove(1)],
            crossterm::event::KeyCode::PageDown => vec![Action::SelectionPage(1)],
            crossterm::event::KeyCode::PageUp => vec![Action::SelectionPage(-1)],
            crossterm::event::KeyCode::Home => vec![Action::SelectionJumpTop],
            crossterm::event::KeyCode::End => vec![Action::SelectionJumpBottom],
            crossterm::event::KeyCode::Char('s') => vec![Action::SortToggle],
            crossterm::event::KeyCode::Char('b') => vec![Action::CardSwapToggle],
            crossterm::event::KeyCode::Char('r') => vec![Action::DetailRetry],
            crossterm::event::KeyCode::Char('R') => vec![Action::CatalogReload],
            _ => vec![],
        },
        EventKind::Scroll { delta, .. } => vec![Action::SelectionMove((*delta * 3) as i16)],
        _ => {
            let items = page_items(state);
            let props = SelectListProps {
                items: &items,
                count: items.len(),
                selected: page_row(state, items.len()),
                is_focused: true,
                style: dex_list_style(),
                behavior: SelectListBehavior {
                    show_scrollbar: false,
                    wrap_navigation: false,
                },
                on_select: Action::PageSelect,
                render_item: &|item| item.clone(),
            };
            return handler_response(dex_list.handle_event(event, props).into_iter().collect());
        }
    };
    handler_response(actions)
}

pub fn handle_search_event(event: &EventKind, _state: &AppState) -> HandlerResponse<Action> {
    let actions = match event {
        EventKind::Key(key) => match key.code {
            crossterm::event::KeyCode::Esc => vec![Action::SearchCancel],
            crossterm::event::KeyCode::Enter => vec![Action::SearchSubmit],
            crossterm::event::KeyCode::Backspace => vec![Action::SearchBackspace],
            crossterm::event::KeyCode::Char(ch) => vec![Action::SearchInput(ch)],
            _ => vec![],
        },
        _ => vec![],
    };
    handler_response(actions)
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let title_style = Style::default()
        .fg(ACCENT_RED)
        .add_modifier(Modifier::BOLD);
    let search = if state.search.active {
        format!("/{}_", state.search.query)
    } else if state.search.query.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", state.search.query)
    };
    let order = if state.sort.enabled() { "BY NAME" } else { "DEX ORDER" };
    let header = Line::from(vec![
        Span::styled("POKEDEX", title_style),
        Span::raw("  |  Search: "),
        Span::styled(search, Style::default().fg(ACCENT_TEAL)),
        Span::raw("  |  Order: "),
        Span::styled(order, Style::default().fg(ACCENT_GOLD)),
        Span::raw("  |  "),
        Span::styled(
            format!("{}/{}", state.view.len(), state.catalog.len()),
            Style::default().fg(ACCENT_TEAL),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM));
    let paragraph = Paragraph::new(header)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_list(frame: &mut Frame, area: Rect, state: &AppState, dex_list: &mut SelectList) {
    let range = state.page_range();
    let pages = state.view.len().div_ceil(state.page_size()).max(1);
    let page = range.start / state.page_size() + 1;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("DEX {page}/{pages}"))
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(
            Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.view.is_empty() {
        let text = if state.catalog_loading {
            "Loading catalog..."
        } else if state.catalog.is_empty() {
            "Catalog unavailable."
        } else {
            "No match."
        };
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(TEXT_DIM)),
            inner,
        );
        return;
    }

    let items = page_items(state);
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: page_row(state, items.len()),
        is_focused: !state.search.active,
        style: dex_list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: false,
            wrap_navigation: false,
        },
        on_select: Action::PageSelect,
        render_item: &|item| item.clone(),
    };
    dex_list.render(frame, inner, props);
}

fn page_row(state: &AppState, len: usize) -> usize {
    state
        .selected_index
        .saturating_sub(state.page_range().start)
        .min(len.saturating_sub(1))
}

fn page_items(state: &AppState) -> Vec<Line<'static>> {
    state.view[state.page_range()]
        .iter()
        .map(|entry| dex_line(state, entry))
        .collect()
}

fn dex_line(state: &AppState, entry: &EntitySummary) -> Line<'static> {
    let resource = state.resolution(&entry.name);
    let id = resource
        .data()
        .map(|detail| detail.id)
        .or_else(|| entry.id_from_url())
        .map(|id| format!("#{id:04}"))
        .unwrap_or_else(|| "#----".to_string());
    let kind = match resource {
        DataResource::Loaded(detail) => detail.primary_type().unwrap_or("?").to_string(),
        DataResource::Loading => "...".to_string(),
        DataResource::Failed(_) => "!".to_string(),
        DataResource::Empty => String::new(),
    };
    Line::from(vec![
        Span::styled(id, Style::default().fg(TEXT_DIM)),
        Span::raw(" "),
        Span::styled(entry.name.clone(), Style::default().fg(TEXT_MAIN)),
        Span::raw(" "),
        Span::styled(kind, Style::default().fg(ACCENT_GOLD)),
    ])
}

fn render_card(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = state
        .selected_name()
        .map(|name| name.to_ascii_uppercase())
        .unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_CARD).fg(TEXT_CARD))
        .border_style(Style::default().fg(ACCENT_RED));

    let text = match state.selected_entry() {
        None => Text::from("[select a pokemon]"),
        Some(entry) => match state.resolution(&entry.name) {
            DataResource::Loaded(detail) => card_text(state, detail),
            DataResource::Failed(error) => Text::from(vec![
                Line::from(Span::styled(
                    "[unresolved]",
                    Style::default().fg(ACCENT_RED),
                )),
                Line::from(error.clone()),
                Line::from("press r to retry"),
            ]),
            _ => Text::from("[resolving...]"),
        },
    };
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn card_text(state: &AppState, detail: &EntityDetail) -> Text<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let variant = state.sprite_variant(&detail.name);
    let exp = detail
        .base_experience
        .map(|exp| exp.to_string())
        .unwrap_or_else(|| "?".to_string());
    let sprite = detail
        .sprites
        .url(variant)
        .unwrap_or("(no sprite)")
        .to_string();
    Text::from(vec![
        Line::from(Span::styled(
            detail.name.clone(),
            bold.fg(ACCENT_RED),
        )),
        Line::from(Span::styled(format!("ID: {}", detail.id), bold)),
        Line::from(Span::styled(
            format!("Type: {}", detail.primary_type().unwrap_or("?")),
            bold,
        )),
        Line::from(Span::styled(format!("Height: {} m", detail.height_m()), bold)),
        Line::from(Span::styled(format!("Weight: {} kg", detail.weight_kg()), bold)),
        Line::from(Span::styled(format!("Exp: {exp}"), bold)),
        Line::from(""),
        Line::from(format!("Sprite: {}", variant.label())),
        Line::from(sprite),
    ])
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = state.message.clone().unwrap_or_else(|| {
        if state.catalog_loading {
            "Loading catalog...".to_string()
        } else if state.prefetch_loading {
            format!(
                "Prefetching details {}/{}",
                state.resolved_count(),
                state.catalog.len()
            )
        } else {
            String::new()
        }
    });
    let hints = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default()
            .fg(ACCENT_TEAL)
            .add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&hints).with_separator("  "),
        center: StatusBarSection::hints(&[]),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> Vec<StatusBarHint<'static>> {
    if state.search.active {
        return vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Cancel"),
            StatusBarHint::new("Bksp", "Delete"),
        ];
    }
    vec![
        StatusBarHint::new("/", "Search"),
        StatusBarHint::new("s", "Sort"),
        StatusBarHint::new("b", "Back"),
        StatusBarHint::new("r", "Retry"),
        StatusBarHint::new("q", "Quit"),
    ]
}

fn dex_list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_dispatch::testing::*;

    #[test]
    fn list_keys_map_to_actions() {
        let state = AppState::default();
        let mut list = SelectList::new();
        let response = handle_list_event(&EventKind::Key(key("s")), &state, &mut list);
        assert_eq!(response.actions, vec![Action::SortToggle]);

        let response = handle_list_event(&EventKind::Key(key("b")), &state, &mut list);
        assert_eq!(response.actions, vec![Action::CardSwapToggle]);

        let response = handle_list_event(&EventKind::Key(key("x")), &state, &mut list);
        assert!(response.actions.is_empty());
        assert!(!response.consumed);
    }

    #[test]
    fn wheel_moves_three_rows_per_notch() {
        let state = AppState::default();
        let mut list = SelectList::new();
        let scroll = |delta| EventKind::Scroll {
            column: 0,
            row: 0,
            delta,
            modifiers: crossterm::event::KeyModifiers::NONE,
        };

        let response = handle_list_event(&scroll(1), &state, &mut list);
        assert_eq!(response.actions, vec![Action::SelectionMove(3)]);

        let response = handle_list_event(&scroll(-2), &state, &mut list);
        assert_eq!(response.actions, vec![Action::SelectionMove(-6)]);
    }

    #[test]
    fn search_keys_edit_query() {
        let state = AppState::default();
        let response = handle_search_event(&EventKind::Key(key("c")), &state);
        assert_eq!(response.actions, vec![Action::SearchInput('c')]);

        let esc = crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Esc,
            crossterm::event::KeyModifiers::NONE,
        );
        let response = handle_search_event(&EventKind::Key(esc), &state);
        assert_eq!(response.actions, vec![Action::SearchCancel]);
    }
}
