use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::{EntityDetail, EntitySummary};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    CatalogReload,
    CatalogDidLoad(Vec<EntitySummary>),
    CatalogDidError(ApiError),

    PrefetchDidLoad {
        details: Vec<EntityDetail>,
        failures: Vec<(String, ApiError)>,
    },

    DetailDidLoad { name: String, detail: EntityDetail },
    DetailDidError { name: String, error: ApiError },
    DetailRetry,

    SortToggle,

    SearchStart,
    SearchCancel,
    SearchSubmit,
    SearchInput(char),
    SearchBackspace,

    SelectionMove(i16),
    SelectionPage(i16),
    SelectionJumpTop,
    SelectionJumpBottom,
    /// Row within the current page.
    PageSelect(usize),

    CardSwapToggle,

    MusicDidFinish,
    MusicDidError(String),

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
