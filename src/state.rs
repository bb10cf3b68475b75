use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use crate::color::{category_colors, ColorMap};
use crate::config::Config;
use crate::data::aggregate::BoxStats;
use crate::data::filter::{Selection, SelectionChange};
use crate::data::loader::load_file;
use crate::data::model::{Dataset, Field, Value};
use crate::view::{feature_quartiles, DashboardView};

// ---------------------------------------------------------------------------
// Events emitted by the UI
// ---------------------------------------------------------------------------

/// Pages of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Progress,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Home, Page::Progress];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Progress => "Progress",
        }
    }
}

/// A user interaction.  Widgets only push these; [`AppState::handle`]
/// is the single place state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Filter(SelectionChange),
    ShowPage(Page),
    /// Show/hide a column of the dataset table.
    ToggleColumn(Field),
    /// Categorical field on the box plot x axis.
    BoxGroup(Field),
    /// Numeric field on the box plot y axis.
    BoxMeasure(Field),
    Open(PathBuf),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Accepted values per filterable field.
    pub selection: Selection,

    /// Metrics and chart series for the current selection.
    pub view: DashboardView,

    /// Box plot series for `box_group` × `box_measure`.
    pub quartiles: Vec<(Value, BoxStats)>,

    /// Per categorical field, stable colours for its values.
    pub colors: BTreeMap<Field, ColorMap>,

    pub page: Page,

    /// Columns shown in the dataset table.
    pub visible_columns: BTreeSet<Field>,

    pub box_group: Field,
    pub box_measure: Field,

    pub target: NonZeroU64,

    /// Sidebar logo, when the configured file exists.
    pub logo: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            dataset: None,
            selection: Selection::default(),
            view: DashboardView::default(),
            quartiles: Vec::new(),
            colors: BTreeMap::new(),
            page: Page::default(),
            visible_columns: Field::ALL.into_iter().collect(),
            box_group: Field::Equipment,
            box_measure: Field::Production,
            target: config.target,
            logo: config.logo.is_file().then(|| config.logo.clone()),
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset: select everything and recompute.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.selection = Selection::all(&dataset);
        self.colors = category_colors(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    /// Apply one event and refresh whatever depends on it.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Filter(change) => {
                let Some(ds) = &self.dataset else {
                    return;
                };
                self.selection = std::mem::take(&mut self.selection).apply(&change, ds);
                self.recompute();
            }
            Event::ShowPage(page) => self.page = page,
            Event::ToggleColumn(field) => {
                if !self.visible_columns.remove(&field) {
                    self.visible_columns.insert(field);
                }
            }
            Event::BoxGroup(field) => {
                self.box_group = field;
                self.recompute_quartiles();
            }
            Event::BoxMeasure(field) => {
                self.box_measure = field;
                self.recompute_quartiles();
            }
            Event::Open(path) => self.open(&path),
        }
    }

    /// Load `path`; on failure keep the current dataset and report the error.
    pub fn open(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute every derived metric after a selection or data change.
    fn recompute(&mut self) {
        if let Some(ds) = &self.dataset {
            self.view = DashboardView::compute(ds, &self.selection, self.target);
        }
        self.recompute_quartiles();
    }

    fn recompute_quartiles(&mut self) {
        if let Some(ds) = &self.dataset {
            self.quartiles = feature_quartiles(ds, &self.selection, self.box_group, self.box_measure);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::dataset;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(dataset(&[(1, "X", 10.0), (2, "X", 20.0), (1, "Y", 30.0)]));
        state
    }

    #[test]
    fn test_set_dataset_selects_everything() {
        let state = loaded();
        assert_eq!(state.view.rows, vec![0, 1, 2]);
        assert_eq!(state.view.production.unwrap().sum, 60.0);
        assert_eq!(state.quartiles.len(), 2);
        assert!(state.colors.contains_key(&Field::Equipment));
    }

    #[test]
    fn test_filter_events_recompute() {
        let mut state = loaded();
        state.handle(Event::Filter(SelectionChange::Toggle {
            field: Field::Equipment,
            value: Value::Text("X".into()),
        }));
        assert_eq!(state.view.rows, vec![2]);
        assert_eq!(state.quartiles.len(), 1);

        state.handle(Event::Filter(SelectionChange::SelectNone(Field::Quality)));
        assert!(state.view.rows.is_empty());
        assert_eq!(state.view.production, None);

        state.handle(Event::Filter(SelectionChange::SelectAll(Field::Quality)));
        state.handle(Event::Filter(SelectionChange::SelectAll(Field::Equipment)));
        assert_eq!(state.view.rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_filter_without_dataset_is_ignored() {
        let mut state = AppState::default();
        state.handle(Event::Filter(SelectionChange::SelectNone(Field::Quality)));
        assert_eq!(state.selection, Selection::default());
        assert!(state.view.rows.is_empty());
    }

    #[test]
    fn test_page_column_and_box_events() {
        let mut state = loaded();
        state.handle(Event::ShowPage(Page::Progress));
        assert_eq!(state.page, Page::Progress);

        state.handle(Event::ToggleColumn(Field::Cost));
        assert!(!state.visible_columns.contains(&Field::Cost));
        state.handle(Event::ToggleColumn(Field::Cost));
        assert!(state.visible_columns.contains(&Field::Cost));

        state.handle(Event::BoxGroup(Field::Quality));
        state.handle(Event::BoxMeasure(Field::Cost));
        let keys: Vec<Value> = state.quartiles.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(state.quartiles[1].1.median, 10.0);
    }

    #[test]
    fn test_failed_open_keeps_dataset() {
        let mut state = loaded();
        state.handle(Event::Open(PathBuf::from("/nonexistent/records.csv")));
        assert!(state.status_message.as_deref().unwrap_or("").starts_with("Error"));
        assert_eq!(state.dataset.as_ref().map(Dataset::len), Some(3));
        assert_eq!(state.view.rows, vec![0, 1, 2]);
    }
}
