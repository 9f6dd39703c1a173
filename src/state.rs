use crate::analysis::stats::EdaSummary;
use crate::cache::{DatasetCache, DatasetEntry};
use crate::charts::{self, ChartOptions, ChartOutcome};
use crate::config::DashboardConfig;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Tabs and views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Eda,
    Visualizations,
    Advanced,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Eda, Tab::Visualizations, Tab::Advanced];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Eda => "EDA",
            Tab::Visualizations => "Visualizations",
            Tab::Advanced => "Advanced Analysis",
        }
    }
}

/// Which table of the selected dataset the tabs analyse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetView {
    Raw,
    Cleaned,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// All datasets, loaded and cleaned at startup.
    pub cache: DatasetCache,

    /// Name of the selected dataset (None when nothing is configured).
    pub selected: Option<String>,

    pub view: DatasetView,

    pub tab: Tab,

    /// EDA tables for the current selection (cached).
    pub summary: Option<EdaSummary>,

    /// Chart results for the current selection (cached).
    pub charts: Vec<ChartOutcome>,
}

impl AppState {
    pub fn new(config: DashboardConfig, cache: DatasetCache) -> Self {
        let selected = cache.names().first().cloned();
        let mut state = Self {
            config,
            cache,
            selected,
            view: DatasetView::Raw,
            tab: Tab::Overview,
            summary: None,
            charts: Vec::new(),
        };
        state.refresh();
        state
    }

    pub fn entry(&self) -> Option<&DatasetEntry> {
        self.selected.as_deref().and_then(|name| self.cache.get(name))
    }

    /// The table the tabs currently analyse. `None` when the cleaned view is
    /// selected but cleaning failed.
    pub fn dataset(&self) -> Option<&Dataset> {
        let entry = self.entry()?;
        match self.view {
            DatasetView::Raw => Some(&entry.raw),
            DatasetView::Cleaned => entry.cleaned.as_ref().map(|c| &c.dataset),
        }
    }

    pub fn select_dataset(&mut self, name: &str) {
        if self.selected.as_deref() == Some(name) {
            return;
        }
        self.selected = Some(name.to_string());
        self.refresh();
    }

    pub fn set_view(&mut self, view: DatasetView) {
        if self.view == view {
            return;
        }
        self.view = view;
        self.refresh();
    }

    /// Charts belonging to one tab, in registry order.
    pub fn charts_for(&self, tab: Tab) -> impl Iterator<Item = &ChartOutcome> {
        self.charts.iter().filter(move |c| c.spec.tab == tab)
    }

    /// Recompute the summary and charts for the current selection.
    fn refresh(&mut self) {
        let options = ChartOptions {
            max_points: self.config.max_plot_points,
        };
        let (summary, charts) = match self.dataset() {
            Some(ds) => (Some(EdaSummary::of(ds)), charts::build_all(ds, &options)),
            None => (None, Vec::new()),
        };
        log::debug!(
            "Selected {:?} ({:?}): {} charts",
            self.selected,
            self.view,
            charts.len()
        );
        self.summary = summary;
        self.charts = charts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetSource;

    fn state_with(dir: &std::path::Path) -> AppState {
        let config = DashboardConfig {
            input_dir: dir.join("raw"),
            output_dir: dir.join("cleaned"),
            datasets: vec![
                DatasetSource {
                    name: "Wind Site".into(),
                    file: "wind.csv".into(),
                },
                DatasetSource {
                    name: "Broken Site".into(),
                    file: "broken.csv".into(),
                },
            ],
            ..DashboardConfig::default()
        };
        std::fs::create_dir_all(&config.input_dir).unwrap();
        std::fs::write(
            config.input_dir.join("wind.csv"),
            "WD,WS,Tamb\n10,1.5,25\n200,,26\n90,4.2,\n",
        )
        .unwrap();
        let cache = DatasetCache::load_all(&config);
        AppState::new(config, cache)
    }

    #[test]
    fn first_dataset_selected_on_start() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(dir.path());

        assert_eq!(state.selected.as_deref(), Some("Wind Site"));
        assert_eq!(state.summary.as_ref().unwrap().rows, 3);
        let titles: Vec<&str> = state
            .charts_for(Tab::Visualizations)
            .map(|c| c.spec.title)
            .collect();
        assert!(titles.contains(&"Wind Rose"));
        assert!(titles.contains(&"Wind Direction Distribution"));
    }

    #[test]
    fn cleaned_view_has_no_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with(dir.path());

        assert_eq!(state.summary.as_ref().unwrap().total_missing(), 2);
        state.set_view(DatasetView::Cleaned);
        assert_eq!(state.summary.as_ref().unwrap().total_missing(), 0);
    }

    #[test]
    fn switching_to_failed_dataset_keeps_ui_alive() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with(dir.path());

        state.select_dataset("Broken Site");
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.rows, 0);
        assert!(state.entry().unwrap().load_error.is_some());
        // Only the unconditional heatmap is attempted, and it fails on its own.
        assert_eq!(state.charts.len(), 1);
        assert!(state.charts[0].result.is_err());
    }
}
