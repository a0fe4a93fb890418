use crate::tui::theme::Theme;
use wcstats_common::Config;
use wcstats_core::TeamSummary;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Chart,
    Help,
}

pub struct App {
    pub input_path: String,
    pub teams: Vec<TeamSummary>, // sorted by name
    pub view: View,
    pub selected: usize, // index into filtered_indices()
    pub search: String,
    pub searching: bool,
    pub show_scored: bool,
    pub show_taken: bool,
    pub status_msg: String,
    pub should_quit: bool,
    pub theme: Theme,
    pub precision: usize,
}

impl App {
    pub fn new(input_path: String, teams: Vec<TeamSummary>, config: &Config) -> Self {
        Self {
            input_path,
            teams,
            view: View::Chart,
            selected: 0,
            search: String::new(),
            searching: false,
            show_scored: true,
            show_taken: true,
            status_msg: "Ready | q:quit ?:help".into(),
            should_quit: false,
            theme: Theme::from_name(&config.display.theme),
            precision: config.display.float_precision,
        }
    }

    /// Indices into `teams` whose name contains the search text, case-insensitively.
    pub fn filtered_indices(&self) -> Vec<usize> {
        let needle = self.search.to_lowercase();
        self.teams
            .iter()
            .enumerate()
            .filter(|(_, t)| needle.is_empty() || t.team_name.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn selected_team(&self) -> Option<&TeamSummary> {
        let idx = *self.filtered_indices().get(self.selected)?;
        self.teams.get(idx)
    }

    pub fn select_by_name(&mut self, name: &str) -> bool {
        self.search.clear();
        match self.teams.iter().position(|t| t.team_name == name) {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }

    pub fn sidebar_down(&mut self) {
        let len = self.filtered_indices().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn sidebar_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wcstats_core::TeamAccumulator;

    fn app() -> App {
        let teams = ["Brazil", "Iceland", "Italy"]
            .into_iter()
            .map(|n| TeamAccumulator::new(n).finalize())
            .collect();
        App::new("results.csv".into(), teams, &Config::default())
    }

    #[test]
    fn search_narrows_list() {
        let mut a = app();
        a.search = "i".into();
        assert_eq!(a.filtered_indices(), vec![0, 1, 2]);
        a.search = "it".into();
        assert_eq!(a.filtered_indices(), vec![2]);
        assert_eq!(a.selected_team().unwrap().team_name, "Italy");
    }

    #[test]
    fn selection_clamped() {
        let mut a = app();
        for _ in 0..10 {
            a.sidebar_down();
        }
        assert_eq!(a.selected, 2);
        a.sidebar_up();
        assert_eq!(a.selected, 1);
    }

    #[test]
    fn select_unknown_team() {
        let mut a = app();
        assert!(!a.select_by_name("Atlantis"));
        assert!(a.select_by_name("Iceland"));
        assert_eq!(a.selected_team().unwrap().team_name, "Iceland");
    }
}
