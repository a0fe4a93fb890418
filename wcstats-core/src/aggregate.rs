use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::events::{match_events, MatchEvent, Outcome, DEFAULT_TOURNAMENT, REQUIRED_COLUMNS};
use crate::reader::RowReader;
use wcstats_common::{DataConfig, Result};

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub tournament: String,
    pub delimiter: char,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self { tournament: DEFAULT_TOURNAMENT.into(), delimiter: ',' }
    }
}

impl From<&DataConfig> for AggregateOptions {
    fn from(cfg: &DataConfig) -> Self {
        Self { tournament: cfg.tournament.clone(), delimiter: cfg.delimiter }
    }
}

/// A team's view of one match, kept in input order for charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub goals_for: u32,
    pub goals_against: u32,
}

/// Running average after adding `value` to a mean of `count` values.
pub fn add_to_avg(avg: f64, count: u32, value: f64) -> f64 {
    (avg * count as f64 + value) / (count as f64 + 1.0)
}

/// Mutable per-team state while the fold is running.
#[derive(Debug, Clone)]
pub struct TeamAccumulator {
    team_name: String,
    wins: u32,
    losses: u32,
    draws: u32,
    goals_scored: u64,
    goals_taken: u64,
    avg_goals_scored: f64,
    avg_goals_taken: f64,
    current_win_streak: u32,
    best_win_streak: u32,
    history: Vec<MatchRecord>,
}

impl TeamAccumulator {
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            wins: 0,
            losses: 0,
            draws: 0,
            goals_scored: 0,
            goals_taken: 0,
            avg_goals_scored: 0.0,
            avg_goals_taken: 0.0,
            current_win_streak: 0,
            best_win_streak: 0,
            history: Vec::new(),
        }
    }

    pub fn matches(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    pub fn update(&mut self, event: &MatchEvent) {
        // averages use the count before this event
        let n = self.matches();
        self.avg_goals_scored = add_to_avg(self.avg_goals_scored, n, event.goals_for as f64);
        self.avg_goals_taken = add_to_avg(self.avg_goals_taken, n, event.goals_against as f64);
        self.goals_scored += event.goals_for as u64;
        self.goals_taken += event.goals_against as u64;
        self.history.push(MatchRecord {
            date: event.date,
            goals_for: event.goals_for,
            goals_against: event.goals_against,
        });

        match event.outcome() {
            Outcome::Win => {
                self.wins += 1;
                self.current_win_streak += 1;
            }
            outcome => {
                if outcome == Outcome::Loss {
                    self.losses += 1;
                } else {
                    self.draws += 1;
                }
                self.best_win_streak = self.best_win_streak.max(self.current_win_streak);
                self.current_win_streak = 0;
            }
        }
    }

    /// Closes the trailing run and freezes the record.
    pub fn finalize(self) -> TeamSummary {
        let max_win_streak = self.best_win_streak.max(self.current_win_streak);
        TeamSummary {
            matches_played: self.matches(),
            first_match: self.history.first().map(|m| m.date),
            last_match: self.history.last().map(|m| m.date),
            team_name: self.team_name,
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
            goals_scored: self.goals_scored,
            goals_taken: self.goals_taken,
            avg_goals_scored: self.avg_goals_scored,
            avg_goals_taken: self.avg_goals_taken,
            current_win_streak: self.current_win_streak,
            max_win_streak,
            history: self.history,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub matches_played: u32,
    pub goals_scored: u64,
    pub goals_taken: u64,
    pub avg_goals_scored: f64,
    pub avg_goals_taken: f64,
    pub current_win_streak: u32,
    pub max_win_streak: u32,
    pub first_match: Option<NaiveDate>,
    pub last_match: Option<NaiveDate>,
    #[serde(skip)]
    pub history: Vec<MatchRecord>,
}

/// Folds match events into per-team accumulators.
#[derive(Debug, Default)]
pub struct Aggregator {
    teams: HashMap<String, TeamAccumulator>,
    events: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: &MatchEvent) {
        self.teams
            .entry(event.team_name.clone())
            .or_insert_with(|| TeamAccumulator::new(event.team_name.as_str()))
            .update(event);
        self.events += 1;
    }

    pub fn events(&self) -> u64 {
        self.events
    }

    pub fn finish(self) -> TeamTable {
        let teams = self
            .teams
            .into_iter()
            .map(|(name, acc)| (name, acc.finalize()))
            .collect();
        TeamTable { teams }
    }
}

/// Finalized summaries keyed by team name.
#[derive(Debug, Clone, Default)]
pub struct TeamTable {
    teams: HashMap<String, TeamSummary>,
}

impl TeamTable {
    pub fn get(&self, team_name: &str) -> Option<&TeamSummary> {
        self.teams.get(team_name)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamSummary> {
        self.teams.values()
    }

    /// Summaries ordered by team name.
    pub fn sorted(&self) -> Vec<&TeamSummary> {
        let mut out: Vec<&TeamSummary> = self.teams.values().collect();
        out.sort_by(|a, b| a.team_name.cmp(&b.team_name));
        out
    }

    pub fn into_sorted(self) -> Vec<TeamSummary> {
        let mut out: Vec<TeamSummary> = self.teams.into_values().collect();
        out.sort_by(|a, b| a.team_name.cmp(&b.team_name));
        out
    }
}

/// Streams `path` and returns one finalized summary per team. Any malformed row aborts.
pub fn aggregate(path: &Path, opts: &AggregateOptions) -> Result<TeamTable> {
    log::debug!("aggregating {} (tournament: {})", path.display(), opts.tournament);
    let reader = RowReader::open(path, opts.delimiter)?;
    aggregate_rows(reader, opts)
}

pub fn aggregate_reader<R: BufRead>(source: R, opts: &AggregateOptions) -> Result<TeamTable> {
    aggregate_rows(RowReader::new(source, opts.delimiter)?, opts)
}

fn aggregate_rows<R: BufRead>(reader: RowReader<R>, opts: &AggregateOptions) -> Result<TeamTable> {
    reader.require_columns(&REQUIRED_COLUMNS)?;
    let mut agg = Aggregator::new();
    for event in match_events(reader, &opts.tournament) {
        agg.push(&event?);
    }
    let events = agg.events();
    let table = agg.finish();
    log::info!("aggregated {} match events into {} teams", events, table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(team: &str, gf: u32, ga: u32) -> MatchEvent {
        MatchEvent {
            team_name: team.into(),
            goals_for: gf,
            goals_against: ga,
            date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        }
    }

    fn fold(results: &[(u32, u32)]) -> TeamSummary {
        let mut acc = TeamAccumulator::new("T");
        for &(gf, ga) in results {
            acc.update(&ev("T", gf, ga));
        }
        acc.finalize()
    }

    #[test]
    fn add_to_avg_from_empty() {
        assert_eq!(add_to_avg(0.0, 0, 4.0), 4.0);
    }

    #[test]
    fn incremental_avg_matches_mean() {
        let values = [3.0, 0.0, 7.0, 1.0, 2.0, 5.0, 5.0];
        let mut avg = 0.0;
        for (i, v) in values.iter().enumerate() {
            avg = add_to_avg(avg, i as u32, *v);
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!((avg - mean).abs() < 1e-12);
    }

    #[test]
    fn streak_w_w_l_w() {
        let s = fold(&[(1, 0), (2, 0), (0, 1), (3, 1)]);
        assert_eq!(s.max_win_streak, 2);
        assert_eq!(s.current_win_streak, 1);
    }

    #[test]
    fn trailing_run_counts() {
        let s = fold(&[(1, 0), (0, 0), (1, 0), (2, 1), (3, 0)]);
        assert_eq!(s.max_win_streak, 3);
    }

    #[test]
    fn draw_breaks_streak() {
        let s = fold(&[(1, 0), (1, 1), (1, 0)]);
        assert_eq!((s.wins, s.draws, s.max_win_streak), (2, 1, 1));
    }

    #[test]
    fn no_wins_zero_streak() {
        let s = fold(&[(0, 1), (0, 0)]);
        assert_eq!(s.max_win_streak, 0);
    }

    #[test]
    fn counts_sum_to_matches() {
        let s = fold(&[(1, 0), (0, 1), (2, 2), (4, 1), (0, 3)]);
        assert_eq!(s.wins + s.losses + s.draws, 5);
        assert_eq!(s.matches_played, 5);
        assert_eq!(s.history.len(), 5);
    }

    #[test]
    fn totals_and_averages_agree() {
        let s = fold(&[(1, 0), (0, 1), (2, 2), (4, 1)]);
        assert_eq!((s.goals_scored, s.goals_taken), (7, 4));
        assert!((s.avg_goals_scored - 7.0 / 4.0).abs() < 1e-12);
        assert!((s.avg_goals_taken - 1.0).abs() < 1e-12);
    }

    #[test]
    fn aggregator_keys_by_team() {
        let mut agg = Aggregator::new();
        agg.push(&ev("A", 1, 0));
        agg.push(&ev("B", 0, 1));
        agg.push(&ev("A", 0, 0));
        assert_eq!(agg.events(), 3);
        let table = agg.finish();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("A").unwrap().matches_played, 2);
        assert!(table.get("C").is_none());
    }

    #[test]
    fn sorted_by_name() {
        let mut agg = Aggregator::new();
        for t in ["Peru", "Chile", "Italy"] {
            agg.push(&ev(t, 0, 0));
        }
        let names: Vec<_> = agg.finish().sorted().iter().map(|s| s.team_name.clone()).collect();
        assert_eq!(names, ["Chile", "Italy", "Peru"]);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn results() -> impl Strategy<Value = Vec<(u32, u32)>> {
            prop::collection::vec((0u32..8, 0u32..8), 0..80)
        }

        proptest! {
            /// Every folded event lands in exactly one of wins, losses, draws
            #[test]
            fn prop_counts_sum_to_events(rs in results()) {
                let s = fold(&rs);
                prop_assert_eq!(s.wins + s.losses + s.draws, rs.len() as u32);
                prop_assert_eq!(s.matches_played, rs.len() as u32);
            }

            /// The running average equals the plain mean of the inputs
            #[test]
            fn prop_running_avg_is_mean(rs in results()) {
                prop_assume!(!rs.is_empty());
                let s = fold(&rs);
                let n = rs.len() as f64;
                let scored: u32 = rs.iter().map(|r| r.0).sum();
                let taken: u32 = rs.iter().map(|r| r.1).sum();
                prop_assert_eq!(s.goals_scored, scored as u64);
                prop_assert!((s.avg_goals_scored - scored as f64 / n).abs() < 1e-9);
                prop_assert!((s.avg_goals_taken - taken as f64 / n).abs() < 1e-9);
            }

            /// Best streak is the longest run of wins between non-wins
            #[test]
            fn prop_max_streak_is_longest_run(rs in results()) {
                let s = fold(&rs);
                let longest = rs.split(|&(gf, ga)| gf <= ga).map(<[_]>::len).max().unwrap_or(0);
                prop_assert_eq!(s.max_win_streak as usize, longest);
                let trailing = rs.iter().rev().take_while(|&&(gf, ga)| gf > ga).count();
                prop_assert_eq!(s.current_win_streak as usize, trailing);
            }
        }
    }
}
