use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::reader::Row;
use wcstats_common::{Result, WcStatsError};

pub const DEFAULT_TOURNAMENT: &str = "FIFA World Cup";

pub const REQUIRED_COLUMNS: [&str; 6] =
    ["date", "home_team", "away_team", "home_score", "away_score", "tournament"];

/// One team's side of a single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub team_name: String,
    pub goals_for: u32,
    pub goals_against: u32,
    pub date: NaiveDate,
}

impl MatchEvent {
    pub fn outcome(&self) -> Outcome {
        match self.goals_for.cmp(&self.goals_against) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Home and away perspectives of `row`, or `None` if the row belongs to another tournament.
pub fn expand_row(row: &Row, tournament: &str) -> Result<Option<[MatchEvent; 2]>> {
    if row.get("tournament")? != tournament {
        return Ok(None);
    }
    let home_score = parse_score(row, "home_score")?;
    let away_score = parse_score(row, "away_score")?;
    let date = parse_date(row)?;
    let home = MatchEvent {
        team_name: row.get("home_team")?.to_owned(),
        goals_for: home_score,
        goals_against: away_score,
        date,
    };
    let away = MatchEvent {
        team_name: row.get("away_team")?.to_owned(),
        goals_for: away_score,
        goals_against: home_score,
        date,
    };
    Ok(Some([home, away]))
}

/// Flattens rows into match events, stopping at the first error.
pub fn match_events<'t, I>(rows: I, tournament: &'t str) -> impl Iterator<Item = Result<MatchEvent>> + 't
where
    I: Iterator<Item = Result<Row>> + 't,
{
    rows.flat_map(move |row| {
        let expanded = row.and_then(|r| expand_row(&r, tournament));
        let items: Vec<Result<MatchEvent>> = match expanded {
            Ok(Some(pair)) => pair.into_iter().map(Ok).collect(),
            Ok(None) => Vec::new(),
            Err(e) => vec![Err(e)],
        };
        items
    })
}

fn parse_score(row: &Row, column: &str) -> Result<u32> {
    let raw = row.get(column)?;
    raw.trim().parse::<u32>().map_err(|_| WcStatsError::InvalidScore {
        line: row.line,
        column: column.to_owned(),
        value: raw.to_owned(),
    })
}

fn parse_date(row: &Row) -> Result<NaiveDate> {
    let raw = row.get("date")?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| WcStatsError::InvalidDate {
        line: row.line,
        value: raw.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: [&str; 6]) -> Row {
        Row {
            line: 7,
            values: REQUIRED_COLUMNS
                .iter()
                .zip(cells)
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn expands_symmetric_pair() {
        let r = row(["2000-01-01", "Iceland", "Norway", "2", "1", DEFAULT_TOURNAMENT]);
        let [home, away] = expand_row(&r, DEFAULT_TOURNAMENT).unwrap().unwrap();
        assert_eq!((home.team_name.as_str(), home.goals_for, home.goals_against), ("Iceland", 2, 1));
        assert_eq!((away.team_name.as_str(), away.goals_for, away.goals_against), ("Norway", 1, 2));
        assert_eq!(home.outcome(), Outcome::Win);
        assert_eq!(away.outcome(), Outcome::Loss);
        assert_eq!(home.date, away.date);
    }

    #[test]
    fn other_tournament_skipped_without_parsing() {
        let r = row(["garbage", "A", "B", "x", "y", "Friendly"]);
        assert!(expand_row(&r, DEFAULT_TOURNAMENT).unwrap().is_none());
    }

    #[test]
    fn bad_score_names_line_and_column() {
        let r = row(["2000-01-01", "A", "B", "2", "two", DEFAULT_TOURNAMENT]);
        let err = expand_row(&r, DEFAULT_TOURNAMENT).unwrap_err();
        assert!(matches!(err, WcStatsError::InvalidScore { line: 7, ref column, .. } if column == "away_score"));
    }

    #[test]
    fn negative_score_rejected() {
        let r = row(["2000-01-01", "A", "B", "-1", "0", DEFAULT_TOURNAMENT]);
        assert!(expand_row(&r, DEFAULT_TOURNAMENT).is_err());
    }

    #[test]
    fn bad_date() {
        let r = row(["01/01/2000", "A", "B", "0", "0", DEFAULT_TOURNAMENT]);
        let err = expand_row(&r, DEFAULT_TOURNAMENT).unwrap_err();
        assert!(matches!(err, WcStatsError::InvalidDate { line: 7, .. }));
    }

    #[test]
    fn draw_outcome() {
        let r = row(["2000-01-01", "A", "B", "1", "1", DEFAULT_TOURNAMENT]);
        let [home, _] = expand_row(&r, DEFAULT_TOURNAMENT).unwrap().unwrap();
        assert_eq!(home.outcome(), Outcome::Draw);
    }
}
