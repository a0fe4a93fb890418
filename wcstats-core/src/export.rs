use std::io::Write;
use std::path::Path;

use crate::aggregate::TeamSummary;
use wcstats_common::{Result, WcStatsError};

/// One-line human readable rendering of a summary.
pub fn prettify(s: &TeamSummary) -> String {
    format!(
        "{}, wins: {}, losses: {}, draws: {}, scored goals avg: {}, taken goals avg: {}, max_win_streak: {}",
        s.team_name, s.wins, s.losses, s.draws, s.avg_goals_scored, s.avg_goals_taken, s.max_win_streak
    )
}

pub fn print_table<W: Write>(out: &mut W, rows: &[&TeamSummary], precision: usize) -> Result<()> {
    let name_w = rows.iter().map(|s| s.team_name.chars().count()).max().unwrap_or(4).max(4);
    writeln!(
        out,
        "{:<name_w$} {:>4} {:>4} {:>4} {:>4} {:>8} {:>8} {:>6}",
        "team", "P", "W", "L", "D", "GF avg", "GA avg", "streak"
    )?;
    for s in rows {
        writeln!(
            out,
            "{:<name_w$} {:>4} {:>4} {:>4} {:>4} {:>8.p$} {:>8.p$} {:>6}",
            s.team_name,
            s.matches_played,
            s.wins,
            s.losses,
            s.draws,
            s.avg_goals_scored,
            s.avg_goals_taken,
            s.max_win_streak,
            p = precision,
        )?;
    }
    Ok(())
}

pub fn export_json(output_path: &Path, rows: &[&TeamSummary]) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(file, rows).map_err(|e| WcStatsError::Other(e.to_string()))?;
    Ok(())
}

pub fn export_csv(output_path: &Path, rows: &[&TeamSummary], precision: usize) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    write_csv(&mut file, rows, precision)
}

pub fn write_csv<W: Write>(out: &mut W, rows: &[&TeamSummary], precision: usize) -> Result<()> {
    writeln!(out, "team_name,matches_played,wins,losses,draws,goals_scored,goals_taken,avg_goals_scored,avg_goals_taken,current_win_streak,max_win_streak,first_match,last_match")?;
    for s in rows {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{:.p$},{:.p$},{},{},{},{}",
            csv_escape(&s.team_name),
            s.matches_played,
            s.wins,
            s.losses,
            s.draws,
            s.goals_scored,
            s.goals_taken,
            s.avg_goals_scored,
            s.avg_goals_taken,
            s.current_win_streak,
            s.max_win_streak,
            s.first_match.map_or_else(String::new, |d| d.to_string()),
            s.last_match.map_or_else(String::new, |d| d.to_string()),
            p = precision,
        )?;
    }
    Ok(())
}

// wrap in quotes if it contains a comma, quote, or newline
fn csv_escape(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::TeamAccumulator;
    use crate::events::MatchEvent;
    use chrono::NaiveDate;

    fn iceland() -> TeamSummary {
        let mut acc = TeamAccumulator::new("Iceland");
        for (gf, ga) in [(2, 1), (3, 0)] {
            acc.update(&MatchEvent {
                team_name: "Iceland".into(),
                goals_for: gf,
                goals_against: ga,
                date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            });
        }
        acc.finalize()
    }

    #[test]
    fn prettify_line() {
        assert_eq!(
            prettify(&iceland()),
            "Iceland, wins: 2, losses: 0, draws: 0, scored goals avg: 2.5, taken goals avg: 0.5, max_win_streak: 2"
        );
    }

    #[test]
    fn csv_has_header_and_row() {
        let s = iceland();
        let mut buf = Vec::new();
        write_csv(&mut buf, &[&s], 2).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Iceland,2,2,0,0,5,1,2.50,0.50,2,2,2000-01-01,2000-01-01"));
    }

    #[test]
    fn csv_escapes_commas() {
        assert_eq!(csv_escape("Korea, Republic"), "\"Korea, Republic\"");
        assert_eq!(csv_escape("Peru"), "Peru");
    }

    #[test]
    fn table_aligns() {
        let s = iceland();
        let mut buf = Vec::new();
        print_table(&mut buf, &[&s], 1).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().nth(1).unwrap().contains("2.5"));
    }

    #[test]
    fn json_skips_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let s = iceland();
        export_json(&path, &[&s]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v[0]["wins"], 2);
        assert!(v[0].get("history").is_none());
    }
}
