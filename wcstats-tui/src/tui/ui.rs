use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, ListState, Paragraph, Wrap},
};
use crate::tui::app::{App, View};
use crate::tui::theme::Theme;
use wcstats_core::TeamSummary;

pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    render_topbar(frame, app, chunks[0], theme);
    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(chunks[1]);
    render_sidebar(frame, app, mid[0], theme);
    render_main(frame, app, mid[1], theme);
    render_bottombar(frame, app, chunks[2], theme);
    if app.view == View::Help { render_help(frame, area); }
}

fn render_topbar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let info = format!(" {} | {} teams", app.input_path, app.teams.len());
    let line = Line::from(vec![Span::styled("[wcstats]", Style::default().fg(theme.highlight)), Span::raw(info)]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg).fg(theme.fg)), area);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let title = if app.searching {
        format!("Teams /{}_", app.search)
    } else if !app.search.is_empty() {
        format!("Teams /{}", app.search)
    } else {
        "Teams".to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let items: Vec<ListItem> = app
        .filtered_indices()
        .iter()
        .map(|&i| {
            let t = &app.teams[i];
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<18}", truncate(&t.team_name, 18))),
                Span::styled(format!("{:>3}W", t.wins), Style::default().fg(theme.muted)),
            ]))
        })
        .collect();
    let mut state = ListState::default();
    if !items.is_empty() { state.select(Some(app.selected.min(items.len() - 1))); }
    let list = List::new(items).block(block).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_main(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let Some(team) = app.selected_team() else {
        let p = Paragraph::new("no team matches the search").block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);
    render_stats(frame, app, team, chunks[0], theme);
    render_chart(frame, app, team, chunks[1], theme);
}

fn render_stats(frame: &mut Frame, app: &App, t: &TeamSummary, area: Rect, theme: &Theme) {
    let p = app.precision;
    let lines = vec![
        Line::from(format!(
            " played {}  W {}  L {}  D {}  best streak {}",
            t.matches_played, t.wins, t.losses, t.draws, t.max_win_streak
        )),
        Line::from(vec![
            Span::styled(format!(" scored avg {:.p$}", t.avg_goals_scored), Style::default().fg(theme.scored)),
            Span::raw("  "),
            Span::styled(format!("taken avg {:.p$}", t.avg_goals_taken), Style::default().fg(theme.taken)),
        ]),
    ];
    let block = Block::default().borders(Borders::ALL).title(t.team_name.as_str());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_chart(frame: &mut Frame, app: &App, t: &TeamSummary, area: Rect, theme: &Theme) {
    let (scored, taken) = chart_points(t);
    let mut datasets = Vec::new();
    if app.show_scored {
        datasets.push(
            Dataset::default()
                .name("Goals Scored")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.scored))
                .data(&scored),
        );
    }
    if app.show_taken {
        datasets.push(
            Dataset::default()
                .name("Goals Taken")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.taken))
                .data(&taken),
        );
    }
    let x_max = (t.history.len().saturating_sub(1)).max(1) as f64;
    let y_max = t.history.iter().map(|m| m.goals_for.max(m.goals_against)).max().unwrap_or(0) as f64 + 1.0;
    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("Goals per match"))
        .x_axis(
            Axis::default()
                .title("Date")
                .style(Style::default().fg(theme.muted))
                .bounds([0.0, x_max])
                .labels(date_labels(t).into_iter().map(Span::from).collect::<Vec<_>>()),
        )
        .y_axis(
            Axis::default()
                .title("Goals")
                .style(Style::default().fg(theme.muted))
                .bounds([0.0, y_max])
                .labels(vec![Span::raw("0"), Span::raw(format!("{}", y_max as u32))]),
        );
    frame.render_widget(chart, area);
}

/// (match index, goals) series for goals scored and goals taken.
pub fn chart_points(t: &TeamSummary) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    t.history
        .iter()
        .enumerate()
        .map(|(i, m)| ((i as f64, m.goals_for as f64), (i as f64, m.goals_against as f64)))
        .unzip()
}

fn date_labels(t: &TeamSummary) -> Vec<String> {
    match (t.history.first(), t.history.get(t.history.len() / 2), t.history.last()) {
        (Some(a), Some(b), Some(c)) if t.history.len() > 2 => vec![a.date.to_string(), b.date.to_string(), c.date.to_string()],
        (Some(a), _, Some(c)) => vec![a.date.to_string(), c.date.to_string()],
        _ => Vec::new(),
    }
}

fn render_bottombar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let color = if app.selected_team().is_some() { theme.success } else { theme.error };
    let hint = Span::styled(format!(" {}", app.status_msg), Style::default().fg(color));
    frame.render_widget(Paragraph::new(Line::from(hint)).style(Style::default().bg(theme.bg)), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 50, area);
    let text = vec![
        Line::from("j/k, Up/Down   move selection"),
        Line::from("PgUp/PgDn      move by 10"),
        Line::from("/              search teams (Enter keeps, Esc clears)"),
        Line::from("s              toggle goals scored"),
        Line::from("t              toggle goals taken"),
        Line::from("?              toggle this help"),
        Line::from("q              quit"),
    ];
    frame.render_widget(Clear, popup);
    let p = Paragraph::new(text).wrap(Wrap { trim: false }).block(Block::default().borders(Borders::ALL).title("Help"));
    frame.render_widget(p, popup);
}

fn centered_rect(pct_x: u16, pct_y: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .split(v[1])[1]
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max { s.to_string() } else { format!("{}…", s.chars().take(max.saturating_sub(1)).collect::<String>()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use wcstats_common::Config;
    use wcstats_core::{aggregate_reader, AggregateOptions};

    fn teams() -> Vec<TeamSummary> {
        let csv = "date,home_team,away_team,home_score,away_score,tournament\n\
                   2014-06-12,Brazil,Croatia,3,1,FIFA World Cup\n\
                   2014-07-08,Brazil,Germany,1,7,FIFA World Cup\n";
        aggregate_reader(csv.as_bytes(), &AggregateOptions::default()).unwrap().into_sorted()
    }

    #[test]
    fn points_follow_history() {
        let t = teams();
        let (scored, taken) = chart_points(&t[0]);
        assert_eq!(scored, vec![(0.0, 3.0), (1.0, 1.0)]);
        assert_eq!(taken, vec![(0.0, 1.0), (1.0, 7.0)]);
    }

    #[test]
    fn truncates_long_names() {
        assert_eq!(truncate("Bosnia and Herzegovina", 8), "Bosnia …");
        assert_eq!(truncate("Peru", 8), "Peru");
        assert_eq!(truncate("Peru", 0), "…");
    }

    #[test]
    fn renders_without_panic() {
        let app = App::new("wc.csv".into(), teams(), &Config::default());
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let text: String = buf.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Brazil"));
    }
}
