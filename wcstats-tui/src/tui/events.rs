use crate::tui::app::{App, View};
use crossterm::event::{KeyCode, KeyEvent};

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if app.searching {
        handle_search(app, key);
        return;
    }
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => {
            app.view = if app.view == View::Help { View::Chart } else { View::Help };
        }
        KeyCode::Esc if app.view == View::Help => app.view = View::Chart,
        KeyCode::Char('j') | KeyCode::Down => app.sidebar_down(),
        KeyCode::Char('k') | KeyCode::Up => app.sidebar_up(),
        KeyCode::PageDown => {
            for _ in 0..10 {
                app.sidebar_down();
            }
        }
        KeyCode::PageUp => {
            for _ in 0..10 {
                app.sidebar_up();
            }
        }
        KeyCode::Home => app.selected = 0,
        KeyCode::Char('/') => {
            app.searching = true;
            app.search.clear();
            app.selected = 0;
        }
        KeyCode::Char('s') => {
            app.show_scored = !app.show_scored;
            app.status_msg = format!("goals scored: {}", on_off(app.show_scored));
        }
        KeyCode::Char('t') => {
            app.show_taken = !app.show_taken;
            app.status_msg = format!("goals taken: {}", on_off(app.show_taken));
        }
        _ => {}
    }
}

fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.searching = false;
            app.search.clear();
            app.selected = 0;
        }
        KeyCode::Enter => app.searching = false,
        KeyCode::Backspace => {
            app.search.pop();
            app.selected = 0;
        }
        KeyCode::Char(c) => {
            app.search.push(c);
            app.selected = 0;
        }
        _ => {}
    }
}

fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use wcstats_common::Config;
    use wcstats_core::TeamAccumulator;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app() -> App {
        let teams = ["Brazil", "Peru"].into_iter().map(|n| TeamAccumulator::new(n).finalize()).collect();
        App::new("x.csv".into(), teams, &Config::default())
    }

    #[test]
    fn search_mode_swallows_q() {
        let mut a = app();
        press(&mut a, KeyCode::Char('/'));
        press(&mut a, KeyCode::Char('q'));
        assert!(!a.should_quit);
        assert_eq!(a.search, "q");
        press(&mut a, KeyCode::Esc);
        assert!(!a.searching);
        press(&mut a, KeyCode::Char('q'));
        assert!(a.should_quit);
    }

    #[test]
    fn toggles_series() {
        let mut a = app();
        press(&mut a, KeyCode::Char('s'));
        assert!(!a.show_scored);
        assert!(a.show_taken);
    }

    #[test]
    fn help_toggle() {
        let mut a = app();
        press(&mut a, KeyCode::Char('?'));
        assert_eq!(a.view, View::Help);
        press(&mut a, KeyCode::Esc);
        assert_eq!(a.view, View::Chart);
    }
}
