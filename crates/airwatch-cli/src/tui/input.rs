//! Keyboard input handling for the dashboard.
//!
//! # Key Bindings
//!
//! | Key             | Action          |
//! |-----------------|-----------------|
//! | `q` / `Esc`     | Quit            |
//! | `Ctrl+C`        | Quit            |
//! | `p` / `Space`   | Pause / resume  |
//! | `r`             | Refresh now     |
//! | `?`             | Toggle help     |

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// User actions that can be triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the dashboard.
    Quit,
    /// Freeze or unfreeze the chart window.
    TogglePause,
    /// Poll immediately.
    Refresh,
    /// Toggle the help overlay.
    ToggleHelp,
    /// No action (unrecognized key).
    None,
}

/// Map a key event to an action.
///
/// While the help overlay is open any key other than quit closes it.
pub fn handle_key(key: KeyEvent, help_open: bool) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        _ if help_open => Action::ToggleHelp,
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') | KeyCode::Char(' ') => Action::TogglePause,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('?') => Action::ToggleHelp,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_input_handling_quit() {
        assert_eq!(handle_key(key(KeyCode::Char('q')), false), Action::Quit);
        assert_eq!(handle_key(key(KeyCode::Esc), false), Action::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(ctrl_c, false), Action::Quit);
    }

    #[test]
    fn test_input_handling_controls() {
        assert_eq!(handle_key(key(KeyCode::Char('p')), false), Action::TogglePause);
        assert_eq!(handle_key(key(KeyCode::Char(' ')), false), Action::TogglePause);
        assert_eq!(handle_key(key(KeyCode::Char('r')), false), Action::Refresh);
        assert_eq!(handle_key(key(KeyCode::Char('?')), false), Action::ToggleHelp);
        assert_eq!(handle_key(key(KeyCode::Char('x')), false), Action::None);
    }

    #[test]
    fn test_input_handling_help_open() {
        // Any key closes help, q still quits
        assert_eq!(handle_key(key(KeyCode::Char('p')), true), Action::ToggleHelp);
        assert_eq!(handle_key(key(KeyCode::Esc), true), Action::ToggleHelp);
        assert_eq!(handle_key(key(KeyCode::Char('q')), true), Action::Quit);
    }
}
