//! Key mapping from terminal events to player commands.

use crate::types::{BombKind, InputCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Map keyboard input to a player command.
///
/// Board y grows upwards, so "up" is `dy = +1`. Lowercase `s` belongs to the
/// WASD cursor keys; the swap booster sits on `S` and Tab.
pub fn map_key(key: KeyEvent) -> Option<InputCommand> {
    if key.kind == KeyEventKind::Release || key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }

    match key.code {
        // Cursor
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(InputCommand::MoveCursor { dx: -1, dy: 0 }),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(InputCommand::MoveCursor { dx: 1, dy: 0 }),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(InputCommand::MoveCursor { dx: 0, dy: 1 }),
        KeyCode::Down | KeyCode::Char('s') => Some(InputCommand::MoveCursor { dx: 0, dy: -1 }),

        // Tray
        KeyCode::Char(c @ '1'..='9') => Some(InputCommand::SelectSlot(c as usize - '1' as usize)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(InputCommand::Place),

        // Boosters
        KeyCode::Char('x') | KeyCode::Char('X') => Some(InputCommand::Bomb(BombKind::Horizontal)),
        KeyCode::Char('v') | KeyCode::Char('V') => Some(InputCommand::Bomb(BombKind::Vertical)),
        KeyCode::Char('b') | KeyCode::Char('B') => Some(InputCommand::Bomb(BombKind::Area3x3)),
        KeyCode::Char('S') | KeyCode::Tab => Some(InputCommand::Swap),

        // Run
        KeyCode::Char('h') | KeyCode::Char('H') => Some(InputCommand::Hint),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(InputCommand::SecondChance),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(InputCommand::NextRun),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(InputCommand::Restart),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Screen position `(column, row)` of a left-button press.
pub fn left_click(event: &MouseEvent) -> Option<(u16, u16)> {
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => Some((event.column, event.row)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> Option<InputCommand> {
        map_key(KeyEvent::from(code))
    }

    #[test]
    fn test_cursor_keys() {
        assert_eq!(key(KeyCode::Left), Some(InputCommand::MoveCursor { dx: -1, dy: 0 }));
        assert_eq!(key(KeyCode::Char('d')), Some(InputCommand::MoveCursor { dx: 1, dy: 0 }));
        assert_eq!(key(KeyCode::Up), Some(InputCommand::MoveCursor { dx: 0, dy: 1 }));
        assert_eq!(key(KeyCode::Char('s')), Some(InputCommand::MoveCursor { dx: 0, dy: -1 }));
    }

    #[test]
    fn test_tray_keys() {
        assert_eq!(key(KeyCode::Char('1')), Some(InputCommand::SelectSlot(0)));
        assert_eq!(key(KeyCode::Char('3')), Some(InputCommand::SelectSlot(2)));
        assert_eq!(key(KeyCode::Enter), Some(InputCommand::Place));
        assert_eq!(key(KeyCode::Char(' ')), Some(InputCommand::Place));
        assert_eq!(key(KeyCode::Char('0')), None);
    }

    #[test]
    fn test_booster_and_run_keys() {
        assert_eq!(key(KeyCode::Char('x')), Some(InputCommand::Bomb(BombKind::Horizontal)));
        assert_eq!(key(KeyCode::Char('v')), Some(InputCommand::Bomb(BombKind::Vertical)));
        assert_eq!(key(KeyCode::Char('b')), Some(InputCommand::Bomb(BombKind::Area3x3)));
        assert_eq!(key(KeyCode::Char('S')), Some(InputCommand::Swap));
        assert_eq!(key(KeyCode::Tab), Some(InputCommand::Swap));
        assert_eq!(key(KeyCode::Char('h')), Some(InputCommand::Hint));
        assert_eq!(key(KeyCode::Char('c')), Some(InputCommand::SecondChance));
        assert_eq!(key(KeyCode::Char('n')), Some(InputCommand::NextRun));
        assert_eq!(key(KeyCode::Char('r')), Some(InputCommand::Restart));
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(should_quit(ctrl_c));
        assert_eq!(map_key(ctrl_c), None);
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }

    #[test]
    fn test_left_click() {
        let down = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(left_click(&down), Some((12, 5)));
        let moved = MouseEvent {
            kind: MouseEventKind::Moved,
            ..down
        };
        assert_eq!(left_click(&moved), None);
    }
}
