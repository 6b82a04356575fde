use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quit,

    // List navigation
    NextComment,
    PreviousComment,

    // Input handling; meaning depends on the current mode
    Character(char),
    Backspace,
    Enter,
    Escape,

    Tick,
}

pub struct EventHandler {
    should_quit: bool,
}

impl EventHandler {
    pub fn new() -> Self {
        Self { should_quit: false }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn next_event(&mut self) -> Result<AppEvent> {
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    Ok(self.handle_key_event(key_event))
                }
                _ => Ok(AppEvent::Tick),
            }
        } else {
            Ok(AppEvent::Tick)
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> AppEvent {
        match key_event {
            // Global quit with Ctrl+C
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.should_quit = true;
                AppEvent::Quit
            }

            KeyEvent {
                code: KeyCode::Down,
                ..
            } => AppEvent::NextComment,

            KeyEvent { code: KeyCode::Up, .. } => AppEvent::PreviousComment,

            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => AppEvent::Enter,

            KeyEvent { code: KeyCode::Esc, .. } => AppEvent::Escape,

            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => AppEvent::Backspace,

            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::NONE,
                ..
            } => AppEvent::Character(c),

            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::SHIFT,
                ..
            } => AppEvent::Character(c.to_uppercase().next().unwrap_or(c)),

            _ => AppEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_mapping() {
        let mut handler = EventHandler::new();

        assert_eq!(
            handler.handle_key_event(key(KeyCode::Char('a'), KeyModifiers::NONE)),
            AppEvent::Character('a')
        );
        assert_eq!(
            handler.handle_key_event(key(KeyCode::Char('g'), KeyModifiers::SHIFT)),
            AppEvent::Character('G')
        );
        assert_eq!(
            handler.handle_key_event(key(KeyCode::Down, KeyModifiers::NONE)),
            AppEvent::NextComment
        );
        assert_eq!(
            handler.handle_key_event(key(KeyCode::F(5), KeyModifiers::NONE)),
            AppEvent::Tick
        );
        assert!(!handler.should_quit());

        assert_eq!(
            handler.handle_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppEvent::Quit
        );
        assert!(handler.should_quit());
    }
}
