use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::domain::{DirConfig, DirError, Focus, Message};
use crate::model::Model;
use crate::ui::HitMap;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &DirConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model, hits: &HitMap) -> Result<Option<Message>, DirError> {
        if !event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(None);
        }
        let message = match event::read()? {
            // crossterm also emits key release and repeat events on Windows
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                Self::handle_key(key, model)
            }
            Event::Mouse(mouse) => Self::handle_mouse(mouse, hits),
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            _ => None,
        };
        Ok(message)
    }

    pub fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Tab, _) => Some(Message::FocusNext),
            (KeyCode::BackTab, _) => Some(Message::FocusPrevious),
            _ if model.show_popup() => match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                _ => Some(Message::Exit),
            },
            (KeyCode::Char('?'), _) if model.input_is_empty() => Some(Message::Help),
            _ if model.raw_keyevents() => Some(Message::RawKey(key)),
            (code, _) => Self::handle_command_key(code),
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    fn handle_command_key(code: KeyCode) -> Option<Message> {
        match code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Char('/') => Some(Message::Focus(Focus::Search)),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
            KeyCode::Enter | KeyCode::Char('s') => Some(Message::SortCurrentColumn),
            KeyCode::PageDown | KeyCode::Char('n') => Some(Message::NextPage),
            KeyCode::PageUp | KeyCode::Char('p') => Some(Message::PreviousPage),
            KeyCode::Char('y') => Some(Message::CopyWebsite),
            KeyCode::Char('g') => Some(Message::PagePrompt),
            KeyCode::Char(d @ '1'..='9') => d
                .to_digit(10)
                .map(|page| Message::GoToPage(page as usize)),
            _ => None,
        }
    }

    pub fn handle_mouse(mouse: MouseEvent, hits: &HitMap) -> Option<Message> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let message = hits.message_at(mouse.column, mouse.row);
                trace!("Click at {}:{} => {message:?}", mouse.column, mouse.row);
                message
            }
            MouseEventKind::ScrollDown => Some(Message::MoveDown),
            MouseEventKind::ScrollUp => Some(Message::MoveUp),
            _ => None,
        }
    }
}
