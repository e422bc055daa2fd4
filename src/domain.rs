use std::io::Error;
use std::time::Duration;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

use crate::company::Field;

pub const PAGE_SIZE: usize = 10;
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);
pub const DEFAULT_SOURCE: &str = "companies.json";
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load companies";

pub const HELP_TEXT: &str = "\
Tab / Shift+Tab  switch focus (search, location, industry, table)
Type             edit search when the search box is focused
Up / Down        move row selection, or change the focused filter
Left / Right     move the header cursor (table) or change the filter
Enter / s        sort by the column under the header cursor
n / PageDown     next page
p / PageUp       previous page
1-9              jump to page
g                type a page number, Enter to jump
y                copy the selected company's website
?                show this help (also in an empty search box)
Esc              close popup / leave search / cancel page prompt
q / Ctrl+C       quit";

#[derive(Debug, Error)]
pub enum DirError {
    #[error("io error: {0}")]
    IoError(#[from] Error),
    #[error("load failure: {0}")]
    LoadFailure(String),
}

impl From<serde_json::Error> for DirError {
    fn from(err: serde_json::Error) -> Self {
        DirError::LoadFailure(format!("invalid company data: {err}"))
    }
}

impl From<reqwest::Error> for DirError {
    fn from(err: reqwest::Error) -> Self {
        DirError::LoadFailure(format!("request failed: {err}"))
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct DirConfig {
    pub event_poll_time: u64,
    pub page_size: usize,
    pub debounce: Duration,
    #[setters(into)]
    pub source: String,
}

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            page_size: PAGE_SIZE,
            debounce: DEBOUNCE_DELAY,
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Location,
    Industry,
    Table,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Search => Focus::Location,
            Focus::Location => Focus::Industry,
            Focus::Industry => Focus::Table,
            Focus::Table => Focus::Search,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Focus::Search => Focus::Table,
            Focus::Location => Focus::Search,
            Focus::Industry => Focus::Location,
            Focus::Table => Focus::Industry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Location,
    Industry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Exit,
    Help,
    Resize(usize, usize),
    FocusNext,
    FocusPrevious,
    Focus(Focus),
    RawKey(KeyEvent),
    CycleFilter(FilterKind, i32),
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    SortCurrentColumn,
    SortBy(Field),
    PreviousPage,
    NextPage,
    GoToPage(usize),
    PagePrompt,
    SelectRow(usize),
    CopyWebsite,
}
