use std::time::Instant;

use arboard::Clipboard;
use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, info, trace};

use crate::company::{Company, Field};
use crate::debounce::Debouncer;
use crate::domain::{
    DirConfig, DirError, FilterKind, Focus, HELP_TEXT, LOAD_FAILURE_MESSAGE, Message,
};
use crate::inputter::{InputResult, Inputter};
use crate::pagination::{PageControl, PageTarget, page_controls};
use crate::pipeline::{self, QueryState};
use crate::source::{LoadState, Loader};
use crate::table::{Column, company_columns};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Status {
    Loading,
    Ready,
    Failed,
    Quitting,
}

pub struct Model {
    config: DirConfig,
    pub status: Status,
    loader: Option<Loader>,
    records: Vec<Company>,
    error: Option<String>,
    locations: Vec<String>,
    industries: Vec<String>,
    query: QueryState,
    debouncer: Debouncer<String>,
    input: Inputter,
    last_input: InputResult,
    page_prompt: Option<Inputter>,
    columns: Vec<Column>,
    page_rows: Vec<Company>,
    matched: usize,
    total_pages: usize,
    focus: Focus,
    row_cursor: usize,
    header_cursor: usize,
    show_popup: bool,
    clipboard: Option<Clipboard>,
    status_message: String,
    ui_size: (usize, usize),
}

impl Model {
    pub fn init(config: &DirConfig, loader: Loader) -> Self {
        let mut model = Self::new(config);
        model.loader = Some(loader);
        model.apply_load_state(LoadState::Pending);
        model.set_status_message(format!("Loading {} ...", config.source));
        model
    }

    /// A model without a loader, waiting for `apply_load_state`.
    pub fn new(config: &DirConfig) -> Self {
        Self {
            config: config.clone(),
            status: Status::Loading,
            loader: None,
            records: Vec::new(),
            error: None,
            locations: Vec::new(),
            industries: Vec::new(),
            query: QueryState::default(),
            debouncer: Debouncer::new(config.debounce),
            input: Inputter::default(),
            last_input: InputResult::default(),
            page_prompt: None,
            columns: company_columns(),
            page_rows: Vec::new(),
            matched: 0,
            total_pages: 0,
            focus: Focus::Search,
            row_cursor: 0,
            header_cursor: 0,
            show_popup: false,
            clipboard: None,
            status_message: String::new(),
            ui_size: (0, 0),
        }
    }

    /// Applies the terminal state of the one and only load.
    pub fn apply_load_state(&mut self, state: LoadState) {
        match state {
            LoadState::Pending => self.status = Status::Loading,
            LoadState::Loaded(records) => {
                self.locations = pipeline::distinct_values(&records, Field::Location);
                self.industries = pipeline::distinct_values(&records, Field::Industry);
                info!(
                    "{} companies, {} locations, {} industries",
                    records.len(),
                    self.locations.len(),
                    self.industries.len()
                );
                self.records = records;
                self.status = Status::Ready;
                self.refresh();
            }
            LoadState::Failed(reason) => {
                debug!("Showing load failure for: {reason}");
                self.error = Some(LOAD_FAILURE_MESSAGE.to_string());
                self.status = Status::Failed;
                self.set_status_message(reason);
            }
        }
    }

    // -------------------- Accessors for the ui ---------------------------- //

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn page_rows(&self) -> &[Company] {
        &self.page_rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn page_controls(&self) -> Vec<PageControl> {
        page_controls(self.query.current_page, self.total_pages)
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn row_cursor(&self) -> Option<usize> {
        (self.focus == Focus::Table && !self.page_rows.is_empty()).then_some(self.row_cursor)
    }

    pub fn header_cursor(&self) -> Option<usize> {
        (self.focus == Focus::Table).then_some(self.header_cursor)
    }

    pub fn search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn search_input(&self) -> &InputResult {
        &self.last_input
    }

    /// Text typed into the open go-to-page prompt.
    pub fn page_prompt(&self) -> Option<String> {
        self.page_prompt.as_ref().map(|prompt| prompt.get().input)
    }

    /// True when the input receiving raw keys holds no text.
    pub fn input_is_empty(&self) -> bool {
        match &self.page_prompt {
            Some(prompt) => prompt.get().input.is_empty(),
            None => self.last_input.input.is_empty(),
        }
    }

    pub fn filter_label(&self, kind: FilterKind) -> String {
        let (selected, all) = match kind {
            FilterKind::Location => (&self.query.location_filter, "All Locations"),
            FilterKind::Industry => (&self.query.industry_filter, "All Industries"),
        };
        selected.clone().unwrap_or_else(|| all.to_string())
    }

    pub fn filter_options(&self, kind: FilterKind) -> &[String] {
        match kind {
            FilterKind::Location => &self.locations,
            FilterKind::Industry => &self.industries,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn show_popup(&self) -> bool {
        self.show_popup
    }

    pub fn popup_message(&self) -> &str {
        HELP_TEXT
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn raw_keyevents(&self) -> bool {
        (self.focus == Focus::Search || self.page_prompt.is_some()) && !self.show_popup
    }

    pub fn quit(&mut self) {
        self.debouncer.cancel();
        self.status = Status::Quitting;
    }

    // -------------------- Update ------------------------------------------ //

    /// Advances timers and the loader, then applies `message`.
    pub fn update(&mut self, message: Option<Message>, now: Instant) -> Result<(), DirError> {
        if let Some(state) = self.loader.as_mut().and_then(|l| l.poll()) {
            self.loader = None;
            self.apply_load_state(state);
        }
        if let Some(text) = self.debouncer.poll(now) {
            trace!("Debounced search text \"{text}\"");
            self.query.debounced_search_text = text;
            self.refresh();
        }

        let Some(msg) = message else {
            return Ok(());
        };

        match msg {
            Message::Quit => {
                self.quit();
                return Ok(());
            }
            Message::Resize(width, height) => {
                self.ui_resize(width, height);
                return Ok(());
            }
            _ => {}
        }

        if self.show_popup {
            if matches!(msg, Message::Exit | Message::Help) {
                self.show_popup = false;
            }
            return Ok(());
        }

        if self.status != Status::Ready {
            if msg == Message::Help {
                self.show_popup = true;
            }
            return Ok(());
        }

        match msg {
            Message::Help => self.show_popup = true,
            Message::Exit => self.exit(),
            Message::FocusNext => self.set_focus(self.focus.next()),
            Message::FocusPrevious => self.set_focus(self.focus.previous()),
            Message::Focus(focus) => self.set_focus(focus),
            Message::RawKey(key) if self.page_prompt.is_some() => self.page_prompt_key(key),
            Message::RawKey(key) => self.search_input_key(key, now),
            Message::CycleFilter(kind, step) => self.cycle_filter(kind, step),
            Message::MoveUp => self.move_vertical(-1),
            Message::MoveDown => self.move_vertical(1),
            Message::MoveLeft => self.move_horizontal(-1),
            Message::MoveRight => self.move_horizontal(1),
            Message::SortCurrentColumn => {
                if let Some(Message::SortBy(key)) = self.columns[self.header_cursor].activate() {
                    self.sort_by(key);
                }
            }
            Message::SortBy(key) => self.sort_by(key),
            Message::PreviousPage => self.activate_page_control(PageTarget::Previous),
            Message::NextPage => self.activate_page_control(PageTarget::Next),
            Message::GoToPage(page) => self.activate_page_control(PageTarget::Page(page)),
            Message::PagePrompt => self.page_prompt = Some(Inputter::default()),
            Message::SelectRow(idx) => {
                if idx < self.page_rows.len() {
                    self.focus = Focus::Table;
                    self.row_cursor = idx;
                }
            }
            Message::CopyWebsite => self.copy_website(),
            Message::Quit | Message::Resize(_, _) => {}
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn refresh(&mut self) {
        let output = pipeline::run(&self.records, &self.query, self.config.page_size);
        self.matched = output.matched;
        self.total_pages = output.total_pages;
        self.page_rows = output.rows.into_iter().cloned().collect();
        self.row_cursor = std::cmp::min(self.row_cursor, self.page_rows.len().saturating_sub(1));
        self.set_status_message(format!(
            "{} of {} companies, page {}/{}",
            self.matched,
            self.records.len(),
            self.query.current_page,
            self.total_pages
        ));
    }

    fn set_focus(&mut self, focus: Focus) {
        trace!("Focus {:?} -> {:?}", self.focus, focus);
        self.focus = focus;
    }

    fn exit(&mut self) {
        if self.focus == Focus::Search {
            self.focus = Focus::Table;
        }
    }

    fn search_input_key(&mut self, key: KeyEvent, now: Instant) {
        if self.focus != Focus::Search {
            return;
        }
        self.last_input = self.input.read(key);
        if self.last_input.changed {
            self.query.set_search_text(self.last_input.input.clone());
            self.debouncer.schedule(self.last_input.input.clone(), now);
            self.row_cursor = 0;
            self.refresh();
        }
        if self.last_input.finished {
            self.focus = Focus::Table;
        }
    }

    fn page_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.page_prompt.as_mut() else {
            return;
        };
        if key.code == KeyCode::Esc {
            self.page_prompt = None;
            return;
        }
        let result = prompt.read(key);
        if !result.finished {
            return;
        }
        self.page_prompt = None;
        let typed = result.input.trim();
        match typed.parse::<usize>() {
            Ok(page) if (1..=self.total_pages).contains(&page) => {
                self.activate_page_control(PageTarget::Page(page))
            }
            _ => self.set_status_message(format!("No page \"{typed}\"")),
        }
    }

    fn cycle_filter(&mut self, kind: FilterKind, step: i32) {
        let options = self.filter_options(kind);
        let current = match kind {
            FilterKind::Location => self.query.location_filter.as_ref(),
            FilterKind::Industry => self.query.industry_filter.as_ref(),
        };
        // Slot 0 is "All", slot n is options[n - 1]
        let slots = options.len() as i32 + 1;
        let position = current
            .and_then(|value| options.iter().position(|o| o == value))
            .map(|p| p as i32 + 1)
            .unwrap_or(0);
        let next = (position + step).rem_euclid(slots) as usize;
        let selected = (next > 0).then(|| options[next - 1].clone());
        trace!("Filter {:?} -> {:?}", kind, selected);

        match kind {
            FilterKind::Location => self.query.set_location_filter(selected),
            FilterKind::Industry => self.query.set_industry_filter(selected),
        }
        self.row_cursor = 0;
        self.refresh();
    }

    fn move_vertical(&mut self, step: i32) {
        match self.focus {
            Focus::Table => {
                if step < 0 {
                    self.row_cursor = self.row_cursor.saturating_sub(1);
                } else if self.row_cursor + 1 < self.page_rows.len() {
                    self.row_cursor += 1;
                }
            }
            Focus::Location => self.cycle_filter(FilterKind::Location, step),
            Focus::Industry => self.cycle_filter(FilterKind::Industry, step),
            Focus::Search => {}
        }
    }

    fn move_horizontal(&mut self, step: i32) {
        match self.focus {
            Focus::Table => {
                if step < 0 {
                    self.header_cursor = self.header_cursor.saturating_sub(1);
                } else if self.header_cursor + 1 < self.columns.len() {
                    self.header_cursor += 1;
                }
            }
            Focus::Location => self.cycle_filter(FilterKind::Location, step),
            Focus::Industry => self.cycle_filter(FilterKind::Industry, step),
            Focus::Search => {}
        }
    }

    fn sort_by(&mut self, key: Field) {
        let Some(idx) = self.columns.iter().position(|c| c.key == key && c.sortable) else {
            trace!("Ignoring sort on {:?}", key);
            return;
        };
        self.header_cursor = idx;
        self.query.toggle_sort(key);
        self.refresh();
    }

    fn activate_page_control(&mut self, target: PageTarget) {
        let controls = self.page_controls();
        let Some(control) = controls.iter().find(|c| c.target == target) else {
            trace!("No page control {:?}", target);
            return;
        };
        if control.activate().is_none() {
            trace!("Page control {:?} is disabled", target);
            return;
        }
        self.query.current_page = control.apply(self.query.current_page);
        self.row_cursor = 0;
        self.refresh();
    }

    fn copy_website(&mut self) {
        let Some(company) = self.page_rows.get(self.row_cursor) else {
            return;
        };
        let website = company.website.clone();
        if self.clipboard.is_none() {
            self.clipboard = Clipboard::new()
                .map_err(|e| debug!("Clipboard not available: {e:?}"))
                .ok();
        }
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(website.clone()).map_err(|e| format!("{e}")),
            None => Err("no clipboard".to_string()),
        };
        match result {
            Ok(_) => {
                trace!("Copied {website} to clipboard.");
                self.set_status_message(format!("Copied {website}"));
            }
            Err(e) => {
                trace!("Error copying to clipboard: {e}");
                self.set_status_message(format!("Could not copy {website}: {e}"));
            }
        }
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.ui_size.0, width, self.ui_size.1, height
        );
        self.ui_size = (width, height);
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }
}
