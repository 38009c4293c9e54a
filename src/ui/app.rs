use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use log::warn;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

use crate::db::SqliteBookRepository;
use crate::models::SortKey;
use crate::store::{Catalog, StatusLabelBinder};

use super::forms::{BookField, BookForm, ConfirmRemove, FilterState, SortPrompt};
use super::helpers::{
    cell_text, centered_rect, column_heading, cursor_column, direction_word, key_hint,
    surface_error,
};

/// Footer space: a top border, the record counter, the message line and the
/// key help.
const FOOTER_HEIGHT: u16 = 4;
/// Height of the note pane below the table, borders included.
const NOTE_HEIGHT: u16 = 5;

/// Fine-grained modes layered over the catalog table.
enum Mode {
    Normal,
    Editing(BookForm),
    ChoosingSort(SortPrompt),
    Filtering(FilterState),
    ConfirmRemove(ConfirmRemove),
    ConfirmQuit,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    catalog: Catalog<SqliteBookRepository>,
    record_label: StatusLabelBinder,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(catalog: Catalog<SqliteBookRepository>) -> Self {
        let record_label = catalog.bind_status_label();
        Self {
            catalog,
            record_label,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn catalog(&self) -> &Catalog<SqliteBookRepository> {
        &self.catalog
    }

    /// Current record counter text.
    pub fn record_label(&self) -> String {
        self.record_label.text()
    }

    /// Process one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Editing(form) => self.handle_edit(code, form)?,
            Mode::ChoosingSort(prompt) => self.handle_sort_prompt(code, prompt)?,
            Mode::Filtering(state) => self.handle_filter(code, state)?,
            Mode::ConfirmRemove(confirm) => self.handle_confirm_remove(code, confirm)?,
            Mode::ConfirmQuit => self.handle_confirm_quit(code, &mut exit)?,
        };

        Ok(exit)
    }

    /// Ctrl-S saves from anywhere except the edit form, where it submits the
    /// form first so the save includes it.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        match mode {
            Mode::Editing(form) => {
                self.apply_form(&form);
                self.save();
            }
            Mode::Normal => {
                self.save();
            }
            other => self.mode = other,
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.catalog.has_unsaved_changes() {
                    return Ok(Mode::ConfirmQuit);
                }
                *exit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => self.catalog.go_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.catalog.go_next(),
            KeyCode::Home | KeyCode::Char('g') => self.catalog.go_first(),
            KeyCode::End | KeyCode::Char('G') => self.catalog.go_last(),
            KeyCode::Char('1') => self.sort_by_column(SortKey::Title),
            KeyCode::Char('2') => self.sort_by_column(SortKey::Author),
            KeyCode::Char('3') => self.sort_by_column(SortKey::Year),
            KeyCode::Char('o') | KeyCode::Char('O') => {
                self.clear_status();
                return Ok(Mode::ChoosingSort(SortPrompt::default()));
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                self.clear_status();
                return Ok(Mode::Filtering(FilterState::start(self.catalog.filter())));
            }
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.catalog.add();
                self.set_status("Added a new book.", StatusKind::Info);
                return Ok(Mode::Editing(BookForm::default()));
            }
            KeyCode::Char('-') | KeyCode::Char('d') => {
                if let Some(title) = self.catalog.selected().map(|(_, b)| b.display_title()) {
                    self.clear_status();
                    return Ok(Mode::ConfirmRemove(ConfirmRemove { title }));
                }
                self.set_status("No book selected to remove.", StatusKind::Error);
            }
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(form) = self.catalog.selected().map(|(_, b)| BookForm::from_book(b)) {
                    self.clear_status();
                    return Ok(Mode::Editing(form));
                }
                self.set_status("No book selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.save();
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_edit(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                self.apply_form(&form);
                return Ok(Mode::Normal);
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::Editing(form))
    }

    fn handle_sort_prompt(&mut self, code: KeyCode, mut prompt: SortPrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Tab | KeyCode::Down => prompt.cycle(),
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Enter => {
                match self.catalog.sort_by_attribute(&prompt.input) {
                    Ok(state) => self.set_status(
                        format!("Sorted by {} ({}).", state.key, direction_word(state.ascending)),
                        StatusKind::Info,
                    ),
                    Err(err) => self.set_status(err.to_string(), StatusKind::Error),
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::ChoosingSort(prompt))
    }

    /// The filter applies as the user types; Esc restores what was active
    /// before the bar opened.
    fn handle_filter(&mut self, code: KeyCode, mut state: FilterState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.catalog.set_filter(state.previous.as_deref());
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                let message = self
                    .catalog
                    .filter()
                    .map(|filter| format!("Showing books matching \"{filter}\"."));
                match message {
                    Some(message) => self.set_status(message, StatusKind::Info),
                    None => self.clear_status(),
                }
                return Ok(Mode::Normal);
            }
            KeyCode::Up => self.catalog.go_previous(),
            KeyCode::Down => self.catalog.go_next(),
            KeyCode::Backspace => {
                state.query.pop();
                self.catalog.set_filter(Some(&state.query));
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                state.query.push(ch);
                self.catalog.set_filter(Some(&state.query));
            }
            _ => {}
        }
        Ok(Mode::Filtering(state))
    }

    fn handle_confirm_remove(&mut self, code: KeyCode, confirm: ConfirmRemove) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if self.catalog.remove_selected().is_some() {
                    self.set_status(format!("Removed {}.", confirm.title), StatusKind::Info);
                } else {
                    self.set_status("No book selected to remove.", StatusKind::Error);
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmRemove(confirm)),
        }
    }

    fn handle_confirm_quit(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                // Stay open when the save fails so nothing is lost.
                *exit = self.save();
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                warn!("event=app_quit module=ui status=ok unsaved_changes_discarded=true");
                *exit = true;
                Ok(Mode::Normal)
            }
            KeyCode::Esc => {
                self.clear_status();
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmQuit),
        }
    }

    fn sort_by_column(&mut self, key: SortKey) {
        let state = self.catalog.sort_by_column(key);
        self.set_status(
            format!("Sorted by {} ({}).", state.key, direction_word(state.ascending)),
            StatusKind::Info,
        );
    }

    fn apply_form(&mut self, form: &BookForm) {
        if self.catalog.update_selected(form.to_book()) {
            self.set_status("Book updated.", StatusKind::Info);
        } else {
            self.set_status("No changes.", StatusKind::Info);
        }
    }

    /// Save pending changes and report the outcome. Returns `true` on success.
    fn save(&mut self) -> bool {
        match self.catalog.save() {
            Ok(0) => {
                self.set_status("Nothing to save.", StatusKind::Info);
                true
            }
            Ok(count) => {
                let noun = if count == 1 { "change" } else { "changes" };
                self.set_status(format!("Saved {count} {noun}."), StatusKind::Info);
                true
            }
            Err(err) => {
                let message = surface_error(&anyhow::Error::from(err));
                self.set_status(format!("Failed to save: {message}"), StatusKind::Error);
                false
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(NOTE_HEIGHT),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_table(frame, chunks[0]);
        self.draw_note(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Editing(form) => self.draw_book_form(frame, area, form),
            Mode::ChoosingSort(prompt) => self.draw_sort_prompt(frame, area, prompt),
            Mode::Filtering(state) => self.draw_filter_bar(frame, area, state),
            Mode::ConfirmRemove(confirm) => self.draw_confirm_remove(frame, area, confirm),
            Mode::ConfirmQuit => self.draw_confirm_quit(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let title = match self.catalog.filter() {
            Some(filter) => format!("My Book Store (filter: {filter})"),
            None => "My Book Store".to_string(),
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.catalog.is_empty() {
            let text = if self.catalog.filter().is_some() {
                "No books match the current filter."
            } else {
                "No books yet. Press '+' to add one."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let sort = self.catalog.sort_state();
        let header = Row::new(
            SortKey::ALL
                .into_iter()
                .map(|key| Cell::from(column_heading(key, sort))),
        )
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.catalog.store().rows().map(|(_, book)| {
            Row::new(vec![
                Cell::from(cell_text(book.title.as_deref())),
                Cell::from(cell_text(book.author.as_deref())),
                Cell::from(cell_text(book.year.as_deref())),
            ])
        });

        let widths = [
            Constraint::Percentage(50),
            Constraint::Percentage(35),
            Constraint::Min(6),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(self.catalog.selection().index());
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_note(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Note");
        let text = match self.catalog.selected() {
            Some((_, book)) => match book.note.as_deref() {
                Some(note) => Line::from(note.to_string()),
                None => Line::from(Span::styled(
                    "No note.",
                    Style::default().fg(Color::DarkGray),
                )),
            },
            None => Line::from(""),
        };
        let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let mut counter = vec![Span::styled(
            self.record_label(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if self.catalog.has_unsaved_changes() {
            counter.push(Span::styled(
                "  • unsaved changes",
                Style::default().fg(Color::Yellow),
            ));
        }

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![
            Line::from(counter),
            status_line,
            self.footer_instructions(),
        ]);
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match &self.mode {
            Mode::Editing(_) => Line::from(vec![
                key_hint("[Enter]"),
                Span::raw(" Apply   "),
                key_hint("[Tab]"),
                Span::raw(" Next Field   "),
                key_hint("[Ctrl-S]"),
                Span::raw(" Apply & Save   "),
                key_hint("[Esc]"),
                Span::raw(" Cancel"),
            ]),
            Mode::ChoosingSort(_) => Line::from(vec![
                key_hint("[Tab]"),
                Span::raw(" Cycle   "),
                key_hint("[Enter]"),
                Span::raw(" Sort   "),
                key_hint("[Esc]"),
                Span::raw(" Cancel"),
            ]),
            Mode::Filtering(_) => Line::from(vec![
                key_hint("[↑↓]"),
                Span::raw(" Navigate   "),
                key_hint("[Enter]"),
                Span::raw(" Keep   "),
                key_hint("[Esc]"),
                Span::raw(" Cancel"),
            ]),
            Mode::ConfirmRemove(_) | Mode::ConfirmQuit => Line::from(vec![
                key_hint("[y]"),
                Span::raw(" Yes   "),
                key_hint("[n]"),
                Span::raw(" No"),
            ]),
            Mode::Normal => Line::from(vec![
                key_hint("[↑↓]"),
                Span::raw(" Prev/Next   "),
                key_hint("[g/G]"),
                Span::raw(" First/Last   "),
                key_hint("[1-3]"),
                Span::raw(" Sort Column   "),
                key_hint("[o]"),
                Span::raw(" Sort By   "),
                key_hint("[f]"),
                Span::raw(" Filter   "),
                key_hint("[+/-]"),
                Span::raw(" Add/Remove   "),
                key_hint("[e]"),
                Span::raw(" Edit   "),
                key_hint("[s]"),
                Span::raw(" Save   "),
                key_hint("[q]"),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Edit Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|&field| form.build_line(field))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter to apply • Tab to switch • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));

        frame.render_widget(Paragraph::new(lines), inner);

        let row = BookField::ALL
            .iter()
            .position(|&field| field == form.active)
            .unwrap_or(0) as u16;
        let prefix = form.active.label().len() + 2;
        let cursor_x = cursor_column(inner, prefix, form.value_len(form.active));
        frame.set_cursor_position((cursor_x, inner.y.saturating_add(row)));
    }

    fn draw_sort_prompt(&self, frame: &mut Frame, area: Rect, prompt: &SortPrompt) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Sort By").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Attribute: {}", prompt.input)),
            Line::from(""),
            Line::from(Span::styled(
                "title, author or year (always ascending)",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = cursor_column(inner, "Attribute: ".len(), prompt.input.chars().count());
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_filter_bar(&self, frame: &mut Frame, area: Rect, state: &FilterState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Filter");
        let paragraph = Paragraph::new(Span::raw(format!("Filter: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = cursor_column(inner, "Filter: ".len(), state.query.chars().count());
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_confirm_remove(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmRemove) {
        let lines = vec![
            Line::from(format!("Remove {}?", confirm.title)),
            Line::from("The book disappears from the database on the next save."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];
        self.draw_dialog(frame, area, "Confirm Removal", lines);
    }

    fn draw_confirm_quit(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from("You have unsaved changes."),
            Line::from("Save them before quitting?"),
            Line::from(""),
            Line::from(Span::styled(
                "Y to save and quit, N to quit without saving, Esc to stay.",
                Style::default().fg(Color::Gray),
            )),
        ];
        self.draw_dialog(frame, area, "Quit", lines);
    }

    fn draw_dialog(&self, frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
