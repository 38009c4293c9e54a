use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{normalize_field, Book, SortKey};

/// Fields available within the book form, in focus order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
    Note,
}

impl BookField {
    pub(crate) const ALL: [BookField; 4] = [
        BookField::Title,
        BookField::Author,
        BookField::Year,
        BookField::Note,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Year",
            BookField::Note => "Note",
        }
    }

    fn next(self) -> Self {
        match self {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Year,
            BookField::Year => BookField::Note,
            BookField::Note => BookField::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            BookField::Title => BookField::Note,
            BookField::Author => BookField::Title,
            BookField::Year => BookField::Author,
            BookField::Note => BookField::Year,
        }
    }
}

/// Editable copy of a book. Nothing reaches the store until the form is
/// submitted.
#[derive(Default, Clone, Debug)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) note: String,
    pub(crate) active: BookField,
}

impl BookForm {
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone().unwrap_or_default(),
            author: book.author.clone().unwrap_or_default(),
            year: book.year.clone().unwrap_or_default(),
            note: book.note.clone().unwrap_or_default(),
            active: BookField::Title,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    pub(crate) fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => &self.year,
            BookField::Note => &self.note,
        }
    }

    fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Year => &mut self.year,
            BookField::Note => &mut self.note,
        }
    }

    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }

    /// Convert the form back into a book; blank fields become missing values.
    pub(crate) fn to_book(&self) -> Book {
        Book {
            title: normalize_field(&self.title),
            author: normalize_field(&self.author),
            year: normalize_field(&self.year),
            note: normalize_field(&self.note),
        }
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() && !is_active {
            "<empty>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }
}

/// Free-text sort attribute entry. Tab cycles through the valid names the
/// way a combo box drop-down would.
#[derive(Default, Clone, Debug)]
pub(crate) struct SortPrompt {
    pub(crate) input: String,
    choice: Option<usize>,
}

impl SortPrompt {
    pub(crate) fn cycle(&mut self) {
        let next = match self.choice {
            Some(idx) => (idx + 1) % SortKey::ALL.len(),
            None => 0,
        };
        self.choice = Some(next);
        self.input = SortKey::ALL[next].attribute().to_string();
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.input.push(ch);
        self.choice = None;
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.input.pop();
        self.choice = None;
    }
}

/// State for the inline filter bar. `previous` is restored on cancel.
#[derive(Default, Clone, Debug)]
pub(crate) struct FilterState {
    pub(crate) query: String,
    pub(crate) previous: Option<String>,
}

impl FilterState {
    pub(crate) fn start(current: Option<&str>) -> Self {
        Self {
            query: current.unwrap_or_default().to_string(),
            previous: current.map(str::to_string),
        }
    }
}

/// Snapshot of the book pending removal, for the confirmation dialog.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmRemove {
    pub(crate) title: String,
}
