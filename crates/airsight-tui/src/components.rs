use crate::theme::{ComponentType, ThemeManager};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Single line input field, used for the airline search and table filter
#[derive(Debug, Clone)]
pub struct InputField {
    content: String,
    /// Cursor position in characters
    cursor_position: usize,
    placeholder: String,
}

impl Default for InputField {
    fn default() -> Self {
        Self::new()
    }
}

impl InputField {
    /// Create a new input field
    pub fn new() -> Self {
        Self {
            content: String::new(),
            cursor_position: 0,
            placeholder: String::new(),
        }
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Set the content
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor_position = self.content.chars().count();
    }

    /// Clear the content
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor_position = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    /// Insert a character at the cursor position
    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index(self.cursor_position);
        self.content.insert(index, c);
        self.cursor_position += 1;
    }

    /// Delete character before cursor (backspace)
    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let index = self.byte_index(self.cursor_position);
            self.content.remove(index);
        }
    }

    /// Delete character at cursor (delete)
    pub fn delete(&mut self) {
        if self.cursor_position < self.content.chars().count() {
            let index = self.byte_index(self.cursor_position);
            self.content.remove(index);
        }
    }

    /// Move cursor left
    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move cursor right
    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.content.chars().count() {
            self.cursor_position += 1;
        }
    }

    /// Move cursor to beginning
    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    /// Move cursor to end
    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.content.chars().count();
    }

    /// Render the input field. `focused` shows the cursor; `disabled` dims it.
    pub fn render(
        &self,
        area: Rect,
        buf: &mut Buffer,
        theme: &ThemeManager,
        title: &str,
        focused: bool,
        disabled: bool,
    ) {
        let border_style = if disabled {
            theme.get_style(ComponentType::Disabled)
        } else if focused {
            theme.get_style(ComponentType::Highlight)
        } else {
            theme.get_style(ComponentType::Border)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .title_style(theme.get_style(ComponentType::Title))
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        // Keep the cursor in view
        let width = inner.width as usize;
        let scroll = (self.cursor_position + 1).saturating_sub(width);
        let text = if self.content.is_empty() && !focused {
            Span::styled(
                self.placeholder.clone(),
                theme.get_style(ComponentType::Placeholder),
            )
        } else {
            let visible: String = self.content.chars().skip(scroll).take(width).collect();
            let style = if disabled {
                theme.get_style(ComponentType::Disabled)
            } else {
                theme.get_style(ComponentType::Text)
            };
            Span::styled(visible, style)
        };
        Paragraph::new(text).render(inner, buf);

        if focused && !disabled {
            let cursor = Rect::new(inner.x + (self.cursor_position - scroll) as u16, inner.y, 1, 1);
            buf.set_style(cursor, Style::default().add_modifier(Modifier::REVERSED));
        }
    }
}

/// Multi-line text input for the sentiment tool
#[derive(Debug, Clone)]
pub struct TextArea {
    lines: Vec<String>,
    row: usize,
    /// Column in characters
    column: usize,
}

impl Default for TextArea {
    fn default() -> Self {
        Self::new()
    }
}

impl TextArea {
    /// Create an empty text area
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            column: 0,
        }
    }

    /// Full text with `\n` line breaks
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.column)
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn current_line(&mut self) -> &mut String {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        let row = self.row.min(self.lines.len() - 1);
        &mut self.lines[row]
    }

    fn byte_index(line: &str, column: usize) -> usize {
        line.char_indices()
            .nth(column)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let column = self.column;
        let line = self.current_line();
        let index = Self::byte_index(line, column);
        line.insert(index, c);
        self.column += 1;
    }

    /// Split the current line at the cursor
    pub fn new_line(&mut self) {
        let column = self.column;
        let line = self.current_line();
        let index = Self::byte_index(line, column);
        let rest = line.split_off(index);
        self.row += 1;
        self.lines.insert(self.row, rest);
        self.column = 0;
    }

    pub fn backspace(&mut self) {
        if self.column > 0 {
            self.column -= 1;
            let column = self.column;
            let line = self.current_line();
            let index = Self::byte_index(line, column);
            line.remove(index);
        } else if self.row > 0 {
            let removed = self.lines.remove(self.row);
            self.row -= 1;
            self.column = self.lines[self.row].chars().count();
            self.lines[self.row].push_str(&removed);
        }
    }

    pub fn delete(&mut self) {
        let column = self.column;
        let row = self.row;
        let line_len = self.current_line().chars().count();
        if column < line_len {
            let line = self.current_line();
            let index = Self::byte_index(line, column);
            line.remove(index);
        } else if row + 1 < self.lines.len() {
            let next = self.lines.remove(row + 1);
            self.lines[row].push_str(&next);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.column > 0 {
            self.column -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.column = self.lines[self.row].chars().count();
        }
    }

    pub fn move_cursor_right(&mut self) {
        let len = self.lines[self.row].chars().count();
        if self.column < len {
            self.column += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.column = 0;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.column = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.column = self.lines[self.row].chars().count();
    }

    /// Render the text area
    pub fn render(
        &self,
        area: Rect,
        buf: &mut Buffer,
        theme: &ThemeManager,
        focused: bool,
        disabled: bool,
    ) {
        let border_style = if disabled {
            theme.get_style(ComponentType::Disabled)
        } else if focused {
            theme.get_style(ComponentType::Highlight)
        } else {
            theme.get_style(ComponentType::Border)
        };
        let title = if disabled {
            "Content (analyzing...)"
        } else {
            "Content"
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(theme.get_style(ComponentType::Title))
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.is_blank() && !focused {
            Paragraph::new(Span::styled(
                "Press i and type or paste a review to analyze",
                theme.get_style(ComponentType::Placeholder),
            ))
            .wrap(Wrap { trim: true })
            .render(inner, buf);
            return;
        }

        let height = inner.height as usize;
        let first = (self.row + 1).saturating_sub(height);
        let text_style = if disabled {
            theme.get_style(ComponentType::Disabled)
        } else {
            theme.get_style(ComponentType::Text)
        };
        let width = inner.width as usize;
        for (offset, line) in self.lines.iter().skip(first).take(height).enumerate() {
            let scroll = if first + offset == self.row {
                (self.column + 1).saturating_sub(width)
            } else {
                0
            };
            let visible: String = line.chars().skip(scroll).take(width).collect();
            buf.set_stringn(inner.x, inner.y + offset as u16, visible, width, text_style);
        }

        if focused && !disabled {
            let scroll = (self.column + 1).saturating_sub(width);
            let cursor = Rect::new(
                inner.x + (self.column - scroll) as u16,
                inner.y + (self.row - first) as u16,
                1,
                1,
            );
            buf.set_style(cursor, Style::default().add_modifier(Modifier::REVERSED));
        }
    }
}

/// Status bar component
#[derive(Debug, Clone)]
pub struct StatusBar {
    left_items: Vec<StatusItem>,
    right_items: Vec<StatusItem>,
}

/// Individual status item
#[derive(Debug, Clone)]
pub struct StatusItem {
    pub label: String,
    pub value: String,
    pub style: ComponentType,
}

impl StatusItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>, style: ComponentType) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            style,
        }
    }
}

impl StatusBar {
    /// Create a new status bar
    pub fn new() -> Self {
        Self {
            left_items: Vec::new(),
            right_items: Vec::new(),
        }
    }

    /// Add item to the left side
    pub fn add_left(&mut self, item: StatusItem) {
        self.left_items.push(item);
    }

    /// Add item to the right side
    pub fn add_right(&mut self, item: StatusItem) {
        self.right_items.push(item);
    }

    /// Clear all items
    pub fn clear(&mut self) {
        self.left_items.clear();
        self.right_items.clear();
    }

    /// Render the status bar
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        buf.set_style(
            area,
            Style::default().bg(theme.get_color(ComponentType::Selection)),
        );

        let mut current_x = area.x;
        for item in &self.left_items {
            let text = format!(" {}: {} ", item.label, item.value);
            let text_len = text.chars().count() as u16;
            let line = Line::from(Span::styled(text, theme.get_style(item.style)));

            if current_x < area.x + area.width {
                buf.set_line(current_x, area.y, &line, area.width - (current_x - area.x));
                current_x = current_x.saturating_add(text_len);
            }
        }

        let right_text: String = self
            .right_items
            .iter()
            .map(|item| format!("{}: {}", item.label, item.value))
            .collect::<Vec<_>>()
            .join(" | ");

        if !right_text.is_empty() {
            let right_len = right_text.chars().count() as u16 + 1;
            let right_x = area.x + area.width.saturating_sub(right_len);
            if right_x >= current_x {
                let line = Line::from(Span::styled(
                    right_text,
                    theme.get_style(ComponentType::Muted),
                ));
                buf.set_line(right_x, area.y, &line, area.width - (right_x - area.x));
            }
        }
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

/// Severity of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    created: Instant,
}

/// Transient notifications, newest first
#[derive(Debug, Clone)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
    lifetime: Duration,
    capacity: usize,
}

impl ToastQueue {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            toasts: VecDeque::new(),
            lifetime,
            capacity: 5,
        }
    }

    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.push_at(level, message, Instant::now());
    }

    fn push_at(&mut self, level: ToastLevel, message: impl Into<String>, created: Instant) {
        self.toasts.push_front(Toast {
            message: message.into(),
            level,
            created,
        });
        self.toasts.truncate(self.capacity);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message);
    }

    /// Drop expired toasts
    pub fn expire(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.created) < lifetime);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Render stacked in the top right corner of `area`
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        let width = area.width.min(48);
        let mut y = area.y + 1;
        for toast in &self.toasts {
            let inner_width = width.saturating_sub(2).max(1) as usize;
            let lines = (toast.message.chars().count() / inner_width + 1) as u16;
            let height = (lines + 2).min(5);
            if y + height > area.y + area.height {
                break;
            }
            let rect = Rect::new(area.x + area.width - width, y, width, height);
            let style = match toast.level {
                ToastLevel::Info => theme.get_style(ComponentType::Info),
                ToastLevel::Success => theme.get_style(ComponentType::Success),
                ToastLevel::Error => theme.get_style(ComponentType::Error),
            };
            Clear.render(rect, buf);
            Paragraph::new(toast.message.as_str())
                .style(theme.get_style(ComponentType::Text))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).border_style(style))
                .render(rect, buf);
            y += height;
        }
    }
}

/// Popup dialog component
#[derive(Debug, Clone)]
pub struct PopupDialog {
    title: String,
    lines: Vec<(String, String)>,
}

impl PopupDialog {
    /// Create a dialog listing `key: description` pairs
    pub fn new(title: impl Into<String>, lines: Vec<(String, String)>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    /// The key binding reference
    pub fn help() -> Self {
        let entries = [
            ("F1 / ?", "Toggle this help"),
            ("q / Ctrl+C", "Quit"),
            ("1 2 3", "Dashboard, Review Data, Analytics Tool"),
            ("Ctrl+← / Ctrl+→", "Previous / next page"),
            ("/", "Search an airline (Enter to submit)"),
            ("r", "Clear the selected airline"),
            ("n / p", "Next / previous table page"),
            ("Tab / Shift+Tab", "Select column or result view"),
            ("f", "Edit the review filter"),
            ("v", "Cycle the selected column's filter value"),
            ("o", "Sort by the selected column"),
            ("x", "Show or hide the selected column"),
            ("i", "Write text for sentiment analysis"),
            ("Enter / Alt+Enter", "Submit / new line"),
            ("← / →", "Move between highlighted words"),
            ("c", "Reset the sentiment tool"),
            ("t", "Toggle theme"),
            ("Esc", "Leave the current input"),
        ];
        Self::new(
            "Help",
            entries
                .iter()
                .map(|(k, d)| (k.to_string(), d.to_string()))
                .collect(),
        )
    }

    /// Render the popup dialog
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &ThemeManager) {
        Clear.render(area, buf);

        let style = theme.get_style(ComponentType::Info);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.as_str())
            .title_style(style)
            .border_style(style);

        let key_width = self
            .lines
            .iter()
            .map(|(k, _)| k.chars().count())
            .max()
            .unwrap_or(0);
        let lines: Vec<Line> = self
            .lines
            .iter()
            .map(|(key, description)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>width$}  ", key, width = key_width),
                        theme.get_style(ComponentType::Highlight),
                    ),
                    Span::styled(description.clone(), theme.get_style(ComponentType::Text)),
                ])
            })
            .collect();

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .render(area, buf);
    }
}
