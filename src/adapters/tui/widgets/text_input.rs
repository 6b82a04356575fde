use ratatui::{
    layout::Position,
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

/// Single-field text editor used for composing and editing comments.
pub struct TextInput {
    text: String,
    // Cursor position in chars, not bytes
    cursor_position: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor_position: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor_position = self.text.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_index = self.byte_index();
        self.text.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let byte_index = self.byte_index();
            self.text.remove(byte_index);
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor_position = 0;
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow));

        let (content, style) = if self.text.is_empty() {
            ("Add a comment...", Style::default().fg(Color::DarkGray))
        } else {
            (self.text.as_str(), Style::default())
        };

        let paragraph = Paragraph::new(content)
            .block(block)
            .style(style)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);

        if let Some(position) = self.cursor_cell(area) {
            frame.set_cursor_position(position);
        }
    }

    /// Terminal cell for the cursor, or `None` once it runs past the right border.
    fn cursor_cell(&self, area: Rect) -> Option<Position> {
        let offset = u16::try_from(self.cursor_position).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(offset);
        let right_edge = area.x.saturating_add(area.width.saturating_sub(1));

        (x < right_edge).then(|| Position {
            x,
            y: area.y.saturating_add(1),
        })
    }
}
