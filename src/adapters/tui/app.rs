use color_eyre::Result;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};

use super::{
    event::{AppEvent, EventHandler},
    widgets::TextInput,
};
use crate::application::{CommentStore, CommentsSnapshot, Intent};
use crate::domain::{Comment, CommentId, SortPreference};
use crate::ports::{Notification, DELETE_PROMPT};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Browse,
    Help,
    Compose,
    Edit(CommentId),
    ConfirmDelete(CommentId),
    Alert(String),
}

pub struct App {
    store: Arc<CommentStore>,
    notifications: UnboundedReceiver<Notification>,

    // UI State
    mode: AppMode,
    snapshot: CommentsSnapshot,
    table_state: TableState,
    input: TextInput,
    alerts: VecDeque<String>,

    // Intents still running in the background
    pending: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(store: Arc<CommentStore>, notifications: UnboundedReceiver<Notification>) -> Self {
        Self {
            store,
            notifications,
            mode: AppMode::Browse,
            snapshot: CommentsSnapshot {
                comments: Vec::new(),
                loading: true,
                sort: SortPreference::default(),
                initialized: false,
            },
            table_state: TableState::default(),
            input: TextInput::new(),
            alerts: VecDeque::new(),
            pending: Vec::new(),
        }
    }

    pub fn mode(&self) -> &AppMode {
        &self.mode
    }

    /// Starts the first load in the background so the UI can draw a loading state.
    pub fn initialize(&mut self) {
        let store = self.store.clone();
        self.pending.push(tokio::spawn(async move {
            // Load failures are logged by the store and leave an empty list.
            let _ = store.initialize().await;
        }));
    }

    /// Pulls the latest store state and any queued failure notifications.
    pub async fn refresh(&mut self) {
        self.pending.retain(|handle| !handle.is_finished());

        self.snapshot = self.store.snapshot().await;
        self.clamp_selection();

        while let Ok(notification) = self.notifications.try_recv() {
            self.alerts.push_back(notification.to_string());
        }
        if self.mode == AppMode::Browse {
            if let Some(alert) = self.alerts.pop_front() {
                self.mode = AppMode::Alert(alert);
            }
        }
    }

    fn dispatch(&mut self, intent: Intent) {
        tracing::debug!("Dispatching {:?}", intent);
        let store = self.store.clone();
        self.pending.push(tokio::spawn(async move {
            // Failures are already logged, and mutation failures come back as notifications.
            if let Err(e) = store.dispatch(intent).await {
                tracing::debug!("Intent finished with error: {}", e);
            }
        }));
    }

    fn selected_comment(&self) -> Option<&Comment> {
        self.table_state
            .selected()
            .and_then(|i| self.snapshot.comments.get(i))
    }

    fn clamp_selection(&mut self) {
        let len = self.snapshot.comments.len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            None => self.table_state.select(Some(0)),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }

    fn next_comment(&mut self) {
        let len = self.snapshot.comments.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn previous_comment(&mut self) {
        if self.snapshot.comments.is_empty() {
            return;
        }
        let i = self.table_state.selected().unwrap_or(0).saturating_sub(1);
        self.table_state.select(Some(i));
    }

    /// Returns true when the app should exit.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        if event == AppEvent::Quit {
            return true;
        }

        match self.mode.clone() {
            AppMode::Browse => return self.handle_browse_event(event),
            AppMode::Help | AppMode::Alert(_) => {
                if event != AppEvent::Tick {
                    self.mode = AppMode::Browse;
                }
            }
            AppMode::Compose => self.handle_input_event(event, None),
            AppMode::Edit(id) => self.handle_input_event(event, Some(id)),
            AppMode::ConfirmDelete(id) => match event {
                AppEvent::Character('y') | AppEvent::Character('Y') => {
                    self.dispatch(Intent::Delete(id));
                    self.mode = AppMode::Browse;
                }
                AppEvent::Character(_) | AppEvent::Escape => self.mode = AppMode::Browse,
                _ => {}
            },
        }

        false
    }

    fn handle_browse_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Character('q') => return true,
            AppEvent::NextComment | AppEvent::Character('j') => self.next_comment(),
            AppEvent::PreviousComment | AppEvent::Character('k') => self.previous_comment(),
            AppEvent::Character('g') => {
                if !self.snapshot.comments.is_empty() {
                    self.table_state.select(Some(0));
                }
            }
            AppEvent::Character('G') => {
                if !self.snapshot.comments.is_empty() {
                    self.table_state
                        .select(Some(self.snapshot.comments.len() - 1));
                }
            }
            AppEvent::Character('?') => self.mode = AppMode::Help,
            AppEvent::Character('a') => {
                self.input.clear();
                self.mode = AppMode::Compose;
            }
            AppEvent::Character('e') | AppEvent::Enter => {
                if let Some(comment) = self.selected_comment() {
                    let (id, text) = (comment.id, comment.text.clone());
                    self.input.set_text(&text);
                    self.mode = AppMode::Edit(id);
                }
            }
            AppEvent::Character('d') => {
                if let Some(comment) = self.selected_comment() {
                    self.mode = AppMode::ConfirmDelete(comment.id);
                }
            }
            AppEvent::Character('s') => self.dispatch(Intent::ToggleSortField),
            AppEvent::Character('o') => self.dispatch(Intent::ToggleSortOrder),
            AppEvent::Character('r') => self.dispatch(Intent::Reload),
            _ => {}
        }
        false
    }

    fn handle_input_event(&mut self, event: AppEvent, editing: Option<CommentId>) {
        match event {
            AppEvent::Character(c) => self.input.insert_char(c),
            AppEvent::Backspace => self.input.delete_char(),
            AppEvent::Escape => {
                self.input.clear();
                self.mode = AppMode::Browse;
            }
            AppEvent::Enter => self.submit_input(editing),
            _ => {}
        }
    }

    fn submit_input(&mut self, editing: Option<CommentId>) {
        let text = self.input.text().to_string();
        if text.trim().is_empty() {
            return;
        }

        match editing {
            None => self.dispatch(Intent::Add(text)),
            Some(id) => {
                let unchanged = self
                    .snapshot
                    .comments
                    .iter()
                    .find(|c| c.id == id)
                    .is_some_and(|c| c.is_unchanged_by(&text));
                if !unchanged {
                    self.dispatch(Intent::Update(id, text));
                }
            }
        }

        self.input.clear();
        self.mode = AppMode::Browse;
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Comment table
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        self.render_header(frame, main_chunks[0]);
        self.render_comment_list(frame, main_chunks[1]);
        self.render_status_bar(frame, main_chunks[2]);

        match &self.mode {
            AppMode::Browse => {}
            AppMode::Help => self.render_help(frame),
            AppMode::Compose => {
                let area = Self::centered_rect(70, 30, frame.area());
                self.input
                    .render(frame, area, "New comment (Enter: post, Esc: cancel)");
            }
            AppMode::Edit(id) => {
                let area = Self::centered_rect(70, 30, frame.area());
                let title = format!("Edit comment #{id} (Enter: save, Esc: cancel)");
                self.input.render(frame, area, &title);
            }
            AppMode::ConfirmDelete(id) => {
                let message = format!("{DELETE_PROMPT}\n\nComment #{id}\n\ny: delete    n: keep");
                Self::render_popup(frame, "Delete comment", &message, Color::Yellow);
            }
            AppMode::Alert(message) => {
                let message = format!("{message}\n\nPress any key to continue");
                Self::render_popup(frame, "Error", &message, Color::Red);
            }
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let sort = self.snapshot.sort;
        let header = Line::from(vec![
            Span::styled("Comment Hub", Style::default().fg(Color::Blue).bold()),
            Span::raw("  "),
            Span::styled(
                format!("sorted by {} ({})", sort.field, sort.order),
                Style::default().fg(Color::Gray),
            ),
        ]);

        let paragraph = Paragraph::new(header).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_comment_list(&mut self, frame: &mut Frame, area: Rect) {
        let len = self.snapshot.comments.len();
        let title = if self.snapshot.loading {
            format!("Comments ({len}) - loading...")
        } else {
            format!("Comments ({len})")
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Green));

        if self.snapshot.comments.is_empty() {
            let message = if self.snapshot.loading && !self.snapshot.initialized {
                "Loading..."
            } else if self.snapshot.loading {
                "Loading comments..."
            } else {
                "No comments yet. Be the first!"
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let rows: Vec<Row> = self
            .snapshot
            .comments
            .iter()
            .map(|comment| {
                let when = format!(
                    "{} • {}",
                    comment.time_since_created(),
                    comment.date_display()
                );
                Row::new(vec![
                    Cell::from(comment.author.clone()).style(Style::default().fg(Color::Cyan)),
                    Cell::from(when).style(Style::default().fg(Color::DarkGray)),
                    Cell::from(format!("👍 {}", comment.likes)),
                    Cell::from(comment.text.replace('\n', " ")),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(18), // Author
                Constraint::Length(38), // Relative and exact date
                Constraint::Length(7),  // Likes
                Constraint::Min(20),    // Text
            ],
        )
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("");

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let help_text = match self.mode {
            AppMode::Compose | AppMode::Edit(_) => "Enter: save | Esc: cancel",
            AppMode::ConfirmDelete(_) => "y: delete | n/Esc: keep",
            _ => "j/k: navigate | a: add | e: edit | d: delete | s: sort field | o: sort order | r: reload | ?: help | q: quit",
        };

        let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let help_text = [
            "Comment Hub Help",
            "",
            "Navigation:",
            "  j/k or ↑/↓     - Move up/down",
            "  g/G            - First/last comment",
            "",
            "Comments:",
            "  a              - Add a comment",
            "  e or Enter     - Edit the selected comment",
            "  d              - Delete the selected comment",
            "",
            "Sorting:",
            "  s              - Toggle sort field (date/id)",
            "  o              - Toggle sort order (asc/desc)",
            "  r              - Reload from the server",
            "",
            "General:",
            "  ?              - Show this help",
            "  q / Ctrl+C     - Quit",
            "",
            "Press any key to close this help",
        ]
        .join("\n");

        Self::render_popup(frame, "Help", &help_text, Color::Gray);
    }

    fn render_popup(frame: &mut Frame, title: &str, text: &str, color: Color) {
        let popup_area = Self::centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, popup_area);

        let paragraph = Paragraph::new(text.to_string())
            .block(
                Block::default()
                    .title(title.to_string())
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(color)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup_area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }

    /// Waits for every dispatched intent so submitted changes reach the server.
    pub async fn shutdown(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if !pending.is_empty() {
            tracing::info!("Waiting for {} pending operations", pending.len());
        }
        for handle in pending {
            if let Err(e) = handle.await {
                tracing::error!("Background operation failed: {}", e);
            }
        }
    }

    #[cfg(test)]
    async fn settle(&mut self) {
        self.shutdown().await;
        self.refresh().await;
    }
}

pub async fn run_tui(mut app: App) -> Result<()> {
    // Set up terminal
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.initialize();

    let mut event_handler = EventHandler::new();
    let result = async {
        loop {
            app.refresh().await;
            terminal.draw(|frame| app.render(frame))?;

            let event = event_handler.next_event().await?;
            if app.handle_event(event) || event_handler.should_quit() {
                break;
            }
        }
        Ok::<(), color_eyre::Report>(())
    }
    .await;

    // Cleanup
    let restored = crossterm::terminal::disable_raw_mode().and_then(|_| {
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )
    });
    app.shutdown().await;

    restored?;
    result
}
