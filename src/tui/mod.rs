//! Terminal UI for formsmith using ratatui
//!
//! Palette on the left, canvas in the middle, inspector on the right.
//! Items are dragged with the mouse or picked up with Space and moved with
//! the arrow keys.

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

use crate::builder::{BuilderMode, DropOutcome, FormBuilder};
use crate::dnd::{ContainerId, DragLocation, DragTracker};
use crate::editor::EditTarget;
use crate::models::{FieldInstance, FieldKind, FieldValue};

/// Pane holding keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Catalog,
    Canvas,
    Inspector,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Catalog => Focus::Canvas,
            Focus::Canvas => Focus::Inspector,
            Focus::Inspector => Focus::Catalog,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Catalog => Focus::Inspector,
            Focus::Canvas => Focus::Catalog,
            Focus::Inspector => Focus::Canvas,
        }
    }
}

/// Main TUI application state
pub struct TuiApp {
    builder: FormBuilder,
    focus: Focus,
    catalog_state: ListState,
    canvas_state: ListState,
    preview_state: ListState,
    inspector_index: usize,
    /// Target receiving typed characters
    typing: Option<EditTarget>,
    drag: DragTracker,
    should_quit: bool,
    status_message: Option<String>,
    // Last drawn list areas, for mouse hit-testing
    catalog_area: Rect,
    canvas_area: Rect,
}

impl TuiApp {
    /// Create a new TUI application
    pub fn new(builder: FormBuilder) -> Self {
        let mut catalog_state = ListState::default();
        if !builder.catalog().is_empty() {
            catalog_state.select(Some(0));
        }

        Self {
            builder,
            focus: Focus::Catalog,
            catalog_state,
            canvas_state: ListState::default(),
            preview_state: ListState::default(),
            inspector_index: 0,
            typing: None,
            drag: DragTracker::new(),
            should_quit: false,
            status_message: None,
            catalog_area: Rect::default(),
            canvas_area: Rect::default(),
        }
    }

    pub fn builder(&self) -> &FormBuilder {
        &self.builder
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Run event loop
        let res = self.run_app(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        res
    }

    /// Main event loop
    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.ui(f))?;

            if event::poll(std::time::Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Dispatch a key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.typing.is_some() {
            self.handle_typing_key(key);
            return;
        }

        if self.drag.is_dragging() {
            self.handle_drag_key(key);
            return;
        }

        if self.builder.mode() == BuilderMode::PreviewVisible {
            self.handle_preview_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char(' ') if self.focus != Focus::Inspector => {
                self.pick_up();
            }
            KeyCode::Enter if self.focus == Focus::Catalog => {
                // Shortcut for dragging the highlighted item onto the canvas
                if let Some(index) = self.catalog_state.selected() {
                    self.drag.begin(DragLocation::catalog(index));
                    self.drag.retarget(ContainerId::Canvas, self.builder.canvas().len());
                    self.finish_drag();
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') if self.focus == Focus::Inspector => {
                self.activate_inspector_target(1);
            }
            KeyCode::Left if self.focus == Focus::Inspector => {
                self.activate_inspector_target(-1);
            }
            KeyCode::Right if self.focus == Focus::Inspector => {
                self.activate_inspector_target(1);
            }
            KeyCode::Char('s') => {
                self.submit();
            }
            _ => {}
        }
    }

    fn handle_typing_key(&mut self, key: KeyEvent) {
        let (Some(target), Some(id)) = (self.typing, self.selected_field_id()) else {
            self.typing = None;
            return;
        };
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.typing = None;
            }
            KeyCode::Backspace => {
                self.builder.pop_char(&id, target);
            }
            KeyCode::Char(c) => {
                self.builder.push_char(&id, target, c);
            }
            _ => {}
        }
    }

    fn handle_drag_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.drag.cancel();
                self.status_message = Some("Drag cancelled".to_string());
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.finish_drag(),
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.target_len();
                self.drag.nudge(1, len);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let len = self.target_len();
                self.drag.nudge(-1, len);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                let len = self.builder.catalog().len();
                self.drag.retarget(ContainerId::Catalog, len);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let len = self.builder.canvas().len();
                self.drag.retarget(ContainerId::Canvas, len);
            }
            _ => {}
        }
    }

    fn handle_preview_key(&mut self, key: KeyEvent) {
        let len = self.builder.canvas().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('q') => {
                self.builder.close();
            }
            KeyCode::Down | KeyCode::Char('j') => step_list(&mut self.preview_state, len, 1),
            KeyCode::Up | KeyCode::Char('k') => step_list(&mut self.preview_state, len, -1),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right => {
                if let Some(index) = self.preview_state.selected() {
                    self.canvas_state.select(Some(index));
                    self.edit_value(1);
                }
            }
            KeyCode::Left => {
                if let Some(index) = self.preview_state.selected() {
                    self.canvas_state.select(Some(index));
                    self.edit_value(-1);
                }
            }
            _ => {}
        }
    }

    /// Dispatch a mouse event; left button drags between lists
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.builder.mode() != BuilderMode::Editing || self.typing.is_some() {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(location) = self.hit_test(mouse.column, mouse.row) {
                    let valid = match location.container {
                        ContainerId::Catalog => location.index < self.builder.catalog().len(),
                        ContainerId::Canvas => location.index < self.builder.canvas().len(),
                        ContainerId::Other(_) => false,
                    };
                    if valid {
                        self.select_location(&location);
                        self.drag.begin(location);
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let target = self.hit_test(mouse.column, mouse.row);
                self.drag.hover(target);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag.is_dragging() {
                    let target = self.hit_test(mouse.column, mouse.row);
                    self.drag.hover(target);
                    self.finish_drag();
                }
            }
            _ => {}
        }
    }

    /// Map a screen cell to a list slot
    fn hit_test(&self, column: u16, row: u16) -> Option<DragLocation> {
        let slot = |area: Rect, offset: usize| -> Option<usize> {
            let inside = column >= area.x
                && column < area.x + area.width
                && row > area.y
                && row + 1 < area.y + area.height;
            inside.then(|| (row - area.y - 1) as usize + offset)
        };

        if let Some(index) = slot(self.catalog_area, self.catalog_state.offset()) {
            return Some(DragLocation::catalog(index));
        }
        if let Some(index) = slot(self.canvas_area, self.canvas_state.offset()) {
            let index = index.min(self.builder.canvas().len());
            return Some(DragLocation::canvas(index));
        }
        None
    }

    fn select_location(&mut self, location: &DragLocation) {
        match location.container {
            ContainerId::Catalog => {
                self.focus = Focus::Catalog;
                self.catalog_state.select(Some(location.index));
            }
            ContainerId::Canvas => {
                self.focus = Focus::Canvas;
                self.canvas_state.select(Some(location.index));
                self.inspector_index = 0;
            }
            ContainerId::Other(_) => {}
        }
    }

    fn target_len(&self) -> usize {
        match self.drag.target().map(|t| &t.container) {
            Some(ContainerId::Catalog) => self.builder.catalog().len(),
            _ => self.builder.canvas().len(),
        }
    }

    /// Start a keyboard drag from the focused list
    fn pick_up(&mut self) {
        let source = match self.focus {
            Focus::Catalog => self.catalog_state.selected().map(DragLocation::catalog),
            Focus::Canvas => self.canvas_state.selected().map(DragLocation::canvas),
            Focus::Inspector => None,
        };
        if let Some(source) = source {
            let from_catalog = source.container == ContainerId::Catalog;
            self.drag.begin(source);
            if from_catalog {
                self.drag.retarget(ContainerId::Canvas, self.builder.canvas().len());
            }
            self.status_message = None;
        }
    }

    fn finish_drag(&mut self) {
        let Some(event) = self.drag.finish() else {
            return;
        };
        match self.builder.handle_drop(&event) {
            DropOutcome::Appended(id) => {
                let index = self.builder.canvas().len() - 1;
                self.canvas_state.select(Some(index));
                self.inspector_index = 0;
                self.status_message = Some(format!("Added {}", id));
            }
            DropOutcome::Moved { to, .. } => {
                self.canvas_state.select(Some(to));
                self.focus = Focus::Canvas;
                self.status_message = None;
            }
            DropOutcome::Ignored => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        match self.focus {
            Focus::Catalog => {
                let len = self.builder.catalog().len();
                step_list(&mut self.catalog_state, len, delta);
            }
            Focus::Canvas => {
                let len = self.builder.canvas().len();
                step_list(&mut self.canvas_state, len, delta);
                self.inspector_index = 0;
            }
            Focus::Inspector => {
                let len = self.inspector_targets().len();
                if len == 0 {
                    return;
                }
                let next = self.inspector_index as isize + delta;
                self.inspector_index = next.clamp(0, len as isize - 1) as usize;
            }
        }
    }

    fn selected_field(&self) -> Option<&FieldInstance> {
        self.canvas_state
            .selected()
            .and_then(|i| self.builder.canvas().fields().get(i))
    }

    fn selected_field_id(&self) -> Option<String> {
        self.selected_field().map(|f| f.id.clone())
    }

    fn inspector_targets(&self) -> Vec<EditTarget> {
        self.selected_field()
            .map(|f| EditTarget::for_kind(f.kind, f.options.len()))
            .unwrap_or_default()
    }

    /// Enter on an inspector row: type into text targets, toggle or cycle values
    fn activate_inspector_target(&mut self, step: isize) {
        let targets = self.inspector_targets();
        let Some(&target) = targets.get(self.inspector_index) else {
            return;
        };
        if target == EditTarget::Value {
            self.edit_value(step);
        } else {
            self.typing = Some(target);
        }
    }

    /// Change the bound value of the selected field in a kind-appropriate way
    fn edit_value(&mut self, step: isize) {
        let Some(field) = self.selected_field() else {
            return;
        };
        let (id, kind) = (field.id.clone(), field.kind);
        match kind {
            FieldKind::Boolean => {
                self.builder.toggle(&id);
            }
            FieldKind::SingleSelect => {
                self.builder.cycle_selection(&id, step);
            }
            FieldKind::ActionButton => {}
            _ => self.typing = Some(EditTarget::Value),
        }
    }

    fn submit(&mut self) {
        let result = self.builder.submit();
        if result.is_valid() {
            self.status_message = None;
            self.preview_state
                .select((!self.builder.canvas().is_empty()).then_some(0));
        }
    }

    /// Draw the UI
    pub fn ui(&mut self, f: &mut Frame) {
        let banner = self.builder.error_banner();
        let banner_height = if banner.is_some() { 3 } else { 0 };

        // Main layout: header, content, banner, footer
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),             // Header
                Constraint::Min(0),                // Content
                Constraint::Length(banner_height), // Error banner
                Constraint::Length(3),             // Footer
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25), // Catalog
                Constraint::Percentage(40), // Canvas
                Constraint::Percentage(35), // Inspector
            ])
            .split(chunks[1]);

        self.catalog_area = content_chunks[0];
        self.canvas_area = content_chunks[1];

        self.render_catalog(f, content_chunks[0]);
        self.render_canvas(f, content_chunks[1]);
        self.render_inspector(f, content_chunks[2]);

        if let Some(message) = banner {
            let paragraph = Paragraph::new(message)
                .block(Block::default().borders(Borders::ALL).title("Error"))
                .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
            f.render_widget(paragraph, chunks[2]);
        }

        self.render_footer(f, chunks[3]);

        if self.builder.mode() == BuilderMode::PreviewVisible {
            self.render_preview_popup(f);
        }
    }

    /// Render header
    fn render_header(&self, f: &mut Frame, area: Rect) {
        let title = Paragraph::new(format!(
            " formsmith  |  {} fields  |  {}",
            self.builder.canvas().len(),
            self.builder.mode()
        ))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        f.render_widget(title, area);
    }

    fn pane_block(&self, title: String, pane: Focus) -> Block<'static> {
        let style = if self.focus == pane {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(style)
    }

    /// Render the palette of archetypes
    fn render_catalog(&mut self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .builder
            .catalog()
            .iter()
            .map(|archetype| ListItem::new(format!("{}  ({})", archetype.label, archetype.kind)))
            .collect();

        let list = List::new(items)
            .block(self.pane_block("Components".to_string(), Focus::Catalog))
            .highlight_style(Style::default().bg(Color::Blue).add_modifier(Modifier::BOLD))
            .highlight_symbol(">> ");

        f.render_stateful_widget(list, area, &mut self.catalog_state);
    }

    /// Render the canvas, one line per placed field
    fn render_canvas(&mut self, f: &mut Frame, area: Rect) {
        // Catalog items always land at the end, whatever slot is hovered
        let drop_slot = match (self.drag.source(), self.drag.target()) {
            (Some(source), Some(target)) if target.container == ContainerId::Canvas => {
                match source.container {
                    ContainerId::Canvas => Some(target.index),
                    _ => Some(self.builder.canvas().len()),
                }
            }
            _ => None,
        };

        let preview = self.builder.preview();
        let mut items: Vec<ListItem> = preview
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let marker = if field.required { "*" } else { " " };
                let mut style = Style::default();
                if drop_slot == Some(i) {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                ListItem::new(format!(
                    "{}{}. {}: {}",
                    marker,
                    i + 1,
                    field.label,
                    field.control_text()
                ))
                .style(style)
            })
            .collect();

        if drop_slot == Some(self.builder.canvas().len()) {
            items.push(ListItem::new("   -- drop here --").style(Style::default().fg(Color::Yellow)));
        }

        let title = match self.drag.source() {
            Some(source) => format!("Form Layout [dragging from {} #{}]", source.container, source.index + 1),
            None => format!("Form Layout ({})", self.builder.canvas().len()),
        };

        if items.is_empty() {
            let empty = Paragraph::new("No components dropped yet.")
                .block(self.pane_block(title, Focus::Canvas))
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, area);
            return;
        }

        let list = List::new(items)
            .block(self.pane_block(title, Focus::Canvas))
            .highlight_style(Style::default().bg(Color::Blue).add_modifier(Modifier::BOLD))
            .highlight_symbol(">> ");

        f.render_stateful_widget(list, area, &mut self.canvas_state);
    }

    /// Render the field editor for the selected canvas field
    fn render_inspector(&self, f: &mut Frame, area: Rect) {
        let block = self.pane_block("Inspector".to_string(), Focus::Inspector);
        let Some(field) = self.selected_field() else {
            let empty = Paragraph::new("Select a field on the canvas to edit it.")
                .block(block)
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true });
            f.render_widget(empty, area);
            return;
        };

        let editor = self.builder.editor();
        let mut lines = vec![
            Line::from(Span::styled(
                format!("{} ({})", field.id, field.kind),
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
        ];

        for (i, target) in self.inspector_targets().into_iter().enumerate() {
            let text = match target {
                EditTarget::Value => match &field.value {
                    FieldValue::Text(s) => s.clone(),
                    other => other.to_string(),
                },
                _ => editor
                    .text(self.builder.canvas(), &field.id, target)
                    .unwrap_or_default(),
            };
            let cursor = if self.typing == Some(target) { "_" } else { "" };
            let style = if i == self.inspector_index && self.focus == Focus::Inspector {
                Style::default().bg(Color::Blue).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("{:<12} {}{}", format!("{}:", target), text, cursor),
                style,
            )));
        }

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    /// Render footer with keybindings
    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let footer_text = if let Some(msg) = &self.status_message {
            format!("  {}", msg)
        } else if self.typing.is_some() {
            "  Type to edit  Backspace: Delete  Enter/Esc: Done".to_string()
        } else if self.drag.is_dragging() {
            "  ↑/↓: Move  ←/→: Switch list  Space/Enter: Drop  Esc: Cancel".to_string()
        } else if self.builder.mode() == BuilderMode::PreviewVisible {
            "  ↑/↓: Navigate  Enter: Edit value  Esc: Close preview".to_string()
        } else {
            "  Tab: Pane  ↑/↓: Navigate  Space: Pick up  Enter: Add/Edit  s: Submit  q: Quit".to_string()
        };

        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(Color::White).bg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(footer, area);
    }

    /// Render the assembled form
    fn render_preview_popup(&mut self, f: &mut Frame) {
        let area = centered_rect(70, 70, f.area());
        f.render_widget(Clear, area);

        let warnings = self.builder.warnings();
        let warnings_height = if warnings.is_empty() {
            0
        } else {
            warnings.len() as u16 + 2
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(warnings_height),
                Constraint::Length(3),
            ])
            .split(area);

        let preview = self.builder.preview();
        let items: Vec<ListItem> = preview
            .fields
            .iter()
            .map(|field| {
                let marker = if field.required { " *" } else { "" };
                let control_style = if field.is_inert() {
                    Style::default().fg(Color::White).bg(Color::Blue)
                } else {
                    Style::default().fg(Color::Yellow)
                };
                let mut lines = Vec::new();
                if field.kind != FieldKind::ActionButton && field.kind != FieldKind::Boolean {
                    lines.push(Line::from(format!("{}{}", field.label, marker)));
                }
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(field.control_text(), control_style),
                    Span::styled(
                        if field.kind == FieldKind::Boolean { marker } else { "" },
                        Style::default().fg(Color::Red),
                    ),
                ]));
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Form Preview"))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
        f.render_stateful_widget(list, chunks[0], &mut self.preview_state);

        if !warnings.is_empty() {
            let lines: Vec<Line> = warnings.into_iter().map(Line::from).collect();
            let paragraph = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("Warnings"))
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(paragraph, chunks[1]);
        }

        let instructions = Paragraph::new("↑/↓: Select  Enter: Edit value  Esc: Close")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::White));
        f.render_widget(instructions, chunks[2]);
    }
}

/// Move a list selection by `delta`, wrapping at both ends
fn step_list(state: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let next = match state.selected() {
        Some(i) => (i as isize + delta).rem_euclid(len as isize) as usize,
        None => 0,
    };
    state.select(Some(next));
}

/// Helper function to create a centered rect
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
