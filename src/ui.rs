use crate::clock::Clock;
use crate::drag::{DragLocation, DropEvent, MoveOutcome};
use crate::i18n::{Localizer, TranslationKey};
use crate::kanban_board::KanbanBoard;
use crate::storage::Storage;
use crate::task::{Task, TaskDraft, TaskId, TaskStatus, FALLBACK_LABEL_COLOR};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use log::{debug, error};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Labels,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Labels,
            FormField::Labels => FormField::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Labels,
            FormField::Description => FormField::Title,
            FormField::Labels => FormField::Description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub draft: TaskDraft,
    pub field: FormField,
    pub label_cursor: usize,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            draft: TaskDraft::default(),
            field: FormField::Title,
            label_cursor: 0,
        }
    }
}

/// A card picked up with `Space`, hovering over a column until dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grab {
    pub task_id: TaskId,
    pub source: DragLocation,
    pub hover: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Dragging(Grab),
    Adding(TaskForm),
}

pub struct App<S, C> {
    pub board: KanbanBoard<S, C>,
    pub l10n: Localizer,
    pub mode: Mode,
    pub selected_status: usize,
    pub selected_task: usize,
    pub dark_mode: bool,
    pub should_quit: bool,
}

impl<S: Storage, C: Clock> App<S, C> {
    pub fn new(board: KanbanBoard<S, C>, l10n: Localizer, dark_mode: bool) -> Self {
        Self {
            board,
            l10n,
            mode: Mode::Browse,
            selected_status: 0,
            selected_task: 0,
            dark_mode,
            should_quit: false,
        }
    }

    fn column_status(&self) -> TaskStatus {
        TaskStatus::ALL[self.selected_status]
    }

    fn selected_task_id(&self) -> Option<TaskId> {
        self.board
            .tasks_by_status(self.column_status())
            .get(self.selected_task)
            .map(|t| t.id)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::Browse => self.browse_key(key.code),
            Mode::Dragging(grab) => self.drag_key(grab, key.code),
            Mode::Adding(form) => self.form_key(form, key.code),
        }
    }

    fn browse_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('a') => self.mode = Mode::Adding(TaskForm::default()),
            KeyCode::Char('l') => {
                let language = self.l10n.cycle();
                debug!("language switched to {language}");
            }
            KeyCode::Char('t') => self.dark_mode = !self.dark_mode,
            KeyCode::Left => {
                if self.selected_status > 0 {
                    self.selected_status -= 1;
                    self.selected_task = 0;
                }
            }
            KeyCode::Right => {
                if self.selected_status < TaskStatus::ALL.len() - 1 {
                    self.selected_status += 1;
                    self.selected_task = 0;
                }
            }
            KeyCode::Up => {
                self.selected_task = self.selected_task.saturating_sub(1);
            }
            KeyCode::Down => {
                let max_tasks = self.board.count_by_status(self.column_status());
                if self.selected_task + 1 < max_tasks {
                    self.selected_task += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(task_id) = self.selected_task_id() {
                    self.mode = Mode::Dragging(Grab {
                        task_id,
                        source: DragLocation::column(self.column_status(), self.selected_task),
                        hover: self.selected_status,
                    });
                }
            }
            _ => {}
        }
    }

    fn drag_key(&mut self, mut grab: Grab, code: KeyCode) {
        match code {
            KeyCode::Left => {
                grab.hover = grab.hover.saturating_sub(1);
                self.mode = Mode::Dragging(grab);
            }
            KeyCode::Right => {
                grab.hover = (grab.hover + 1).min(TaskStatus::ALL.len() - 1);
                self.mode = Mode::Dragging(grab);
            }
            KeyCode::Enter => {
                let status = TaskStatus::ALL[grab.hover];
                let index = self.board.count_by_status(status);
                self.release(grab, Some(DragLocation::column(status, index)));
            }
            KeyCode::Esc => self.release(grab, None),
            _ => self.mode = Mode::Dragging(grab),
        }
    }

    fn release(&mut self, grab: Grab, destination: Option<DragLocation>) {
        let event = DropEvent {
            source: grab.source,
            destination,
            draggable_id: grab.task_id.to_string(),
        };
        if let MoveOutcome::Moved { task, .. } = self.board.handle_drop(&event) {
            self.selected_status = task.status.column();
            self.selected_task = self
                .board
                .tasks_by_status(task.status)
                .iter()
                .position(|t| t.id == task.id)
                .unwrap_or(0);
        }
    }

    fn form_key(&mut self, mut form: TaskForm, code: KeyCode) {
        match code {
            KeyCode::Esc => return,
            KeyCode::Tab => form.field = form.field.next(),
            KeyCode::BackTab => form.field = form.field.prev(),
            KeyCode::Enter => match self.board.add_task(form.draft.clone()) {
                Ok(Some(id)) => {
                    let status = form.draft.status.unwrap_or_default();
                    self.selected_status = status.column();
                    self.selected_task = self
                        .board
                        .tasks_by_status(status)
                        .iter()
                        .position(|t| t.id == id)
                        .unwrap_or(0);
                    return;
                }
                Ok(None) => {}
                Err(err) => error!("failed to add task: {err}"),
            },
            KeyCode::Left if form.field == FormField::Labels => {
                form.label_cursor = form.label_cursor.saturating_sub(1);
            }
            KeyCode::Right if form.field == FormField::Labels => {
                if form.label_cursor + 1 < self.board.labels().len() {
                    form.label_cursor += 1;
                }
            }
            KeyCode::Char(' ') if form.field == FormField::Labels => {
                if let Some(label) = self.board.labels().get(form.label_cursor) {
                    form.draft.toggle_label(&label.name);
                }
            }
            KeyCode::Char(c) => match form.field {
                FormField::Title => form.draft.title.push(c),
                FormField::Description => form.draft.description.push(c),
                FormField::Labels => {}
            },
            KeyCode::Backspace => match form.field {
                FormField::Title => {
                    form.draft.title.pop();
                }
                FormField::Description => {
                    form.draft.description.pop();
                }
                FormField::Labels => {}
            },
            _ => {}
        }
        self.mode = Mode::Adding(form);
    }

    fn base_style(&self) -> Style {
        if self.dark_mode {
            Style::default().fg(Color::White).bg(Color::Black)
        } else {
            Style::default().fg(Color::Black).bg(Color::White)
        }
    }

    pub fn draw(&self, f: &mut Frame) {
        f.render_widget(Block::default().style(self.base_style()), f.area());

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(1), Constraint::Min(3)])
            .split(f.area());

        let help = format!(
            "[a] {}  [space] drag  [←/→] column  [l] {}  [t] theme  [q] quit",
            self.l10n.t(TranslationKey::AddTask),
            self.l10n.language(),
        );
        f.render_widget(
            Paragraph::new(help).style(self.base_style().add_modifier(Modifier::DIM)),
            rows[0],
        );

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![
                Constraint::Percentage(33),
                Constraint::Percentage(33),
                Constraint::Percentage(34),
            ])
            .split(rows[1]);

        for (i, status) in TaskStatus::ALL.iter().enumerate() {
            self.draw_column(f, chunks[i], i, *status);
        }

        if let Mode::Adding(form) = &self.mode {
            self.draw_form(f, form);
        }

        if self.board.celebrating() {
            self.draw_celebration(f);
        }
    }

    fn draw_column(&self, f: &mut Frame, area: Rect, i: usize, status: TaskStatus) {
        let dragged = match &self.mode {
            Mode::Dragging(grab) => Some(grab),
            _ => None,
        };

        let items: Vec<ListItem> = self
            .board
            .tasks_by_status(status)
            .iter()
            .map(|t| self.task_card(t, dragged.is_some_and(|g| g.task_id == t.id)))
            .collect();

        let border_style = if dragged.is_some_and(|g| g.hover == i) {
            Style::default().fg(Color::Yellow)
        } else if self.selected_status == i {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!(
                        "{} ({})",
                        self.l10n.t(status),
                        self.board.count_by_status(status)
                    ))
                    .borders(Borders::ALL)
                    .border_style(border_style),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default();
        if self.selected_status == i {
            state.select(Some(self.selected_task));
        }
        f.render_stateful_widget(list, area, &mut state);
    }

    fn task_card(&self, task: &Task, dragging: bool) -> ListItem<'static> {
        let marker = if dragging { "⠿ " } else { "" };
        let mut lines = vec![Line::from(vec![
            Span::raw(format!("{marker}[#{}] ", task.id)),
            Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ])];
        if !task.description.is_empty() {
            lines.push(Line::from(Span::styled(
                task.description.clone(),
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
        if !task.labels.is_empty() {
            let spans: Vec<Span> = task
                .labels
                .iter()
                .flat_map(|name| {
                    [
                        Span::styled(
                            format!(" {name} "),
                            Style::default()
                                .fg(Color::White)
                                .bg(label_color(self.board.label_color(name))),
                        ),
                        Span::raw(" "),
                    ]
                })
                .collect();
            lines.push(Line::from(spans));
        }
        let style = if dragging {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
        ListItem::new(lines).style(style)
    }

    fn draw_form(&self, f: &mut Frame, form: &TaskForm) {
        let area = centered(f.area(), 60, 9);
        let focus = |field: FormField| {
            if form.field == field {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            }
        };

        let mut label_spans = vec![Span::styled(
            format!("{}: ", self.l10n.t(TranslationKey::Labels)),
            focus(FormField::Labels),
        )];
        for (i, label) in self.board.labels().iter().enumerate() {
            let checked = if form.draft.labels.contains(&label.name) { "x" } else { " " };
            let mut style = Style::default().fg(label_color(&label.color));
            if form.field == FormField::Labels && form.label_cursor == i {
                style = style.add_modifier(Modifier::REVERSED);
            }
            label_spans.push(Span::styled(format!("[{checked}] {}", label.name), style));
            label_spans.push(Span::raw(" "));
        }

        let lines = vec![
            Line::from(vec![
                Span::styled(format!("{}: ", self.l10n.t(TranslationKey::Title)), focus(FormField::Title)),
                Span::raw(form.draft.title.clone()),
            ]),
            Line::from(vec![
                Span::styled(
                    format!("{}: ", self.l10n.t(TranslationKey::Description)),
                    focus(FormField::Description),
                ),
                Span::raw(form.draft.description.clone()),
            ]),
            Line::from(label_spans),
            Line::from(""),
            Line::from(format!(
                "[Enter] {}  [Esc] {}  [Tab] ↹",
                self.l10n.t(TranslationKey::Add),
                self.l10n.t(TranslationKey::Cancel)
            )),
        ];

        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(lines).style(self.base_style()).block(
                Block::default()
                    .title(self.l10n.t(TranslationKey::NewTask))
                    .borders(Borders::ALL),
            ),
            area,
        );
    }

    fn draw_celebration(&self, f: &mut Frame) {
        let text = self.l10n.t(TranslationKey::Congratulations);
        let full = f.area();
        let width = (text.chars().count() as u16 * 2 + 4).min(full.width);
        let height = 3.min(full.height);
        let area = Rect {
            x: full.x + full.width - width,
            y: full.y + full.height - height,
            width,
            height,
        };
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::White).bg(Color::Green))
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
    }
}

fn label_color(hex: &str) -> Color {
    hex.parse::<Color>()
        .or_else(|_| FALLBACK_LABEL_COLOR.parse::<Color>())
        .unwrap_or(Color::Gray)
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

pub fn run_app<B: Backend, S: Storage, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, C>,
) -> io::Result<()> {
    while !app.should_quit {
        app.board.tick();
        terminal.draw(|f| app.draw(f))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::celebration::Celebration;
    use crate::clock::ManualClock;
    use crate::i18n::Language;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use rstest::{fixture, rstest};

    type TestApp = App<MemoryStore, ManualClock>;

    fn press(app: &mut TestApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut TestApp, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[fixture]
    fn app() -> TestApp {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
        let mut board = KanbanBoard::load(MemoryStore::new(), clock, Celebration::default()).unwrap();
        board.add_task(TaskDraft::new("Write report")).unwrap();
        board.add_task(TaskDraft::new("Call bank")).unwrap();
        App::new(board, Localizer::new(Language::En), false)
    }

    #[rstest]
    fn grab_and_drop_moves_selected_task(mut app: TestApp) {
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Browse);
        let moved = app.board.task(TaskId(2)).unwrap();
        assert_eq!(moved.status, TaskStatus::Completed);
        assert_eq!(app.selected_status, 2);
        assert_eq!(app.selected_task, 0);
    }

    #[rstest]
    fn escape_drops_outside_and_changes_nothing(mut app: TestApp) {
        let before = app.board.tasks().to_vec();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.board.tasks(), before.as_slice());
    }

    #[rstest]
    fn grabbing_an_empty_column_does_nothing(mut app: TestApp) {
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.mode, Mode::Browse);
    }

    #[rstest]
    fn form_adds_task_with_labels(mut app: TestApp) {
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Buy milk");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2 litres");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Browse);
        let task = app.board.tasks().last().unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2 litres");
        assert_eq!(task.labels.iter().collect::<Vec<_>>(), ["緊急"]);
        assert_eq!(app.selected_task, 2);
    }

    #[rstest]
    fn empty_title_keeps_form_open(mut app: TestApp) {
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Adding(_)));
        assert_eq!(app.board.tasks().len(), 2);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Browse);
    }

    #[rstest]
    fn language_switch_leaves_data_alone(mut app: TestApp) {
        let tasks = app.board.tasks().to_vec();
        let labels = app.board.labels().to_vec();
        let stored = app.board.storage().database().clone();

        press(&mut app, KeyCode::Char('l'));

        assert_eq!(app.l10n.language(), Language::Zh);
        assert_eq!(app.board.tasks(), tasks.as_slice());
        assert_eq!(app.board.labels(), labels.as_slice());
        assert_eq!(app.board.storage().database(), &stored);
    }

    #[rstest]
    fn renders_columns_and_cards(app: TestApp) {
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Not Started (2)"));
        assert!(screen.contains("In Progress (0)"));
        assert!(screen.contains("Write report"));
    }

    #[test]
    fn unknown_label_colors_fall_back() {
        assert_eq!(label_color("#EF4444"), Color::Rgb(0xEF, 0x44, 0x44));
        assert_eq!(label_color("not a color"), Color::Rgb(0xE5, 0xE7, 0xEB));
    }
}
