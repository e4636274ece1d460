//! Main TUI application state and logic

use crate::timeline::{Timeline, TimelineEvent, UpdateListener};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout},
};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Rolling cap on the trace pane's event history.
const TRACE_CAP: usize = 200;

/// Shared record of what the listener observed.
#[derive(Default)]
pub struct TrackerInner {
    /// Cells written by the navigation call in progress (or just finished).
    pub changed: Vec<i32>,
    /// Rolling log of recent events for the trace pane.
    pub trace: Vec<TimelineEvent>,
}

impl TrackerInner {
    /// Forget the previous navigation's cell writes (the trace is kept).
    fn begin_navigation(&mut self) {
        self.changed.clear();
    }
}

/// Timeline listener that feeds the memory highlights and the trace pane.
pub struct ChangeTracker {
    inner: Rc<RefCell<TrackerInner>>,
}

impl UpdateListener for ChangeTracker {
    fn timeline_changed(&mut self, event: &TimelineEvent) {
        let mut inner = self.inner.borrow_mut();
        if let TimelineEvent::CellChanged { address, .. } = event {
            inner.changed.push(*address);
        }
        inner.trace.push(*event);
        if inner.trace.len() > TRACE_CAP {
            let excess = inner.trace.len() - TRACE_CAP;
            inner.trace.drain(..excess);
        }
    }
}

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Memory,
    Registers,
    Trace,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> memory -> registers -> trace)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Memory,
            FocusedPane::Memory => FocusedPane::Registers,
            FocusedPane::Registers => FocusedPane::Trace,
            FocusedPane::Trace => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Trace,
            FocusedPane::Memory => FocusedPane::Source,
            FocusedPane::Registers => FocusedPane::Memory,
            FocusedPane::Trace => FocusedPane::Registers,
        }
    }
}

/// The main application state
pub struct App {
    /// The navigable execution history
    pub timeline: Timeline,

    /// State shared with the registered [`ChangeTracker`] listener
    tracker: Rc<RefCell<TrackerInner>>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub memory_scroll: usize,
    pub trace_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,
}

impl App {
    /// Create a new app around a timeline, registering the change tracker.
    pub fn new(mut timeline: Timeline) -> Self {
        let tracker = Rc::new(RefCell::new(TrackerInner::default()));
        timeline.add_listener(Box::new(ChangeTracker {
            inner: Rc::clone(&tracker),
        }));

        App {
            timeline,
            tracker,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            memory_scroll: 0,
            trace_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: Instant::now(),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Handle auto-play mode
            if self.is_playing {
                if self.last_play_time.elapsed() >= Duration::from_millis(300) {
                    if self.timeline.position() < self.timeline.count_steps() {
                        self.navigate(1);
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.is_playing = false;
                        self.status_message = "Playback complete".to_string();
                    }
                    self.last_play_time = Instant::now();
                }
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Move the cursor by `offset` steps, tracking changed cells.
    fn navigate(&mut self, offset: i64) {
        self.tracker.borrow_mut().begin_navigation();
        self.timeline.add_to_position(offset);
        self.status_message = format!(
            "Step {}/{}",
            self.timeline.position(),
            self.timeline.count_steps()
        );
    }

    /// Jump to an absolute cursor position, tracking changed cells.
    fn jump(&mut self, target: i64) {
        self.tracker.borrow_mut().begin_navigation();
        self.timeline.set_position(target);
        self.status_message = format!(
            "Step {}/{}",
            self.timeline.position(),
            self.timeline.count_steps()
        );
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Create layout: 4 panes in 2 columns, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        // Split into 2 columns
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(pane_area);

        // Left column: Source (top) | Registers (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(columns[0]);

        // Right column: Memory (top) | Trace (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        let current_line = self.timeline.find_current_command().map(|c| c.line);

        super::panes::render_source_pane(
            frame,
            left_rows[0],
            self.timeline.source(),
            current_line,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        super::panes::render_registers_pane(
            frame,
            left_rows[1],
            &self.timeline,
            self.focused_pane == FocusedPane::Registers,
        );

        let tracker = self.tracker.borrow();

        super::panes::render_memory_pane(
            frame,
            right_rows[0],
            &self.timeline,
            &tracker.changed,
            self.focused_pane == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        super::panes::render_trace_pane(
            frame,
            right_rows[1],
            &self.timeline,
            &tracker.trace,
            self.focused_pane == FocusedPane::Trace,
            &mut self.trace_scroll,
        );

        drop(tracker);

        super::panes::render_status_bar(
            frame,
            status_area,
            &self.status_message,
            self.timeline.position(),
            self.timeline.count_steps(),
            self.is_playing,
        );
    }

    /// Handle a key press
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => {
                self.is_playing = false;
                self.navigate(1);
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => {
                self.is_playing = false;
                self.navigate(-1);
            }
            KeyCode::PageDown => {
                self.is_playing = false;
                self.navigate(10);
            }
            KeyCode::PageUp => {
                self.is_playing = false;
                self.navigate(-10);
            }
            KeyCode::Home => {
                self.is_playing = false;
                self.jump(0);
            }
            KeyCode::End => {
                self.is_playing = false;
                let end = self.timeline.count_steps() as i64;
                self.jump(end);
            }
            KeyCode::Char(' ') => {
                self.is_playing = !self.is_playing;
                self.status_message = if self.is_playing {
                    "Playing...".to_string()
                } else {
                    "Paused".to_string()
                };
                self.last_play_time = Instant::now();
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll_focused(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_focused(1),
            _ => {}
        }
    }

    /// Scroll the focused pane by `delta` rows.
    fn scroll_focused(&mut self, delta: i64) {
        let scroll = match self.focused_pane {
            FocusedPane::Source => &mut self.source_scroll,
            FocusedPane::Memory => &mut self.memory_scroll,
            FocusedPane::Trace => &mut self.trace_scroll,
            FocusedPane::Registers => return,
        };
        *scroll = scroll.saturating_add_signed(delta as isize);
    }
}
