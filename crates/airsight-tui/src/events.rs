use crate::fetch::PanelKind;
use crate::geo::WorldGeometry;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

/// Custom application events
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Terminal input event
    Input(Event),
    /// Tick event for periodic updates
    Tick,
    /// Resize event
    Resize(u16, u16),
    /// Request to quit the application
    Quit,
    /// Error event
    Error(String),
    /// The shared selection changed
    SelectionChanged,
    /// A panel request finished
    Fetched {
        panel: PanelKind,
        generation: u64,
        result: Result<Value, String>,
    },
    /// A sentiment submission finished
    Submitted {
        revision: u64,
        result: Result<Value, String>,
    },
    /// The world outline finished loading
    GeometryLoaded(Result<Arc<WorldGeometry>, String>),
}

/// Represents different input modes for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigation and shortcuts
    Normal,
    /// Typing an airline name in the top bar
    Search,
    /// Typing text for the sentiment tool
    Compose,
    /// Typing the review table's global filter
    Filter,
}

/// Key binding actions
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    /// No action
    None,
    /// Quit the application
    Quit,
    /// Leave the current text mode
    EnterNormal,
    /// Focus the airline search box
    EnterSearch,
    /// Focus the sentiment input
    EnterCompose,
    /// Focus the review filter
    EnterFilter,
    /// Jump to page by index
    GoToPage(usize),
    NextPage,
    PreviousPage,
    /// Submit the focused input
    Submit,
    /// Insert a line break in the focused input
    NewLine,
    /// Clear input
    Clear,
    /// Delete character
    Delete,
    /// Backspace
    Backspace,
    /// Insert character
    InsertChar(char),
    MoveLeft,
    MoveRight,
    MoveHome,
    MoveEnd,
    /// Toggle theme
    ToggleTheme,
    /// Show help
    ShowHelp,
    /// Clear the selected airline
    ResetAirline,
    /// Clear the sentiment input and result
    ResetSentiment,
    NextTablePage,
    PreviousTablePage,
    /// Move the column or view cursor forward
    FocusNext,
    /// Move the column or view cursor backward
    FocusPrevious,
    CycleFilterValue,
    ToggleColumn,
    ToggleSort,
}

/// Event handler for managing input and application events
#[derive(Debug)]
pub struct EventHandler {
    /// Event receiver
    receiver: mpsc::UnboundedReceiver<AppEvent>,
    /// Event sender
    sender: mpsc::UnboundedSender<AppEvent>,
    /// Current input mode
    input_mode: InputMode,
    /// Last tick time
    last_tick: Instant,
    /// Tick rate for periodic updates
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            receiver,
            sender,
            input_mode: InputMode::Normal,
            last_tick: Instant::now(),
            tick_rate,
        }
    }

    /// Get the event sender for external use
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.sender.clone()
    }

    /// Get the current input mode
    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Set the input mode
    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
    }

    /// Wait for the next event with timeout
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        let timeout_duration = self
            .tick_rate
            .checked_sub(self.last_tick.elapsed())
            .unwrap_or(Duration::from_millis(0));

        if let Ok(event) = timeout(timeout_duration, self.receiver.recv()).await {
            event
        } else {
            self.last_tick = Instant::now();
            Some(AppEvent::Tick)
        }
    }

    /// Take an already queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<AppEvent> {
        self.receiver.try_recv().ok()
    }

    /// Handle keyboard input and return the corresponding action
    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Only presses; releases arrive on some platforms
        if key.kind == KeyEventKind::Release {
            return KeyAction::None;
        }

        if let Some(global_action) = self.handle_global_key(key) {
            return global_action;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode_key(key),
            InputMode::Search | InputMode::Filter => self.handle_line_mode_key(key),
            InputMode::Compose => self.handle_compose_mode_key(key),
        }
    }

    /// Handle global keys that work in any mode
    fn handle_global_key(&self, key: KeyEvent) -> Option<KeyAction> {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(KeyAction::Quit),
            (KeyModifiers::NONE, KeyCode::F(1)) => Some(KeyAction::ShowHelp),
            (KeyModifiers::CONTROL, KeyCode::Right) => Some(KeyAction::NextPage),
            (KeyModifiers::CONTROL, KeyCode::Left) => Some(KeyAction::PreviousPage),
            _ => None,
        }
    }

    /// Handle key events in normal mode
    fn handle_normal_mode_key(&self, key: KeyEvent) -> KeyAction {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => KeyAction::Quit,
            (KeyModifiers::NONE, KeyCode::Esc) => KeyAction::EnterNormal,

            // Mode switches
            (KeyModifiers::NONE, KeyCode::Char('/')) => KeyAction::EnterSearch,
            (KeyModifiers::NONE, KeyCode::Char('i')) => KeyAction::EnterCompose,
            (KeyModifiers::NONE, KeyCode::Char('f')) => KeyAction::EnterFilter,

            // Pages
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='3')) => {
                KeyAction::GoToPage(c as usize - '1' as usize)
            }

            // Table paging
            (KeyModifiers::NONE, KeyCode::Char('n'))
            | (KeyModifiers::NONE, KeyCode::Right)
            | (KeyModifiers::NONE, KeyCode::PageDown) => KeyAction::NextTablePage,
            (KeyModifiers::NONE, KeyCode::Char('p'))
            | (KeyModifiers::NONE, KeyCode::Left)
            | (KeyModifiers::NONE, KeyCode::PageUp) => KeyAction::PreviousTablePage,

            // Column and view focus
            (KeyModifiers::NONE, KeyCode::Tab) => KeyAction::FocusNext,
            (KeyModifiers::SHIFT, KeyCode::BackTab) | (KeyModifiers::NONE, KeyCode::BackTab) => {
                KeyAction::FocusPrevious
            }
            (KeyModifiers::NONE, KeyCode::Char('v')) => KeyAction::CycleFilterValue,
            (KeyModifiers::NONE, KeyCode::Char('x')) => KeyAction::ToggleColumn,
            (KeyModifiers::NONE, KeyCode::Char('o')) => KeyAction::ToggleSort,

            // Resets
            (KeyModifiers::NONE, KeyCode::Char('r')) => KeyAction::ResetAirline,
            (KeyModifiers::NONE, KeyCode::Char('c')) => KeyAction::ResetSentiment,

            // UI toggles
            (KeyModifiers::NONE, KeyCode::Char('t')) => KeyAction::ToggleTheme,
            (KeyModifiers::NONE, KeyCode::Char('?')) => KeyAction::ShowHelp,
            (KeyModifiers::SHIFT, KeyCode::Char('?')) => KeyAction::ShowHelp,

            _ => KeyAction::None,
        }
    }

    /// Shared editing keys of the single and multi line inputs
    fn handle_editing_key(&self, key: KeyEvent) -> KeyAction {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Esc) => KeyAction::EnterNormal,
            (KeyModifiers::NONE, KeyCode::Backspace) => KeyAction::Backspace,
            (KeyModifiers::NONE, KeyCode::Delete) => KeyAction::Delete,
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => KeyAction::Clear,
            (KeyModifiers::NONE, KeyCode::Left) => KeyAction::MoveLeft,
            (KeyModifiers::NONE, KeyCode::Right) => KeyAction::MoveRight,
            (KeyModifiers::NONE, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                KeyAction::MoveHome
            }
            (KeyModifiers::NONE, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                KeyAction::MoveEnd
            }
            (KeyModifiers::NONE, KeyCode::Char(c)) => KeyAction::InsertChar(c),
            (KeyModifiers::SHIFT, KeyCode::Char(c)) => KeyAction::InsertChar(c),
            _ => KeyAction::None,
        }
    }

    /// Search box and review filter: one line, Enter submits
    fn handle_line_mode_key(&self, key: KeyEvent) -> KeyAction {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Enter) => KeyAction::Submit,
            _ => self.handle_editing_key(key),
        }
    }

    /// Sentiment input: Enter submits, Alt+Enter breaks the line
    fn handle_compose_mode_key(&self, key: KeyEvent) -> KeyAction {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Enter) => KeyAction::Submit,
            (KeyModifiers::ALT, KeyCode::Enter) | (KeyModifiers::SHIFT, KeyCode::Enter) => {
                KeyAction::NewLine
            }
            _ => self.handle_editing_key(key),
        }
    }
}

/// Set while a terminal listener is running
static EVENT_LISTENER_SPAWNED: AtomicBool = AtomicBool::new(false);

/// How long the listener waits for input before checking for shutdown
const LISTENER_POLL: Duration = Duration::from_millis(100);

/// Blocking source of terminal events.
pub trait InputSource: Send + 'static {
    /// Wait up to `timeout` for an event to become readable.
    fn poll(&mut self, timeout: Duration) -> std::io::Result<bool>;
    fn read(&mut self) -> std::io::Result<Event>;
}

/// The process terminal through crossterm.
pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn poll(&mut self, timeout: Duration) -> std::io::Result<bool> {
        crossterm::event::poll(timeout)
    }

    fn read(&mut self) -> std::io::Result<Event> {
        crossterm::event::read()
    }
}

/// Forward events from `source` until the receiving side is dropped or the
/// source fails. Never blocks longer than one poll interval.
pub fn listen<S: InputSource>(mut source: S, sender: mpsc::UnboundedSender<AppEvent>) {
    while !sender.is_closed() {
        let ready = match source.poll(LISTENER_POLL) {
            Ok(ready) => ready,
            Err(err) => {
                let _ = sender.send(AppEvent::Error(format!("Input error: {}", err)));
                break;
            }
        };
        if !ready {
            continue;
        }
        let forwarded = match source.read() {
            Ok(Event::Resize(w, h)) => sender.send(AppEvent::Resize(w, h)),
            Ok(other) => sender.send(AppEvent::Input(other)),
            Err(err) => {
                let _ = sender.send(AppEvent::Error(format!("Input error: {}", err)));
                break;
            }
        };
        if forwarded.is_err() {
            break;
        }
    }
}

/// Spawns a background task to capture terminal events.
/// Only one listener runs at a time. The task ends shortly after the event
/// receiver is dropped.
pub fn spawn_event_listener(
    sender: mpsc::UnboundedSender<AppEvent>,
) -> Option<tokio::task::JoinHandle<()>> {
    if EVENT_LISTENER_SPAWNED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        tracing::warn!("Event listener already spawned, skipping duplicate spawn");
        return None;
    }

    Some(tokio::task::spawn_blocking(move || {
        tracing::debug!("Starting terminal event listener");
        listen(CrosstermInput, sender);
        EVENT_LISTENER_SPAWNED.store(false, Ordering::SeqCst);
        tracing::debug!("Terminal event listener stopped");
    }))
}

/// Forward every selection change into the event loop.
pub fn spawn_selection_watcher<T>(
    mut receiver: watch::Receiver<T>,
    sender: mpsc::UnboundedSender<AppEvent>,
) -> tokio::task::JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    tokio::spawn(async move {
        while receiver.changed().await.is_ok() {
            if sender.send(AppEvent::SelectionChanged).is_err() {
                break;
            }
        }
        tracing::debug!("Selection watcher stopped");
    })
}
