//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! One thread owns `App`. Each pass:
//!
//! 1. sync component props from `App`
//! 2. draw if anything changed
//! 3. handle every pending terminal event
//! 4. drain the `Action` channel fed by background tasks
//!
//! Network calls and the reveal timer run as tokio tasks (see [`tasks`]) and
//! only ever talk back through the channel.
//!
//! ## Redraw Strategy
//!
//! - **Revealing**: polls every ~16ms so ticks land on screen promptly.
//! - **Waiting** (analyze or answer in flight): ~80ms for the spinners.
//! - **Idle**: sleeps up to 500ms, redraws only on events or resize.

pub mod clipboard;
mod component;
pub mod components;
pub mod event;
pub mod markdown;
pub mod tasks;
mod ui;

use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};
use tokio::task::AbortHandle;

use crate::backend::{HttpBackend, TutorBackend};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::source::SourceTab;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{ChatEvent, ChatInput, MessageListState, SourceEvent, SourcePanel};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const REVEAL_POLL: Duration = Duration::from_millis(16);
const ANIMATION_POLL: Duration = Duration::from_millis(80);
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Which pane receives typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Source,
    Chat,
}

/// Values supplied on the command line before the UI starts.
#[derive(Debug, Clone, Default)]
pub struct Prefill {
    pub video_url: Option<String>,
    pub pdf_path: Option<String>,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub focus: Focus,
    pub source_panel: SourcePanel,
    pub chat_input: ChatInput,
    pub message_list: MessageListState,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            focus: Focus::Source,
            source_panel: SourcePanel::new(),
            chat_input: ChatInput::new(),
            message_list: MessageListState::new(),
        }
    }

    pub fn apply_prefill(&mut self, prefill: &Prefill) {
        if let Some(url) = &prefill.video_url {
            self.source_panel.set_url(url);
        }
        if let Some(path) = &prefill.pdf_path {
            self.source_panel.set_pdf_path(path);
            self.source_panel.set_tab(SourceTab::Pdf);
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Source => Focus::Chat,
            Focus::Chat => Focus::Source,
        };
    }

    /// Copy the `App` flags components need into their props.
    pub fn sync_props(&mut self, app: &App) {
        self.source_panel.is_analyzing = app.is_analyzing;
        self.source_panel.focused = self.focus == Focus::Source;
        self.chat_input.is_loading = app.is_chat_loading;
        self.chat_input.focused = self.focus == Focus::Chat;
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol is ignored by terminals that lack it.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape
        );
    }
}

/// Handles kept for tasks the loop may need to cancel.
#[derive(Default)]
struct RunningTasks {
    analyze: Option<AbortHandle>,
    answer: Option<AbortHandle>,
    reveal_timer: Option<AbortHandle>,
}

impl RunningTasks {
    fn abort_reveal_timer(&mut self) {
        if let Some(handle) = self.reveal_timer.take() {
            debug!("Aborting reveal timer");
            handle.abort();
        }
    }

    fn abort_all(&mut self) {
        for handle in [self.analyze.take(), self.answer.take(), self.reveal_timer.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
    }
}

/// Start whatever I/O an effect asks for. Returns true on `Effect::Quit`.
fn apply_effect(
    effect: Effect,
    app: &App,
    tasks: &mut RunningTasks,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match effect {
        Effect::None => {}
        Effect::Quit => return true,
        Effect::SpawnAnalyze(request) => {
            tasks.analyze = Some(tasks::spawn_analyze(app.backend.clone(), request, tx.clone()));
        }
        Effect::SpawnAnswer { query, attachment } => {
            tasks.answer = Some(tasks::spawn_answer(
                app.backend.clone(),
                query,
                attachment,
                tx.clone(),
            ));
        }
        Effect::StartReveal { id, ticks } => {
            tasks.abort_reveal_timer();
            tasks.reveal_timer = Some(tasks::spawn_reveal_timer(
                id,
                ticks,
                app.reveal_interval,
                tx.clone(),
            ));
        }
    }
    false
}

/// Route one terminal event. Returns true when the app should quit.
///
/// Props are re-synced afterwards so the next event in the same batch sees
/// the loading flags this one may have set.
fn handle_tui_event(
    event: TuiEvent,
    app: &mut App,
    tui: &mut TuiState,
    tasks: &mut RunningTasks,
    tx: &mpsc::Sender<Action>,
) -> bool {
    let quit = route_tui_event(event, app, tui, tasks, tx);
    tui.sync_props(app);
    quit
}

fn route_tui_event(
    event: TuiEvent,
    app: &mut App,
    tui: &mut TuiState,
    tasks: &mut RunningTasks,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match event {
        TuiEvent::Resize => false,
        TuiEvent::ForceQuit => {
            let effect = update(app, Action::Quit);
            apply_effect(effect, app, tasks, tx)
        }
        TuiEvent::FocusNext => {
            tui.toggle_focus();
            false
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(&event);
            false
        }
        // Tab switching works from either pane.
        TuiEvent::SwitchSourceTab => {
            tui.source_panel.handle_event(&event);
            false
        }
        TuiEvent::PasteImage => {
            match clipboard::paste_image() {
                Ok(file) => {
                    app.status_message = format!("Attached {}", file.name);
                    tui.chat_input.attach(file);
                    tui.focus = Focus::Chat;
                }
                Err(e) => {
                    warn!("Clipboard paste failed: {}", e);
                    app.status_message = e.to_string();
                }
            }
            false
        }
        _ => match tui.focus {
            Focus::Source => match tui.source_panel.handle_event(&event) {
                Some(SourceEvent::Analyze(request)) => {
                    let effect = update(app, Action::Analyze(request));
                    apply_effect(effect, app, tasks, tx)
                }
                _ => false,
            },
            Focus::Chat => match tui.chat_input.handle_event(&event) {
                Some(ChatEvent::Submit { text, attachment }) => {
                    tui.message_list.pin_to_bottom();
                    let effect = update(app, Action::Send { text, attachment });
                    apply_effect(effect, app, tasks, tx)
                }
                Some(ChatEvent::Attached(name)) => {
                    app.status_message = format!("Attached {name}");
                    false
                }
                Some(ChatEvent::AttachmentRemoved) => {
                    app.status_message = String::from("Attachment removed");
                    false
                }
                Some(ChatEvent::AttachFailed(message)) => {
                    app.status_message = message;
                    false
                }
                Some(ChatEvent::Edited) | None => false,
            },
        },
    }
}

/// Apply one background action. Returns true when the app should quit.
fn handle_action(
    action: Action,
    app: &mut App,
    tui: &mut TuiState,
    tasks: &mut RunningTasks,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match &action {
        Action::AnalyzeSucceeded(_) | Action::AnalyzeFailed(_) => tasks.analyze = None,
        Action::AnswerReceived(_) | Action::AnswerFailed(_) => tasks.answer = None,
        _ => {}
    }
    let analyzed = matches!(action, Action::AnalyzeSucceeded(_));
    let answered = matches!(action, Action::AnswerReceived(_));
    let effect = update(app, action);
    if analyzed {
        tui.message_list.pin_to_bottom();
        tui.focus = Focus::Chat;
    }
    // Both leave no reveal behind: a fresh conversation, or an empty answer.
    if (analyzed || answered) && app.reveal.is_none() {
        tasks.abort_reveal_timer();
    }
    let quit = apply_effect(effect, app, tasks, tx);
    tui.sync_props(app);
    quit
}

pub fn build_backend(config: &ResolvedConfig) -> Arc<dyn TutorBackend> {
    Arc::new(HttpBackend::new(config.backend_url.clone()))
}

pub fn run(config: ResolvedConfig, prefill: Prefill) -> std::io::Result<()> {
    let backend = build_backend(&config);
    info!("Using backend {} at {}", backend.name(), config.backend_url);
    let mut app = App::from_config(backend, &config);
    let mut tui = TuiState::new();
    tui.apply_prefill(&prefill);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("Could not enable terminal modes: {}", e);
            None
        }
    };

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut tasks = RunningTasks::default();

    let start_time = Instant::now();
    let mut needs_redraw = true;
    let mut should_quit = false;

    while !should_quit {
        tui.sync_props(&app);

        let waiting = app.is_analyzing || app.is_chat_loading;
        if waiting {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if app.is_revealing() {
            REVEAL_POLL
        } else if waiting {
            ANIMATION_POLL
        } else {
            IDLE_POLL
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Handle the first event and everything already queued behind it.
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_tui_event(event, &mut app, &mut tui, &mut tasks, &tx) {
                should_quit = true;
                break;
            }
        }

        while !should_quit && let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            if !matches!(action, Action::RevealTick(_)) {
                debug!("Event loop received: {:?}", action);
            }
            should_quit = handle_action(action, &mut app, &mut tui, &mut tasks, &tx);
        }
    }

    tasks.abort_all();
    info!("Shutting down");
    ratatui::restore();
    Ok(())
}
