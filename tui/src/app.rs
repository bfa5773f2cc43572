//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display surface over
//! the wall engine:
//! - Event loop (keyboard, mouse, resize)
//! - Background poll and submit tasks
//! - One compositor layer per card, plus status line and compose form
//!
//! # Event Loop
//!
//! ```text
//! ┌────────────── tokio::select! ──────────────┐
//! │ terminal event │ poll done │ submit done │ frame │
//! └───────┬────────────┬───────────┬───────────┬───┘
//!         └────────────┴─────┬─────┴───────────┘
//!                            ▼
//!                tick(): start due poll, advance motion,
//!                        sync layers  ──►  render()
//! ```
//!
//! The wall is only ever touched from this loop. Network requests run as
//! spawned tasks and their answers are applied when they come back.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    Event, EventStream, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use ratatui::Terminal;
use tokio::task::{JoinError, JoinHandle};

use driftwall_core::{
    spawn_fetch, Clock, EntryId, Extent, FetchResult, MonotonicClock, SubmitClient, SubmitError,
    SyncError, Wall, WallBackend, WallConfig,
};

use crate::compositor::{Compositor, LayerId};
use crate::input::{compose_action, wall_action, Action};
use crate::layout::{cell_motion, TerminalLayout};
use crate::widgets::{CardWidget, ComposeField, ComposeForm, ComposeView, NoticeLevel, StatusLine};

/// Rows reserved below the wall
const STATUS_HEIGHT: u16 = 1;

/// Target ~30 FPS
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// How long shutdown waits for an in-flight submission
const SUBMIT_GRACE: Duration = Duration::from_secs(2);

type SubmitResult = Result<EntryId, SubmitError>;

/// What woke the event loop
enum Step {
    Terminal(Event),
    Polled(Result<FetchResult, JoinError>),
    Submitted(Result<SubmitResult, JoinError>),
    Frame,
    InputClosed,
    InputFailed(std::io::Error),
}

/// Await a task slot, or never resolve when it is empty
async fn join_slot<T>(slot: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match slot.as_mut() {
        Some(handle) => {
            let joined = handle.await;
            *slot = None;
            joined
        }
        None => std::future::pending().await,
    }
}

/// Wall area for a terminal of `size`
fn field_extent(size: (u16, u16)) -> Extent {
    Extent::new(
        f64::from(size.0),
        f64::from(size.1.saturating_sub(STATUS_HEIGHT)),
    )
}

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// The engine
    wall: Wall,

    // === Server ===
    /// Where polls go
    backend: Arc<dyn WallBackend>,
    /// Where submissions go
    submitter: SubmitClient<dyn WallBackend>,
    /// Poll request in flight
    poll_task: Option<JoinHandle<FetchResult>>,
    /// Submission in flight
    submit_task: Option<JoinHandle<SubmitResult>>,

    // === UI Components ===
    /// The layered compositor
    compositor: Compositor,
    /// One layer per card
    card_layers: HashMap<EntryId, LayerId>,
    /// Bottom status row
    status_layer: LayerId,
    /// Compose form overlay
    compose_layer: LayerId,

    // === Input State ===
    /// Open compose form
    compose: Option<ComposeForm>,
    /// Keyboard selection
    selected: Option<EntryId>,
    /// Status line contents
    status: StatusLine,

    // === Misc State ===
    /// Terminal size
    size: (u16, u16),
}

impl App {
    /// Create an App on the real clock
    pub fn new(config: WallConfig, backend: Arc<dyn WallBackend>, size: (u16, u16)) -> Self {
        Self::with_clock(config, backend, size, Arc::new(MonotonicClock))
    }

    /// Create an App on an explicit clock
    pub fn with_clock(
        mut config: WallConfig,
        backend: Arc<dyn WallBackend>,
        size: (u16, u16),
        clock: Arc<dyn Clock>,
    ) -> Self {
        let area = Rect::new(0, 0, size.0, size.1);
        let mut compositor = Compositor::new(area);

        let status_layer = compositor.create_layer(
            Rect::new(0, size.1.saturating_sub(STATUS_HEIGHT), size.0, STATUS_HEIGHT),
            i32::MAX - 1,
        );
        compositor.set_opaque(status_layer, true);

        let compose_layer = compositor.create_layer(ComposeView::frame(area), i32::MAX);
        compositor.set_opaque(compose_layer, true);
        compositor.set_visible(compose_layer, false);

        config.motion = cell_motion(&config.motion);
        let mut wall = Wall::with_clock(config, TerminalLayout, clock);
        wall.resize(field_extent(size));

        tracing::info!(backend = backend.name(), width = size.0, height = size.1, "App created");

        Self {
            running: true,
            wall,
            submitter: SubmitClient::new(backend.clone()),
            backend,
            poll_task: None,
            submit_task: None,
            compositor,
            card_layers: HashMap::new(),
            status_layer,
            compose_layer,
            compose: None,
            selected: None,
            status: StatusLine::default(),
            size,
        }
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        self.tick();
        self.render(terminal)?;

        while self.running {
            let step = tokio::select! {
                biased;

                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => Step::Terminal(event),
                    Some(Err(err)) => Step::InputFailed(err),
                    None => Step::InputClosed,
                },
                joined = join_slot(&mut self.poll_task) => Step::Polled(joined),
                joined = join_slot(&mut self.submit_task) => Step::Submitted(joined),
                () = tokio::time::sleep(FRAME_INTERVAL) => Step::Frame,
            };

            match step {
                Step::Terminal(event) => self.handle_event(event),
                Step::Polled(joined) => self.apply_poll(joined),
                Step::Submitted(joined) => self.apply_submit(joined),
                Step::Frame => {}
                Step::InputClosed => self.running = false,
                Step::InputFailed(err) => {
                    self.shutdown().await;
                    return Err(err.into());
                }
            }

            self.tick();
            self.render(terminal)?;
        }

        self.shutdown().await;
        Ok(())
    }

    /// Route one terminal event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(w, h) => self.handle_resize(w, h),
            _ => {}
        }
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = if self.compose.is_some() {
            compose_action(key)
        } else {
            wall_action(key)
        };

        match action {
            Action::Quit => self.running = false,
            Action::SelectNext => self.cycle_selection(true),
            Action::SelectPrev => self.cycle_selection(false),
            Action::ToggleFocus => self.toggle_focus(),
            Action::Dismiss => {
                if let Some(form) = &self.compose {
                    if !form.sending {
                        self.compose = None;
                    }
                } else {
                    self.wall.unfocus();
                }
            }
            Action::Compose => self.compose = Some(ComposeForm::new()),
            Action::Type(ch) => self.with_form(|form| form.insert(ch)),
            Action::Backspace => self.with_form(ComposeForm::backspace),
            Action::NextField => self.with_form(ComposeForm::next_field),
            Action::ToggleSurprise => self.with_form(ComposeForm::toggle_surprise),
            Action::Confirm => {
                if self.compose.as_ref().is_some_and(|f| f.field == ComposeField::Name) {
                    self.with_form(ComposeForm::next_field);
                } else {
                    self.start_submit();
                }
            }
            Action::Ignore => {}
        }
    }

    /// Handle mouse input
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) || self.compose.is_some() {
            return;
        }

        let hit = self.card_at(mouse.column, mouse.row);
        match self.wall.focused() {
            Some(focused) if hit == Some(focused) => {
                if self.on_close_mark(focused, mouse.column, mouse.row) {
                    self.wall.unfocus();
                }
            }
            // Clicking anywhere off the focused card dismisses it
            Some(_) => {
                self.wall.unfocus();
            }
            None => {
                if let Some(id) = hit {
                    self.selected = Some(id);
                    self.wall.focus(id);
                }
            }
        }
    }

    /// Handle terminal resize
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        let area = Rect::new(0, 0, width, height);
        self.compositor.resize(area);

        self.compositor
            .move_layer(self.status_layer, 0, height.saturating_sub(STATUS_HEIGHT));
        self.compositor
            .resize_layer(self.status_layer, width, STATUS_HEIGHT);

        let form = ComposeView::frame(area);
        self.compositor.move_layer(self.compose_layer, form.x, form.y);
        self.compositor
            .resize_layer(self.compose_layer, form.width, form.height);

        self.wall.resize(field_extent(self.size));
    }

    /// Probe the server once, marking the wall offline if it is down
    pub async fn check_backend(&mut self) -> bool {
        let healthy = self.backend.health_check().await;
        if healthy {
            tracing::info!(backend = self.backend.name(), "Wall server reachable");
        } else {
            tracing::warn!(backend = self.backend.name(), "Wall server unreachable");
            self.status.offline = Some("server unreachable".to_string());
            let now = self.wall.now();
            self.status
                .notify("Could not reach the wall", NoticeLevel::Error, now);
        }
        healthy
    }

    /// Start a due poll, advance motion, refresh layers
    pub fn tick(&mut self) {
        self.start_poll_if_due();
        self.update();
    }

    /// Wait for background requests and apply their results
    pub async fn settle(&mut self) {
        if self.poll_task.is_some() {
            let joined = join_slot(&mut self.poll_task).await;
            self.apply_poll(joined);
        }
        if self.submit_task.is_some() {
            let joined = join_slot(&mut self.submit_task).await;
            self.apply_submit(joined);
        }
        self.update();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The engine
    #[must_use]
    pub fn wall(&self) -> &Wall {
        &self.wall
    }

    /// Is the app still running?
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Open compose form, if any
    #[must_use]
    pub fn compose(&self) -> Option<&ComposeForm> {
        self.compose.as_ref()
    }

    /// Keyboard selection
    #[must_use]
    pub fn selected(&self) -> Option<EntryId> {
        self.selected
    }

    /// Status line contents
    #[must_use]
    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Screen rectangle of a card
    #[must_use]
    pub fn card_rect(&self, id: EntryId) -> Option<Rect> {
        self.card_layers
            .get(&id)
            .and_then(|layer| self.compositor.layer(*layer))
            .map(|layer| layer.bounds)
    }

    // ------------------------------------------------------------------
    // Background work
    // ------------------------------------------------------------------

    fn start_poll_if_due(&mut self) {
        if self.poll_task.is_some() || !self.wall.poll_due() {
            return;
        }
        if let Some(ticket) = self.wall.begin_poll() {
            self.poll_task = Some(spawn_fetch(self.backend.clone(), ticket));
        }
    }

    fn apply_poll(&mut self, joined: Result<FetchResult, JoinError>) {
        let (ticket, result) = match joined {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::error!(error = %err, "Poll task failed");
                self.wall.abandon_poll();
                return;
            }
        };

        match self.wall.finish_poll(ticket, result) {
            Ok(outcome) => {
                if self.status.offline.take().is_some() {
                    tracing::info!("Wall server reachable again");
                }
                if !outcome.inserted.is_empty() {
                    tracing::debug!(inserted = outcome.inserted.len(), cursor = outcome.cursor, "New cards");
                }
            }
            Err(SyncError::Closed) => {}
            Err(err) => self.status.offline = Some(err.to_string()),
        }
    }

    fn start_submit(&mut self) {
        let Some(form) = self.compose.as_mut() else {
            return;
        };
        if form.sending || self.submit_task.is_some() {
            return;
        }
        if let Err(err) = form.validate() {
            form.error = Some(err.to_string());
            return;
        }

        form.sending = true;
        form.error = None;
        let submitter = self.submitter.clone();
        let (name, text, defer) = (form.name.clone(), form.text.clone(), form.surprise);
        self.submit_task = Some(tokio::spawn(async move {
            submitter.submit(&name, &text, defer).await
        }));
    }

    fn apply_submit(&mut self, joined: Result<SubmitResult, JoinError>) {
        let now = self.wall.now();
        let hour = self.wall.config().reveal.hour;
        let Some(form) = self.compose.as_mut() else {
            return;
        };
        form.sending = false;

        match joined {
            Ok(Ok(_id)) => {
                let message = if form.surprise {
                    format!("Saved! It will appear tomorrow at {hour:02}:00")
                } else {
                    "Sent! It will drift in shortly".to_string()
                };
                self.compose = None;
                self.status.notify(message, NoticeLevel::Success, now);
            }
            Ok(Err(err @ SubmitError::Rejected(_))) => form.error = Some(err.to_string()),
            Ok(Err(err @ SubmitError::Network(_))) => {
                form.error = Some(err.to_string());
                self.status
                    .notify("Could not reach the wall", NoticeLevel::Error, now);
            }
            Err(err) => {
                tracing::error!(error = %err, "Submit task failed");
                form.error = Some("Submission was interrupted, please try again".to_string());
                self.status
                    .notify("Submission interrupted", NoticeLevel::Error, now);
            }
        }
    }

    async fn shutdown(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        if let Some(task) = self.submit_task.take() {
            if tokio::time::timeout(SUBMIT_GRACE, task).await.is_err() {
                tracing::warn!("Submission still pending at exit");
            }
        }
        self.wall.teardown();
        tracing::info!("App shut down");
    }

    // ------------------------------------------------------------------
    // Selection and focus
    // ------------------------------------------------------------------

    fn with_form(&mut self, edit: impl FnOnce(&mut ComposeForm)) {
        if let Some(form) = self.compose.as_mut() {
            edit(form);
        }
    }

    fn cycle_selection(&mut self, forward: bool) {
        if self.wall.focused().is_some() {
            return;
        }
        let ids = self.wall.ids();
        if ids.is_empty() {
            self.selected = None;
            return;
        }

        let next = match self.selected.and_then(|id| ids.iter().position(|x| *x == id)) {
            None if forward => 0,
            None => ids.len() - 1,
            Some(i) if forward => (i + 1) % ids.len(),
            Some(i) => (i + ids.len() - 1) % ids.len(),
        };
        self.selected = Some(ids[next]);
    }

    fn toggle_focus(&mut self) {
        if self.wall.focused().is_some() {
            self.wall.unfocus();
            return;
        }
        if self.selected.is_none() {
            self.cycle_selection(true);
        }
        if let Some(id) = self.selected {
            self.wall.focus(id);
        }
    }

    fn card_at(&self, x: u16, y: u16) -> Option<EntryId> {
        let layer = self.compositor.layer_at(x, y)?;
        self.card_layers
            .iter()
            .find_map(|(id, l)| (*l == layer).then_some(*id))
    }

    fn on_close_mark(&self, id: EntryId, x: u16, y: u16) -> bool {
        self.card_rect(id).is_some_and(|rect| {
            let right = rect.x.saturating_add(rect.width);
            y == rect.y && x.saturating_add(5) >= right && x < right
        })
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Update animations and layers
    fn update(&mut self) {
        let now = self.wall.now();
        self.wall.frame();

        self.status.expire(now);
        self.status.cards = self.wall.len();
        self.status.focused = self.wall.focused().is_some();
        self.status.retry_in = self
            .status
            .offline
            .is_some()
            .then(|| self.wall.until_next_poll());

        self.sync_card_layers(now);
        self.render_status();
        self.render_compose();
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn sync_card_layers(&mut self, now: std::time::Instant) {
        let order = self.wall.draw_order();
        self.card_layers.retain(|id, layer| {
            let keep = order.contains(id);
            if !keep {
                self.compositor.remove_layer(*layer);
            }
            keep
        });

        for (z, id) in order.iter().enumerate() {
            let Some(card) = self.wall.card(*id) else {
                continue;
            };
            let (width, height) = (card.size.width as u16, card.size.height as u16);
            let x = card.motion.position.x.round() as u16;
            let y = card.motion.position.y.round() as u16;

            let layer = *self.card_layers.entry(*id).or_insert_with(|| {
                let layer = self
                    .compositor
                    .create_layer(Rect::new(x, y, width, height), 0);
                self.compositor.set_opaque(layer, true);
                layer
            });
            self.compositor.move_layer(layer, x, y);
            self.compositor.resize_layer(layer, width, height);
            self.compositor
                .set_z_index(layer, i32::try_from(z).unwrap_or(i32::MAX - 2));

            let widget = CardWidget::new(&card.entry)
                .appearance(self.wall.appearance(*id))
                .selected(self.selected == Some(*id))
                .badge(card.has_badge(now));
            if let Some(buf) = self.compositor.layer_buffer_mut(layer) {
                buf.reset();
                let area = buf.area;
                widget.render(area, buf);
            }
        }
    }

    fn render_status(&mut self) {
        if let Some(buf) = self.compositor.layer_buffer_mut(self.status_layer) {
            buf.reset();
            let area = buf.area;
            (&self.status).render(area, buf);
        }
    }

    fn render_compose(&mut self) {
        let Some(form) = &self.compose else {
            self.compositor.set_visible(self.compose_layer, false);
            return;
        };
        self.compositor.set_visible(self.compose_layer, true);
        let hour = self.wall.config().reveal.hour;
        if let Some(buf) = self.compositor.layer_buffer_mut(self.compose_layer) {
            buf.reset();
            let area = buf.area;
            ComposeView::new(form, hour).render(area, buf);
        }
    }

    /// Draw the composited layers to the terminal
    pub fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            let output = self.compositor.composite();
            let area = frame.area();
            let buf = frame.buffer_mut();

            for y in 0..area.height.min(output.area.height) {
                for x in 0..area.width.min(output.area.width) {
                    if let Some(cell) = output.cell((x, y)) {
                        buf[(x, y)] = cell.clone();
                    }
                }
            }
        })?;

        Ok(())
    }
}
