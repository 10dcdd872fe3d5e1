use std::sync::Arc;

use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::client::ChatBackend;
use crate::config::Settings;
use crate::controller::{ChatState, Controller, Effect, Event};
use crate::error::ChatError;
use crate::state::InputEdit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Transcript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Chat,
    Clear,
}

impl RequestKind {
    /// Completion event for a task that died before producing one
    fn aborted(self, reason: String) -> Event {
        match self {
            RequestKind::Chat => Event::ChatCompleted(Err(ChatError::Aborted(reason))),
            RequestKind::Clear => Event::ClearCompleted(Err(ChatError::Aborted(reason))),
        }
    }
}

struct PendingRequest {
    kind: RequestKind,
    handle: JoinHandle<Event>,
    /// Belongs to a conversation that has since been reset
    discarded: bool,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: FocusPane,
    controller: Controller,
    backend: Arc<dyn ChatBackend>,
    pending: Vec<PendingRequest>,

    // Loading indicator animation
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Transcript viewport, updated during render
    pub transcript_scroll: u16,
    pub follow_bottom: bool,
    pub transcript_height: u16,
    pub transcript_width: u16,
    pub max_scroll: u16,
    pub transcript_area: Option<Rect>,

    // Display
    pub endpoint: String,
    pub welcome_text: String,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, settings: &Settings) -> Self {
        Self {
            should_quit: false,
            focus: FocusPane::Input,
            controller: Controller::new(),
            backend,
            pending: Vec::new(),

            animation_frame: 0,

            transcript_scroll: 0,
            follow_bottom: true,
            transcript_height: 0,
            transcript_width: 0,
            max_scroll: 0,
            transcript_area: None,

            endpoint: settings.base_url.clone(),
            welcome_text: settings.welcome_text.clone(),
        }
    }

    pub fn state(&self) -> &ChatState {
        self.controller.state()
    }

    pub fn has_pending_request(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn dispatch(&mut self, event: Event) {
        let effects = self.controller.dispatch(event);
        for effect in effects {
            self.apply(effect);
        }
    }

    pub fn edit_input(&mut self, edit: InputEdit) {
        self.dispatch(Event::Input(edit));
    }

    /// Feed pasted text into the input box in one edit
    pub fn type_text(&mut self, text: &str) {
        let normalized: String = text
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .chars()
            .filter_map(|c| match c {
                '\n' => Some('\n'),
                '\t' => Some(' '),
                c if c.is_control() => None,
                c => Some(c),
            })
            .collect();
        if !normalized.is_empty() {
            self.dispatch(Event::Paste(normalized));
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::SendChat(text) => {
                let backend = Arc::clone(&self.backend);
                let handle = tokio::spawn(async move {
                    Event::ChatCompleted(backend.send_message(&text).await)
                });
                self.track(RequestKind::Chat, handle);
            }
            Effect::ClearChat => {
                let backend = Arc::clone(&self.backend);
                let handle = tokio::spawn(async move {
                    Event::ClearCompleted(backend.clear_chat().await)
                });
                self.track(RequestKind::Clear, handle);
            }
            Effect::DiscardChat => {
                for pending in self.pending.iter_mut().filter(|p| p.kind == RequestKind::Chat) {
                    pending.discarded = true;
                }
            }
            Effect::SetBusy(busy) => {
                self.animation_frame = 0;
                if busy {
                    // Keep the indicator in view
                    self.follow_bottom = true;
                }
            }
            Effect::FocusInput => self.focus = FocusPane::Input,
            Effect::ScrollToBottom => self.follow_bottom = true,
        }
    }

    fn track(&mut self, kind: RequestKind, handle: JoinHandle<Event>) {
        debug!(?kind, in_flight = self.pending.len(), "request started");
        self.pending.push(PendingRequest {
            kind,
            handle,
            discarded: false,
        });
    }

    /// Deliver completions of the requests that have finished
    pub async fn poll_pending(&mut self) {
        while let Some(idx) = self.pending.iter().position(|p| p.handle.is_finished()) {
            let pending = self.pending.remove(idx);
            self.deliver(pending).await;
        }
    }

    /// Wait for every outstanding request and deliver its completion
    pub async fn finish_pending(&mut self) {
        while !self.pending.is_empty() {
            let pending = self.pending.remove(0);
            self.deliver(pending).await;
        }
    }

    /// A task that panicked still completes its request, as an error
    async fn deliver(&mut self, pending: PendingRequest) {
        let event = match pending.handle.await {
            Ok(event) => event,
            Err(e) => {
                error!(kind = ?pending.kind, error = %e, "request task failed");
                pending.kind.aborted(e.to_string())
            }
        };
        if pending.discarded {
            debug!(kind = ?pending.kind, "dropping completion from a reset conversation");
            return;
        }
        self.dispatch(event);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.state().busy {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Transcript scrolling
    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.transcript_scroll = self.transcript_scroll.saturating_add(lines).min(self.max_scroll);
        if self.transcript_scroll >= self.max_scroll {
            self.follow_bottom = true;
        }
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.transcript_height / 2).max(1));
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.transcript_height / 2).max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_bottom = false;
        self.transcript_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.transcript_scroll = self.max_scroll;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Input => FocusPane::Transcript,
            FocusPane::Transcript => FocusPane::Input,
        };
    }
}
