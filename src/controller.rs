//! Chat controller
//!
//! Owns the session state and turns events into state changes plus a list of
//! [`Effect`]s for the runtime to carry out. Handlers are registered in a
//! table when the controller is built; nothing here performs IO, so every
//! transition can be driven directly in tests.
//!
//! Single-flight is enforced by [`Lifecycle`]: a submit arriving while a
//! request is outstanding is dropped, whatever the UI shows. A reset is always
//! accepted; if it interrupts a turn, that turn's reply is discarded.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::error::ChatResult;
use crate::state::{InputEdit, InputState, Lifecycle, Message, Transcript};

/// Everything that can happen to the chat session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user asked to send what is in the input box
    Submit,
    /// The user asked for a new chat
    Reset,
    /// A keystroke in the input box
    Input(InputEdit),
    /// Text pasted into the input box
    Paste(String),
    /// The chat request finished
    ChatCompleted(ChatResult<String>),
    /// The clear-chat request finished
    ClearCompleted(ChatResult<()>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Submit,
    Reset,
    Input,
    Paste,
    ChatCompleted,
    ClearCompleted,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Submit => EventKind::Submit,
            Event::Reset => EventKind::Reset,
            Event::Input(_) => EventKind::Input,
            Event::Paste(_) => EventKind::Paste,
            Event::ChatCompleted(_) => EventKind::ChatCompleted,
            Event::ClearCompleted(_) => EventKind::ClearCompleted,
        }
    }
}

/// Side effects requested by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST the trimmed text to the chat endpoint
    SendChat(String),
    /// POST to the clear-chat endpoint
    ClearChat,
    /// Drop the reply of the chat request in flight when it arrives
    DiscardChat,
    /// Show or hide the loading indicator
    SetBusy(bool),
    FocusInput,
    ScrollToBottom,
}

#[derive(Debug, Default)]
pub struct ChatState {
    pub transcript: Transcript,
    pub input: InputState,
    pub lifecycle: Lifecycle,
    /// Loading indicator shown, input disabled
    pub busy: bool,
    pub show_welcome: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            show_welcome: true,
            ..Self::default()
        }
    }
}

type Handler = fn(&mut ChatState, Event) -> Vec<Effect>;

pub struct Controller {
    state: ChatState,
    handlers: HashMap<EventKind, Handler>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        let mut handlers: HashMap<EventKind, Handler> = HashMap::new();
        handlers.insert(EventKind::Submit, handle_submit);
        handlers.insert(EventKind::Reset, handle_reset);
        handlers.insert(EventKind::Input, handle_input);
        handlers.insert(EventKind::Paste, handle_paste);
        handlers.insert(EventKind::ChatCompleted, handle_chat_completed);
        handlers.insert(EventKind::ClearCompleted, handle_clear_completed);

        Self {
            state: ChatState::new(),
            handlers,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        let kind = event.kind();
        match self.handlers.get(&kind) {
            Some(handler) => handler(&mut self.state, event),
            None => {
                warn!(?kind, "no handler registered");
                Vec::new()
            }
        }
    }

    pub fn submit(&mut self) -> Vec<Effect> {
        self.dispatch(Event::Submit)
    }

    pub fn reset(&mut self) -> Vec<Effect> {
        self.dispatch(Event::Reset)
    }
}

/// Toggle the loading indicator and input availability together
fn set_busy(state: &mut ChatState, busy: bool) -> Effect {
    state.busy = busy;
    state.input.set_disabled(busy);
    Effect::SetBusy(busy)
}

fn handle_submit(state: &mut ChatState, _event: Event) -> Vec<Effect> {
    if state.lifecycle != Lifecycle::Idle {
        debug!(lifecycle = ?state.lifecycle, "submit ignored, request in flight");
        return Vec::new();
    }

    let text = state.input.text().trim().to_string();
    if text.is_empty() {
        return Vec::new();
    }

    state.show_welcome = false;
    state.transcript.push(Message::user(text.clone()));
    state.input.clear();
    state.lifecycle = Lifecycle::Sending;

    vec![
        Effect::ScrollToBottom,
        set_busy(state, true),
        Effect::SendChat(text),
    ]
}

fn handle_chat_completed(state: &mut ChatState, event: Event) -> Vec<Effect> {
    let Event::ChatCompleted(result) = event else {
        return Vec::new();
    };
    if state.lifecycle != Lifecycle::Sending {
        warn!(lifecycle = ?state.lifecycle, "chat completion without a pending turn");
        return Vec::new();
    }

    match result {
        Ok(reply) => {
            debug!(len = reply.len(), "reply received");
            state.transcript.push(Message::bot(reply));
        }
        Err(err) => {
            warn!(error = %err, "chat turn failed");
            state.transcript.push(Message::error(format!(
                "Sorry, I encountered an error: {}. Please try again.",
                err.user_message()
            )));
        }
    }
    state.lifecycle = Lifecycle::Idle;

    vec![
        Effect::ScrollToBottom,
        set_busy(state, false),
        Effect::FocusInput,
    ]
}

fn handle_reset(state: &mut ChatState, _event: Event) -> Vec<Effect> {
    let mut effects = Vec::new();
    match state.lifecycle {
        Lifecycle::Clearing => {
            debug!("reset already in progress");
            return effects;
        }
        Lifecycle::Sending => {
            debug!("reset interrupts a pending turn, its reply will be dropped");
            effects.push(Effect::DiscardChat);
        }
        Lifecycle::Idle => {}
    }

    state.lifecycle = Lifecycle::Clearing;
    effects.push(set_busy(state, true));
    effects.push(Effect::ClearChat);
    effects
}

fn handle_clear_completed(state: &mut ChatState, event: Event) -> Vec<Effect> {
    let Event::ClearCompleted(result) = event else {
        return Vec::new();
    };
    if state.lifecycle != Lifecycle::Clearing {
        warn!(lifecycle = ?state.lifecycle, "clear completion without a pending reset");
        return Vec::new();
    }

    match result {
        Ok(()) => info!("conversation reset"),
        Err(err) => warn!(error = %err, "error clearing chat history, resetting locally"),
    }

    state.transcript.clear();
    state.input.clear();
    state.show_welcome = true;
    state.lifecycle = Lifecycle::Idle;

    vec![set_busy(state, false), Effect::FocusInput]
}

fn handle_input(state: &mut ChatState, event: Event) -> Vec<Effect> {
    if let Event::Input(edit) = event {
        state.input.apply(edit);
    }
    Vec::new()
}

fn handle_paste(state: &mut ChatState, event: Event) -> Vec<Effect> {
    if let Event::Paste(text) = event {
        state.input.insert_str(&text);
    }
    Vec::new()
}
