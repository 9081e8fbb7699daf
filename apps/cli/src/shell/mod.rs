//! Terminal shell: the expertise and question inputs, the streaming
//! response area and the status line.
//!
//! The event loop never blocks on the model. It waits for key events only
//! as long as the poll timer allows, then lets the [`Assistant`] poll the
//! relay.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use savant_core::{Assistant, Generate};
use std::time::{Duration, Instant};

mod view;

pub use view::render;

/// Longest wait for input while no answer is streaming.
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// The focused input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The single-line expertise field
    Expertise,
    /// The multi-line question field
    Question,
}

/// Shell state around the [`Assistant`].
pub struct Shell<G: Generate> {
    assistant: Assistant<G>,
    focus: Focus,
    /// Rows scrolled up from the bottom of the response
    scroll_back: u16,
    quit: bool,
}

impl<G: Generate> Shell<G> {
    /// Create a shell with the expertise field focused
    pub fn new(assistant: Assistant<G>) -> Self {
        Self {
            assistant,
            focus: Focus::Expertise,
            scroll_back: 0,
            quit: false,
        }
    }

    /// The controller
    pub fn assistant(&self) -> &Assistant<G> {
        &self.assistant
    }

    /// The focused input
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Rows scrolled up from the bottom of the response, `0` follows new text
    pub fn scroll_back(&self) -> u16 {
        self.scroll_back
    }

    /// Whether quit was requested
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Run until quit, then cancel and join every background thread.
    pub fn run(mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let result = self.event_loop(terminal);
        self.assistant.shutdown();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.quit {
            self.tick(Instant::now());
            terminal.draw(|frame| render(frame, self))?;

            let wait = self
                .assistant
                .next_tick(Instant::now())
                .map_or(IDLE_WAIT, |due| due.min(IDLE_WAIT));
            if event::poll(wait)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key, Instant::now());
                    }
                }
            }
        }
        Ok(())
    }

    /// Let the assistant poll the relay if its timer is due.
    pub fn tick(&mut self, now: Instant) {
        if let Some(poll) = self.assistant.tick(now) {
            if poll.done {
                tracing::debug!("answer complete");
            }
        }
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if ctrl => self.quit = true,
            KeyCode::Char('s') if ctrl => self.submit(now),
            KeyCode::F(5) => self.submit(now),
            KeyCode::Char('r') if ctrl => self.reset(),
            KeyCode::Tab | KeyCode::BackTab => self.toggle_focus(),
            KeyCode::PageUp => self.scroll_back = self.scroll_back.saturating_add(5),
            KeyCode::PageDown => self.scroll_back = self.scroll_back.saturating_sub(5),
            KeyCode::End if ctrl => self.scroll_back = 0,
            KeyCode::Enter => match self.focus {
                Focus::Expertise => self.focus = Focus::Question,
                Focus::Question => self.assistant.form_mut().question.push('\n'),
            },
            KeyCode::Backspace => {
                self.field().pop();
            }
            KeyCode::Char(c) if !ctrl => self.field().push(c),
            _ => {}
        }
    }

    fn submit(&mut self, now: Instant) {
        match self.assistant.submit(now) {
            Ok(()) => self.scroll_back = 0,
            Err(e) => tracing::debug!("submit ignored: {e}"),
        }
    }

    fn reset(&mut self) {
        self.assistant.reset();
        self.scroll_back = 0;
        self.focus = Focus::Expertise;
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Expertise => Focus::Question,
            Focus::Question => Focus::Expertise,
        };
    }

    fn field(&mut self) -> &mut String {
        let form = self.assistant.form_mut();
        match self.focus {
            Focus::Expertise => &mut form.expertise,
            Focus::Question => &mut form.question,
        }
    }
}
