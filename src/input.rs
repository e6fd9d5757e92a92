//! Keyboard handling for the terminal host.
//!
//! DESIGN
//! ======
//! [`feed_action`] maps keys pressed while the chat log is showing.
//! [`CredentialForm`] drives the settings form: every keystroke is applied
//! to the gate straight away through [`CredentialGate::update`], the way
//! the form fields write through on each change. Enter advances and
//! confirms on the last field. Esc asks the gate to close without
//! submitting.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::gate::{CredentialField, CredentialGate, GateError};

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

const MASK: char = '*';

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c' | 'C'))
}

// =============================================================================
// FEED KEYS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedAction {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    /// Reopen the credential form.
    Settings,
    Quit,
}

/// Map a key pressed over the chat log. Releases and unbound keys map to `None`.
#[must_use]
pub fn feed_action(key: &KeyEvent) -> Option<FeedAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if is_interrupt(key) {
        return Some(FeedAction::Quit);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(FeedAction::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(FeedAction::ScrollDown),
        KeyCode::PageUp => Some(FeedAction::PageUp),
        KeyCode::PageDown => Some(FeedAction::PageDown),
        KeyCode::Char('s' | 'S') => Some(FeedAction::Settings),
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(FeedAction::Quit),
        _ => None,
    }
}

// =============================================================================
// CREDENTIAL FORM
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    /// Keep editing.
    Continue,
    /// All fields entered; the host should call [`CredentialGate::confirm`].
    Confirm,
    /// The gate closed without submitting.
    Dismissed,
    /// Ctrl-C.
    Quit,
}

/// Cursor state of the settings form. Field values live in the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialForm {
    active: usize,
    notice: Option<String>,
}

impl CredentialForm {
    /// Start on the first empty field, or the first field if none is empty.
    #[must_use]
    pub fn new(gate: &CredentialGate) -> Self {
        Self { active: first_missing(gate), notice: None }
    }

    #[must_use]
    pub fn active_field(&self) -> CredentialField {
        CredentialField::ALL[self.active]
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn handle_key(&mut self, gate: &mut CredentialGate, key: &KeyEvent) -> FormStep {
        if key.kind != KeyEventKind::Press {
            return FormStep::Continue;
        }
        if is_interrupt(key) {
            return FormStep::Quit;
        }

        let field = self.active_field();
        match key.code {
            KeyCode::Char(c) => {
                let mut value = gate.credentials().get(field).to_owned();
                value.push(c);
                gate.update(field, value);
            }
            KeyCode::Backspace => {
                let mut value = gate.credentials().get(field).to_owned();
                value.pop();
                gate.update(field, value);
            }
            KeyCode::Tab | KeyCode::Down => self.move_by(1),
            KeyCode::BackTab | KeyCode::Up => self.move_by(CredentialField::ALL.len() - 1),
            KeyCode::Enter => {
                if self.active + 1 == CredentialField::ALL.len() {
                    return FormStep::Confirm;
                }
                self.active += 1;
            }
            KeyCode::Esc => match gate.request_close() {
                Ok(()) => return FormStep::Dismissed,
                Err(e) => {
                    self.notice = Some(e.to_string());
                    self.active = first_missing(gate);
                }
            },
            _ => {}
        }
        FormStep::Continue
    }

    /// Record the outcome of [`CredentialGate::confirm`].
    pub fn after_confirm(&mut self, gate: &CredentialGate, result: &Result<(), GateError>) {
        match result {
            Ok(()) => self.notice = None,
            Err(e) => {
                self.notice = Some(e.to_string());
                self.active = first_missing(gate);
            }
        }
    }

    /// Screen lines for the form. Secret fields are masked.
    #[must_use]
    pub fn lines(&self, gate: &CredentialGate) -> Vec<String> {
        let mut lines = vec![
            "Settings".to_owned(),
            "Please enter your Telegram Bot credentials and OpenAI API key.".to_owned(),
            String::new(),
        ];
        for (index, field) in CredentialField::ALL.into_iter().enumerate() {
            let marker = if index == self.active { '>' } else { ' ' };
            let shown = display_value(field, gate.credentials().get(field));
            lines.push(format!("{marker} {}: {shown}", field.label()));
        }
        lines.push(String::new());
        if let Some(notice) = &self.notice {
            lines.push(notice.clone());
        }
        lines.push("Enter next/save | Tab move | Esc close | Ctrl-C quit".to_owned());
        lines
    }

    fn move_by(&mut self, step: usize) {
        self.active = (self.active + step) % CredentialField::ALL.len();
    }
}

fn first_missing(gate: &CredentialGate) -> usize {
    gate.credentials()
        .missing()
        .first()
        .and_then(|field| CredentialField::ALL.iter().position(|f| f == field))
        .unwrap_or(0)
}

/// Value as shown on screen: secrets become one mask character per char.
#[must_use]
pub fn display_value(field: CredentialField, value: &str) -> String {
    if field.is_secret() { std::iter::repeat_n(MASK, value.chars().count()).collect() } else { value.to_owned() }
}
