use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use tokio::sync::mpsc;

use crate::form::{FormInput, FormState, Focus};
use crate::predict::{self, Outcome, PredictionClient};

/// Seconds before a status message disappears
const STATUS_SECONDS: u64 = 3;

/// Where the current submission cycle stands
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Loading,
    Settled(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

type Settlement = (u64, Outcome);

pub struct App {
    pub form: FormState,
    pub phase: Phase,
    pub popup: Popup,

    /// Values of the most recent dispatched request
    pub last_sent: Option<FormInput>,

    // Status message (auto-clears after STATUS_SECONDS)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    client: PredictionClient,
    seq: u64,
    tx: mpsc::UnboundedSender<Settlement>,
    rx: mpsc::UnboundedReceiver<Settlement>,
}

impl App {
    pub fn new(client: PredictionClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            form: FormState::default(),
            phase: Phase::Idle,
            popup: Popup::None,
            last_sent: None,
            status_message: None,
            status_message_time: None,
            client,
            seq: 0,
            tx,
            rx,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.phase {
            Phase::Settled(outcome) => Some(outcome),
            _ => None,
        }
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup == Popup::Help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.popup = Popup::None;
            }
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.form.focus = self.form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus = self.form.focus.prev(),

            // Enter submits the form from any control
            KeyCode::Enter => self.submit(),
            KeyCode::Char(' ') if self.form.focus == Focus::Submit => self.submit(),

            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.form.reset();
                self.set_status("Valores padrão restaurados");
            }

            KeyCode::Char('?') | KeyCode::F(1) => self.popup = Popup::Help,
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(c) => {
                self.form.push_char(c);
            }
            KeyCode::Esc => {
                self.status_message = None;
                self.status_message_time = None;
            }
            _ => {}
        }
    }

    /// Dispatch one prediction request for the current form values.
    /// Ignored while a request is in flight.
    pub fn submit(&mut self) {
        let Some((seq, input)) = self.begin_submission() else {
            return;
        };

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = predict::submit(&client, input).await;
            // Receiver only goes away on shutdown
            let _ = tx.send((seq, outcome));
        });
    }

    /// Enter the loading phase, clearing any previous outcome.
    /// Returns the sequence number and a snapshot of the values to send.
    fn begin_submission(&mut self) -> Option<(u64, FormInput)> {
        if self.is_loading() {
            tracing::debug!(seq = self.seq, "submission ignored, request in flight");
            self.set_status("Aguarde a resposta anterior");
            return None;
        }

        self.seq += 1;
        self.phase = Phase::Loading;
        let input = self.form.input;
        self.last_sent = Some(input);

        tracing::info!(
            seq = self.seq,
            systolic = input.systolic,
            diastolic = input.diastolic,
            age = input.age,
            "submitting prediction request"
        );
        if !input.out_of_range().is_empty() {
            tracing::debug!("submitting values outside advisory bounds");
        }

        Some((self.seq, input))
    }

    /// Apply a settled request. Only the latest dispatched request may settle.
    fn settle(&mut self, seq: u64, outcome: Outcome) {
        if seq != self.seq {
            tracing::debug!(seq, latest = self.seq, "dropping stale prediction result");
            return;
        }

        match &outcome {
            Outcome::Success(p) => tracing::info!(seq, label = ?p.label, "prediction settled"),
            Outcome::Partial(_) => tracing::warn!(seq, "prediction response is missing fields"),
            Outcome::Rejected { status, message } => {
                tracing::warn!(seq, status, "prediction service rejected request: {}", message)
            }
            Outcome::Failed { .. } => tracing::warn!(seq, "prediction request failed"),
        }

        self.phase = Phase::Settled(outcome);
    }

    pub fn tick(&mut self) {
        while let Ok((seq, outcome)) = self.rx.try_recv() {
            self.settle(seq, outcome);
        }

        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_SECONDS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}
