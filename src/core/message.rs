//! The single on-screen narrative message.

use super::constants::{MESSAGE_HIDE_GRACE_MS, MESSAGE_REVEAL_DELAY_MS};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredMessage {
    pub text: String,
    pub duration_sec: f32,
}

/// What the message display should show this frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub text: String,
    pub duration_sec: f32,
    /// False during the short reveal delay and the hide grace period.
    pub visible: bool,
}

/// Holds at most one message; a new one replaces the old and restarts its
/// timing. Cleared `MESSAGE_HIDE_GRACE_MS` after its duration elapses.
#[derive(Clone, Debug, Default)]
pub struct MessageSlot {
    current: Option<(TriggeredMessage, f64)>,
}

impl MessageSlot {
    pub fn show(&mut self, message: TriggeredMessage, now_ms: f64) {
        self.current = Some((message, now_ms));
    }

    /// Restart the current message's timing from `now_ms`.
    pub fn restart(&mut self, now_ms: f64) {
        if let Some((_, shown_at)) = self.current.as_mut() {
            *shown_at = now_ms;
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn active(&self) -> Option<&TriggeredMessage> {
        self.current.as_ref().map(|(m, _)| m)
    }

    pub fn tick(&mut self, now_ms: f64) {
        if let Some((m, shown_at)) = &self.current {
            let hide_at = shown_at + m.duration_sec as f64 * 1000.0;
            if now_ms >= hide_at + MESSAGE_HIDE_GRACE_MS {
                self.current = None;
            }
        }
    }

    pub fn view(&self, now_ms: f64) -> Option<MessageView> {
        let (m, shown_at) = self.current.as_ref()?;
        let elapsed = now_ms - shown_at;
        let visible =
            elapsed >= MESSAGE_REVEAL_DELAY_MS && elapsed < m.duration_sec as f64 * 1000.0;
        Some(MessageView {
            text: m.text.clone(),
            duration_sec: m.duration_sec,
            visible,
        })
    }
}
