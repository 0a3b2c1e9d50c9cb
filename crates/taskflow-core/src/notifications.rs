//! Toast notifications.
//!
//! `Toasts` is a small bounded queue of user-facing messages. Front ends
//! render and `dismiss` them; `error_from` turns an `ApiError` into the
//! message the user should see.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use crate::api::ApiError;

/// Toasts dismiss themselves after this long unless given another duration.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);

/// Maximum number of toasts kept; the oldest is dropped first.
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub duration: Duration,
}

#[derive(Debug, Default)]
pub struct Toasts {
    queue: VecDeque<Toast>,
    next_id: u64,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.push_with_duration(kind, message, DEFAULT_TOAST_DURATION)
    }

    pub fn push_with_duration(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        duration: Duration,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        if self.queue.len() == MAX_TOASTS {
            self.queue.pop_front();
        }
        self.queue.push_back(Toast {
            id,
            kind,
            message: message.into(),
            duration,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Warning, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Info, message)
    }

    /// Error toast for a failed call: the server's message when it sent one,
    /// otherwise `fallback`.
    pub fn error_from(&mut self, error: &ApiError, fallback: &str) -> u64 {
        self.error(error.user_message(fallback))
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.queue.len();
        self.queue.retain(|t| t.id != id);
        self.queue.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.queue.iter()
    }

    /// Remove and return every pending toast, oldest first.
    pub fn drain(&mut self) -> Vec<Toast> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorBody;

    #[test]
    fn test_ids_increase_and_dismiss() {
        let mut toasts = Toasts::new();
        let a = toasts.success("Task deleted successfully!");
        let b = toasts.info("Loading");
        assert!(b > a);

        assert!(toasts.dismiss(a));
        assert!(!toasts.dismiss(a));
        assert_eq!(toasts.len(), 1);
    }

    #[test]
    fn test_queue_is_bounded() {
        let mut toasts = Toasts::new();
        for i in 0..(MAX_TOASTS + 2) {
            toasts.warning(format!("w{}", i));
        }
        let drained = toasts.drain();
        assert_eq!(drained.len(), MAX_TOASTS);
        assert_eq!(drained[0].message, "w2");
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_error_from_uses_server_message() {
        let mut toasts = Toasts::new();
        toasts.error_from(&ApiError::Validation(ErrorBody::message("Title is required")), "Failed to save task");
        toasts.error_from(&ApiError::InvalidResponse("bad json".into()), "Failed to load tasks");

        let messages: Vec<String> = toasts.iter().map(|t| t.message.clone()).collect();
        assert_eq!(messages, vec!["Title is required", "Failed to load tasks"]);
        assert!(toasts.iter().all(|t| t.kind == ToastKind::Error));
    }
}
