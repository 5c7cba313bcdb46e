//! Violation bookkeeping with a hard report cap.

/// Collects the violation messages raised while processing one state and keeps
/// the running count for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLedger {
    max_reported: u32,
    reported: u32,
    pending: Vec<String>,
}

impl ErrorLedger {
    pub fn new(max_reported: u32) -> Self {
        Self {
            max_reported,
            reported: 0,
            pending: Vec::new(),
        }
    }

    /// Records a violation for the current state.
    ///
    /// Returns `false` without recording anything once the cap is reached.
    pub fn report(&mut self, message: impl Into<String>) -> bool {
        if self.is_saturated() {
            return false;
        }
        self.pending.push(message.into());
        self.reported += 1;
        if self.is_saturated() {
            log::warn!(
                "Error report cap of {} reached; further violations are suppressed",
                self.max_reported
            );
        }
        true
    }

    /// Adds a message that does not count against the cap.
    pub fn note(&mut self, message: impl Into<String>) {
        self.pending.push(message.into());
    }

    pub fn is_saturated(&self) -> bool {
        self.reported >= self.max_reported
    }

    /// Number of violations reported so far.
    pub fn error_count(&self) -> u32 {
        self.reported
    }

    pub fn max_reported(&self) -> u32 {
        self.max_reported
    }

    /// Drains the messages of the current state.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }

    pub fn reset(&mut self, max_reported: u32) {
        self.max_reported = max_reported;
        self.reported = 0;
        self.pending.clear();
    }
}

/// Formats `value` with comma thousands separators.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Renders a list as `"{label}: 0: a, 1: b"`, or `"{label}: None"` when empty.
pub fn format_indexed<T: std::fmt::Display>(label: &str, values: &[T]) -> String {
    if values.is_empty() {
        return format!("{label}: None");
    }
    let body = values
        .iter()
        .enumerate()
        .map(|(i, value)| format!("{i}: {value}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{label}: {body}")
}
