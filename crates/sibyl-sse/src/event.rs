/// Type assigned when the wire block carries no `event:` field.
pub const TYPE_DEFAULT: &str = "message";
/// Output-bearing event; `data` holds a chunk of prediction output.
pub const TYPE_OUTPUT: &str = "output";
/// Log lines from the running prediction.
pub const TYPE_LOGS: &str = "logs";
/// Remote-reported failure; `data` holds the standard JSON error shape.
pub const TYPE_ERROR: &str = "error";
/// Terminal marker; no further events follow.
pub const TYPE_DONE: &str = "done";

/// One decoded Server-Sent Event.
///
/// `data` concatenates every `data:` value of the block in arrival order,
/// each keeping its terminating newline, so `data: foo` decodes to
/// `"foo\n"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: String,
    pub id: String,
    pub data: String,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            event_type: TYPE_DEFAULT.to_string(),
            id: String::new(),
            data: String::new(),
        }
    }
}

impl Event {
    pub fn is_output(&self) -> bool {
        self.event_type == TYPE_OUTPUT
    }

    pub fn is_logs(&self) -> bool {
        self.event_type == TYPE_LOGS
    }

    pub fn is_error(&self) -> bool {
        self.event_type == TYPE_ERROR
    }

    pub fn is_done(&self) -> bool {
        self.event_type == TYPE_DONE
    }

    /// A block that decoded to nothing meaningful, e.g. the comment-only
    /// heartbeat some servers emit at stream start. The terminal `done`
    /// event also has an empty payload and is never negligible.
    pub fn is_negligible(&self) -> bool {
        self.data.is_empty() && !self.is_done()
    }
}
