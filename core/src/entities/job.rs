use chrono::{DateTime, FixedOffset};

use super::{parse_datetime, text};
use crate::error::ApiError;

entity_view! {
    /// An asynchronous server-side job.
    Job => Job
}

entity_view! {
    /// A notification from the poll queue.
    PollMessage => PollMessage
}

impl Job {
    /// `RUNNING`, `SUCCESS`, `FAILED`, `CANCELLED`, ...
    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    pub fn action(&self) -> Option<&str> {
        self.str_field("action")
    }

    pub fn sub_status(&self) -> Option<String> {
        text(self, &["subStatus", "sub_status"])
    }

    pub fn execution_date(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(self.get_any(&["execDate", "execution_date"]))
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status(), Some("SUCCESS" | "FAILED" | "CANCELLED"))
    }

    pub fn is_successful(&self) -> bool {
        self.status() == Some("SUCCESS")
    }

    pub fn is_failed(&self) -> bool {
        self.status() == Some("FAILED")
    }

    pub fn is_running(&self) -> bool {
        self.status() == Some("RUNNING")
    }
}

impl PollMessage {
    pub fn message(&self) -> Option<String> {
        text(self, &["message", "text"])
    }

    pub fn message_type(&self) -> Option<String> {
        text(self, &["type", "message_type"])
    }

    pub fn object_type(&self) -> Option<String> {
        text(self, &["objectType", "object_type"])
    }

    /// The job this message reports on.
    pub fn job(&self) -> Result<Option<Job>, ApiError> {
        Ok(self
            .association("job", Some("Job"))?
            .and_then(|entity| Job::try_from(entity).ok()))
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_datetime(self.get("created"))
    }
}
