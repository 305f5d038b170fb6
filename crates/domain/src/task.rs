use crate::date::TimeOfDay;
use crate::shared::entity::{Entity, ID};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A `Task` is a monitored unit of work with a configured deadline and a
/// set of assignees. When its timeout passes, the timeout scanner notifies
/// every assignee, and a bounded per-user rest allowance can defer the
/// final escalation.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: ID,
    pub name: String,
    pub status: bool,
    pub schedule: TaskSchedule,
    /// Duration in millis of one granted rest window
    pub rest_time: i64,
    /// Ceiling on the number of rests grantable per cycle
    pub rest_max: i64,
    pub assignees: Assignees,
    /// Set when the escalation for the current cycle has fired.
    /// `None` until then, cleared again when a new cycle begins.
    pub timeout_notified_at: Option<i64>,
    /// The deadline instant `timeout_notified_at` fired for. Makes cycle
    /// identity explicit: a marker stored for another deadline is stale
    /// and the scanner clears it itself.
    pub notified_deadline: Option<i64>,
    pub created: i64,
    pub updated: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Schedule configuration of a `Task`. The times of day are wall-clock
/// times in `timezone`; `frequency = None` means a single, non-recurring
/// window.
#[derive(Debug, Clone)]
pub struct TaskSchedule {
    pub period_start: i64,
    pub period_end: i64,
    pub frequency: Option<TaskFrequency>,
    /// Time of day the task's window closes. Only used for the
    /// remaining-time display in notifications.
    pub time_cloture: Option<TimeOfDay>,
    /// Time of day after which the task is considered overdue
    pub time_out: Option<TimeOfDay>,
    pub timezone: Tz,
}

impl Task {
    pub fn new(name: String, schedule: TaskSchedule, rest_time: i64, rest_max: i64, now: i64) -> Self {
        Self {
            id: Default::default(),
            name,
            status: true,
            schedule,
            rest_time,
            rest_max,
            assignees: Default::default(),
            timeout_notified_at: None,
            notified_deadline: None,
            created: now,
            updated: now,
        }
    }

    pub fn has_timeout_configured(&self) -> bool {
        self.schedule.time_cloture.is_some() && self.schedule.time_out.is_some()
    }

    pub fn is_notified(&self) -> bool {
        self.timeout_notified_at.is_some()
    }

    /// Whether the escalation already fired for the given deadline. A
    /// marker stored for a different deadline belongs to an older cycle.
    pub fn is_notified_for(&self, deadline: i64) -> bool {
        self.is_notified() && self.notified_deadline == Some(deadline)
    }

    pub fn mark_timeout_notified(&mut self, at: i64, deadline: i64) {
        self.timeout_notified_at = Some(at);
        self.notified_deadline = Some(deadline);
        self.updated = at;
    }

    pub fn clear_timeout_notification(&mut self, now: i64) {
        self.timeout_notified_at = None;
        self.notified_deadline = None;
        self.updated = now;
    }
}

impl Entity for Task {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Ordered list of assignee ids. Well-typed everywhere inside the system;
/// the lenient parse of legacy free-form encodings lives in
/// [`Assignees::parse`] and is only applied at the API boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignees(Vec<ID>);

impl Assignees {
    pub fn new(ids: Vec<ID>) -> Self {
        let mut deduped: Vec<ID> = Vec::with_capacity(ids.len());
        for id in ids {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        Self(deduped)
    }

    pub fn ids(&self) -> &[ID] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses a textual assignee list. A well-formed encoding like
    /// `["<id>", "<id>"]` is tried first; when that fails, every
    /// id-looking token found in the text is extracted instead. An
    /// unparseable text yields an empty list, never an error.
    pub fn parse(text: &str) -> Self {
        if let Some(ids) = Self::parse_structured(text) {
            return Self::new(ids);
        }
        Self::new(Self::scan_tokens(text))
    }

    fn parse_structured(text: &str) -> Option<Vec<ID>> {
        let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?.trim();
        if inner.is_empty() {
            return Some(Vec::new());
        }
        inner
            .split(',')
            .map(|part| {
                part.trim()
                    .trim_matches(|c| c == '"' || c == '\'')
                    .parse::<ID>()
                    .ok()
            })
            .collect()
    }

    fn scan_tokens(text: &str) -> Vec<ID> {
        text.split(|c: char| !(c.is_ascii_hexdigit() || c == '-'))
            .filter_map(|token| token.parse::<ID>().ok())
            .collect()
    }
}

impl From<Vec<ID>> for Assignees {
    fn from(ids: Vec<ID>) -> Self {
        Self::new(ids)
    }
}
