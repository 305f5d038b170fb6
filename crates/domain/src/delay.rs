use crate::shared::entity::{Entity, ID};
use crate::task::Task;

/// The durable rest ledger record for one (task, user) pair. A row with
/// `rest_max > 0` is an active delay: it holds the task's escalation until
/// the running rest window elapses. Rows are never deleted, they are
/// reused across cycles.
#[derive(Debug, Clone)]
pub struct Delay {
    pub id: ID,
    pub task_id: ID,
    pub user_id: ID,
    /// Duration in millis of one rest window, copied from the task at grant
    pub rest_time: i64,
    /// Remaining rests, decremented toward zero
    pub rest_max: i64,
    /// Instant the running rest window elapses, `None` when exhausted
    pub next_alarm_at: Option<i64>,
    /// Reminder pings sent during the current cycle
    pub alarm_count: i64,
    pub last_alarm_at: Option<i64>,
}

impl Delay {
    pub fn new(task: &Task, user_id: ID, now: i64) -> Self {
        Self {
            id: Default::default(),
            task_id: task.id.clone(),
            user_id,
            rest_time: task.rest_time,
            rest_max: task.rest_max,
            next_alarm_at: Self::alarm_after(task.rest_max, task.rest_time, now),
            alarm_count: 0,
            last_alarm_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.rest_max > 0
    }

    pub fn is_last_rest(&self) -> bool {
        self.rest_max == 1
    }

    pub fn is_alarm_elapsed(&self, now: i64) -> bool {
        matches!(self.next_alarm_at, Some(at) if at <= now)
    }

    /// Re-grants the full allowance from the task's current configuration.
    /// Called on the initial escalation of a cycle, so a row carried over
    /// from an earlier cycle starts fresh.
    pub fn refresh_from(&mut self, task: &Task, now: i64) {
        self.rest_time = task.rest_time;
        self.rest_max = task.rest_max;
        self.next_alarm_at = Self::alarm_after(task.rest_max, task.rest_time, now);
        self.alarm_count = 0;
    }

    /// Consumes one rest after a reminder ping and re-arms the alarm.
    /// Exhausting the last rest deactivates the row until the next grant.
    pub fn consume_rest(&mut self, now: i64) {
        if self.rest_max > 0 {
            self.rest_max -= 1;
        }
        self.alarm_count += 1;
        self.last_alarm_at = Some(now);
        self.next_alarm_at = Self::alarm_after(self.rest_max, self.rest_time, now);
    }

    fn alarm_after(rest_max: i64, rest_time: i64, now: i64) -> Option<i64> {
        if rest_max > 0 {
            Some(now + rest_time)
        } else {
            None
        }
    }
}

impl Entity for Delay {
    fn id(&self) -> &ID {
        &self.id
    }
}
