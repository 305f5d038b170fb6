use super::{dispatcher, ledger};
use crate::error::RelanceError;
use crate::shared::{
    auth::protect_admin_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use relance_api_structs::run_timeout_scan::*;
use relance_domain::{deadlines, Task};
use relance_infra::Context;
use std::fmt::Display;
use tracing::{debug, error, info};

pub async fn run_timeout_scan_controller(
    http_req: HttpRequest,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, RelanceError> {
    protect_admin_route(&http_req, &ctx)?;

    execute(CheckTaskTimeoutsUseCase::default(), &ctx)
        .await
        .map(|summary| {
            HttpResponse::Ok().json(APIResponse {
                success: true,
                exit_code: 0,
                output: summary.to_string(),
                notified: summary.notified,
                skipped: summary.skipped,
                errors: summary.errors,
            })
        })
        .map_err(RelanceError::from)
}

/// The timeout sweep. Loads every active task with a configured timeout,
/// computes its deadline for the current cycle and escalates the ones
/// that newly crossed it, honoring the rest ledger. Tasks are processed
/// one at a time and a failing task never aborts the rest of the sweep.
#[derive(Debug, Default)]
pub struct CheckTaskTimeoutsUseCase {}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeoutScanSummary {
    pub considered: usize,
    pub notified: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl Display for TimeoutScanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "considered: {}, notified: {}, skipped: {}, errors: {}",
            self.considered, self.notified, self.skipped, self.errors
        )
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for RelanceError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[derive(Debug)]
enum TaskOutcome {
    Notified,
    Skipped(SkipReason),
}

#[derive(Debug)]
enum SkipReason {
    NoDeadline,
    ActiveDelay,
    NotDue,
    AlreadyNotified,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CheckTaskTimeoutsUseCase {
    type Response = TimeoutScanSummary;

    type Error = UseCaseError;

    const NAME: &'static str = "CheckTaskTimeouts";

    /// This will run every minute
    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let tasks = ctx
            .repos
            .tasks
            .find_active_with_timeout()
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let mut summary = TimeoutScanSummary {
            considered: tasks.len(),
            ..Default::default()
        };

        for task in tasks {
            let task_id = task.id.clone();
            match process_task(task, now, ctx).await {
                Ok(TaskOutcome::Notified) => summary.notified += 1,
                Ok(TaskOutcome::Skipped(reason)) => {
                    debug!("Skipping task with id: {}. Reason: {:?}", task_id, reason);
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!(
                        "Unable to process task with id: {}. Error: {:?}",
                        task_id, e
                    );
                    summary.errors += 1;
                }
            }
        }

        info!("Timeout scan done. {}", summary);
        Ok(summary)
    }
}

async fn process_task(mut task: Task, now: i64, ctx: &Context) -> anyhow::Result<TaskOutcome> {
    let task_deadlines = match deadlines(&task.schedule, now) {
        Some(task_deadlines) => task_deadlines,
        None => return Ok(TaskOutcome::Skipped(SkipReason::NoDeadline)),
    };

    // A marker stored for another deadline belongs to an older cycle and
    // is cleared here, no external rollover job is involved
    if task.is_notified() && !task.is_notified_for(task_deadlines.timeout_at) {
        task.clear_timeout_notification(now);
        ctx.repos.tasks.save(&task).await?;
    }

    let delays = ctx.repos.delays.find_by_task(&task.id).await;
    if ledger::has_active_delay(&delays) {
        let due = ledger::due_delays(&delays, now);
        if due.is_empty() {
            // A rest is in progress, hold the whole task
            return Ok(TaskOutcome::Skipped(SkipReason::ActiveDelay));
        }
        let report =
            dispatcher::dispatch_rest_reminders(&task, &task_deadlines, due, now, ctx).await;
        info!(
            "Re-escalated task with id: {} after an elapsed rest. Deliveries: {}, failed: {}",
            task.id, report.success, report.failed
        );
        return Ok(TaskOutcome::Notified);
    }

    if now < task_deadlines.timeout_at {
        return Ok(TaskOutcome::Skipped(SkipReason::NotDue));
    }
    if task.is_notified_for(task_deadlines.timeout_at) {
        // Should have been filtered out above, kept as a safety net
        return Ok(TaskOutcome::Skipped(SkipReason::AlreadyNotified));
    }

    let report =
        dispatcher::dispatch_timeout_notifications(&task, &task_deadlines, now, ctx).await;
    info!(
        "Escalated task with id: {}. Deliveries: {}, failed: {}",
        task.id, report.success, report.failed
    );

    task.mark_timeout_notified(now, task_deadlines.timeout_at);
    ctx.repos.tasks.save(&task).await?;

    Ok(TaskOutcome::Notified)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::prelude::*;
    use chrono_tz::UTC;
    use relance_domain::{Assignees, Delay, TaskFrequency, TaskSchedule, User, ID};
    use relance_infra::{ISys, ITaskRepo, InMemoryNotifier};
    use std::sync::Arc;

    const REST_TIME: i64 = 1000 * 60 * 30;

    struct StaticTimeSys(i64);
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            self.0
        }
    }

    fn ts(year: i32, month: u32, day: u32, hours: u32, minutes: u32) -> i64 {
        UTC.ymd(year, month, day)
            .and_hms(hours, minutes, 0)
            .timestamp_millis()
    }

    /// 2021-02-21 09:00 UTC, within the period of the factory tasks and
    /// after their midnight timeout
    fn scan_time() -> i64 {
        ts(2021, 2, 21, 9, 0)
    }

    fn todays_deadline() -> i64 {
        ts(2021, 2, 21, 0, 0)
    }

    struct TestContext {
        ctx: Context,
        notifier: Arc<InMemoryNotifier>,
    }

    fn setup(now: i64) -> TestContext {
        let mut ctx = Context::create_inmemory();
        let notifier = Arc::new(InMemoryNotifier::new());
        ctx.notifier = notifier.clone();
        ctx.sys = Arc::new(StaticTimeSys(now));
        TestContext { ctx, notifier }
    }

    fn set_time(ctx: &mut Context, now: i64) {
        ctx.sys = Arc::new(StaticTimeSys(now));
    }

    fn task_factory(rest_max: i64, assignees: Vec<ID>) -> Task {
        let schedule = TaskSchedule {
            period_start: ts(2021, 2, 20, 0, 0),
            period_end: ts(2021, 2, 23, 0, 0),
            frequency: Some(TaskFrequency::Daily),
            time_cloture: Some("17:00".parse().unwrap()),
            time_out: Some("0:00".parse().unwrap()),
            timezone: UTC,
        };
        let mut task = Task::new("inventory".into(), schedule, REST_TIME, rest_max, 0);
        task.assignees = Assignees::new(assignees);
        task
    }

    async fn insert_user(ctx: &Context, device_token: Option<&str>) -> User {
        let mut user = User::new("Ada".into());
        user.device_token = device_token.map(|t| t.to_string());
        ctx.repos.users.insert(&user).await.unwrap();
        user
    }

    async fn run_scan(ctx: &Context) -> TimeoutScanSummary {
        CheckTaskTimeoutsUseCase::default()
            .execute(ctx)
            .await
            .expect("Scan to complete")
    }

    #[actix_web::main]
    #[test]
    async fn notifies_an_overdue_task() {
        let TestContext { ctx, notifier } = setup(scan_time());
        let user = insert_user(&ctx, Some("token-7")).await;
        let task = task_factory(2, vec![user.id.clone()]);
        ctx.repos.tasks.insert(&task).await.unwrap();

        let summary = run_scan(&ctx).await;

        assert_eq!(
            summary,
            TimeoutScanSummary {
                considered: 1,
                notified: 1,
                skipped: 0,
                errors: 0,
            }
        );

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].device_token, "token-7");

        let delays = ctx.repos.delays.find_by_task(&task.id).await;
        assert_eq!(delays.len(), 1);
        assert_eq!(delays[0].rest_max, 2);

        let audit = ctx.repos.timeout_notifications.find_by_task(&task.id).await;
        assert_eq!(audit.len(), 1);

        let task = ctx.repos.tasks.find(&task.id).await.unwrap();
        assert_eq!(task.timeout_notified_at, Some(scan_time()));
        assert_eq!(task.notified_deadline, Some(todays_deadline()));
    }

    #[actix_web::main]
    #[test]
    async fn does_not_notify_before_the_deadline() {
        let TestContext { ctx, notifier } = setup(scan_time());
        let user = insert_user(&ctx, Some("token-7")).await;
        let mut task = task_factory(2, vec![user.id.clone()]);
        // Later today, not reached at 09:00
        task.schedule.time_out = Some("23:00".parse().unwrap());
        ctx.repos.tasks.insert(&task).await.unwrap();

        let summary = run_scan(&ctx).await;

        assert_eq!(summary.notified, 0);
        assert_eq!(summary.skipped, 1);
        assert!(notifier.sent().is_empty());

        let task = ctx.repos.tasks.find(&task.id).await.unwrap();
        assert_eq!(task.timeout_notified_at, None);
        assert!(ctx.repos.delays.find_by_task(&task.id).await.is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn skips_tasks_without_a_computable_deadline() {
        let TestContext { ctx, notifier } = setup(scan_time());
        let user = insert_user(&ctx, Some("token-7")).await;
        let mut task = task_factory(2, vec![user.id.clone()]);
        // Active and configured, but the period is already over
        task.schedule.period_end = ts(2021, 2, 20, 23, 0);
        ctx.repos.tasks.insert(&task).await.unwrap();

        let summary = run_scan(&ctx).await;

        assert_eq!(summary.notified, 0);
        assert_eq!(summary.skipped, 1);
        assert!(notifier.sent().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn dispatches_at_most_once_per_cycle() {
        let TestContext { ctx, notifier } = setup(scan_time());
        let user = insert_user(&ctx, Some("token-7")).await;
        // No rests configured: no delay gate hides re-runs
        let task = task_factory(0, vec![user.id.clone()]);
        ctx.repos.tasks.insert(&task).await.unwrap();

        let summary = run_scan(&ctx).await;
        assert_eq!(summary.notified, 1);
        let notified_at = ctx
            .repos
            .tasks
            .find(&task.id)
            .await
            .unwrap()
            .timeout_notified_at;

        for _ in 0..3 {
            let summary = run_scan(&ctx).await;
            assert_eq!(summary.notified, 0);
            assert_eq!(summary.skipped, 1);
        }

        assert_eq!(notifier.sent().len(), 1);
        let task = ctx.repos.tasks.find(&task.id).await.unwrap();
        assert_eq!(task.timeout_notified_at, notified_at);
    }

    #[actix_web::main]
    #[test]
    async fn holds_escalation_while_a_rest_is_active() {
        let TestContext { ctx, notifier } = setup(scan_time());
        let user = insert_user(&ctx, Some("token-7")).await;
        let task = task_factory(2, vec![user.id.clone()]);
        ctx.repos.tasks.insert(&task).await.unwrap();
        // An active delay whose rest window has not elapsed yet
        ctx.repos
            .delays
            .insert(&Delay::new(&task, user.id.clone(), scan_time()))
            .await
            .unwrap();

        let summary = run_scan(&ctx).await;

        assert_eq!(summary.notified, 0);
        assert_eq!(summary.skipped, 1);
        assert!(notifier.sent().is_empty());
        let task = ctx.repos.tasks.find(&task.id).await.unwrap();
        assert_eq!(task.timeout_notified_at, None);
    }

    #[actix_web::main]
    #[test]
    async fn re_escalates_when_a_rest_expires() {
        let TestContext { mut ctx, notifier } = setup(scan_time());
        let user = insert_user(&ctx, Some("token-7")).await;
        let task = task_factory(2, vec![user.id.clone()]);
        ctx.repos.tasks.insert(&task).await.unwrap();

        // Initial escalation grants the allowance of two rests
        let summary = run_scan(&ctx).await;
        assert_eq!(summary.notified, 1);
        assert_eq!(notifier.sent().len(), 1);

        // Still within the first rest window: held
        set_time(&mut ctx, scan_time() + REST_TIME - 1);
        let summary = run_scan(&ctx).await;
        assert_eq!(summary.skipped, 1);
        assert_eq!(notifier.sent().len(), 1);

        // First rest elapsed: reminder, one rest consumed, last one left
        set_time(&mut ctx, scan_time() + REST_TIME);
        let summary = run_scan(&ctx).await;
        assert_eq!(summary.notified, 1);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].message.body.contains("This is the last warning."));

        // Second rest elapsed: final reminder, allowance exhausted
        set_time(&mut ctx, scan_time() + 2 * REST_TIME);
        let summary = run_scan(&ctx).await;
        assert_eq!(summary.notified, 1);
        assert_eq!(notifier.sent().len(), 3);
        let delays = ctx.repos.delays.find_by_task(&task.id).await;
        assert_eq!(delays[0].rest_max, 0);
        assert_eq!(delays[0].alarm_count, 2);

        // Nothing left to escalate within this cycle
        set_time(&mut ctx, scan_time() + 3 * REST_TIME);
        let summary = run_scan(&ctx).await;
        assert_eq!(summary.notified, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(notifier.sent().len(), 3);
    }

    #[actix_web::main]
    #[test]
    async fn clears_a_stale_marker_on_cycle_rollover() {
        let TestContext { ctx, notifier } = setup(scan_time());
        let user = insert_user(&ctx, Some("token-7")).await;
        let mut task = task_factory(0, vec![user.id.clone()]);
        // Escalated yesterday, for yesterday's deadline
        task.mark_timeout_notified(ts(2021, 2, 20, 0, 5), ts(2021, 2, 20, 0, 0));
        ctx.repos.tasks.insert(&task).await.unwrap();

        let summary = run_scan(&ctx).await;

        assert_eq!(summary.notified, 1);
        assert_eq!(notifier.sent().len(), 1);
        let task = ctx.repos.tasks.find(&task.id).await.unwrap();
        assert_eq!(task.timeout_notified_at, Some(scan_time()));
        assert_eq!(task.notified_deadline, Some(todays_deadline()));
    }

    #[actix_web::main]
    #[test]
    async fn a_failing_task_does_not_abort_the_sweep() {
        struct FailingSaveTaskRepo {
            inner: Arc<dyn ITaskRepo>,
            poisoned: ID,
        }

        #[async_trait::async_trait]
        impl ITaskRepo for FailingSaveTaskRepo {
            async fn insert(&self, task: &Task) -> anyhow::Result<()> {
                self.inner.insert(task).await
            }

            async fn save(&self, task: &Task) -> anyhow::Result<()> {
                if task.id == self.poisoned {
                    return Err(anyhow::Error::msg("Simulated storage failure"));
                }
                self.inner.save(task).await
            }

            async fn find(&self, task_id: &ID) -> Option<Task> {
                self.inner.find(task_id).await
            }

            async fn delete(&self, task_id: &ID) -> Option<Task> {
                self.inner.delete(task_id).await
            }

            async fn find_active_with_timeout(&self) -> anyhow::Result<Vec<Task>> {
                self.inner.find_active_with_timeout().await
            }
        }

        let TestContext { mut ctx, notifier } = setup(scan_time());
        let user = insert_user(&ctx, Some("token-7")).await;
        let task_a = task_factory(0, vec![user.id.clone()]);
        let task_b = task_factory(0, vec![user.id.clone()]);
        let task_c = task_factory(0, vec![user.id.clone()]);
        for task in [&task_a, &task_b, &task_c].iter() {
            ctx.repos.tasks.insert(task).await.unwrap();
        }
        ctx.repos.tasks = Arc::new(FailingSaveTaskRepo {
            inner: ctx.repos.tasks.clone(),
            poisoned: task_b.id.clone(),
        });

        let summary = run_scan(&ctx).await;

        assert_eq!(summary.considered, 3);
        assert_eq!(summary.notified, 2);
        assert_eq!(summary.errors, 1);
        // The healthy tasks were escalated and marked
        assert_eq!(notifier.sent().len(), 3);
        for task_id in [&task_a.id, &task_c.id].iter() {
            let task = ctx.repos.tasks.find(task_id).await.unwrap();
            assert!(task.is_notified());
        }
        let task = ctx.repos.tasks.find(&task_b.id).await.unwrap();
        assert!(!task.is_notified());
    }

    #[actix_web::main]
    #[test]
    async fn marks_a_task_without_recipients_as_notified() {
        let TestContext { ctx, notifier } = setup(scan_time());
        let task = task_factory(2, vec![]);
        ctx.repos.tasks.insert(&task).await.unwrap();

        let summary = run_scan(&ctx).await;

        assert_eq!(summary.notified, 1);
        assert!(notifier.sent().is_empty());
        let task = ctx.repos.tasks.find(&task.id).await.unwrap();
        assert!(task.is_notified());
    }
}
