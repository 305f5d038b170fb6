use super::ledger;
use relance_domain::{Delay, Task, TaskDeadlines, TimeoutNotification, User};
use relance_infra::{Context, PushMessage};
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Aggregate outcome of one notification fan-out. Delivery errors are
/// contained per recipient and only surface here as counts.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchReport {
    pub success: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EscalationKind {
    Initial,
    Reminder,
}

impl EscalationKind {
    fn notification_type(&self) -> &'static str {
        match self {
            EscalationKind::Initial => "task_timeout",
            EscalationKind::Reminder => "task_timeout_reminder",
        }
    }
}

/// Initial escalation of a cycle: notify every resolvable assignee once
/// and grant each of them the task's rest allowance. Never raises to the
/// scanner, whatever happens inside.
pub async fn dispatch_timeout_notifications(
    task: &Task,
    deadlines: &TaskDeadlines,
    now: i64,
    ctx: &Context,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    if !ctx.notifier.enabled() {
        warn!(
            "No push notification transport available, skipping dispatch for task with id: {}",
            task.id
        );
        return report;
    }
    if task.assignees.is_empty() {
        debug!("Task with id: {} has no assignees to notify", task.id);
        return report;
    }

    let users = match ctx.repos.users.find_many(task.assignees.ids()).await {
        Ok(users) => users,
        Err(e) => {
            error!(
                "Unable to resolve assignees of task with id: {}. Error: {:?}",
                task.id, e
            );
            return report;
        }
    };

    for user in users {
        // Assignees without a registered push destination are excluded,
        // not counted as failures
        if user.device_token.is_none() {
            continue;
        }

        let delay = match ledger::grant_or_refresh_delay(task, &user.id, now, ctx).await {
            Ok(delay) => delay,
            Err(e) => {
                error!(
                    "Unable to update the rest ledger for task: {} and user: {}. Error: {:?}",
                    task.id, user.id, e
                );
                report.failed += 1;
                continue;
            }
        };

        notify_user(
            task,
            deadlines,
            &user,
            &delay,
            EscalationKind::Initial,
            now,
            ctx,
            &mut report,
        )
        .await;
    }

    report
}

/// Reminder escalation: one notification per delay whose rest window has
/// elapsed, consuming one rest each. The rest is consumed even when its
/// owner can no longer be resolved, so an orphaned row cannot hold the
/// task forever.
pub async fn dispatch_rest_reminders(
    task: &Task,
    deadlines: &TaskDeadlines,
    due: Vec<Delay>,
    now: i64,
    ctx: &Context,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    if !ctx.notifier.enabled() {
        warn!(
            "No push notification transport available, skipping reminders for task with id: {}",
            task.id
        );
        return report;
    }

    for delay in due {
        let user_id = delay.user_id.clone();
        let delay = match ledger::consume_rest(delay, now, ctx).await {
            Ok(delay) => delay,
            Err(e) => {
                error!(
                    "Unable to update the rest ledger for task: {} and user: {}. Error: {:?}",
                    task.id, user_id, e
                );
                report.failed += 1;
                continue;
            }
        };

        let user = match ctx.repos.users.find(&delay.user_id).await {
            Some(user) if user.device_token.is_some() => user,
            _ => {
                debug!(
                    "User with id: {} has no push destination, skipping reminder",
                    delay.user_id
                );
                continue;
            }
        };

        notify_user(
            task,
            deadlines,
            &user,
            &delay,
            EscalationKind::Reminder,
            now,
            ctx,
            &mut report,
        )
        .await;
    }

    report
}

async fn notify_user(
    task: &Task,
    deadlines: &TaskDeadlines,
    user: &User,
    delay: &Delay,
    kind: EscalationKind,
    now: i64,
    ctx: &Context,
    report: &mut DispatchReport,
) {
    let message = compose_message(task, deadlines, user, delay.is_last_rest(), kind, now);

    // Bookkeeping happens before the delivery attempt and is not rolled
    // back when the delivery fails
    let audit = TimeoutNotification::new(
        task.id.clone(),
        user.id.clone(),
        message.body.clone(),
        now,
    );
    if let Err(e) = ctx.repos.timeout_notifications.insert(&audit).await {
        error!(
            "Unable to record the notification audit row for task: {} and user: {}. Error: {:?}",
            task.id, user.id, e
        );
    }

    let device_token = match &user.device_token {
        Some(token) => token,
        None => return,
    };
    match ctx.notifier.send(device_token, &message).await {
        Ok(message_id) => {
            debug!(
                "Notified user with id: {} about task with id: {}. Provider message id: {}",
                user.id, task.id, message_id
            );
            report.success += 1;
        }
        Err(e) => {
            error!(
                "Unable to deliver the timeout notification for task: {} to user: {}. Error: {:?}",
                task.id, user.id, e
            );
            report.failed += 1;
        }
    }
}

fn compose_message(
    task: &Task,
    deadlines: &TaskDeadlines,
    user: &User,
    is_last_rest: bool,
    kind: EscalationKind,
    now: i64,
) -> PushMessage {
    let mut body = match kind {
        EscalationKind::Initial => format!("The task \"{}\" has passed its deadline.", task.name),
        EscalationKind::Reminder => format!("The task \"{}\" is still overdue.", task.name),
    };
    match deadlines.closes_at {
        Some(closes_at) if closes_at > now => {
            let minutes_left = (closes_at - now) / (1000 * 60);
            body.push_str(&format!(" It closes in {} minutes.", minutes_left));
        }
        Some(_) => body.push_str(" Its window is already closed."),
        None => {}
    }
    if is_last_rest {
        body.push_str(" This is the last warning.");
    }

    let mut data = HashMap::new();
    data.insert("task_id".to_string(), task.id.as_string());
    data.insert("task_name".to_string(), task.name.clone());
    data.insert("user_name".to_string(), user.name.clone());
    data.insert(
        "notification_type".to_string(),
        kind.notification_type().to_string(),
    );
    data.insert("is_last_time".to_string(), is_last_rest.to_string());

    PushMessage {
        title: task.name.clone(),
        body,
        data,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono_tz::UTC;
    use relance_domain::{Assignees, TaskSchedule, ID};
    use relance_infra::{DisabledNotifier, InMemoryNotifier};
    use std::sync::Arc;

    const REST_TIME: i64 = 1000 * 60 * 30;

    fn task_factory(rest_max: i64, assignees: Vec<ID>) -> Task {
        let schedule = TaskSchedule {
            period_start: 0,
            period_end: 1000 * 60 * 60 * 24,
            frequency: None,
            time_cloture: Some("17:00".parse().unwrap()),
            time_out: Some("12:00".parse().unwrap()),
            timezone: UTC,
        };
        let mut task = Task::new("inventory".into(), schedule, REST_TIME, rest_max, 0);
        task.assignees = Assignees::new(assignees);
        task
    }

    fn deadlines_factory() -> TaskDeadlines {
        TaskDeadlines {
            timeout_at: 1000 * 60 * 60 * 12,
            closes_at: Some(1000 * 60 * 60 * 17),
        }
    }

    struct TestContext {
        ctx: Context,
        notifier: Arc<InMemoryNotifier>,
    }

    fn setup() -> TestContext {
        let mut ctx = Context::create_inmemory();
        let notifier = Arc::new(InMemoryNotifier::new());
        ctx.notifier = notifier.clone();
        TestContext { ctx, notifier }
    }

    async fn insert_user(ctx: &Context, device_token: Option<&str>) -> User {
        let mut user = User::new("Ada".into());
        user.device_token = device_token.map(|t| t.to_string());
        ctx.repos.users.insert(&user).await.unwrap();
        user
    }

    #[actix_web::main]
    #[test]
    async fn notifies_each_resolvable_assignee_once() {
        let TestContext { ctx, notifier } = setup();
        let with_token = insert_user(&ctx, Some("token-1")).await;
        let without_token = insert_user(&ctx, None).await;
        let unknown = ID::new();
        let task = task_factory(
            2,
            vec![with_token.id.clone(), without_token.id.clone(), unknown],
        );

        let now = 1000 * 60 * 60 * 13;
        let report = dispatch_timeout_notifications(&task, &deadlines_factory(), now, &ctx).await;

        assert_eq!(report, DispatchReport { success: 1, failed: 0 });
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].device_token, "token-1");

        // Ledger and audit rows exist only for the notified assignee
        let delays = ctx.repos.delays.find_by_task(&task.id).await;
        assert_eq!(delays.len(), 1);
        assert_eq!(delays[0].user_id, with_token.id);
        assert_eq!(delays[0].rest_max, 2);
        let audit = ctx.repos.timeout_notifications.find_by_task(&task.id).await;
        assert_eq!(audit.len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn contains_per_recipient_delivery_failures() {
        let TestContext { ctx, notifier } = setup();
        let healthy = insert_user(&ctx, Some("token-1")).await;
        let broken = insert_user(&ctx, Some("token-broken")).await;
        notifier.fail_for("token-broken");
        let task = task_factory(1, vec![healthy.id.clone(), broken.id.clone()]);

        let report = dispatch_timeout_notifications(&task, &deadlines_factory(), 0, &ctx).await;

        assert_eq!(report, DispatchReport { success: 1, failed: 1 });
        // Bookkeeping was written for both recipients before the attempt
        assert_eq!(ctx.repos.delays.find_by_task(&task.id).await.len(), 2);
        assert_eq!(
            ctx.repos
                .timeout_notifications
                .find_by_task(&task.id)
                .await
                .len(),
            2
        );
    }

    #[actix_web::main]
    #[test]
    async fn is_a_no_op_without_a_transport() {
        let TestContext { mut ctx, .. } = setup();
        ctx.notifier = Arc::new(DisabledNotifier);
        let user = insert_user(&ctx, Some("token-1")).await;
        let task = task_factory(1, vec![user.id.clone()]);

        let report = dispatch_timeout_notifications(&task, &deadlines_factory(), 0, &ctx).await;

        assert_eq!(report, DispatchReport::default());
        assert!(ctx.repos.delays.find_by_task(&task.id).await.is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn is_a_no_op_without_assignees() {
        let TestContext { ctx, notifier } = setup();
        let task = task_factory(1, vec![]);

        let report = dispatch_timeout_notifications(&task, &deadlines_factory(), 0, &ctx).await;

        assert_eq!(report, DispatchReport::default());
        assert!(notifier.sent().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn reminders_consume_one_rest_per_due_delay() {
        let TestContext { ctx, notifier } = setup();
        let user = insert_user(&ctx, Some("token-1")).await;
        let task = task_factory(2, vec![user.id.clone()]);

        let delay = ledger::grant_or_refresh_delay(&task, &user.id, 0, &ctx)
            .await
            .unwrap();

        let now = REST_TIME;
        let report =
            dispatch_rest_reminders(&task, &deadlines_factory(), vec![delay], now, &ctx).await;

        assert_eq!(report, DispatchReport { success: 1, failed: 0 });
        let delays = ctx.repos.delays.find_by_task(&task.id).await;
        assert_eq!(delays[0].rest_max, 1);
        assert_eq!(delays[0].alarm_count, 1);
        assert_eq!(delays[0].next_alarm_at, Some(now + REST_TIME));

        // Down to the last rest: the message is the final warning variant
        let sent = notifier.sent();
        assert!(sent[0].message.body.contains("This is the last warning."));
        assert_eq!(
            sent[0].message.data.get("is_last_time"),
            Some(&"true".to_string())
        );
        assert_eq!(
            sent[0].message.data.get("notification_type"),
            Some(&"task_timeout_reminder".to_string())
        );
    }

    #[test]
    fn composes_the_remaining_time_until_closure() {
        let user = User::new("Ada".into());
        let task = task_factory(3, vec![user.id.clone()]);
        let deadlines = deadlines_factory();

        let now = deadlines.closes_at.unwrap() - 1000 * 60 * 45;
        let message = compose_message(
            &task,
            &deadlines,
            &user,
            false,
            EscalationKind::Initial,
            now,
        );
        assert_eq!(message.title, "inventory");
        assert!(message.body.contains("has passed its deadline"));
        assert!(message.body.contains("closes in 45 minutes"));
        assert!(!message.body.contains("last warning"));
        assert_eq!(
            message.data.get("notification_type"),
            Some(&"task_timeout".to_string())
        );
        assert_eq!(message.data.get("is_last_time"), Some(&"false".to_string()));
        assert_eq!(message.data.get("task_id"), Some(&task.id.as_string()));
        assert_eq!(message.data.get("user_name"), Some(&"Ada".to_string()));

        let message = compose_message(
            &task,
            &deadlines,
            &user,
            false,
            EscalationKind::Reminder,
            deadlines.closes_at.unwrap() + 1,
        );
        assert!(message.body.contains("still overdue"));
        assert!(message.body.contains("already closed"));
    }
}
