use relance_domain::{Delay, Task, ID};
use relance_infra::Context;

/// The rest ledger decides whether an escalation may proceed. A task is
/// held as long as any assignee owns an active delay, and re-escalated
/// once the granted rest windows elapse.

pub fn has_active_delay(delays: &[Delay]) -> bool {
    delays.iter().any(|d| d.is_active())
}

/// Active delays whose rest window has elapsed and which are therefore
/// due for a reminder escalation
pub fn due_delays(delays: &[Delay], now: i64) -> Vec<Delay> {
    delays
        .iter()
        .filter(|d| d.is_active() && d.is_alarm_elapsed(now))
        .cloned()
        .collect()
}

/// Fetch-or-create the ledger row for the (task, user) pair, re-granting
/// the full allowance from the task's current configuration.
pub async fn grant_or_refresh_delay(
    task: &Task,
    user_id: &ID,
    now: i64,
    ctx: &Context,
) -> anyhow::Result<Delay> {
    match ctx
        .repos
        .delays
        .find_by_task_and_user(&task.id, user_id)
        .await
    {
        Some(mut delay) => {
            delay.refresh_from(task, now);
            ctx.repos.delays.save(&delay).await?;
            Ok(delay)
        }
        None => {
            let delay = Delay::new(task, user_id.clone(), now);
            ctx.repos.delays.insert(&delay).await?;
            Ok(delay)
        }
    }
}

/// Consumes one rest of the delay and persists the row
pub async fn consume_rest(mut delay: Delay, now: i64, ctx: &Context) -> anyhow::Result<Delay> {
    delay.consume_rest(now);
    ctx.repos.delays.save(&delay).await?;
    Ok(delay)
}
