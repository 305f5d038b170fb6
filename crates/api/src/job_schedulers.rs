use crate::shared::usecase::execute;
use crate::timeout::check_task_timeouts::CheckTaskTimeoutsUseCase;
use actix_web::rt::time::{interval, sleep_until, Instant};
use relance_infra::Context;
use std::time::Duration;
use tracing::{error, info};

/// Seconds until the start of the next minute
pub fn get_start_delay(now_ts: usize) -> usize {
    60 - (now_ts / 1000) % 60
}

/// Runs the timeout scan every minute, aligned with the minute boundary.
/// Each sweep runs to completion before the next tick fires, so there is
/// never more than one scan in flight.
pub fn start_timeout_scan_job(ctx: Context) {
    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize);
        let start = Instant::now() + Duration::from_secs(secs_to_next_run as u64);

        sleep_until(start).await;
        let mut minutely_interval = interval(Duration::from_secs(60));
        loop {
            minutely_interval.tick().await;
            match execute(CheckTaskTimeoutsUseCase::default(), &ctx).await {
                Ok(summary) => info!("Scheduled timeout scan completed. {}", summary),
                Err(e) => error!("Scheduled timeout scan failed. Error: {:?}", e),
            }
        }
    });
}
