// src/readiness/poller.rs

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::errors::WaitError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::readiness::condition::{ReadinessCondition, ReadinessTarget};

/// Block until `condition` holds, probing every `interval`.
///
/// Gives up with [`WaitError::Timeout`] once `timeout` has elapsed, even if a
/// probe is still in flight.
pub async fn wait(
    condition: &ReadinessCondition,
    timeout: Duration,
    interval: Duration,
) -> Result<(), WaitError> {
    wait_with(&RealFileSystem, condition, timeout, interval).await
}

/// Same as [`wait`], with file probes going through `fs`.
pub async fn wait_with(
    fs: &dyn FileSystem,
    condition: &ReadinessCondition,
    budget: Duration,
    interval: Duration,
) -> Result<(), WaitError> {
    info!(
        condition = %condition,
        timeout_ms = budget.as_millis() as u64,
        interval_ms = interval.as_millis() as u64,
        "waiting for readiness condition"
    );

    let start = Instant::now();
    let deadline = start + budget;
    let mut attempts: u32 = 0;
    let mut last_error: Option<String> = None;

    let polled = timeout(budget, async {
        loop {
            attempts += 1;
            match probe(fs, condition, deadline).await {
                Ok(()) => break,
                Err(reason) => {
                    debug!(condition = %condition, attempt = attempts, %reason, "not ready yet");
                    last_error = Some(reason);
                }
            }
            sleep(interval).await;
        }
    })
    .await;

    match polled {
        Ok(()) => {
            info!(
                condition = %condition,
                attempts,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "readiness condition satisfied"
            );
            Ok(())
        }
        Err(_) => {
            warn!(condition = %condition, attempts, "readiness wait timed out");
            Err(WaitError::Timeout {
                condition: condition.to_string(),
                timeout: budget,
                attempts,
                last_error,
            })
        }
    }
}

/// One readiness check. `Err` carries why the target is not ready yet.
async fn probe(
    fs: &dyn FileSystem,
    condition: &ReadinessCondition,
    deadline: Instant,
) -> Result<(), String> {
    match condition.target() {
        ReadinessTarget::Tcp { host, port } => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match timeout(remaining, TcpStream::connect((host.as_str(), *port))).await {
                Ok(Ok(_stream)) => Ok(()),
                Ok(Err(e)) => Err(format!("connect to {host}:{port}: {e}")),
                Err(_) => Err(format!("connect to {host}:{port}: timed out")),
            }
        }
        ReadinessTarget::File { path } => {
            if fs.exists(path) {
                Ok(())
            } else {
                Err(format!("{} does not exist", path.display()))
            }
        }
    }
}
