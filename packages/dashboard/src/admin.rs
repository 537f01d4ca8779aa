use std::sync::Arc;
use std::time::Duration;

use api::{AdminApi, ApiError};
use tracing::{debug, error, info};

/// Result of one auto-close check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoCloseOutcome {
    NoActiveHackathon,
    AwaitingSubmissions,
    /// Every team had submitted and the running hackathon was closed.
    Closed { name: Option<String> },
}

/// Close the running hackathon if every assigned team has submitted.
pub async fn close_if_all_submitted(api: &dyn AdminApi) -> Result<AutoCloseOutcome, ApiError> {
    let status = api.hackathon_status().await?;
    if !status.is_active {
        return Ok(AutoCloseOutcome::NoActiveHackathon);
    }

    if !api.solutions_status().await?.all_submitted {
        return Ok(AutoCloseOutcome::AwaitingSubmissions);
    }

    api.close_hackathon(None).await?;
    info!(name = ?status.name, "All teams submitted, hackathon closed");
    Ok(AutoCloseOutcome::Closed { name: status.name })
}

/// Run the auto-close check as a background task.
pub async fn run_auto_close(api: Arc<dyn AdminApi>, period: Duration) {
    info!(
        interval_secs = period.as_secs(),
        "Starting hackathon auto-close check"
    );

    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;

        match close_if_all_submitted(api.as_ref()).await {
            Ok(outcome) => debug!(?outcome, "Auto-close check finished"),
            Err(ApiError::Unauthorized) => {
                error!("Admin token rejected, stopping auto-close check");
                return;
            }
            Err(e) => error!(error = %e, "Auto-close check failed"),
        }
    }
}
