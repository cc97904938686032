use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::lifecycle::{CancelOrigin, LifecycleError, RequestLifecycle};
use crate::models::PaymentStatus;

/// Outcome of one sweep run, surfaced to the job runner's log.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub cancelled: usize,
    pub failed: usize,
}

impl RequestLifecycle {
    /// Auto-cancel approved requests whose payment deadline has lapsed.
    ///
    /// Each candidate is first marked overdue, then run through the normal
    /// cancel transition with the system origin. Per-item failures are
    /// logged and skipped; one bad record never aborts the batch.
    pub async fn sweep_overdue(
        &self,
        now: DateTime<Utc>,
    ) -> Result<SweepReport, LifecycleError> {
        let lapsed = self.requests().list_payment_lapsed(now).await?;
        let mut report = SweepReport {
            scanned: lapsed.len(),
            ..SweepReport::default()
        };

        for mut request in lapsed {
            if request.payment_status == PaymentStatus::Unpaid {
                request.payment_status = PaymentStatus::Overdue;
                request.touch();
                if let Err(err) = self.requests().replace(&request).await {
                    error!(request = %request.id, error = %err, "failed to mark payment overdue");
                    report.failed += 1;
                    continue;
                }
            }
            match self.cancel(request.id, CancelOrigin::System).await {
                Ok(_) => report.cancelled += 1,
                Err(err) => {
                    error!(request = %request.id, error = %err, "auto-cancellation failed");
                    report.failed += 1;
                }
            }
        }

        if report.scanned > 0 {
            info!(
                scanned = report.scanned,
                cancelled = report.cancelled,
                failed = report.failed,
                "overdue payment sweep finished"
            );
        }
        Ok(report)
    }
}
