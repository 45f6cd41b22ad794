//! Bulk submission of wizard entries

use ledger_core::{ActivityWithEmission, PeriodId};
use ledger_wizard::ActivityWizard;
use tracing::{debug, info, warn};

use crate::api::LedgerApi;
use crate::error::ApiResult;

/// Send every buffered entry to `period` in one bulk request
///
/// On success the wizard is reset and the backend's computed activities are
/// returned. On failure the entries are put back into the buffer so nothing
/// the user typed is lost. An empty buffer sends nothing.
///
/// # Errors
/// Whatever the API returns; the wizard buffer is unchanged in that case.
pub async fn submit_entries<A>(
    api: &A,
    wizard: &mut ActivityWizard,
    period: PeriodId,
) -> ApiResult<Vec<ActivityWithEmission>>
where
    A: LedgerApi + ?Sized,
{
    if wizard.entries().is_empty() {
        debug!(%period, "nothing to submit");
        return Ok(Vec::new());
    }

    let preview_kg = wizard.total_co2e();
    let entries = wizard.take_entries();
    let count = entries.len();

    match api.bulk_create_activities(period, &entries).await {
        Ok(created) => {
            let computed_kg: f64 = created.iter().map(|a| a.co2e_kg).sum();
            info!(%period, count, preview_kg, computed_kg, "activities submitted");
            wizard.reset();
            Ok(created)
        }
        Err(err) => {
            warn!(%period, count, error = %err, "submission failed, entries kept");
            if let Err(restore) = wizard.restore_entries(entries) {
                warn!(%period, error = %restore, "buffered entries could not be restored");
            }
            Err(err)
        }
    }
}
