//! Folding per-file bucket results into the run-wide aggregate
//!
//! `fold` is plain field-wise addition over exact decimals, so the final
//! report does not depend on the order files finish in. Sums that would leave
//! the decimal range are rejected and the report passed in stays as it was.

use crate::app::models::{AggregateReport, PaymentType, TaxBucketResult, TaxCategory};
use crate::{Error, Result};

/// Add each of the six fields of `result` into the matching report total
pub fn fold(report: AggregateReport, result: &TaxBucketResult) -> Result<AggregateReport> {
    let mut next = report;
    for category in TaxCategory::ALL {
        let totals = next.category_mut(category);
        for payment in PaymentType::ALL {
            let slot = match payment {
                PaymentType::Card => &mut totals.card,
                PaymentType::Cash => &mut totals.cash,
                PaymentType::Other => &mut totals.other,
            };
            *slot = slot
                .checked_add(result.get(category, payment))
                .ok_or_else(|| Error::amount_overflow("running totals"))?;
        }
    }
    next.checked_grand_total()
        .ok_or_else(|| Error::amount_overflow("running totals"))?;
    Ok(next)
}

/// Fold a sequence of results into a fresh report; no results gives an empty report
pub fn aggregate<'a, I>(results: I) -> Result<AggregateReport>
where
    I: IntoIterator<Item = &'a TaxBucketResult>,
{
    results
        .into_iter()
        .try_fold(AggregateReport::default(), fold)
}
