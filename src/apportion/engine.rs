use crate::config::ApportionConfig;
use crate::errors::{PaymentError, Result};
use crate::events::{Event, EventStore};
use crate::model::{Fee, Payment};

use super::{ApportionRecord, CaseApportionment};

/// apportionment engine: allocates successful payments across a case's fees.
///
/// pure and stateless; fee and payment data is supplied in memory and the
/// caller owns persistence. within one case, payments are walked in receipt
/// order (oldest first) and fees in creation order — changing either order
/// changes the allocation, so both are part of the contract, not an
/// optimization.
pub struct ApportionEngine {
    config: ApportionConfig,
}

impl Default for ApportionEngine {
    fn default() -> Self {
        Self::new(ApportionConfig::default())
    }
}

impl ApportionEngine {
    pub fn new(config: ApportionConfig) -> Self {
        Self { config }
    }

    /// full recompute across the case: resets every eligible fee's running
    /// totals, then folds each successful payment through the fee walk.
    /// running twice on unchanged inputs yields identical fee state.
    pub fn run(
        &self,
        ccd_case_number: &str,
        fees: &mut [Fee],
        payments: &[Payment],
        events: &mut EventStore,
    ) -> Result<CaseApportionment> {
        self.validate(fees, payments)?;

        fees.sort_by_key(|fee| fee.date_created);
        for fee in fees.iter_mut().filter(|fee| self.fee_eligible(fee)) {
            fee.reset_apportionment();
        }

        let mut eligible: Vec<&Payment> = payments
            .iter()
            .filter(|payment| payment.is_success() && self.payment_eligible(payment))
            .collect();
        eligible.sort_by_key(|payment| payment.date_created);
        let applied = eligible.len();

        let mut outcome = CaseApportionment::new(ccd_case_number);
        for payment in eligible {
            self.walk_fees(ccd_case_number, fees, payment, &mut outcome, events);
        }

        self.finish(ccd_case_number, fees, applied, &mut outcome, events);
        Ok(outcome)
    }

    /// incremental walk of one successful payment against the fees' current
    /// running totals, used when a payment transitions to Success. a payment
    /// in any other status is ignored.
    pub fn apply(
        &self,
        ccd_case_number: &str,
        fees: &mut [Fee],
        payment: &Payment,
        events: &mut EventStore,
    ) -> Result<CaseApportionment> {
        self.validate(fees, std::slice::from_ref(payment))?;

        let mut outcome = CaseApportionment::new(ccd_case_number);
        if !payment.is_success() || !self.payment_eligible(payment) {
            return Ok(outcome);
        }

        fees.sort_by_key(|fee| fee.date_created);
        self.walk_fees(ccd_case_number, fees, payment, &mut outcome, events);
        self.finish(ccd_case_number, fees, 1, &mut outcome, events);
        Ok(outcome)
    }

    /// fail fast before any fee is mutated
    fn validate(&self, fees: &[Fee], payments: &[Payment]) -> Result<()> {
        for fee in fees {
            if fee.calculated_amount.is_negative() {
                return Err(PaymentError::MalformedCaseData {
                    message: format!(
                        "fee {} has negative calculated amount {}",
                        fee.code, fee.calculated_amount
                    ),
                });
            }
        }
        for payment in payments {
            if !payment.amount.is_positive() {
                return Err(PaymentError::MalformedCaseData {
                    message: format!(
                        "payment {} has non-positive amount {}",
                        payment.reference, payment.amount
                    ),
                });
            }
        }
        Ok(())
    }

    fn fee_eligible(&self, fee: &Fee) -> bool {
        match self.config.apportion_live_date {
            Some(live) => fee.date_created >= live,
            None => true,
        }
    }

    fn payment_eligible(&self, payment: &Payment) -> bool {
        match self.config.apportion_live_date {
            Some(live) => payment.date_created >= live,
            None => true,
        }
    }

    /// greedy fee-priority walk: allocate min(remaining, outstanding) to each
    /// fee in creation order until the payment is used up. leftover is surplus;
    /// no fee ever receives more than its net liability.
    fn walk_fees(
        &self,
        ccd_case_number: &str,
        fees: &mut [Fee],
        payment: &Payment,
        outcome: &mut CaseApportionment,
        events: &mut EventStore,
    ) {
        let mut remaining = payment.amount;

        for fee in fees.iter_mut() {
            if !self.fee_eligible(fee) {
                continue;
            }
            let outstanding = fee.outstanding();
            if outstanding.is_zero() {
                // fully covered already, or fully remitted (net of zero)
                continue;
            }

            let slice = remaining.min(outstanding);
            fee.record_allocation(slice, payment.date_created);
            remaining -= slice;

            outcome.records.push(ApportionRecord {
                id: uuid::Uuid::new_v4(),
                fee_id: fee.id,
                payment_id: payment.id,
                ccd_case_number: ccd_case_number.to_string(),
                fee_amount: fee.net_amount,
                payment_amount: payment.amount,
                apportion_amount: slice,
                allocated_amount: fee.current_apportion_amount,
                is_fully_apportioned: fee.is_fully_apportioned(),
                created_by: "SYSTEM".to_string(),
                date_created: payment.date_created,
            });
            events.emit(Event::FeeApportioned {
                ccd_case_number: ccd_case_number.to_string(),
                fee_id: fee.id,
                payment_id: payment.id,
                apportion_amount: slice,
                allocated_amount: fee.current_apportion_amount,
                timestamp: payment.date_created,
            });

            if remaining.is_zero() {
                break;
            }
        }

        if remaining.is_positive() {
            outcome.surplus += remaining;
            events.emit(Event::SurplusRecorded {
                ccd_case_number: ccd_case_number.to_string(),
                payment_id: payment.id,
                surplus: remaining,
                timestamp: payment.date_created,
            });
        }
    }

    fn finish(
        &self,
        ccd_case_number: &str,
        fees: &[Fee],
        payments_applied: usize,
        outcome: &mut CaseApportionment,
        events: &mut EventStore,
    ) {
        outcome.shortfall = fees
            .iter()
            .filter(|fee| self.fee_eligible(fee))
            .map(|fee| fee.outstanding())
            .sum();

        if let Some(last) = outcome.records.last() {
            if outcome.shortfall.is_positive() {
                events.emit(Event::ShortfallRecorded {
                    ccd_case_number: ccd_case_number.to_string(),
                    shortfall: outcome.shortfall,
                    timestamp: last.date_created,
                });
            }
            events.emit(Event::CaseApportioned {
                ccd_case_number: ccd_case_number.to_string(),
                fees_touched: outcome
                    .records
                    .iter()
                    .map(|record| record.fee_id)
                    .collect::<std::collections::HashSet<_>>()
                    .len(),
                payments_applied,
                timestamp: last.date_created,
            });
        }
    }
}
