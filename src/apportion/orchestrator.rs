use hourglass_rs::SafeTimeProvider;
use tracing::{info, warn};

use crate::errors::{PaymentError, Result, StoreError};
use crate::events::{Event, EventStore};
use crate::model::{Fee, Payment};
use crate::store::ApportionStore;

use super::{ApportionEngine, CaseApportionment, CaseBundle};

/// outcome of one batch run; the batch itself never fails
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub processed: usize,
    pub failures: Vec<CaseFailure>,
}

/// a bundle that failed, tagged with its case
#[derive(Debug)]
pub struct CaseFailure {
    pub ccd_case_number: String,
    pub error: PaymentError,
}

/// drives the apportionment engine across case bundles, committing each
/// case's fee and audit updates as one unit through the storage collaborator.
/// bundles are independent: one failure is reported and the batch moves on.
pub struct Apportioner<S: ApportionStore> {
    engine: ApportionEngine,
    store: S,
    events: EventStore,
}

impl<S: ApportionStore> Apportioner<S> {
    pub fn new(engine: ApportionEngine, store: S) -> Self {
        Self {
            engine,
            store,
            events: EventStore::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// drain the audit events collected so far
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// batch trigger: apportion each case bundle independently.
    /// re-running on unchanged bundles produces identical fee state, since
    /// the engine recomputes each case's allocation from scratch.
    pub fn process_fee_pay_apportion(&mut self, bundles: Vec<CaseBundle>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        info!(bundles = bundles.len(), "starting fee-pay apportionment batch");

        for mut bundle in bundles {
            let ccd_case_number = bundle.ccd_case_number.clone();
            match self.apportion_bundle(&mut bundle) {
                Ok(case) => {
                    info!(
                        ccd_case_number = %ccd_case_number,
                        allocations = case.records.len(),
                        surplus = %case.surplus,
                        shortfall = %case.shortfall,
                        "case apportioned"
                    );
                    outcome.processed += 1;
                }
                Err(error) => {
                    warn!(
                        ccd_case_number = %ccd_case_number,
                        %error,
                        "case apportionment failed, continuing batch"
                    );
                    outcome.failures.push(CaseFailure {
                        ccd_case_number,
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// load one case from the store and recompute its full allocation,
    /// the per-case unit of work a maintenance job drives
    pub fn process_case(&mut self, ccd_case_number: &str) -> Result<CaseApportionment> {
        let mut fees = self.store.find_fees_for_case(ccd_case_number)?;
        let payments = self
            .store
            .find_successful_payments_for_case(ccd_case_number)?;
        let case = self
            .engine
            .run(ccd_case_number, &mut fees, &payments, &mut self.events)?;
        self.commit_case(ccd_case_number, &fees, &case)?;
        Ok(case)
    }

    /// single-case trigger, invoked when a payment transitions to Success:
    /// walk this payment across the case's outstanding fees and commit.
    pub fn process_apportion(&mut self, payment: &Payment) -> Result<CaseApportionment> {
        let ccd_case_number = payment
            .case_identifier()
            .ok_or_else(|| PaymentError::PaymentNotLinkedToCase {
                reference: payment.reference.clone(),
            })?
            .to_string();

        let mut fees = match self.store.find_fees_for_case(&ccd_case_number) {
            Ok(fees) => fees,
            // no fees yet for the case: nothing to apportion
            Err(StoreError::UnknownCase { .. }) => {
                return Ok(CaseApportionment::new(ccd_case_number))
            }
            Err(source) => return Err(self.case_failure(&ccd_case_number, source)),
        };

        let case = self
            .engine
            .apply(&ccd_case_number, &mut fees, payment, &mut self.events)?;
        self.commit_case(&ccd_case_number, &fees, &case)?;
        Ok(case)
    }

    /// on a payment's transition to Success, reduce each apportioned fee's
    /// amount due by the amount this payment contributed.
    pub fn update_fee_amount_due(
        &mut self,
        payment: &Payment,
        time: &SafeTimeProvider,
    ) -> Result<usize> {
        let records = self.store.find_apportionments_for_payment(payment.id)?;
        if records.is_empty() {
            return Ok(0);
        }
        let ccd_case_number = payment
            .case_identifier()
            .ok_or_else(|| PaymentError::PaymentNotLinkedToCase {
                reference: payment.reference.clone(),
            })?
            .to_string();

        let mut fees = self.store.find_fees_for_case(&ccd_case_number)?;
        let mut updated = 0;
        for record in &records {
            let Some(fee) = fees.iter_mut().find(|fee| fee.id == record.fee_id) else {
                continue;
            };
            let old_amount_due = fee.amount_due;
            fee.amount_due = fee.amount_due - record.apportion_amount;
            self.events.emit(Event::AmountDueUpdated {
                fee_id: fee.id,
                payment_id: payment.id,
                old_amount_due,
                new_amount_due: fee.amount_due,
                timestamp: time.now(),
            });
            if let Err(source) = self.store.save_fee_apportionment(fee) {
                self.store.rollback();
                return Err(self.case_failure(&ccd_case_number, source));
            }
            updated += 1;
        }
        if let Err(source) = self.store.commit() {
            self.store.rollback();
            return Err(self.case_failure(&ccd_case_number, source));
        }
        Ok(updated)
    }

    fn apportion_bundle(&mut self, bundle: &mut CaseBundle) -> Result<CaseApportionment> {
        let case = self.engine.run(
            &bundle.ccd_case_number,
            &mut bundle.fees,
            &bundle.payments,
            &mut self.events,
        )?;
        self.commit_case(&bundle.ccd_case_number, &bundle.fees, &case)?;
        Ok(case)
    }

    /// persist one case's fee updates and audit rows as a single unit;
    /// any failure rolls the whole case back
    fn commit_case(
        &mut self,
        ccd_case_number: &str,
        fees: &[Fee],
        case: &CaseApportionment,
    ) -> Result<()> {
        let touched: Vec<&Fee> = fees
            .iter()
            .filter(|fee| case.records.iter().any(|record| record.fee_id == fee.id))
            .collect();

        for fee in touched {
            if let Err(source) = self.store.save_fee_apportionment(fee) {
                self.store.rollback();
                return Err(self.case_failure(ccd_case_number, source));
            }
        }
        for record in &case.records {
            if let Err(source) = self.store.save_audit_record(record) {
                self.store.rollback();
                return Err(self.case_failure(ccd_case_number, source));
            }
        }
        if let Err(source) = self.store.commit() {
            self.store.rollback();
            return Err(self.case_failure(ccd_case_number, source));
        }
        Ok(())
    }

    fn case_failure(&self, ccd_case_number: &str, source: StoreError) -> PaymentError {
        PaymentError::ApportionmentFailure {
            ccd_case_number: ccd_case_number.to_string(),
            source,
        }
    }
}
