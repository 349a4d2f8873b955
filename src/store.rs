use std::collections::HashMap;

use crate::apportion::ApportionRecord;
use crate::errors::StoreError;
use crate::model::{Fee, Payment};
use crate::types::PaymentId;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// storage collaborator boundary. the store owns the per-case transaction:
/// saves are staged, `commit` makes one case's writes durable as a unit, and
/// `rollback` discards everything staged since the last commit. a failed save
/// followed by rollback must leave nothing durable.
pub trait ApportionStore {
    /// fees for a case, creation time ascending
    fn find_fees_for_case(&self, ccd_case_number: &str) -> StoreResult<Vec<Fee>>;

    /// successful payments for a case, creation time ascending
    fn find_successful_payments_for_case(&self, ccd_case_number: &str) -> StoreResult<Vec<Payment>>;

    /// audit rows previously written for one payment
    fn find_apportionments_for_payment(&self, payment_id: PaymentId) -> StoreResult<Vec<ApportionRecord>>;

    /// stage an updated fee row
    fn save_fee_apportionment(&mut self, fee: &Fee) -> StoreResult<()>;

    /// stage one audit row
    fn save_audit_record(&mut self, record: &ApportionRecord) -> StoreResult<()>;

    /// make staged writes durable, all or nothing
    fn commit(&mut self) -> StoreResult<()>;

    /// discard staged writes
    fn rollback(&mut self);
}

/// in-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    cases: HashMap<String, CaseRows>,
    records: Vec<ApportionRecord>,
    staged_fees: Vec<Fee>,
    staged_records: Vec<ApportionRecord>,
}

#[derive(Debug, Default)]
struct CaseRows {
    fees: Vec<Fee>,
    payments: Vec<Payment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// seed a case with its fee and payment rows
    pub fn insert_case(
        &mut self,
        ccd_case_number: impl Into<String>,
        fees: Vec<Fee>,
        payments: Vec<Payment>,
    ) {
        self.cases
            .insert(ccd_case_number.into(), CaseRows { fees, payments });
    }

    /// all audit rows written so far
    pub fn records(&self) -> &[ApportionRecord] {
        &self.records
    }

    pub fn staged_write_count(&self) -> usize {
        self.staged_fees.len() + self.staged_records.len()
    }
}

impl ApportionStore for MemoryStore {
    fn find_fees_for_case(&self, ccd_case_number: &str) -> StoreResult<Vec<Fee>> {
        let rows = self
            .cases
            .get(ccd_case_number)
            .ok_or_else(|| StoreError::UnknownCase {
                ccd_case_number: ccd_case_number.to_string(),
            })?;
        let mut fees = rows.fees.clone();
        fees.sort_by_key(|fee| fee.date_created);
        Ok(fees)
    }

    fn find_successful_payments_for_case(&self, ccd_case_number: &str) -> StoreResult<Vec<Payment>> {
        let rows = self
            .cases
            .get(ccd_case_number)
            .ok_or_else(|| StoreError::UnknownCase {
                ccd_case_number: ccd_case_number.to_string(),
            })?;
        let mut payments: Vec<Payment> = rows
            .payments
            .iter()
            .filter(|payment| payment.is_success())
            .cloned()
            .collect();
        payments.sort_by_key(|payment| payment.date_created);
        Ok(payments)
    }

    fn find_apportionments_for_payment(&self, payment_id: PaymentId) -> StoreResult<Vec<ApportionRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.payment_id == payment_id)
            .cloned()
            .collect())
    }

    fn save_fee_apportionment(&mut self, fee: &Fee) -> StoreResult<()> {
        self.staged_fees.push(fee.clone());
        Ok(())
    }

    fn save_audit_record(&mut self, record: &ApportionRecord) -> StoreResult<()> {
        self.staged_records.push(record.clone());
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        for staged in std::mem::take(&mut self.staged_fees) {
            for rows in self.cases.values_mut() {
                if let Some(existing) = rows.fees.iter_mut().find(|fee| fee.id == staged.id) {
                    *existing = staged.clone();
                }
            }
        }
        self.records.append(&mut self.staged_records);
        Ok(())
    }

    fn rollback(&mut self) {
        self.staged_fees.clear();
        self.staged_records.clear();
    }
}
