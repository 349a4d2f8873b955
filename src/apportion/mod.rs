pub mod engine;
pub mod orchestrator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::model::{Fee, Payment};
use crate::types::{FeeId, PaymentId};

pub use engine::ApportionEngine;
pub use orchestrator::{Apportioner, BatchOutcome, CaseFailure};

/// one case's worth of work for the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseBundle {
    pub ccd_case_number: String,
    pub fees: Vec<Fee>,
    pub payments: Vec<Payment>,
}

impl CaseBundle {
    pub fn new(ccd_case_number: impl Into<String>, fees: Vec<Fee>, payments: Vec<Payment>) -> Self {
        Self {
            ccd_case_number: ccd_case_number.into(),
            fees,
            payments,
        }
    }
}

/// audit row for one (fee, payment) allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApportionRecord {
    pub id: Uuid,
    pub fee_id: FeeId,
    pub payment_id: PaymentId,
    pub ccd_case_number: String,
    /// fee net liability at the time of allocation
    pub fee_amount: Money,
    pub payment_amount: Money,
    /// slice of this payment allocated to this fee
    pub apportion_amount: Money,
    /// fee's cumulative allocation after this slice
    pub allocated_amount: Money,
    pub is_fully_apportioned: bool,
    pub created_by: String,
    pub date_created: DateTime<Utc>,
}

/// result of one apportionment pass over a case
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CaseApportionment {
    pub ccd_case_number: String,
    pub records: Vec<ApportionRecord>,
    /// payment amount received beyond total fee liability
    pub surplus: Money,
    /// fee liability left uncovered by the payments processed
    pub shortfall: Money,
}

impl CaseApportionment {
    pub fn new(ccd_case_number: impl Into<String>) -> Self {
        Self {
            ccd_case_number: ccd_case_number.into(),
            ..Self::default()
        }
    }

    pub fn total_apportioned(&self) -> Money {
        self.records.iter().map(|record| record.apportion_amount).sum()
    }
}
