use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{FeeId, PaymentId, PaymentStatus};

/// all audit events emitted while processing a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // apportionment events
    FeeApportioned {
        ccd_case_number: String,
        fee_id: FeeId,
        payment_id: PaymentId,
        apportion_amount: Money,
        allocated_amount: Money,
        timestamp: DateTime<Utc>,
    },
    SurplusRecorded {
        ccd_case_number: String,
        payment_id: PaymentId,
        surplus: Money,
        timestamp: DateTime<Utc>,
    },
    ShortfallRecorded {
        ccd_case_number: String,
        shortfall: Money,
        timestamp: DateTime<Utc>,
    },
    CaseApportioned {
        ccd_case_number: String,
        fees_touched: usize,
        payments_applied: usize,
        timestamp: DateTime<Utc>,
    },

    // fee lifecycle events
    RemissionApplied {
        fee_id: FeeId,
        hwf_reference: String,
        hwf_amount: Money,
        new_net_amount: Money,
        timestamp: DateTime<Utc>,
    },
    AmountDueUpdated {
        fee_id: FeeId,
        payment_id: PaymentId,
        old_amount_due: Money,
        new_amount_due: Money,
        timestamp: DateTime<Utc>,
    },

    // payment lifecycle events
    PaymentStatusChanged {
        payment_id: PaymentId,
        old_status: PaymentStatus,
        new_status: PaymentStatus,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting audit events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
