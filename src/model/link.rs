use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::events::{Event, EventStore};
use crate::model::fee::{Fee, Remission};
use crate::model::payment::Payment;

/// aggregate grouping fees and payments under one case reference.
/// all apportionment is scoped to a single link; no fee or payment
/// belongs to more than one link at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFeeLink {
    /// the group's own checksum-validated reference
    pub payment_reference: String,
    pub case_reference: Option<String>,
    pub ccd_case_number: Option<String>,
    pub org_id: Option<String>,
    pub enterprise_service_name: Option<String>,
    pub fees: Vec<Fee>,
    pub payments: Vec<Payment>,
}

impl PaymentFeeLink {
    pub fn new(payment_reference: impl Into<String>) -> Self {
        Self {
            payment_reference: payment_reference.into(),
            case_reference: None,
            ccd_case_number: None,
            org_id: None,
            enterprise_service_name: None,
            fees: Vec::new(),
            payments: Vec::new(),
        }
    }

    pub fn with_ccd_case_number(mut self, ccd: impl Into<String>) -> Self {
        self.ccd_case_number = Some(ccd.into());
        self
    }

    pub fn with_case_reference(mut self, case_ref: impl Into<String>) -> Self {
        self.case_reference = Some(case_ref.into());
        self
    }

    pub fn with_fees(mut self, fees: Vec<Fee>) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_payments(mut self, payments: Vec<Payment>) -> Self {
        self.payments = payments;
        self
    }

    /// case identity: ccd case number preferred, case reference fallback
    pub fn case_identifier(&self) -> Option<&str> {
        self.ccd_case_number
            .as_deref()
            .or(self.case_reference.as_deref())
    }

    /// order fees and payments by creation date ascending,
    /// the order apportionment walks them in
    pub fn sort_for_apportionment(&mut self) {
        self.fees.sort_by_key(|fee| fee.date_created);
        self.payments.sort_by_key(|payment| payment.date_created);
    }

    /// apply a help-with-fees remission to the matching fee.
    /// returns the fee's new net amount, or None when no fee carries the code.
    pub fn apply_remission(&mut self, remission: &Remission, events: &mut EventStore) -> Option<Money> {
        let fee = self
            .fees
            .iter_mut()
            .find(|fee| fee.code == remission.fee_code)?;
        let new_net_amount = fee.apply_remission(remission.hwf_amount);
        events.emit(Event::RemissionApplied {
            fee_id: fee.id,
            hwf_reference: remission.hwf_reference.clone(),
            hwf_amount: remission.hwf_amount,
            new_net_amount,
            timestamp: remission.date_created,
        });
        Some(new_net_amount)
    }

    /// successful payments in receipt order, oldest first
    pub fn successful_payments(&self) -> Vec<Payment> {
        let mut payments: Vec<Payment> = self
            .payments
            .iter()
            .filter(|payment| payment.is_success())
            .cloned()
            .collect();
        payments.sort_by_key(|payment| payment.date_created);
        payments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, PaymentStatus, ServiceType};
    use chrono::{Duration, Utc};

    #[test]
    fn test_successful_payments_sorted_oldest_first() {
        let now = Utc::now();
        let older = Payment::builder()
            .amount(Money::from_major(50))
            .reference("RC-1111")
            .service_type(ServiceType::Divorce)
            .method(PaymentMethod::Card)
            .status(PaymentStatus::Success)
            .date_created(now - Duration::minutes(10))
            .build()
            .unwrap();
        let newer = Payment::builder()
            .amount(Money::from_major(40))
            .reference("RC-2222")
            .service_type(ServiceType::Divorce)
            .method(PaymentMethod::Card)
            .status(PaymentStatus::Success)
            .date_created(now)
            .build()
            .unwrap();
        let failed = Payment::builder()
            .amount(Money::from_major(99))
            .reference("RC-3333")
            .service_type(ServiceType::Divorce)
            .method(PaymentMethod::Card)
            .status(PaymentStatus::Failed)
            .date_created(now - Duration::minutes(5))
            .build()
            .unwrap();

        let link = PaymentFeeLink::new("2021-1111222233")
            .with_payments(vec![newer.clone(), failed, older.clone()]);

        let successful = link.successful_payments();
        assert_eq!(successful.len(), 2);
        assert_eq!(successful[0].reference, older.reference);
        assert_eq!(successful[1].reference, newer.reference);
    }

    #[test]
    fn test_remission_applies_to_matching_fee() {
        let fee = Fee::builder()
            .code("FEE0226")
            .calculated_amount(Money::from_major(550))
            .date_created(Utc::now())
            .build()
            .unwrap();
        let mut link = PaymentFeeLink::new("2021-1111222233").with_fees(vec![fee]);
        let mut events = EventStore::new();

        let remission = Remission {
            hwf_reference: "HWF-A1B-23C".to_string(),
            fee_code: "FEE0226".to_string(),
            hwf_amount: Money::from_major(150),
            date_created: Utc::now(),
        };
        let new_net = link.apply_remission(&remission, &mut events);
        assert_eq!(new_net, Some(Money::from_major(400)));
        assert_eq!(link.fees[0].net_amount, Money::from_major(400));
        assert_eq!(events.events().len(), 1);

        let miss = Remission {
            fee_code: "FEE9999".to_string(),
            ..remission
        };
        assert_eq!(link.apply_remission(&miss, &mut events), None);
    }
}
