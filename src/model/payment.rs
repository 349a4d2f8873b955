use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{PaymentError, Result};
use crate::types::{Currency, PaymentChannel, PaymentId, PaymentMethod, PaymentProvider, PaymentStatus, ServiceType};

/// one money movement linked to zero-or-one case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// always positive
    pub amount: Money,
    /// globally unique, checksum-validated
    pub reference: String,
    pub status: PaymentStatus,
    pub channel: Option<PaymentChannel>,
    pub method: PaymentMethod,
    pub provider: Option<PaymentProvider>,
    pub ccd_case_number: Option<String>,
    pub case_reference: Option<String>,
    pub service_type: ServiceType,
    pub currency: Currency,
    /// owner who initiated the payment
    pub user_id: Option<String>,
    pub date_created: DateTime<Utc>,
}

impl Payment {
    pub fn builder() -> PaymentBuilder {
        PaymentBuilder::new()
    }

    /// case identity for matching: ccd case number preferred,
    /// case reference as fallback
    pub fn case_identifier(&self) -> Option<&str> {
        self.ccd_case_number
            .as_deref()
            .or(self.case_reference.as_deref())
    }

    pub fn is_success(&self) -> bool {
        self.status == PaymentStatus::Success
    }

    /// one-directional transition: Initiated -> Success
    pub fn mark_success(&mut self) -> Result<PaymentStatus> {
        self.transition(PaymentStatus::Success)
    }

    /// one-directional transition: Initiated -> Failed
    pub fn mark_failed(&mut self) -> Result<PaymentStatus> {
        self.transition(PaymentStatus::Failed)
    }

    fn transition(&mut self, to: PaymentStatus) -> Result<PaymentStatus> {
        if self.status.is_terminal() {
            return Err(PaymentError::InvalidStatusTransition {
                from: self.status,
                to,
            });
        }
        let old = self.status;
        self.status = to;
        Ok(old)
    }
}

/// builder for payments
#[derive(Debug, Default)]
pub struct PaymentBuilder {
    amount: Option<Money>,
    reference: Option<String>,
    status: Option<PaymentStatus>,
    channel: Option<PaymentChannel>,
    method: Option<PaymentMethod>,
    provider: Option<PaymentProvider>,
    ccd_case_number: Option<String>,
    case_reference: Option<String>,
    service_type: Option<ServiceType>,
    user_id: Option<String>,
    date_created: Option<DateTime<Utc>>,
}

impl PaymentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn channel(mut self, channel: PaymentChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn method(mut self, method: PaymentMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn provider(mut self, provider: PaymentProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn ccd_case_number(mut self, ccd: impl Into<String>) -> Self {
        self.ccd_case_number = Some(ccd.into());
        self
    }

    pub fn case_reference(mut self, case_ref: impl Into<String>) -> Self {
        self.case_reference = Some(case_ref.into());
        self
    }

    pub fn service_type(mut self, service: ServiceType) -> Self {
        self.service_type = Some(service);
        self
    }

    pub fn user_id(mut self, user: impl Into<String>) -> Self {
        self.user_id = Some(user.into());
        self
    }

    pub fn date_created(mut self, date: DateTime<Utc>) -> Self {
        self.date_created = Some(date);
        self
    }

    pub fn build(self) -> Result<Payment> {
        let reference = self.reference.ok_or_else(|| PaymentError::MalformedCaseData {
            message: "payment reference is required".to_string(),
        })?;
        let amount = self.amount.ok_or_else(|| PaymentError::MalformedCaseData {
            message: format!("payment {reference} has no amount"),
        })?;
        if !amount.is_positive() {
            return Err(PaymentError::InvalidPaymentAmount { amount });
        }
        let service_type = self.service_type.ok_or_else(|| PaymentError::MalformedCaseData {
            message: format!("payment {reference} has no service type"),
        })?;
        let method = self.method.ok_or_else(|| PaymentError::MalformedCaseData {
            message: format!("payment {reference} has no method"),
        })?;
        let date_created = self.date_created.ok_or_else(|| PaymentError::MalformedCaseData {
            message: format!("payment {reference} has no creation date"),
        })?;

        Ok(Payment {
            id: Uuid::new_v4(),
            amount,
            reference,
            status: self.status.unwrap_or(PaymentStatus::Initiated),
            channel: self.channel,
            method,
            provider: self.provider,
            ccd_case_number: self.ccd_case_number,
            case_reference: self.case_reference,
            service_type,
            currency: Currency::Gbp,
            user_id: self.user_id,
            date_created,
        })
    }
}
