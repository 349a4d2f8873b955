use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{PaymentError, Result};
use crate::types::FeeId;

/// one chargeable item within a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    pub id: FeeId,
    /// fee register code, not unique across cases
    pub code: String,
    pub version: String,
    /// unit count; None when the request did not specify one
    pub volume: Option<u32>,
    /// nominal fee amount
    pub calculated_amount: Money,
    /// liability after remission, never above calculated_amount
    pub net_amount: Money,
    /// running total already allocated from payments
    pub current_apportion_amount: Money,
    /// cumulative allocation, capped at net_amount
    pub allocated_amount: Money,
    /// calculated_amount less amounts paid off by successful payments
    pub amount_due: Money,
    pub date_created: DateTime<Utc>,
    pub date_apportioned: Option<DateTime<Utc>>,
}

impl Fee {
    pub fn builder() -> FeeBuilder {
        FeeBuilder::new()
    }

    /// liability not yet covered by payments, clamped at zero
    pub fn outstanding(&self) -> Money {
        self.net_amount.saturating_sub(self.current_apportion_amount)
    }

    pub fn is_fully_apportioned(&self) -> bool {
        self.current_apportion_amount >= self.net_amount
    }

    /// reduce the net liability by a help-with-fees amount, clamped at zero.
    /// already-apportioned totals are never clawed back.
    pub fn apply_remission(&mut self, hwf_amount: Money) -> Money {
        self.net_amount = self.calculated_amount.saturating_sub(hwf_amount);
        self.net_amount
    }

    /// clear running totals ahead of a full recompute
    pub fn reset_apportionment(&mut self) {
        self.current_apportion_amount = Money::ZERO;
        self.allocated_amount = Money::ZERO;
        self.date_apportioned = None;
    }

    /// fold one payment slice into the running totals
    pub fn record_allocation(&mut self, slice: Money, when: DateTime<Utc>) {
        self.current_apportion_amount += slice;
        self.allocated_amount = self.current_apportion_amount;
        self.date_apportioned = Some(when);
    }
}

/// help-with-fees remission against one fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remission {
    pub hwf_reference: String,
    pub fee_code: String,
    pub hwf_amount: Money,
    pub date_created: DateTime<Utc>,
}

/// builder for fees
#[derive(Debug, Default)]
pub struct FeeBuilder {
    code: Option<String>,
    version: Option<String>,
    volume: Option<u32>,
    calculated_amount: Option<Money>,
    net_amount: Option<Money>,
    date_created: Option<DateTime<Utc>>,
}

impl FeeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn volume(mut self, volume: u32) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn calculated_amount(mut self, amount: Money) -> Self {
        self.calculated_amount = Some(amount);
        self
    }

    /// explicit net amount; defaults to the calculated amount
    pub fn net_amount(mut self, amount: Money) -> Self {
        self.net_amount = Some(amount);
        self
    }

    pub fn date_created(mut self, date: DateTime<Utc>) -> Self {
        self.date_created = Some(date);
        self
    }

    pub fn build(self) -> Result<Fee> {
        let code = self.code.ok_or_else(|| PaymentError::MalformedCaseData {
            message: "fee code is required".to_string(),
        })?;
        let calculated_amount =
            self.calculated_amount
                .ok_or_else(|| PaymentError::MalformedCaseData {
                    message: format!("fee {code} has no calculated amount"),
                })?;
        if calculated_amount.is_negative() {
            return Err(PaymentError::MalformedCaseData {
                message: format!("fee {code} has negative calculated amount {calculated_amount}"),
            });
        }
        let date_created = self.date_created.ok_or_else(|| PaymentError::MalformedCaseData {
            message: format!("fee {code} has no creation date"),
        })?;

        let net_amount = self.net_amount.unwrap_or(calculated_amount);
        Ok(Fee {
            id: Uuid::new_v4(),
            code,
            version: self.version.unwrap_or_else(|| "1".to_string()),
            volume: self.volume,
            calculated_amount,
            net_amount,
            current_apportion_amount: Money::ZERO,
            allocated_amount: Money::ZERO,
            amount_due: calculated_amount,
            date_created,
            date_apportioned: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a_fee(calculated: i64) -> Fee {
        Fee::builder()
            .code("FEE0001")
            .version("1")
            .volume(1)
            .calculated_amount(Money::from_major(calculated))
            .date_created(Utc::now())
            .build()
            .unwrap()
    }

    #[test]
    fn test_net_defaults_to_calculated() {
        let fee = a_fee(550);
        assert_eq!(fee.net_amount, Money::from_major(550));
        assert_eq!(fee.amount_due, Money::from_major(550));
        assert_eq!(fee.outstanding(), Money::from_major(550));
    }

    #[test]
    fn test_remission_reduces_net() {
        let mut fee = a_fee(550);
        fee.apply_remission(Money::from_major(100));
        assert_eq!(fee.net_amount, Money::from_major(450));
        assert_eq!(fee.outstanding(), Money::from_major(450));
    }

    #[test]
    fn test_remission_clamps_at_zero() {
        let mut fee = a_fee(100);
        fee.apply_remission(Money::from_major(250));
        assert_eq!(fee.net_amount, Money::ZERO);
        assert!(fee.is_fully_apportioned());
    }

    #[test]
    fn test_allocation_never_claws_back() {
        let mut fee = a_fee(100);
        fee.record_allocation(Money::from_major(100), Utc::now());
        assert!(fee.is_fully_apportioned());

        // a later remission shrinks net below the apportioned total;
        // outstanding clamps at zero rather than going negative
        fee.apply_remission(Money::from_major(50));
        assert_eq!(fee.outstanding(), Money::ZERO);
        assert_eq!(fee.current_apportion_amount, Money::from_major(100));
    }

    #[test]
    fn test_negative_calculated_amount_rejected() {
        let result = Fee::builder()
            .code("FEE0001")
            .calculated_amount(Money::ZERO - Money::from_major(10))
            .date_created(Utc::now())
            .build();
        assert!(matches!(
            result,
            Err(PaymentError::MalformedCaseData { .. })
        ));
    }

    #[test]
    fn test_reset_clears_running_totals() {
        let mut fee = a_fee(80);
        fee.record_allocation(Money::from_major(30), Utc::now());
        fee.reset_apportionment();
        assert_eq!(fee.current_apportion_amount, Money::ZERO);
        assert_eq!(fee.allocated_amount, Money::ZERO);
        assert!(fee.date_apportioned.is_none());
    }
}
