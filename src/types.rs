use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a fee
pub type FeeId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// payment created, outcome not yet known
    Initiated,
    /// gateway confirmed the money movement
    Success,
    /// gateway rejected or the payer abandoned
    Failed,
}

impl PaymentStatus {
    /// terminal statuses never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Failed)
    }
}

/// channel the payment arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentChannel {
    Online,
    Telephony,
    DigitalBar,
    Bulk,
}

impl fmt::Display for PaymentChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentChannel::Online => "online",
            PaymentChannel::Telephony => "telephony",
            PaymentChannel::DigitalBar => "digital bar",
            PaymentChannel::Bulk => "bulk scan",
        };
        write!(f, "{name}")
    }
}

/// payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Card,
    PaymentByAccount,
    Cheque,
    Cash,
    PostalOrder,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentMethod::Card => "card",
            PaymentMethod::PaymentByAccount => "payment by account",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Cash => "cash",
            PaymentMethod::PostalOrder => "postal order",
        };
        write!(f, "{name}")
    }
}

/// external provider that executed the payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentProvider {
    GovPay,
    PciPal,
    Middle,
}

/// client service the payment was taken on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Divorce,
    Probate,
    Cmc,
    FinancialRemedy,
    DigitalBar,
    TaxTribunal,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceType::Divorce => "Divorce",
            ServiceType::Probate => "Probate",
            ServiceType::Cmc => "Civil Money Claims",
            ServiceType::FinancialRemedy => "Financial Remedy",
            ServiceType::DigitalBar => "Digital Bar",
            ServiceType::TaxTribunal => "Tax Tribunal",
        };
        write!(f, "{name}")
    }
}

/// settlement currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    Gbp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!PaymentStatus::Initiated.is_terminal());
        assert!(PaymentStatus::Success.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
    }

    #[test]
    fn test_service_display() {
        assert_eq!(ServiceType::Probate.to_string(), "Probate");
        assert_eq!(ServiceType::Cmc.to_string(), "Civil Money Claims");
    }
}
