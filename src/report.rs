use serde::{Deserialize, Serialize};

use crate::types::{PaymentMethod, ServiceType};

/// reconciliation report flavor, selected by payment method and service.
/// a closed mapping: combinations with no report are None at construction
/// rather than a lookup failure at report time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportType {
    Card,
    PbaCmc,
    PbaDivorce,
    PbaProbate,
    PbaFinancialRemedy,
}

impl ReportType {
    pub fn for_payment(method: PaymentMethod, service: ServiceType) -> Option<ReportType> {
        match (method, service) {
            (PaymentMethod::Card, _) => Some(ReportType::Card),
            (PaymentMethod::PaymentByAccount, ServiceType::Cmc) => Some(ReportType::PbaCmc),
            (PaymentMethod::PaymentByAccount, ServiceType::Divorce) => Some(ReportType::PbaDivorce),
            (PaymentMethod::PaymentByAccount, ServiceType::Probate) => Some(ReportType::PbaProbate),
            (PaymentMethod::PaymentByAccount, ServiceType::FinancialRemedy) => {
                Some(ReportType::PbaFinancialRemedy)
            }
            _ => None,
        }
    }

    /// file stem used by the downstream csv generator
    pub fn file_stem(&self) -> &'static str {
        match self {
            ReportType::Card => "hmcts_card_payments",
            ReportType::PbaCmc => "hmcts_pba_cmc_payments",
            ReportType::PbaDivorce => "hmcts_pba_divorce_payments",
            ReportType::PbaProbate => "hmcts_pba_probate_payments",
            ReportType::PbaFinancialRemedy => "hmcts_pba_finrem_payments",
        }
    }
}
