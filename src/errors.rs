use thiserror::Error;

use crate::decimal::Money;
use crate::types::PaymentStatus;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("duplicate payment: a matching payment was received within the last {window_minutes} minutes")]
    DuplicatePayment {
        window_minutes: i64,
    },

    #[error("apportionment failed for case {ccd_case_number}: {source}")]
    ApportionmentFailure {
        ccd_case_number: String,
        #[source]
        source: StoreError,
    },

    #[error("malformed case data: {message}")]
    MalformedCaseData {
        message: String,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("invalid reference: {reference}")]
    InvalidReference {
        reference: String,
    },

    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    #[error("payment {reference} is not linked to a case")]
    PaymentNotLinkedToCase {
        reference: String,
    },

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

/// failures surfaced by the storage collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("write rejected: {message}")]
    WriteRejected {
        message: String,
    },

    #[error("unknown case: {ccd_case_number}")]
    UnknownCase {
        ccd_case_number: String,
    },
}

pub type Result<T> = std::result::Result<T, PaymentError>;
