pub mod apportion;
pub mod config;
pub mod decimal;
pub mod duplicate;
pub mod errors;
pub mod events;
pub mod model;
pub mod reference;
pub mod report;
pub mod store;
pub mod types;

// re-export key types
pub use apportion::{
    ApportionEngine, ApportionRecord, Apportioner, BatchOutcome, CaseApportionment, CaseBundle,
    CaseFailure,
};
pub use config::{ApportionConfig, DuplicateConfig};
pub use decimal::Money;
pub use duplicate::{DuplicateDetector, MemoryLinkQuery, RecentLinkQuery};
pub use errors::{PaymentError, Result, StoreError};
pub use events::{Event, EventStore};
pub use model::{Fee, Payment, PaymentFeeLink, Remission};
pub use reference::{is_valid_reference, ReferenceGenerator};
pub use report::ReportType;
pub use store::{ApportionStore, MemoryStore};
pub use types::{
    Currency, FeeId, PaymentChannel, PaymentId, PaymentMethod, PaymentProvider, PaymentStatus,
    ServiceType,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
