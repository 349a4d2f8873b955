pub mod fee;
pub mod link;
pub mod payment;

pub use fee::{Fee, FeeBuilder, Remission};
pub use link::PaymentFeeLink;
pub use payment::{Payment, PaymentBuilder};
