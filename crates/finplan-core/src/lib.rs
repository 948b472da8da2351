pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "social_security")]
pub mod social_security;

#[cfg(feature = "premium_tax_credit")]
pub mod premium_tax_credit;

pub use error::FinPlanError;
pub use types::*;

/// Standard result type for all finplan operations
pub type FinPlanResult<T> = Result<T, FinPlanError>;
