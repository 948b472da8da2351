pub mod amortization;
pub mod points;
pub mod refinance;
