pub mod benefits;
pub mod lifetime;
pub mod strategies;
