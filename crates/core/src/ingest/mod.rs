pub mod error;
pub mod fixture;
pub mod provider;
pub mod types;
pub mod yahoo;
