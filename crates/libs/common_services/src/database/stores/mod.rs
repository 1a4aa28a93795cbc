pub mod customer_store;
pub mod enrollment_store;
#[cfg(test)]
pub mod memory_store;

pub use customer_store::*;
pub use enrollment_store::*;
