//! dnstrap application layer: capability ports and the use cases driving them.
pub mod ports;
pub mod use_cases;
