//! A library containing the ABI and constants required to interact with the rollup contracts on
//! the L1.

pub mod abi;

pub use constants::*;
mod constants;

pub use contract::TrackedContract;
mod contract;
