//! Solidity bindings for the rollup contracts.

/// Calls to the rollup contracts and the address registry.
pub mod calls;

/// Events emitted by the rollup contracts and the address registry.
pub mod logs;
