//! Memory resources: the `MemoryResource` allocation capability and a couple of
//! reference implementations.
//!
//! - [`HostMemoryResource`]: aligned host heap allocations through the global allocator.
//! - [`SimulatedMemoryResource`]: hands out addresses from a virtual range without
//!   touching memory, for exercising decorators and bookkeeping code.

pub mod host;
pub mod resource;
pub mod simulated;

pub use host::HostMemoryResource;
pub use resource::{MemoryResource, StreamId, same_instance};
pub use simulated::SimulatedMemoryResource;
