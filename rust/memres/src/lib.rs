//! # memres: memory resources with allocation logging
//!
//! A memory resource is an allocator exposing stream-ordered allocate/deallocate calls
//! over some memory pool. This crate re-exports the memres components:
//!
//! * [`align`] - Alignment arithmetic over sizes and addresses
//! * [`common`] - Error types shared by all components
//! * [`mr`] - The [`MemoryResource`](mr::MemoryResource) capability and reference resources
//! * [`logging`] - [`LoggingResourceAdaptor`](logging::LoggingResourceAdaptor), a decorator
//!   recording every allocate/free call as a CSV row, and tools for reading such logs
//!
//! ## Example
//!
//! ```
//! use memres::logging::{LogSummary, LoggingResourceAdaptor};
//! use memres::mr::{HostMemoryResource, MemoryResource, StreamId};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let log_path = dir.path().join("allocations.csv");
//!
//! let upstream = HostMemoryResource::new();
//! let mr = LoggingResourceAdaptor::new(&upstream, &log_path).unwrap();
//!
//! let ptr = mr.allocate(100, StreamId::DEFAULT).unwrap();
//! assert!(memres::align::is_pointer_aligned_default(ptr.as_ptr()));
//! unsafe { mr.deallocate(ptr, 100, StreamId::DEFAULT).unwrap() };
//!
//! let summary = LogSummary::from_path(&log_path).unwrap();
//! assert_eq!(summary.allocations, 1);
//! assert!(summary.is_balanced());
//! ```

pub use memres_align as align;
pub use memres_common as common;
pub use memres_logging as logging;
pub use memres_mr as mr;
