//! `MemoryResource`: the allocation capability shared by allocators and their decorators.

use std::ptr::NonNull;

use memres_align::CUDA_ALLOCATION_ALIGNMENT;
use memres_common::Result;

/// An opaque identifier of the ordered execution queue an allocation is associated with.
///
/// Memory resources may use the stream to order allocations with respect to asynchronous
/// work; nothing in this workspace interprets the value beyond passing it along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(u64);

impl StreamId {
    /// The default (legacy) stream.
    pub const DEFAULT: StreamId = StreamId(0);

    pub const fn new(raw: u64) -> StreamId {
        StreamId(raw)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for StreamId {
    fn from(raw: u64) -> Self {
        StreamId(raw)
    }
}

/// A memory allocator exposing stream-ordered allocate/deallocate over some memory pool.
///
/// Implementations are shared between threads, so every operation takes `&self`.
/// Decorators implement this trait as well and hold a reference to the resource
/// they wrap (their *upstream*), which makes decorators stackable.
pub trait MemoryResource: Send + Sync {
    /// Allocates at least `bytes` bytes, associated with `stream`.
    ///
    /// The returned address is aligned to [`MemoryResource::alignment`].
    ///
    /// # Errors
    ///
    /// Returns an `AllocationFailure` error when the request cannot be satisfied.
    fn allocate(&self, bytes: usize, stream: StreamId) -> Result<NonNull<u8>>;

    /// Releases memory previously obtained from [`MemoryResource::allocate`].
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this resource (or on a resource
    /// that compares equal to it) with the same `bytes`, and must not have been released
    /// already. The resource does not validate the pairing.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, bytes: usize, stream: StreamId) -> Result<()>;

    /// Returns `true` if memory allocated from `self` may be released through `other`
    /// and vice versa.
    fn is_equal(&self, other: &dyn MemoryResource) -> bool;

    /// Name of the concrete resource type, used for equality checks across trait objects.
    fn kind(&self) -> &'static str;

    /// Alignment guaranteed for every address returned by `allocate`.
    fn alignment(&self) -> usize {
        CUDA_ALLOCATION_ALIGNMENT
    }

    /// The resource this one delegates to, if it is a decorator.
    fn upstream(&self) -> Option<&dyn MemoryResource> {
        None
    }
}

/// Returns `true` if `a` and `b` refer to the same resource object.
#[inline]
pub fn same_instance(a: &dyn MemoryResource, b: &dyn MemoryResource) -> bool {
    std::ptr::addr_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_id_display() {
        assert_eq!(StreamId::DEFAULT.to_string(), "0x0");
        assert_eq!(StreamId::new(0xdead).to_string(), "0xdead");
        assert_eq!(StreamId::from(16).value(), 16);
        assert_eq!(StreamId::default(), StreamId::DEFAULT);
    }
}
