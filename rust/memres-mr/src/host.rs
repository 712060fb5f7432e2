//! Host heap memory resource backed by the global allocator.

use std::{
    alloc::Layout,
    ptr::NonNull,
    sync::atomic::{AtomicUsize, Ordering},
};

use memres_align::{CUDA_ALLOCATION_ALIGNMENT, align_up};
use memres_common::{Result, error::Error, verify_arg};

use crate::resource::{MemoryResource, StreamId};

/// A memory resource that serves requests from the process heap.
///
/// Every allocation is rounded up to a multiple of the resource's alignment, and
/// zero-byte requests are served with one alignment unit so that each successful
/// `allocate` yields a distinct address. The stream argument is ignored.
pub struct HostMemoryResource {
    alignment: usize,
    /// Bytes currently handed out, after rounding.
    allocated: AtomicUsize,
}

impl HostMemoryResource {
    /// Creates a host resource aligned to [`CUDA_ALLOCATION_ALIGNMENT`].
    pub fn new() -> HostMemoryResource {
        HostMemoryResource {
            alignment: CUDA_ALLOCATION_ALIGNMENT,
            allocated: AtomicUsize::new(0),
        }
    }

    /// Creates a host resource with a custom alignment.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if `alignment` is not a power of two.
    pub fn with_alignment(alignment: usize) -> Result<HostMemoryResource> {
        verify_arg!(alignment, memres_align::is_supported_alignment(alignment));
        Ok(HostMemoryResource {
            alignment,
            allocated: AtomicUsize::new(0),
        })
    }

    /// Returns the number of bytes currently allocated from this resource (after rounding
    /// every request up to the alignment).
    pub fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    fn layout(&self, bytes: usize) -> Option<Layout> {
        let bytes = bytes.max(1);
        if bytes > isize::MAX as usize {
            return None;
        }
        Layout::from_size_align(align_up(bytes, self.alignment), self.alignment).ok()
    }
}

impl Default for HostMemoryResource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryResource for HostMemoryResource {
    fn allocate(&self, bytes: usize, _stream: StreamId) -> Result<NonNull<u8>> {
        let layout = self
            .layout(bytes)
            .ok_or_else(|| Error::allocation_failure(bytes, "request exceeds addressable size"))?;
        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { std::alloc::alloc(layout) };
        let ptr = NonNull::new(ptr)
            .ok_or_else(|| Error::allocation_failure(bytes, "host allocation failed"))?;
        self.allocated.fetch_add(layout.size(), Ordering::Relaxed);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, bytes: usize, _stream: StreamId) -> Result<()> {
        let Some(layout) = self.layout(bytes) else {
            return Err(Error::invalid_arg("bytes", "exceeds addressable size"));
        };
        // SAFETY: the caller guarantees that `ptr` came from `allocate` with the same
        // `bytes`, which produced this exact layout.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
        self.allocated.fetch_sub(layout.size(), Ordering::Relaxed);
        Ok(())
    }

    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        other.kind() == self.kind() && other.alignment() == self.alignment
    }

    fn kind(&self) -> &'static str {
        "host"
    }

    fn alignment(&self) -> usize {
        self.alignment
    }
}

impl std::fmt::Debug for HostMemoryResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostMemoryResource")
            .field("alignment", &self.alignment)
            .field("allocated", &self.allocated_bytes())
            .finish()
    }
}
