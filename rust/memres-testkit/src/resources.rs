//! Instrumented memory resources for exercising decorators.

use std::{
    ptr::NonNull,
    sync::{Mutex, PoisonError},
};

use memres_common::{Result, error::Error};
use memres_mr::{MemoryResource, StreamId};

/// Wraps a resource and remembers every `(address, bytes)` pair passed through it.
#[derive(Debug, Default)]
pub struct RecordingResource<R> {
    inner: R,
    allocations: Mutex<Vec<(usize, usize)>>,
    deallocations: Mutex<Vec<(usize, usize)>>,
}

impl<R: MemoryResource> RecordingResource<R> {
    pub fn new(inner: R) -> RecordingResource<R> {
        RecordingResource {
            inner,
            allocations: Mutex::new(Vec::new()),
            deallocations: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Successful allocations, in call order.
    pub fn allocations(&self) -> Vec<(usize, usize)> {
        self.allocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Deallocations, in call order.
    pub fn deallocations(&self) -> Vec<(usize, usize)> {
        self.deallocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<R: MemoryResource> MemoryResource for RecordingResource<R> {
    fn allocate(&self, bytes: usize, stream: StreamId) -> Result<NonNull<u8>> {
        let ptr = self.inner.allocate(bytes, stream)?;
        self.allocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((ptr.as_ptr().addr(), bytes));
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, bytes: usize, stream: StreamId) -> Result<()> {
        self.deallocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((ptr.as_ptr().addr(), bytes));
        // SAFETY: forwarded from the caller's contract.
        unsafe { self.inner.deallocate(ptr, bytes, stream) }
    }

    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        other.kind() == self.kind()
            && other
                .upstream()
                .is_some_and(|upstream| self.inner.is_equal(upstream))
    }

    fn kind(&self) -> &'static str {
        "recording"
    }

    fn alignment(&self) -> usize {
        self.inner.alignment()
    }

    fn upstream(&self) -> Option<&dyn MemoryResource> {
        Some(&self.inner)
    }
}

/// A resource that cannot satisfy any request.
///
/// `allocate` fails with [`FailingResource::error`], `deallocate` fails as well.
#[derive(Debug, Default)]
pub struct FailingResource;

impl FailingResource {
    pub fn new() -> FailingResource {
        FailingResource
    }

    /// The error returned for an allocation of `bytes`.
    pub fn error(bytes: usize) -> Error {
        Error::allocation_failure(bytes, "injected allocation failure")
    }
}

impl MemoryResource for FailingResource {
    fn allocate(&self, bytes: usize, _stream: StreamId) -> Result<NonNull<u8>> {
        Err(Self::error(bytes))
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, bytes: usize, _stream: StreamId) -> Result<()> {
        Err(Error::invalid_arg(
            "ptr",
            format!("no allocation of {bytes} bytes was made by this resource"),
        ))
    }

    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        other.kind() == self.kind()
    }

    fn kind(&self) -> &'static str {
        "failing"
    }
}
