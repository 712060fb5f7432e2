//! A memory resource that simulates a fixed-size address space.
//!
//! Addresses are handed out bump-style from a virtual range starting at `0x100`.
//! No memory is ever mapped behind them, so the returned pointers must never be
//! dereferenced. Useful for driving decorators and bookkeeping code at volume
//! without consuming real memory.

use std::{
    ptr::NonNull,
    sync::atomic::{AtomicUsize, Ordering},
};

use memres_align::{CUDA_ALLOCATION_ALIGNMENT, align_up};
use memres_common::{Result, error::Error};

use crate::resource::{MemoryResource, StreamId, same_instance};

const BASE_ADDRESS: usize = 0x100;

pub struct SimulatedMemoryResource {
    next: AtomicUsize,
    end: usize,
}

impl SimulatedMemoryResource {
    /// Creates a resource able to hand out `memory_size_bytes` bytes in total.
    pub fn new(memory_size_bytes: usize) -> SimulatedMemoryResource {
        SimulatedMemoryResource {
            next: AtomicUsize::new(BASE_ADDRESS),
            end: BASE_ADDRESS.saturating_add(memory_size_bytes),
        }
    }

    /// Bytes still available in the simulated range.
    pub fn remaining(&self) -> usize {
        self.end - self.next.load(Ordering::Relaxed).min(self.end)
    }
}

impl MemoryResource for SimulatedMemoryResource {
    fn allocate(&self, bytes: usize, _stream: StreamId) -> Result<NonNull<u8>> {
        let exceeded = || Error::allocation_failure(bytes, "simulated memory size exceeded");
        let size = bytes.max(1);
        if size > self.end - BASE_ADDRESS {
            return Err(exceeded());
        }
        let size = align_up(size, CUDA_ALLOCATION_ALIGNMENT);

        let mut current = self.next.load(Ordering::Relaxed);
        loop {
            let Some(next) = current.checked_add(size).filter(|&next| next <= self.end) else {
                return Err(exceeded());
            };
            match self
                .next
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(updated) => current = updated,
            }
        }
        NonNull::new(std::ptr::without_provenance_mut(current))
            .ok_or_else(|| Error::allocation_failure(bytes, "null simulated address"))
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _bytes: usize, _stream: StreamId) -> Result<()> {
        Ok(())
    }

    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        same_instance(self, other)
    }

    fn kind(&self) -> &'static str {
        "simulated"
    }
}

impl std::fmt::Debug for SimulatedMemoryResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedMemoryResource")
            .field("next", &self.next.load(Ordering::Relaxed))
            .field("end", &self.end)
            .finish()
    }
}
