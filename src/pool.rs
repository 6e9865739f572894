//! Fixed-unit-size block allocator backing [`LargeArray`].
//!
//! The pool hands out zero-initialised blocks measured in units of a
//! fixed byte width chosen at construction. Arrays verify that width
//! against their element type before use. Blocks are tracked so that
//! [`MemoryPool::clear_all`] can purge everything a leaked array left
//! behind.
//!
//! [`LargeArray`]: crate::large_array::LargeArray

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ptr::NonNull;
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Handle to one pool block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    ptr: NonNull<u8>,
    units: usize,
}

// A block is a handle to raw memory; access discipline is up to the
// owning array.
unsafe impl Send for Block {}
unsafe impl Sync for Block {}

impl Block {
    #[inline(always)]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Number of units the block was allocated for.
    #[inline(always)]
    pub fn units(&self) -> usize {
        self.units
    }
}

/// Shared allocator with a fixed element byte width.
pub struct MemoryPool {
    unit_size: usize,
    blocks: Mutex<Vec<Block>>,
}

impl MemoryPool {
    /// Create a pool for elements of `unit_size` bytes.
    ///
    /// The unit size must be a power of two; it doubles as the block
    /// alignment.
    pub fn new(unit_size: usize) -> Result<Self> {
        if unit_size == 0 || !unit_size.is_power_of_two() {
            return Err(Error::Misconfiguration(
                "pool unit size must be a power of two",
            ));
        }
        Ok(MemoryPool {
            unit_size,
            blocks: Mutex::new(Vec::new()),
        })
    }

    #[inline(always)]
    pub fn unit_size(&self) -> usize {
        self.unit_size
    }

    /// Number of blocks currently allocated out of this pool.
    pub fn live_blocks(&self) -> usize {
        self.blocks.lock().unwrap().len()
    }

    /// Allocate a zero-initialised block of `units` elements.
    pub fn alloc(&self, units: usize) -> Result<Block> {
        if units == 0 {
            return Err(Error::OutOfRange("pool block of zero units"));
        }
        let layout = self.layout(units)?;
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(Error::Capacity("pool block allocation failed"))?;
        let block = Block { ptr, units };
        self.blocks.lock().unwrap().push(block);
        Ok(block)
    }

    /// Resize a block, preserving the leading contents; the tail of a
    /// grown block is zero-initialised.
    pub fn realloc(&self, block: Block, units: usize) -> Result<Block> {
        let fresh = self.alloc(units)?;
        let keep = Ord::min(block.units, units) * self.unit_size;
        unsafe {
            std::ptr::copy_nonoverlapping(block.as_ptr(), fresh.as_ptr(), keep);
        }
        self.free(block);
        Ok(fresh)
    }

    /// Return a block to the system.
    pub fn free(&self, block: Block) {
        let mut blocks = self.blocks.lock().unwrap();
        match blocks.iter().position(|b| b.ptr == block.ptr) {
            Some(at) => {
                let recorded = blocks.swap_remove(at);
                drop(blocks);
                self.release(recorded);
            }
            None => debug_assert!(false, "freeing a block this pool never allocated"),
        }
    }

    /// Release every live block, including blocks leaked out of arrays.
    pub fn clear_all(&self) {
        let drained: Vec<Block> = {
            let mut blocks = self.blocks.lock().unwrap();
            blocks.drain(..).collect()
        };
        if !drained.is_empty() {
            debug!("pool purging {} live blocks", drained.len());
        }
        for block in drained {
            self.release(block);
        }
    }

    fn release(&self, block: Block) {
        // The layout was validated when the block was allocated.
        let layout = self.layout(block.units).unwrap();
        unsafe { dealloc(block.as_ptr(), layout) };
    }

    fn layout(&self, units: usize) -> Result<Layout> {
        let bytes = units
            .checked_mul(self.unit_size)
            .ok_or(Error::Capacity("pool block size overflow"))?;
        Layout::from_size_align(bytes, self.unit_size)
            .map_err(|_| Error::Capacity("pool block layout rejected"))
    }
}

impl Drop for MemoryPool {
    fn drop(&mut self) {
        self.clear_all();
    }
}
