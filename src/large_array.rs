//! Blocked storage for the integer strings produced by the recursion.
//!
//! A [`LargeArray`] is a logically contiguous sequence of scalar
//! elements, physically a directory of pool blocks. Logical size is
//! decoupled from any single allocation: a resize reuses existing
//! blocks, reallocates the trailing partial block and appends or
//! releases whole blocks at the end.

use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::pool::{Block, MemoryPool};
use crate::types::{SkewChar, Text};

/// Default number of elements per block.
pub const DEFAULT_BLOCK_UNITS: u32 = 10_000_000;

struct DirEntry {
    block: Block,
    occupied: u32,
}

/// Blocked random-access array of scalars on a [`MemoryPool`].
///
/// Invariants: all blocks except the last are full, the occupied counts
/// sum to the logical length, and elements never run destructors.
pub struct LargeArray<C: SkewChar> {
    pool: Arc<MemoryPool>,
    units_per_block: u32,
    directory: Vec<DirEntry>,
    total: u64,
    _marker: PhantomData<C>,
}

impl<C: SkewChar> LargeArray<C> {
    /// Create an empty array over `pool` with the given block size.
    ///
    /// Fails with [`Error::Misconfiguration`] when the pool's unit size
    /// differs from the element size.
    pub fn new(pool: Arc<MemoryPool>, units_per_block: u32) -> Result<Self> {
        if pool.unit_size() != size_of::<C>() {
            return Err(Error::Misconfiguration(
                "pool unit size does not match the array element size",
            ));
        }
        if units_per_block == 0 {
            return Err(Error::OutOfRange("block size of zero units"));
        }
        Ok(LargeArray {
            pool,
            units_per_block,
            directory: Vec::new(),
            total: 0,
            _marker: PhantomData,
        })
    }

    /// Create an empty array with the default block size.
    pub fn with_default_blocks(pool: Arc<MemoryPool>) -> Result<Self> {
        Self::new(pool, DEFAULT_BLOCK_UNITS)
    }

    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.total
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    #[inline(always)]
    pub fn block_units(&self) -> u32 {
        self.units_per_block
    }

    /// Number of blocks currently held.
    pub fn blocks(&self) -> usize {
        self.directory.len()
    }

    /// Grow or shrink to `new_size` elements.
    ///
    /// Grown storage reads as zero until written. Shrinking releases
    /// surplus blocks and truncates the last one.
    pub fn resize(&mut self, new_size: u64) -> Result<()> {
        if new_size == self.total {
            return Ok(());
        }
        if new_size == 0 {
            for entry in self.directory.drain(..) {
                self.pool.free(entry.block);
            }
            self.total = 0;
            return Ok(());
        }

        let upb = u64::from(self.units_per_block);
        let blocks_needed = (1 + (new_size - 1) / upb) as usize;
        let last_units = (new_size - (blocks_needed as u64 - 1) * upb) as usize;

        while self.directory.len() > blocks_needed {
            let entry = self.directory.pop().unwrap();
            self.pool.free(entry.block);
        }

        if self.directory.len() == blocks_needed {
            // only the trailing block changes size.
            let entry = self.directory.last_mut().unwrap();
            if entry.block.units() != last_units {
                entry.block = self.pool.realloc(entry.block, last_units)?;
            }
            entry.occupied = last_units as u32;
        } else {
            // fill up the trailing block, then append.
            let full = self.units_per_block as usize;
            if let Some(entry) = self.directory.last_mut() {
                if entry.block.units() != full {
                    entry.block = self.pool.realloc(entry.block, full)?;
                }
                entry.occupied = self.units_per_block;
            }
            while self.directory.len() + 1 < blocks_needed {
                let block = self.pool.alloc(full)?;
                self.directory.push(DirEntry {
                    block,
                    occupied: self.units_per_block,
                });
            }
            let block = self.pool.alloc(last_units)?;
            self.directory.push(DirEntry {
                block,
                occupied: last_units as u32,
            });
        }

        debug!(
            "large array resized {} -> {} elements in {} blocks",
            self.total,
            new_size,
            self.directory.len()
        );
        self.total = new_size;
        Ok(())
    }

    #[inline]
    fn locate(&self, pos: u64) -> Result<(usize, usize)> {
        if pos >= self.total {
            return Err(Error::OutOfRange("large array position"));
        }
        let upb = u64::from(self.units_per_block);
        Ok(((pos / upb) as usize, (pos % upb) as usize))
    }

    #[inline(always)]
    fn read(&self, block: usize, offset: usize) -> C {
        debug_assert!(block < self.directory.len());
        debug_assert!(offset < self.directory[block].occupied as usize);
        // in range of the block's allocation, aligned by pool contract.
        unsafe { *(self.directory[block].block.as_ptr() as *const C).add(offset) }
    }

    #[inline(always)]
    fn write(&mut self, block: usize, offset: usize, val: C) {
        debug_assert!(block < self.directory.len());
        debug_assert!(offset < self.directory[block].occupied as usize);
        unsafe { *(self.directory[block].block.as_ptr() as *mut C).add(offset) = val };
    }

    pub fn get(&self, pos: u64) -> Result<C> {
        let (block, offset) = self.locate(pos)?;
        Ok(self.read(block, offset))
    }

    pub fn set(&mut self, pos: u64, val: C) -> Result<()> {
        let (block, offset) = self.locate(pos)?;
        self.write(block, offset, val);
        Ok(())
    }

    pub fn inc(&mut self, pos: u64, amount: C) -> Result<()> {
        let (block, offset) = self.locate(pos)?;
        let val = self.read(block, offset);
        self.write(block, offset, val + amount);
        Ok(())
    }

    /// Set every element to zero.
    ///
    /// Elements are scalars, so a bytewise wipe is equivalent to a
    /// per-element store of zero.
    pub fn zero_all(&mut self) {
        for entry in &self.directory {
            unsafe {
                std::ptr::write_bytes(
                    entry.block.as_ptr(),
                    0,
                    entry.occupied as usize * size_of::<C>(),
                );
            }
        }
    }

    /// Reset to empty without freeing the blocks.
    ///
    /// Valid only when the backing pool is purged wholesale afterwards;
    /// until then the blocks stay live inside the pool.
    pub fn leak(&mut self) {
        debug!(
            "large array leaking {} blocks ({} elements)",
            self.directory.len(),
            self.total
        );
        self.directory.clear();
        self.total = 0;
    }

    pub fn iter(&self) -> LargeArrayIter<'_, C> {
        LargeArrayIter {
            array: self,
            block: 0,
            offset: 0,
        }
    }
}

impl<C: SkewChar> Drop for LargeArray<C> {
    fn drop(&mut self) {
        for entry in self.directory.drain(..) {
            self.pool.free(entry.block);
        }
    }
}

impl<C: SkewChar> Text for LargeArray<C> {
    type Sym = C;

    #[inline(always)]
    fn len(&self) -> usize {
        self.total as usize
    }

    #[inline(always)]
    fn sym(&self, i: usize) -> C {
        let (block, offset) = self
            .locate(i as u64)
            .expect("symbol index out of large array range");
        self.read(block, offset)
    }

    fn for_each_sym<F: FnMut(C)>(&self, f: F) {
        self.iter().for_each(f);
    }
}

/// Forward-only iterator over a [`LargeArray`].
///
/// Maintains `(block, offset)` with `block` below the directory length
/// and `offset` below the block's occupied count whenever [`eoi`] is
/// false; advancement crosses block boundaries transparently.
///
/// [`eoi`]: LargeArrayIter::eoi
pub struct LargeArrayIter<'a, C: SkewChar> {
    array: &'a LargeArray<C>,
    block: usize,
    offset: u32,
}

impl<'a, C: SkewChar> LargeArrayIter<'a, C> {
    /// True once the iterator has moved past the last element.
    #[inline(always)]
    pub fn eoi(&self) -> bool {
        self.block >= self.array.directory.len()
    }

    /// The current element. Panics past the end.
    #[inline(always)]
    pub fn value(&self) -> C {
        assert!(!self.eoi(), "dereferencing a finished large array iterator");
        self.array.read(self.block, self.offset as usize)
    }

    /// Step one element forward.
    #[inline]
    pub fn advance(&mut self) {
        if self.eoi() {
            return;
        }
        self.offset += 1;
        if self.offset >= self.array.directory[self.block].occupied {
            self.block += 1;
            self.offset = 0;
        }
    }

    /// Step `k` elements forward.
    pub fn advance_by(&mut self, mut k: u64) {
        while !self.eoi() {
            let within = u64::from(self.array.directory[self.block].occupied - self.offset);
            if k < within {
                self.offset += k as u32;
                return;
            }
            k -= within;
            self.block += 1;
            self.offset = 0;
        }
    }
}

impl<'a, C: SkewChar> Iterator for LargeArrayIter<'a, C> {
    type Item = C;

    fn next(&mut self) -> Option<C> {
        if self.eoi() {
            return None;
        }
        let val = self.value();
        self.advance();
        Some(val)
    }
}
