//! Bounded tree documents.
//!
//! A [`Cell`] carries up to [`MAX_CELL_BITS`] bits of payload and up to
//! [`MAX_CELL_REFS`] child references. Cells are immutable once built; the
//! representation hash is computed lazily and cached, so two cells with the
//! same content always report the same hash.

use std::fmt;
use std::sync::{Arc, OnceLock};

use sha2::{Digest, Sha256};

use crate::error::{CoreError, Result};
use crate::slice::CellSlice;

/// Maximum payload width of a single cell.
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum number of child references of a single cell.
pub const MAX_CELL_REFS: usize = 4;

/// Maximum depth of a cell tree accepted by the remote environment.
pub const MAX_CELL_DEPTH: u16 = 1024;

/// Content identity of a cell.
pub type CellHash = [u8; 32];

pub struct Cell {
  data: Vec<u8>,
  bit_len: usize,
  refs: Vec<Arc<Cell>>,
  depth: u16,
  hash: OnceLock<CellHash>,
}

impl Cell {
  /// Builds a cell from `bit_len` bits of `data` and child references.
  ///
  /// # Errors
  /// * `CapacityExceeded` when the payload, reference count or tree depth
  ///   is above the protocol limits
  /// * `Malformed` when `data` is shorter than `bit_len`
  pub fn new(
    mut data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Arc<Cell>>,
  ) -> Result<Cell> {
    if bit_len > MAX_CELL_BITS {
      return Err(CoreError::capacity(format!(
        "{bit_len} bits in one cell, limit is {MAX_CELL_BITS}"
      )));
    }
    if refs.len() > MAX_CELL_REFS {
      return Err(CoreError::capacity(format!(
        "{} references in one cell, limit is {MAX_CELL_REFS}",
        refs.len()
      )));
    }
    let byte_len = bit_len.div_ceil(8);
    if data.len() < byte_len {
      return Err(CoreError::malformed(format!(
        "{} bytes cannot hold {bit_len} bits",
        data.len()
      )));
    }
    data.truncate(byte_len);
    // Bits past `bit_len` must be zero for hashing.
    if bit_len % 8 != 0 {
      if let Some(last) = data.last_mut() {
        *last &= 0xffu8 << (8 - bit_len % 8);
      }
    }
    let depth = match refs.iter().map(|r| r.depth).max() {
      None => 0,
      Some(max) => max + 1,
    };
    if depth > MAX_CELL_DEPTH {
      return Err(CoreError::capacity(format!(
        "tree depth {depth}, limit is {MAX_CELL_DEPTH}"
      )));
    }
    Ok(Cell {
      data,
      bit_len,
      refs,
      depth,
      hash: OnceLock::new(),
    })
  }

  /// A cell with no payload and no children.
  #[must_use]
  pub fn empty() -> Cell {
    Cell {
      data: Vec::new(),
      bit_len: 0,
      refs: Vec::new(),
      depth: 0,
      hash: OnceLock::new(),
    }
  }

  #[must_use]
  pub fn bit_len(&self) -> usize {
    self.bit_len
  }

  #[must_use]
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  #[must_use]
  pub fn refs(&self) -> &[Arc<Cell>] {
    &self.refs
  }

  #[must_use]
  pub fn depth(&self) -> u16 {
    self.depth
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.bit_len == 0 && self.refs.is_empty()
  }

  /// Payload bit at `index`, most significant bit first.
  #[must_use]
  pub fn bit(&self, index: usize) -> bool {
    index < self.bit_len && self.data[index / 8] & (0x80 >> (index % 8)) != 0
  }

  /// Starts reading this cell from its first bit and reference.
  #[must_use]
  pub fn parse(&self) -> CellSlice<'_> {
    CellSlice::new(self)
  }

  /// Representation hash of the cell, computed once.
  pub fn hash(&self) -> &CellHash {
    self.hash.get_or_init(|| self.compute_hash())
  }

  #[must_use]
  pub fn hash_hex(&self) -> String {
    hex::encode(self.hash())
  }

  fn compute_hash(&self) -> CellHash {
    let full_bytes = self.bit_len / 8;
    let rem = self.bit_len % 8;
    // Ordinary cells only: level 0, no exotic flag.
    let d1 = u8::try_from(self.refs.len()).unwrap_or(u8::MAX);
    let d2 = u8::try_from(full_bytes * 2 + usize::from(rem != 0))
      .unwrap_or(u8::MAX);

    let mut hasher = Sha256::new();
    hasher.update([d1, d2]);
    if rem == 0 {
      hasher.update(&self.data);
    } else {
      let mut padded = self.data.clone();
      if let Some(last) = padded.last_mut() {
        *last |= 0x80 >> rem;
      }
      hasher.update(&padded);
    }
    for child in &self.refs {
      hasher.update(child.depth.to_be_bytes());
    }
    for child in &self.refs {
      hasher.update(child.hash());
    }
    hasher.finalize().into()
  }
}

impl Clone for Cell {
  fn clone(&self) -> Self {
    Cell {
      data: self.data.clone(),
      bit_len: self.bit_len,
      refs: self.refs.clone(),
      depth: self.depth,
      hash: self.hash.clone(),
    }
  }
}

impl Default for Cell {
  fn default() -> Self {
    Cell::empty()
  }
}

impl PartialEq for Cell {
  fn eq(&self, other: &Self) -> bool {
    self.hash() == other.hash()
  }
}

impl Eq for Cell {}

impl fmt::Debug for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Cell")
      .field("bits", &self.bit_len)
      .field("data", &hex::encode(&self.data))
      .field("refs", &self.refs)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_cell_hash() {
    assert_eq!(
      Cell::empty().hash_hex(),
      "96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7"
    );
  }

  #[test]
  fn rejects_wide_payload() {
    let out = Cell::new(vec![0; 128], 1024, vec![]);
    assert!(matches!(out, Err(CoreError::CapacityExceeded(_))));
  }

  #[test]
  fn rejects_fifth_reference() {
    let child = Arc::new(Cell::empty());
    let refs = vec![child; 5];
    let out = Cell::new(vec![], 0, refs);
    assert!(matches!(out, Err(CoreError::CapacityExceeded(_))));
  }

  #[test]
  fn accepts_full_payload() -> Result<()> {
    let cell = Cell::new(vec![0xff; 128], MAX_CELL_BITS, vec![])?;
    assert_eq!(cell.bit_len(), MAX_CELL_BITS);
    assert_eq!(cell.data().len(), 128);
    Ok(())
  }

  #[test]
  fn trailing_bits_are_cleared() -> Result<()> {
    let a = Cell::new(vec![0b1010_1111], 4, vec![])?;
    let b = Cell::new(vec![0b1010_0000], 4, vec![])?;
    assert_eq!(a, b);
    Ok(())
  }

  #[test]
  fn depth_follows_deepest_child() -> Result<()> {
    let leaf = Arc::new(Cell::empty());
    let mid = Arc::new(Cell::new(vec![], 0, vec![leaf.clone()])?);
    let root = Cell::new(vec![], 0, vec![leaf, mid])?;
    assert_eq!(root.depth(), 2);
    Ok(())
  }

  #[test]
  fn hash_depends_on_children() -> Result<()> {
    let a = Arc::new(Cell::new(vec![1], 8, vec![])?);
    let b = Arc::new(Cell::new(vec![2], 8, vec![])?);
    let left = Cell::new(vec![], 0, vec![a.clone(), b.clone()])?;
    let right = Cell::new(vec![], 0, vec![b, a])?;
    assert_ne!(left.hash(), right.hash());
    Ok(())
  }
}
