//! Get-method stack values.
//!
//! Query responses come back as a stack of loosely typed entries. The
//! [`StackReader`] pops them front to back with the type each record field
//! expects, so decoders read in declaration order.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::address::Address;
use crate::builder::CellBuilder;
use crate::cell::Cell;
use crate::error::{CoreError, Result};

/// Signed 257-bit integer as carried on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct TvmInt {
  negative: bool,
  magnitude: [u8; 32],
}

impl TvmInt {
  #[must_use]
  pub fn from_magnitude(negative: bool, magnitude: [u8; 32]) -> TvmInt {
    // Negative zero is normalised away.
    let negative = negative && magnitude.iter().any(|b| *b != 0);
    TvmInt {
      negative,
      magnitude,
    }
  }

  #[must_use]
  pub fn from_u256(bytes: [u8; 32]) -> TvmInt {
    TvmInt::from_magnitude(false, bytes)
  }

  #[must_use]
  pub fn is_negative(&self) -> bool {
    self.negative
  }

  #[must_use]
  pub fn is_zero(&self) -> bool {
    self.magnitude.iter().all(|b| *b == 0)
  }

  /// Big-endian absolute value.
  #[must_use]
  pub fn magnitude(&self) -> &[u8; 32] {
    &self.magnitude
  }

  /// The value as an unsigned 256-bit big-endian array.
  pub fn to_u256(&self) -> Result<[u8; 32]> {
    if self.negative {
      return Err(CoreError::malformed("negative value for unsigned field"));
    }
    Ok(self.magnitude)
  }

  pub fn to_u128(&self) -> Result<u128> {
    let bytes = self.to_u256()?;
    if bytes[..16].iter().any(|b| *b != 0) {
      return Err(CoreError::malformed("integer does not fit in 128 bits"));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&bytes[16..]);
    Ok(u128::from_be_bytes(low))
  }

  pub fn to_u64(&self) -> Result<u64> {
    u64::try_from(self.to_u128()?)
      .map_err(|e| CoreError::malformed(e.to_string()))
  }

  pub fn to_i128(&self) -> Result<i128> {
    if self.magnitude[..16].iter().any(|b| *b != 0) {
      return Err(CoreError::malformed("integer does not fit in 128 bits"));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&self.magnitude[16..]);
    let abs = u128::from_be_bytes(low);
    if self.negative {
      0i128
        .checked_sub_unsigned(abs)
        .ok_or_else(|| CoreError::malformed("integer below i128 range"))
    } else {
      i128::try_from(abs).map_err(|e| CoreError::malformed(e.to_string()))
    }
  }
}

impl From<u128> for TvmInt {
  fn from(value: u128) -> TvmInt {
    let mut magnitude = [0u8; 32];
    magnitude[16..].copy_from_slice(&value.to_be_bytes());
    TvmInt::from_magnitude(false, magnitude)
  }
}

impl From<u64> for TvmInt {
  fn from(value: u64) -> TvmInt {
    TvmInt::from(u128::from(value))
  }
}

impl From<i128> for TvmInt {
  fn from(value: i128) -> TvmInt {
    let mut magnitude = [0u8; 32];
    magnitude[16..].copy_from_slice(&value.unsigned_abs().to_be_bytes());
    TvmInt::from_magnitude(value < 0, magnitude)
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackItem {
  Null,
  Int(TvmInt),
  Cell(Arc<Cell>),
  Slice(Arc<Cell>),
  Tuple(Vec<StackItem>),
}

impl StackItem {
  #[must_use]
  pub fn int(value: impl Into<TvmInt>) -> StackItem {
    StackItem::Int(value.into())
  }

  /// An address argument, passed as a slice.
  pub fn address(address: &Address) -> Result<StackItem> {
    let cell = CellBuilder::new().store_address(Some(address))?.build_ref()?;
    Ok(StackItem::Slice(cell))
  }

  fn kind(&self) -> &'static str {
    match self {
      StackItem::Null => "null",
      StackItem::Int(_) => "int",
      StackItem::Cell(_) => "cell",
      StackItem::Slice(_) => "slice",
      StackItem::Tuple(_) => "tuple",
    }
  }
}

/// Sequential typed reader over a get-method result.
#[derive(Clone, Debug)]
pub struct StackReader {
  items: VecDeque<StackItem>,
}

impl StackReader {
  #[must_use]
  pub fn new(items: Vec<StackItem>) -> StackReader {
    StackReader {
      items: items.into(),
    }
  }

  #[must_use]
  pub fn remaining(&self) -> usize {
    self.items.len()
  }

  fn pop(&mut self, expected: &str) -> Result<StackItem> {
    self.items.pop_front().ok_or_else(|| {
      CoreError::malformed(format!("stack exhausted, expected {expected}"))
    })
  }

  fn mismatch(expected: &str, found: &StackItem) -> CoreError {
    CoreError::malformed(format!(
      "expected {expected} on stack, found {}",
      found.kind()
    ))
  }

  pub fn read_int(&mut self) -> Result<TvmInt> {
    match self.pop("int")? {
      StackItem::Int(value) => Ok(value),
      other => Err(Self::mismatch("int", &other)),
    }
  }

  pub fn read_u128(&mut self) -> Result<u128> {
    self.read_int()?.to_u128()
  }

  pub fn read_u64(&mut self) -> Result<u64> {
    self.read_int()?.to_u64()
  }

  pub fn read_bool(&mut self) -> Result<bool> {
    Ok(!self.read_int()?.is_zero())
  }

  /// Reads a cell or slice entry as its underlying cell.
  pub fn read_cell(&mut self) -> Result<Arc<Cell>> {
    match self.pop("cell")? {
      StackItem::Cell(cell) | StackItem::Slice(cell) => Ok(cell),
      other => Err(Self::mismatch("cell", &other)),
    }
  }

  /// Reads a cell that may be null, as used for empty dictionaries.
  pub fn read_cell_opt(&mut self) -> Result<Option<Arc<Cell>>> {
    match self.pop("cell or null")? {
      StackItem::Null => Ok(None),
      StackItem::Cell(cell) | StackItem::Slice(cell) => Ok(Some(cell)),
      other => Err(Self::mismatch("cell or null", &other)),
    }
  }

  /// Reads an address from a slice entry.
  pub fn read_address(&mut self) -> Result<Address> {
    self.read_cell()?.parse().load_required_address()
  }

  pub fn read_tuple(&mut self) -> Result<Vec<StackItem>> {
    match self.pop("tuple")? {
      StackItem::Tuple(items) => Ok(items),
      other => Err(Self::mismatch("tuple", &other)),
    }
  }
}
