use std::sync::Arc;

use crate::address::Address;
use crate::cell::{Cell, MAX_CELL_BITS, MAX_CELL_REFS};
use crate::dict::{DictValue, Dictionary};
use crate::error::{CoreError, Result};

/// Largest amount representable as `VarUInteger 16`.
pub const MAX_COINS: u128 = (1 << 120) - 1;

/// Incrementally assembles a [`Cell`].
///
/// Every `store_*` call checks the remaining capacity and fails with
/// `CapacityExceeded` as soon as a field would not fit, so a document that
/// builds is always valid on the wire.
#[derive(Clone, Debug, Default)]
pub struct CellBuilder {
  data: Vec<u8>,
  bit_len: usize,
  refs: Vec<Arc<Cell>>,
}

impl CellBuilder {
  #[must_use]
  pub fn new() -> CellBuilder {
    CellBuilder::default()
  }

  #[must_use]
  pub fn bit_len(&self) -> usize {
    self.bit_len
  }

  #[must_use]
  pub fn bits_left(&self) -> usize {
    MAX_CELL_BITS - self.bit_len
  }

  #[must_use]
  pub fn refs_left(&self) -> usize {
    MAX_CELL_REFS - self.refs.len()
  }

  fn reserve_bits(&self, bits: usize) -> Result<()> {
    if bits > self.bits_left() {
      Err(CoreError::capacity(format!(
        "{bits} more bits requested, {} left",
        self.bits_left()
      )))
    } else {
      Ok(())
    }
  }

  fn push_bit(&mut self, bit: bool) {
    if self.bit_len % 8 == 0 {
      self.data.push(0);
    }
    if bit {
      self.data[self.bit_len / 8] |= 0x80 >> (self.bit_len % 8);
    }
    self.bit_len += 1;
  }

  pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self> {
    self.reserve_bits(1)?;
    self.push_bit(bit);
    Ok(self)
  }

  /// Stores `value` as an unsigned big-endian integer of `bits` width.
  ///
  /// # Errors
  /// * `CapacityExceeded` if `value` does not fit in `bits` or the cell is
  ///   full
  pub fn store_uint(&mut self, value: u128, bits: usize) -> Result<&mut Self> {
    if bits > 128 || (bits < 128 && value >> bits != 0) {
      return Err(CoreError::capacity(format!(
        "value {value} does not fit in {bits} bits"
      )));
    }
    self.reserve_bits(bits)?;
    for i in (0..bits).rev() {
      self.push_bit((value >> i) & 1 == 1);
    }
    Ok(self)
  }

  /// Stores `value` as a two's complement integer of `bits` width.
  pub fn store_int(&mut self, value: i128, bits: usize) -> Result<&mut Self> {
    if bits == 0 || bits > 128 {
      return Err(CoreError::capacity(format!("invalid int width {bits}")));
    }
    if bits < 128 {
      let bound = 1i128 << (bits - 1);
      if value < -bound || value >= bound {
        return Err(CoreError::capacity(format!(
          "value {value} does not fit in {bits} signed bits"
        )));
      }
    }
    self.reserve_bits(bits)?;
    #[allow(clippy::cast_sign_loss)]
    let raw = value as u128;
    for i in (0..bits).rev() {
      self.push_bit((raw >> i) & 1 == 1);
    }
    Ok(self)
  }

  pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
    self.reserve_bits(bytes.len() * 8)?;
    for byte in bytes {
      for i in (0..8).rev() {
        self.push_bit((byte >> i) & 1 == 1);
      }
    }
    Ok(self)
  }

  /// Copies the first `bits` bits of `data`.
  pub fn store_bits(&mut self, data: &[u8], bits: usize) -> Result<&mut Self> {
    if data.len() * 8 < bits {
      return Err(CoreError::malformed(format!(
        "{} bytes cannot hold {bits} bits",
        data.len()
      )));
    }
    self.reserve_bits(bits)?;
    for i in 0..bits {
      self.push_bit(data[i / 8] & (0x80 >> (i % 8)) != 0);
    }
    Ok(self)
  }

  /// Stores an amount as `VarUInteger 16`: a 4-bit byte length followed by
  /// the big-endian bytes of the amount.
  pub fn store_coins(&mut self, amount: u128) -> Result<&mut Self> {
    if amount > MAX_COINS {
      return Err(CoreError::capacity(format!(
        "coin amount {amount} exceeds 120 bits"
      )));
    }
    let byte_len = (128 - amount.leading_zeros() as usize).div_ceil(8);
    self.reserve_bits(4 + byte_len * 8)?;
    self.store_uint(byte_len as u128, 4)?;
    self.store_uint(amount, byte_len * 8)
  }

  /// Stores `addr_std` for `Some`, `addr_none` for `None`.
  pub fn store_address(
    &mut self,
    address: Option<&Address>,
  ) -> Result<&mut Self> {
    match address {
      None => self.store_uint(0, 2),
      Some(address) => {
        self.reserve_bits(Address::STD_BITS)?;
        self.store_uint(0b10, 2)?;
        self.store_bit(false)?;
        self.store_int(i128::from(address.workchain()), 8)?;
        self.store_bytes(address.hash())
      }
    }
  }

  pub fn store_ref(&mut self, cell: Arc<Cell>) -> Result<&mut Self> {
    if self.refs_left() == 0 {
      return Err(CoreError::capacity(format!(
        "more than {MAX_CELL_REFS} references in one cell"
      )));
    }
    self.refs.push(cell);
    Ok(self)
  }

  /// Stores a presence bit and, when present, the reference.
  pub fn store_maybe_ref(
    &mut self,
    cell: Option<Arc<Cell>>,
  ) -> Result<&mut Self> {
    match cell {
      Some(cell) => {
        if self.refs_left() == 0 {
          return Err(CoreError::capacity(format!(
            "more than {MAX_CELL_REFS} references in one cell"
          )));
        }
        self.store_bit(true)?;
        self.store_ref(cell)
      }
      None => self.store_bit(false),
    }
  }

  /// Stores a `HashmapE`: an empty dictionary is a single zero bit.
  pub fn store_dict<V: DictValue>(
    &mut self,
    dict: Option<&Dictionary<V>>,
  ) -> Result<&mut Self> {
    let root = match dict {
      Some(dict) => dict.root()?,
      None => None,
    };
    self.store_maybe_ref(root)
  }

  /// Appends the payload and references of another cell.
  pub fn store_cell_contents(&mut self, cell: &Cell) -> Result<&mut Self> {
    if cell.refs().len() > self.refs_left() {
      return Err(CoreError::capacity(format!(
        "{} references requested, {} left",
        cell.refs().len(),
        self.refs_left()
      )));
    }
    self.store_bits(cell.data(), cell.bit_len())?;
    for child in cell.refs() {
      self.store_ref(child.clone())?;
    }
    Ok(self)
  }

  /// Finishes the cell. The builder is left untouched.
  pub fn build(&self) -> Result<Cell> {
    Cell::new(self.data.clone(), self.bit_len, self.refs.clone())
  }

  /// Finishes the cell behind an [`Arc`] so it can be stored as a child.
  pub fn build_ref(&self) -> Result<Arc<Cell>> {
    self.build().map(Arc::new)
  }
}
