use std::sync::Arc;

use crate::address::Address;
use crate::cell::Cell;
use crate::dict::{DictValue, Dictionary};
use crate::error::{CoreError, Result};

/// Read cursor over a [`Cell`].
///
/// Field widths are trusted; reading past the end of the payload or the
/// reference list yields `Malformed`.
#[derive(Clone, Debug)]
pub struct CellSlice<'a> {
  cell: &'a Cell,
  bit_pos: usize,
  ref_pos: usize,
}

impl<'a> CellSlice<'a> {
  #[must_use]
  pub fn new(cell: &'a Cell) -> CellSlice<'a> {
    CellSlice {
      cell,
      bit_pos: 0,
      ref_pos: 0,
    }
  }

  #[must_use]
  pub fn remaining_bits(&self) -> usize {
    self.cell.bit_len() - self.bit_pos
  }

  #[must_use]
  pub fn remaining_refs(&self) -> usize {
    self.cell.refs().len() - self.ref_pos
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.remaining_bits() == 0 && self.remaining_refs() == 0
  }

  fn ensure_bits(&self, bits: usize) -> Result<()> {
    if bits > self.remaining_bits() {
      Err(CoreError::malformed(format!(
        "read of {bits} bits with {} left",
        self.remaining_bits()
      )))
    } else {
      Ok(())
    }
  }

  pub fn load_bit(&mut self) -> Result<bool> {
    self.ensure_bits(1)?;
    let bit = self.cell.bit(self.bit_pos);
    self.bit_pos += 1;
    Ok(bit)
  }

  /// Reads an unsigned big-endian integer of `bits` width (at most 128).
  pub fn load_uint(&mut self, bits: usize) -> Result<u128> {
    if bits > 128 {
      return Err(CoreError::malformed(format!("uint width {bits} over 128")));
    }
    self.ensure_bits(bits)?;
    let mut value = 0u128;
    for _ in 0..bits {
      value = (value << 1) | u128::from(self.cell.bit(self.bit_pos));
      self.bit_pos += 1;
    }
    Ok(value)
  }

  /// Reads an unsigned integer of at most 64 bits.
  pub fn load_u64(&mut self, bits: usize) -> Result<u64> {
    if bits > 64 {
      return Err(CoreError::malformed(format!("u64 width {bits} over 64")));
    }
    let value = self.load_uint(bits)?;
    u64::try_from(value).map_err(|e| CoreError::malformed(e.to_string()))
  }

  /// Reads a two's complement integer of `bits` width (at most 128).
  pub fn load_int(&mut self, bits: usize) -> Result<i128> {
    if bits == 0 || bits > 128 {
      return Err(CoreError::malformed(format!("invalid int width {bits}")));
    }
    let raw = self.load_uint(bits)?;
    if bits == 128 {
      #[allow(clippy::cast_possible_wrap)]
      return Ok(raw as i128);
    }
    let sign = 1u128 << (bits - 1);
    #[allow(clippy::cast_possible_wrap)]
    let value = if raw & sign == 0 {
      raw as i128
    } else {
      (raw as i128) - (1i128 << bits)
    };
    Ok(value)
  }

  pub fn load_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
    self.ensure_bits(len * 8)?;
    (0..len)
      .map(|_| self.load_uint(8).map(|b| b as u8))
      .collect()
  }

  pub fn load_array<const N: usize>(&mut self) -> Result<[u8; N]> {
    let bytes = self.load_bytes(N)?;
    bytes
      .try_into()
      .map_err(|_| CoreError::malformed(format!("expected {N} bytes")))
  }

  /// Reads a `VarUInteger 16` amount.
  pub fn load_coins(&mut self) -> Result<u128> {
    let byte_len = self.load_uint(4)? as usize;
    self.load_uint(byte_len * 8)
  }

  /// Reads `addr_none` as `None` and `addr_std` as an [`Address`].
  ///
  /// # Errors
  /// * External and variable-length addresses are `Malformed`
  /// * Anycast addresses are `Malformed`
  pub fn load_address(&mut self) -> Result<Option<Address>> {
    match self.load_uint(2)? {
      0b00 => Ok(None),
      0b10 => {
        if self.load_bit()? {
          return Err(CoreError::malformed("anycast addresses are unsupported"));
        }
        let workchain = i8::try_from(self.load_int(8)?)
          .map_err(|e| CoreError::malformed(e.to_string()))?;
        let hash = self.load_array::<32>()?;
        Ok(Some(Address::new(workchain, hash)))
      }
      tag => Err(CoreError::malformed(format!(
        "address tag {tag:#04b} is not an internal address"
      ))),
    }
  }

  /// Reads an address that must be present.
  pub fn load_required_address(&mut self) -> Result<Address> {
    self
      .load_address()?
      .ok_or_else(|| CoreError::malformed("address is addr_none"))
  }

  pub fn load_ref(&mut self) -> Result<Arc<Cell>> {
    let cell = self.cell.refs().get(self.ref_pos).cloned().ok_or_else(|| {
      CoreError::malformed(format!("reference {} is missing", self.ref_pos))
    })?;
    self.ref_pos += 1;
    Ok(cell)
  }

  pub fn load_maybe_ref(&mut self) -> Result<Option<Arc<Cell>>> {
    if self.load_bit()? {
      self.load_ref().map(Some)
    } else {
      Ok(None)
    }
  }

  /// Reads a `HashmapE` with `key_bits`-wide unsigned keys.
  pub fn load_dict<V: DictValue>(
    &mut self,
    key_bits: usize,
  ) -> Result<Dictionary<V>> {
    let root = self.load_maybe_ref()?;
    Dictionary::from_root(key_bits, root.as_deref())
  }
}
