//! `HashmapE` dictionaries with fixed-width unsigned keys.
//!
//! Serialisation picks the shortest of the three label encodings
//! (`hml_short`, `hml_long`, `hml_same`) for every edge, preferring short,
//! then long, then same on ties, so identical maps always produce identical
//! cells.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::builder::CellBuilder;
use crate::cell::Cell;
use crate::error::{CoreError, Result};
use crate::slice::CellSlice;

/// Values that can live in a dictionary leaf.
pub trait DictValue: Sized {
  fn store(&self, builder: &mut CellBuilder) -> Result<()>;
  fn load(slice: &mut CellSlice<'_>) -> Result<Self>;
}

/// Cell values are stored as a reference from the leaf.
impl DictValue for Arc<Cell> {
  fn store(&self, builder: &mut CellBuilder) -> Result<()> {
    builder.store_ref(self.clone()).map(|_| ())
  }

  fn load(slice: &mut CellSlice<'_>) -> Result<Self> {
    slice.load_ref()
  }
}

/// Amounts are stored inline as `VarUInteger 16`.
impl DictValue for u128 {
  fn store(&self, builder: &mut CellBuilder) -> Result<()> {
    builder.store_coins(*self).map(|_| ())
  }

  fn load(slice: &mut CellSlice<'_>) -> Result<Self> {
    slice.load_coins()
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dictionary<V> {
  key_bits: usize,
  entries: BTreeMap<u64, V>,
}

impl<V: DictValue> Dictionary<V> {
  /// Key widths over 64 bits are clamped to 64.
  #[must_use]
  pub fn new(key_bits: usize) -> Dictionary<V> {
    Dictionary {
      key_bits: key_bits.min(64),
      entries: BTreeMap::new(),
    }
  }

  #[must_use]
  pub fn key_bits(&self) -> usize {
    self.key_bits
  }

  /// Inserts a value, failing when `key` does not fit the key width.
  pub fn insert(&mut self, key: u64, value: V) -> Result<Option<V>> {
    if self.key_bits < 64 && key >> self.key_bits != 0 {
      return Err(CoreError::capacity(format!(
        "key {key} does not fit in {} bits",
        self.key_bits
      )));
    }
    Ok(self.entries.insert(key, value))
  }

  #[must_use]
  pub fn get(&self, key: u64) -> Option<&V> {
    self.entries.get(&key)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&u64, &V)> {
    self.entries.iter()
  }

  /// Root cell of the map, `None` when empty.
  pub fn root(&self) -> Result<Option<Arc<Cell>>> {
    if self.entries.is_empty() {
      return Ok(None);
    }
    let items = self
      .entries
      .iter()
      .map(|(key, value)| (key_bits_of(*key, self.key_bits), value))
      .collect::<Vec<_>>();
    serialize_edge(&items, 0, self.key_bits).map(|cell| Some(Arc::new(cell)))
  }

  /// Reads a map back from its root cell.
  pub fn from_root(key_bits: usize, root: Option<&Cell>) -> Result<Self> {
    let mut dict = Dictionary::new(key_bits);
    if let Some(root) = root {
      let mut prefix = Vec::with_capacity(dict.key_bits);
      parse_edge(root, &mut prefix, dict.key_bits, &mut dict.entries)?;
    }
    Ok(dict)
  }
}

impl<V: DictValue> FromIterator<(u64, V)> for Dictionary<V> {
  /// Collects into a 64-bit keyed map; use [`Dictionary::new`] and
  /// [`Dictionary::insert`] for narrower keys.
  fn from_iter<T: IntoIterator<Item = (u64, V)>>(iter: T) -> Self {
    Dictionary {
      key_bits: 64,
      entries: iter.into_iter().collect(),
    }
  }
}

fn key_bits_of(key: u64, width: usize) -> Vec<bool> {
  (0..width).rev().map(|i| (key >> i) & 1 == 1).collect()
}

/// Bits needed to store a length in `0..=max`.
fn length_width(max: usize) -> usize {
  (usize::BITS - max.leading_zeros()) as usize
}

fn serialize_edge<V: DictValue>(
  items: &[(Vec<bool>, &V)],
  offset: usize,
  remaining: usize,
) -> Result<Cell> {
  let first = &items[0].0;
  let label_len = if items.len() == 1 {
    remaining
  } else {
    (0..remaining)
      .take_while(|i| items.iter().all(|(key, _)| key[offset + i] == first[offset + i]))
      .count()
  };
  let label = &first[offset..offset + label_len];

  let mut builder = CellBuilder::new();
  store_label(&mut builder, label, remaining)?;
  if label_len == remaining {
    items[0].1.store(&mut builder)?;
  } else {
    let split = offset + label_len;
    let (left, right): (Vec<_>, Vec<_>) = items
      .iter()
      .map(|(key, value)| (key.clone(), *value))
      .partition(|(key, _)| !key[split]);
    let child_remaining = remaining - label_len - 1;
    builder.store_ref(Arc::new(serialize_edge(
      &left,
      split + 1,
      child_remaining,
    )?))?;
    builder.store_ref(Arc::new(serialize_edge(
      &right,
      split + 1,
      child_remaining,
    )?))?;
  }
  builder.build()
}

fn store_label(
  builder: &mut CellBuilder,
  label: &[bool],
  max: usize,
) -> Result<()> {
  let len = label.len();
  let width = length_width(max);
  let short = 2 * len + 2;
  let long = 2 + width + len;
  let same = 3 + width;
  let uniform = label.windows(2).all(|w| w[0] == w[1]);

  let mut best = short;
  let mut kind = LabelKind::Short;
  if long < best {
    best = long;
    kind = LabelKind::Long;
  }
  if uniform && same < best {
    kind = LabelKind::Same;
  }

  match kind {
    LabelKind::Short => {
      builder.store_bit(false)?;
      for _ in 0..len {
        builder.store_bit(true)?;
      }
      builder.store_bit(false)?;
      for bit in label {
        builder.store_bit(*bit)?;
      }
    }
    LabelKind::Long => {
      builder.store_uint(0b10, 2)?;
      builder.store_uint(len as u128, width)?;
      for bit in label {
        builder.store_bit(*bit)?;
      }
    }
    LabelKind::Same => {
      builder.store_uint(0b11, 2)?;
      builder.store_bit(label.first().copied().unwrap_or(false))?;
      builder.store_uint(len as u128, width)?;
    }
  }
  Ok(())
}

enum LabelKind {
  Short,
  Long,
  Same,
}

fn load_label(slice: &mut CellSlice<'_>, max: usize) -> Result<Vec<bool>> {
  let width = length_width(max);
  if !slice.load_bit()? {
    let mut len = 0;
    while slice.load_bit()? {
      len += 1;
    }
    if len > max {
      return Err(CoreError::malformed(format!(
        "label of {len} bits exceeds {max} remaining key bits"
      )));
    }
    return (0..len).map(|_| slice.load_bit()).collect();
  }
  let same = slice.load_bit()?;
  if same {
    let bit = slice.load_bit()?;
    let len = slice.load_uint(width)? as usize;
    if len > max {
      return Err(CoreError::malformed("same label longer than key"));
    }
    Ok(vec![bit; len])
  } else {
    let len = slice.load_uint(width)? as usize;
    if len > max {
      return Err(CoreError::malformed("long label longer than key"));
    }
    (0..len).map(|_| slice.load_bit()).collect()
  }
}

fn parse_edge<V: DictValue>(
  cell: &Cell,
  prefix: &mut Vec<bool>,
  remaining: usize,
  out: &mut BTreeMap<u64, V>,
) -> Result<()> {
  let mut slice = cell.parse();
  let label = load_label(&mut slice, remaining)?;
  let restore = prefix.len();
  prefix.extend_from_slice(&label);
  let left_over = remaining - label.len();
  if left_over == 0 {
    let key = prefix.iter().fold(0u64, |acc, bit| (acc << 1) | u64::from(*bit));
    out.insert(key, V::load(&mut slice)?);
  } else {
    let left = slice.load_ref()?;
    let right = slice.load_ref()?;
    prefix.push(false);
    parse_edge(&left, prefix, left_over - 1, out)?;
    prefix.pop();
    prefix.push(true);
    parse_edge(&right, prefix, left_over - 1, out)?;
    prefix.pop();
  }
  prefix.truncate(restore);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_cell(tag: u8) -> Result<Arc<Cell>> {
    CellBuilder::new().store_uint(u128::from(tag), 8)?.build_ref()
  }

  #[test]
  fn empty_dict_has_no_root() -> Result<()> {
    let dict = Dictionary::<u128>::new(4);
    assert!(dict.root()?.is_none());
    let cell = CellBuilder::new().store_dict(Some(&dict))?.build()?;
    assert_eq!(cell.bit_len(), 1);
    Ok(())
  }

  #[test]
  fn single_entry_is_a_leaf() -> Result<()> {
    let mut dict = Dictionary::new(4);
    dict.insert(3, 500u128)?;
    let root = dict.root()?.expect("non-empty");
    assert!(root.refs().is_empty());
    let back = Dictionary::<u128>::from_root(4, Some(&root))?;
    assert_eq!(back, dict);
    Ok(())
  }

  #[test]
  fn coins_round_trip() -> Result<()> {
    let mut dict = Dictionary::new(4);
    for key in [0u64, 1, 7, 8, 15] {
      dict.insert(key, u128::from(key) * 1_000)?;
    }
    let root = dict.root()?;
    let back = Dictionary::<u128>::from_root(4, root.as_deref())?;
    assert_eq!(back, dict);
    Ok(())
  }

  #[test]
  fn cell_values_round_trip() -> Result<()> {
    let mut dict = Dictionary::new(32);
    dict.insert(1, sample_cell(1)?)?;
    dict.insert(0xffff_0000, sample_cell(2)?)?;
    dict.insert(0xffff_0001, sample_cell(3)?)?;
    let cell = CellBuilder::new().store_dict(Some(&dict))?.build()?;
    let back = cell.parse().load_dict::<Arc<Cell>>(32)?;
    assert_eq!(back, dict);
    assert_eq!(back.get(0xffff_0001), Some(&sample_cell(3)?));
    Ok(())
  }

  #[test]
  fn rejects_wide_key() {
    let mut dict = Dictionary::<u128>::new(4);
    assert!(matches!(
      dict.insert(16, 1),
      Err(CoreError::CapacityExceeded(_))
    ));
  }

  #[test]
  fn same_content_same_root() -> Result<()> {
    let mut a = Dictionary::new(8);
    let mut b = Dictionary::new(8);
    for key in [5u64, 200, 17] {
      a.insert(key, u128::from(key))?;
    }
    for key in [17u64, 5, 200] {
      b.insert(key, u128::from(key))?;
    }
    assert_eq!(a.root()?, b.root()?);
    Ok(())
  }
}
