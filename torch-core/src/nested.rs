//! Right-skewed chains for sequences that do not fit in one cell.
//!
//! Node `i` holds element `i` inline and, when more elements follow, a single
//! reference to node `i + 1`. An empty sequence is an empty cell.

use std::sync::Arc;

use crate::asset::Asset;
use crate::builder::CellBuilder;
use crate::cell::{Cell, MAX_CELL_DEPTH};
use crate::error::{CoreError, Result};
use crate::slice::CellSlice;

fn store_chain<T>(
  items: &[T],
  store: impl Fn(&T, &mut CellBuilder) -> Result<()>,
) -> Result<Cell> {
  if items.len() > usize::from(MAX_CELL_DEPTH) + 1 {
    return Err(CoreError::capacity(format!(
      "chain of {} nodes exceeds depth limit {MAX_CELL_DEPTH}",
      items.len()
    )));
  }
  let mut tail: Option<Arc<Cell>> = None;
  for item in items.iter().rev() {
    let mut builder = CellBuilder::new();
    store(item, &mut builder)?;
    if let Some(next) = tail.take() {
      builder.store_ref(next)?;
    }
    tail = Some(builder.build_ref()?);
  }
  Ok(tail.map_or_else(Cell::empty, |root| (*root).clone()))
}

fn parse_chain<T>(
  root: &Cell,
  load: impl Fn(&mut CellSlice<'_>) -> Result<T>,
) -> Result<Vec<T>> {
  let mut out = Vec::new();
  if root.is_empty() {
    return Ok(out);
  }
  let mut current = Arc::new(root.clone());
  loop {
    let mut slice = current.parse();
    out.push(load(&mut slice)?);
    if slice.remaining_refs() == 0 {
      break;
    }
    let next = slice.load_ref()?;
    current = next;
  }
  Ok(out)
}

/// Packs amounts as a chain of `VarUInteger 16` nodes.
///
/// # Errors
/// * `CapacityExceeded` when an amount is above 120 bits or the chain would
///   be deeper than the depth limit
pub fn store_coins_nested(values: &[u128]) -> Result<Cell> {
  store_chain(values, |value, builder| {
    builder.store_coins(*value).map(|_| ())
  })
}

pub fn parse_coins_nested(root: &Cell) -> Result<Vec<u128>> {
  parse_chain(root, |slice| slice.load_coins())
}

/// Packs assets as a chain of inline asset nodes.
pub fn store_assets_nested(assets: &[Asset]) -> Result<Cell> {
  store_chain(assets, Asset::store)
}

pub fn parse_assets_nested(root: &Cell) -> Result<Vec<Asset>> {
  parse_chain(root, Asset::load)
}
