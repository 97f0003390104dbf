//! Relay (forwarding) fee estimation.
//!
//! Prices follow the network's message forwarding config: bit and cell prices
//! are fixed point numbers scaled by 2^16, and the action fee is a 2^16
//! fraction of the forwarding fee.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellHash};

const PRICE_SCALE: u128 = 1 << 16;

/// Message forwarding prices, in nanotons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardFeeConfig {
  pub lump_price: u128,
  pub bit_price: u128,
  pub cell_price: u128,
  pub first_frac: u128,
}

impl Default for ForwardFeeConfig {
  /// Basechain prices: 400 nanotons per bit, 40 000 per cell, flat
  /// 400 000, one third of the fee charged as the action fee.
  fn default() -> Self {
    ForwardFeeConfig {
      lump_price: 400_000,
      bit_price: 26_214_400,
      cell_price: 2_621_440_000,
      first_frac: 21_845,
    }
  }
}

/// Distinct cells and bits below a message root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellStats {
  pub bits: u64,
  pub cells: u64,
}

/// Counts the unique descendants of `root`.
///
/// The root is excluded since it travels inside the message header. A cell
/// reachable along several paths is counted once and its subtree is not
/// walked again.
#[must_use]
pub fn collect_stats(root: &Cell) -> CellStats {
  let mut seen: HashSet<CellHash> = HashSet::new();
  seen.insert(*root.hash());
  let mut stats = CellStats::default();
  let mut stack: Vec<&Cell> =
    root.refs().iter().rev().map(|child| &**child).collect();
  while let Some(cell) = stack.pop() {
    if !seen.insert(*cell.hash()) {
      continue;
    }
    stats.cells += 1;
    stats.bits += cell.bit_len() as u64;
    stack.extend(cell.refs().iter().rev().map(|child| &**child));
  }
  stats
}

fn ceil_div(numerator: u128, denominator: u128) -> u128 {
  numerator.div_ceil(denominator)
}

impl ForwardFeeConfig {
  /// Forwarding fee for a message whose body holds `stats`.
  #[must_use]
  pub fn forward_fee(&self, stats: CellStats) -> u128 {
    let variable = self
      .bit_price
      .saturating_mul(u128::from(stats.bits))
      .saturating_add(self.cell_price.saturating_mul(u128::from(stats.cells)));
    self
      .lump_price
      .saturating_add(ceil_div(variable, PRICE_SCALE))
  }

  /// Share of the forwarding fee charged on the sending side.
  #[must_use]
  pub fn action_fee(&self, forward_fee: u128) -> u128 {
    ceil_div(forward_fee.saturating_mul(self.first_frac), PRICE_SCALE)
  }

  #[must_use]
  pub fn per_hop_fee(&self, stats: CellStats) -> u128 {
    let forward = self.forward_fee(stats);
    forward.saturating_add(self.action_fee(forward))
  }

  /// Total relay fee for a body travelling across `hops` messages.
  #[must_use]
  pub fn estimate(&self, root: &Cell, hops: u32) -> u128 {
    self
      .per_hop_fee(collect_stats(root))
      .saturating_mul(u128::from(hops))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use more_asserts::*;

  use super::*;
  use crate::builder::CellBuilder;
  use crate::error::Result;

  fn leaf(tag: u8) -> Result<Arc<Cell>> {
    CellBuilder::new().store_uint(u128::from(tag), 8)?.build_ref()
  }

  #[test]
  fn root_is_not_counted() -> Result<()> {
    let root = CellBuilder::new().store_uint(1, 32)?.build()?;
    assert_eq!(collect_stats(&root), CellStats::default());
    let config = ForwardFeeConfig::default();
    let forward = config.forward_fee(CellStats::default());
    assert_eq!(forward, 400_000);
    assert_eq!(config.estimate(&root, 1), forward + config.action_fee(forward));
    Ok(())
  }

  #[test]
  fn shared_subtrees_count_once() -> Result<()> {
    let shared = CellBuilder::new()
      .store_uint(0xab, 8)?
      .store_ref(leaf(1)?)?
      .build_ref()?;
    let root = CellBuilder::new()
      .store_ref(shared.clone())?
      .store_ref(shared)?
      .build()?;
    assert_eq!(collect_stats(&root), CellStats { bits: 16, cells: 2 });
    Ok(())
  }

  #[test]
  fn equal_content_counts_once() -> Result<()> {
    let root = CellBuilder::new()
      .store_ref(leaf(7)?)?
      .store_ref(leaf(7)?)?
      .store_ref(leaf(8)?)?
      .build()?;
    assert_eq!(collect_stats(&root), CellStats { bits: 16, cells: 2 });
    Ok(())
  }

  #[test]
  fn fee_components() {
    let config = ForwardFeeConfig::default();
    let stats = CellStats { bits: 271, cells: 1 };
    // 400 per bit, 40 000 per cell.
    let forward = config.forward_fee(stats);
    assert_eq!(forward, 400_000 + 271 * 400 + 40_000);
    assert_eq!(config.action_fee(forward), 182_798);
    assert_eq!(config.per_hop_fee(stats), forward + 182_798);
  }

  #[test]
  fn fee_grows_with_hops_and_size() -> Result<()> {
    let config = ForwardFeeConfig::default();
    let small = CellBuilder::new().store_ref(leaf(1)?)?.build()?;
    let large = CellBuilder::new()
      .store_ref(leaf(1)?)?
      .store_ref(leaf(2)?)?
      .build()?;
    assert_gt!(config.estimate(&large, 1), config.estimate(&small, 1));
    assert_eq!(config.estimate(&small, 3), 3 * config.estimate(&small, 1));
    assert_eq!(config.estimate(&small, 0), 0);
    Ok(())
  }

  #[test]
  fn config_from_partial_json() -> serde_json::Result<()> {
    let config: ForwardFeeConfig =
      serde_json::from_str(r#"{ "lump_price": 1000000 }"#)?;
    assert_eq!(config.lump_price, 1_000_000);
    assert_eq!(config.bit_price, ForwardFeeConfig::default().bit_price);
    Ok(())
  }
}
