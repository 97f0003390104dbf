use std::cmp::Ordering;
use std::sync::Arc;

use itertools::Itertools;

use crate::address::Address;
use crate::builder::CellBuilder;
use crate::cell::Cell;
use crate::error::{CoreError, Result};
use crate::slice::CellSlice;

/// Width of the asset type discriminant.
pub const ASSET_TYPE_BITS: usize = 4;

/// Width of an extra currency identifier.
pub const EXTRA_CURRENCY_ID_BITS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum AssetType {
  Ton = 0,
  Jetton = 1,
  ExtraCurrency = 2,
}

impl TryFrom<u64> for AssetType {
  type Error = CoreError;

  fn try_from(value: u64) -> Result<Self> {
    match value {
      0 => Ok(AssetType::Ton),
      1 => Ok(AssetType::Jetton),
      2 => Ok(AssetType::ExtraCurrency),
      other => Err(CoreError::unknown("asset type", other)),
    }
  }
}

/// Asset identifier as understood by pools and vaults.
///
/// Canonical ordering is by asset type, then by jetton master (workchain and
/// account id) or extra currency id. Pools keep their assets in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
  Ton,
  Jetton(Address),
  ExtraCurrency(u32),
}

impl Asset {
  #[must_use]
  pub fn asset_type(&self) -> AssetType {
    match self {
      Asset::Ton => AssetType::Ton,
      Asset::Jetton(_) => AssetType::Jetton,
      Asset::ExtraCurrency(_) => AssetType::ExtraCurrency,
    }
  }

  #[must_use]
  pub fn jetton_master(&self) -> Option<&Address> {
    match self {
      Asset::Jetton(master) => Some(master),
      _ => None,
    }
  }

  /// Writes the asset inline: type discriminant followed by its identifier.
  pub fn store(&self, builder: &mut CellBuilder) -> Result<()> {
    builder.store_uint(self.asset_type() as u128, ASSET_TYPE_BITS)?;
    match self {
      Asset::Ton => {}
      Asset::Jetton(master) => {
        builder.store_address(Some(master))?;
      }
      Asset::ExtraCurrency(id) => {
        builder.store_uint(u128::from(*id), EXTRA_CURRENCY_ID_BITS)?;
      }
    }
    Ok(())
  }

  /// Reads an inline asset.
  ///
  /// # Errors
  /// * `UnknownVariant` for a discriminant outside the known asset types
  pub fn load(slice: &mut CellSlice<'_>) -> Result<Asset> {
    let kind = AssetType::try_from(slice.load_u64(ASSET_TYPE_BITS)?)?;
    match kind {
      AssetType::Ton => Ok(Asset::Ton),
      AssetType::Jetton => Ok(Asset::Jetton(slice.load_required_address()?)),
      AssetType::ExtraCurrency => {
        let id = slice.load_u64(EXTRA_CURRENCY_ID_BITS)?;
        u32::try_from(id)
          .map(Asset::ExtraCurrency)
          .map_err(|e| CoreError::malformed(e.to_string()))
      }
    }
  }

  /// The asset in a cell of its own.
  pub fn to_cell(&self) -> Result<Arc<Cell>> {
    let mut builder = CellBuilder::new();
    self.store(&mut builder)?;
    builder.build_ref()
  }

  pub fn from_cell(cell: &Cell) -> Result<Asset> {
    Asset::load(&mut cell.parse())
  }
}

impl Ord for Asset {
  fn cmp(&self, other: &Self) -> Ordering {
    match (self, other) {
      (Asset::Jetton(a), Asset::Jetton(b)) => a.cmp(b),
      (Asset::ExtraCurrency(a), Asset::ExtraCurrency(b)) => a.cmp(b),
      _ => self.asset_type().cmp(&other.asset_type()),
    }
  }
}

impl PartialOrd for Asset {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

/// An amount of one asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
  pub asset: Asset,
  pub value: u128,
}

impl Allocation {
  #[must_use]
  pub fn new(asset: Asset, value: u128) -> Allocation {
    Allocation { asset, value }
  }

  /// Pairs assets and values position by position.
  ///
  /// # Errors
  /// * `Malformed` if the lengths differ
  pub fn zip(assets: &[Asset], values: &[u128]) -> Result<Vec<Allocation>> {
    if assets.len() != values.len() {
      return Err(CoreError::malformed(format!(
        "{} assets for {} values",
        assets.len(),
        values.len()
      )));
    }
    Ok(
      assets
        .iter()
        .zip(values)
        .map(|(asset, value)| Allocation::new(*asset, *value))
        .collect(),
    )
  }

  /// Sorts allocations into canonical asset order.
  #[must_use]
  pub fn sorted(allocations: &[Allocation]) -> Vec<Allocation> {
    allocations
      .iter()
      .copied()
      .sorted_by(|a, b| a.asset.cmp(&b.asset))
      .collect()
  }

  /// Lays `allocations` out in `pool_assets` order, zero-filling the pool
  /// assets that were not mentioned.
  ///
  /// # Errors
  /// * `UnknownVariant` when an allocation names an asset outside the pool
  pub fn normalize(
    pool_assets: &[Asset],
    allocations: &[Allocation],
  ) -> Result<Vec<Allocation>> {
    if let Some(stray) = allocations
      .iter()
      .find(|alloc| !pool_assets.contains(&alloc.asset))
    {
      return Err(CoreError::unknown(
        "pool asset",
        stray.asset.asset_type() as u64,
      ));
    }
    Ok(
      pool_assets
        .iter()
        .map(|asset| {
          let value = allocations
            .iter()
            .filter(|alloc| alloc.asset == *asset)
            .map(|alloc| alloc.value)
            .sum();
          Allocation::new(*asset, value)
        })
        .collect(),
    )
  }

  #[must_use]
  pub fn values(allocations: &[Allocation]) -> Vec<u128> {
    allocations.iter().map(|alloc| alloc.value).collect()
  }
}
