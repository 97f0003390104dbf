use std::sync::Arc;

use anyhow::Result;
use itertools::Itertools;
use torch_core::address::Address;
use torch_core::asset::{Allocation, Asset};
use torch_core::builder::CellBuilder;
use torch_core::nested::{parse_assets_nested, store_coins_nested};
use torch_core::stack::{StackItem, StackReader};
use torch_idl::accounts::PoolData;
use tracing::debug;

use crate::provider::{query, ContractProvider};

/// Which side of a simulated swap is fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapMode {
  /// `amount` is paid in; the result is the amount out.
  ExactIn,
  /// `amount` is received; the result is the amount in.
  ExactOut,
}

impl SwapMode {
  fn method(self) -> &'static str {
    match self {
      SwapMode::ExactIn => "get_simulate_swap",
      SwapMode::ExactOut => "get_simulate_swap_exact_out",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulateDepositResult {
  pub lp_amount_out: u128,
  pub virtual_price_before: u128,
  pub virtual_price_after: u128,
  pub lp_total_supply: u128,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulateSwapResult {
  /// Amount out for [`SwapMode::ExactIn`], amount in for
  /// [`SwapMode::ExactOut`].
  pub amount: u128,
  pub virtual_price_before: u128,
  pub virtual_price_after: u128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulateWithdrawResult {
  /// One amount per pool asset, or a single one for a one-asset payout.
  pub amount_outs: Vec<u128>,
  pub virtual_price_before: u128,
  pub virtual_price_after: u128,
}

/// Read-only access to a pool's state and pricing.
pub struct PoolClient<P> {
  address: Address,
  provider: P,
}

/// Exchange rates go out as a coins list, one value per rate, in the order
/// given.
fn rates_item(rates: Option<&[Allocation]>) -> Result<StackItem> {
  Ok(match rates {
    Some(rates) => StackItem::Cell(Arc::new(store_coins_nested(
      &Allocation::values(rates),
    )?)),
    None => StackItem::Null,
  })
}

impl<P: ContractProvider> PoolClient<P> {
  #[must_use]
  pub fn new(address: Address, provider: P) -> PoolClient<P> {
    PoolClient { address, provider }
  }

  #[must_use]
  pub fn address(&self) -> Address {
    self.address
  }

  async fn query(
    &self,
    method: &str,
    args: Vec<StackItem>,
  ) -> Result<StackReader> {
    query(&self.provider, self.address, method, args).await
  }

  /// Pool assets in canonical order.
  pub async fn assets(&self) -> Result<Vec<Asset>> {
    let mut reader = self.query("get_assets", vec![]).await?;
    Ok(parse_assets_nested(&*reader.read_cell()?)?)
  }

  /// The `owner`'s LP token wallet; the pool is its own LP jetton master.
  pub async fn wallet_address(&self, owner: Address) -> Result<Address> {
    let args = vec![StackItem::address(&owner)?];
    let mut reader = self.query("get_wallet_address", args).await?;
    Ok(reader.read_address()?)
  }

  pub async fn pool_data(&self) -> Result<PoolData> {
    let mut reader = self.query("get_pool_data", vec![]).await?;
    Ok(PoolData::from_cell(&*reader.read_cell()?)?)
  }

  pub async fn virtual_price(
    &self,
    rates: Option<&[Allocation]>,
  ) -> Result<u128> {
    let mut reader =
      self.query("get_virtual_price", vec![rates_item(rates)?]).await?;
    Ok(reader.read_u128()?)
  }

  /// Orders `allocations` by the live asset set, zero-filling the rest.
  ///
  /// # Errors
  /// - `UnknownVariant` for an asset the pool does not hold
  pub async fn normalize_allocations(
    &self,
    allocations: &[Allocation],
  ) -> Result<Vec<Allocation>> {
    let assets = self.assets().await?;
    Ok(Allocation::normalize(&assets, allocations)?)
  }

  /// LP minted for depositing `allocations`, in any order.
  pub async fn simulate_deposit(
    &self,
    allocations: &[Allocation],
    rates: Option<&[Allocation]>,
  ) -> Result<SimulateDepositResult> {
    let amounts = self.normalize_allocations(allocations).await?;
    let args = vec![
      StackItem::Cell(Arc::new(store_coins_nested(&Allocation::values(
        &amounts,
      ))?)),
      rates_item(rates)?,
    ];
    let mut reader = self.query("get_simulate_deposit", args).await?;
    let result = SimulateDepositResult {
      lp_amount_out: reader.read_u128()?,
      virtual_price_before: reader.read_u128()?,
      virtual_price_after: reader.read_u128()?,
      lp_total_supply: reader.read_u128()?,
    };
    debug!(
      pool = %self.address,
      lp_out = result.lp_amount_out,
      "simulated deposit"
    );
    Ok(result)
  }

  pub async fn simulate_swap(
    &self,
    mode: SwapMode,
    asset_in: Asset,
    asset_out: Asset,
    amount: u128,
    rates: Option<&[Allocation]>,
  ) -> Result<SimulateSwapResult> {
    let args = vec![
      StackItem::Cell(asset_in.to_cell()?),
      StackItem::Cell(asset_out.to_cell()?),
      StackItem::int(amount),
      rates_item(rates)?,
    ];
    let mut reader = self.query(mode.method(), args).await?;
    Ok(SimulateSwapResult {
      amount: reader.read_u128()?,
      virtual_price_before: reader.read_u128()?,
      virtual_price_after: reader.read_u128()?,
    })
  }

  /// Payout for burning `lp_amount`, balanced unless `asset_out` is given.
  pub async fn simulate_withdraw(
    &self,
    lp_amount: u128,
    asset_out: Option<Asset>,
    rates: Option<&[Allocation]>,
  ) -> Result<SimulateWithdrawResult> {
    let asset_out = asset_out.map(|asset| asset.to_cell()).transpose()?;
    let asset_out =
      CellBuilder::new().store_maybe_ref(asset_out)?.build_ref()?;
    let args = vec![
      StackItem::int(lp_amount),
      StackItem::Cell(asset_out),
      rates_item(rates)?,
    ];
    let mut reader = self.query("get_simulate_withdraw", args).await?;
    let mut amounts = StackReader::new(reader.read_tuple()?);
    let amount_outs: Vec<u128> = (0..amounts.remaining())
      .map(|_| amounts.read_u128())
      .try_collect()?;
    Ok(SimulateWithdrawResult {
      amount_outs,
      virtual_price_before: reader.read_u128()?,
      virtual_price_after: reader.read_u128()?,
    })
  }
}
