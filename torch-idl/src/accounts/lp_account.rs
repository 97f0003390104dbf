use std::sync::Arc;

use torch_core::address::Address;
use torch_core::asset::{Allocation, Asset};
use torch_core::cell::Cell;
use torch_core::error::Result;
use torch_core::nested::{
  parse_assets_nested, parse_coins_nested, store_assets_nested,
  store_coins_nested,
};
use torch_core::stack::{StackItem, StackReader};

use crate::constants::ContractType;

/// Transient account collecting the legs of a multi-asset deposit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LpAccountData {
  pub contract_type: ContractType,
  pub admin: Address,
  pub query_id: u64,
  pub provider: Address,
  pub pool: Address,
  pub meta_asset: Asset,
  pub meta_amount: u128,
  pub meta_balance: u128,
  pub assets: Vec<Asset>,
  pub current_balances: Vec<Allocation>,
  pub target_balances: Vec<Allocation>,
  pub base_code: Arc<Cell>,
  pub factory: Address,
}

impl LpAccountData {
  pub fn from_stack(stack: Vec<StackItem>) -> Result<LpAccountData> {
    let mut reader = StackReader::new(stack);
    let contract_type = ContractType::try_from(reader.read_u64()?)?;
    let admin = reader.read_address()?;
    let query_id = reader.read_u64()?;
    let provider = reader.read_address()?;
    let pool = reader.read_address()?;
    let meta_asset = Asset::from_cell(&*reader.read_cell()?)?;
    let meta_amount = reader.read_u128()?;
    let meta_balance = reader.read_u128()?;
    let assets = parse_assets_nested(&*reader.read_cell()?)?;
    let current = parse_coins_nested(&*reader.read_cell()?)?;
    let target = parse_coins_nested(&*reader.read_cell()?)?;
    Ok(LpAccountData {
      contract_type,
      admin,
      query_id,
      provider,
      pool,
      meta_asset,
      meta_amount,
      meta_balance,
      current_balances: Allocation::zip(&assets, &current)?,
      target_balances: Allocation::zip(&assets, &target)?,
      assets,
      base_code: reader.read_cell()?,
      factory: reader.read_address()?,
    })
  }

  pub fn to_stack(&self) -> Result<Vec<StackItem>> {
    Ok(vec![
      StackItem::int(u128::from(self.contract_type)),
      StackItem::address(&self.admin)?,
      StackItem::int(self.query_id),
      StackItem::address(&self.provider)?,
      StackItem::address(&self.pool)?,
      StackItem::Cell(self.meta_asset.to_cell()?),
      StackItem::int(self.meta_amount),
      StackItem::int(self.meta_balance),
      StackItem::Cell(Arc::new(store_assets_nested(&self.assets)?)),
      StackItem::Cell(Arc::new(store_coins_nested(&Allocation::values(
        &self.current_balances,
      ))?)),
      StackItem::Cell(Arc::new(store_coins_nested(&Allocation::values(
        &self.target_balances,
      ))?)),
      StackItem::Cell(self.base_code.clone()),
      StackItem::address(&self.factory)?,
    ])
  }
}
