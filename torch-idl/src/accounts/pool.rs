//! Pool state as returned by `get_pool_data`.

use std::sync::Arc;

use torch_core::address::Address;
use torch_core::asset::{Allocation, Asset};
use torch_core::builder::CellBuilder;
use torch_core::cell::Cell;
use torch_core::dict::Dictionary;
use torch_core::error::{CoreError, Result};
use torch_core::nested::{
  parse_assets_nested, parse_coins_nested, store_assets_nested,
  store_coins_nested,
};
use torch_core::slice::CellSlice;

use crate::constants::{ContractType, PoolStatus, PoolType, Size};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReserveData {
  pub reserves: Vec<Allocation>,
  pub admin_fees: Vec<Allocation>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicData {
  pub fee_numerator: u128,
  pub admin_fee_numerator: u128,
  pub init_a: u32,
  pub future_a: u32,
  pub init_a_time: u32,
  pub future_a_time: u32,
  pub lp_total_supply: u128,
  pub lp_wallet_code: Arc<Cell>,
  pub precision_multipliers: Vec<u128>,
  pub plugins: Dictionary<Arc<Cell>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofData {
  pub base_code: Arc<Cell>,
  pub factory: Address,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolData {
  pub contract_type: ContractType,
  pub pool_type: PoolType,
  pub admin: Address,
  /// Key verifying signed rates.
  pub signer_key: [u8; 32],
  pub status: PoolStatus,
  /// Whether the pool prices with externally signed rates.
  pub use_rate: bool,
  /// Position of the base LP token; always 0 in base pools.
  pub base_lp_index: u8,
  /// Pool assets in canonical order.
  pub assets: Vec<Asset>,
  pub reserve: ReserveData,
  pub basic: BasicData,
  pub proof: ProofData,
}

fn load_u32(slice: &mut CellSlice<'_>, bits: usize) -> Result<u32> {
  u32::try_from(slice.load_u64(bits)?)
    .map_err(|e| CoreError::malformed(e.to_string()))
}

impl PoolData {
  /// Decodes the pool data cell.
  ///
  /// # Errors
  /// * `UnknownVariant` for an unknown contract or pool type
  /// * `Malformed` for truncated or mismatched data
  pub fn from_cell(cell: &Cell) -> Result<PoolData> {
    let mut slice = cell.parse();
    let contract_type =
      ContractType::try_from(slice.load_u64(Size::CONTRACT_TYPE)?)?;
    let pool_type = PoolType::try_from(slice.load_u64(Size::POOL_TYPE)?)?;
    let admin = slice.load_required_address()?;
    let signer_key = slice.load_array::<32>()?;
    let status = if slice.load_bit()? {
      PoolStatus::IsStop
    } else {
      PoolStatus::Active
    };
    let use_rate = slice.load_bit()?;
    let base_lp_index = u8::try_from(slice.load_u64(Size::BASE_LP_INDEX)?)
      .map_err(|e| CoreError::malformed(e.to_string()))?;
    let assets = parse_assets_nested(&*slice.load_ref()?)?;

    let reserve_cell = slice.load_ref()?;
    let mut reserve = reserve_cell.parse();
    let reserves = parse_coins_nested(&*reserve.load_ref()?)?;
    let admin_fees = parse_coins_nested(&*reserve.load_ref()?)?;
    let reserve = ReserveData {
      reserves: Allocation::zip(&assets, &reserves)?,
      admin_fees: Allocation::zip(&assets, &admin_fees)?,
    };

    let basic_cell = slice.load_ref()?;
    let mut basic = basic_cell.parse();
    let basic = BasicData {
      fee_numerator: basic.load_coins()?,
      admin_fee_numerator: basic.load_coins()?,
      init_a: load_u32(&mut basic, Size::AMPLIFICATION_FACTOR)?,
      future_a: load_u32(&mut basic, Size::AMPLIFICATION_FACTOR)?,
      init_a_time: load_u32(&mut basic, Size::TIMESTAMP)?,
      future_a_time: load_u32(&mut basic, Size::TIMESTAMP)?,
      lp_total_supply: basic.load_coins()?,
      lp_wallet_code: basic.load_ref()?,
      precision_multipliers: parse_coins_nested(&*basic.load_ref()?)?,
      plugins: basic.load_dict(Size::DICT_KEY)?,
    };

    let proof_cell = slice.load_ref()?;
    let mut proof = proof_cell.parse();
    let proof = ProofData {
      base_code: proof.load_ref()?,
      factory: proof.load_required_address()?,
    };

    Ok(PoolData {
      contract_type,
      pool_type,
      admin,
      signer_key,
      status,
      use_rate,
      base_lp_index,
      assets,
      reserve,
      basic,
      proof,
    })
  }

  /// Encodes the record in the layout [`PoolData::from_cell`] reads.
  /// `NotExist` is written as an active pool.
  pub fn to_cell(&self) -> Result<Arc<Cell>> {
    let reserve = CellBuilder::new()
      .store_ref(Arc::new(store_coins_nested(&Allocation::values(
        &self.reserve.reserves,
      ))?))?
      .store_ref(Arc::new(store_coins_nested(&Allocation::values(
        &self.reserve.admin_fees,
      ))?))?
      .build_ref()?;
    let basic = CellBuilder::new()
      .store_coins(self.basic.fee_numerator)?
      .store_coins(self.basic.admin_fee_numerator)?
      .store_uint(self.basic.init_a.into(), Size::AMPLIFICATION_FACTOR)?
      .store_uint(self.basic.future_a.into(), Size::AMPLIFICATION_FACTOR)?
      .store_uint(self.basic.init_a_time.into(), Size::TIMESTAMP)?
      .store_uint(self.basic.future_a_time.into(), Size::TIMESTAMP)?
      .store_coins(self.basic.lp_total_supply)?
      .store_ref(self.basic.lp_wallet_code.clone())?
      .store_ref(Arc::new(store_coins_nested(
        &self.basic.precision_multipliers,
      )?))?
      .store_dict(Some(&self.basic.plugins))?
      .build_ref()?;
    let proof = CellBuilder::new()
      .store_ref(self.proof.base_code.clone())?
      .store_address(Some(&self.proof.factory))?
      .build_ref()?;

    CellBuilder::new()
      .store_uint(self.contract_type.into(), Size::CONTRACT_TYPE)?
      .store_uint(self.pool_type.into(), Size::POOL_TYPE)?
      .store_address(Some(&self.admin))?
      .store_bytes(&self.signer_key)?
      .store_bit(self.status == PoolStatus::IsStop)?
      .store_bit(self.use_rate)?
      .store_uint(self.base_lp_index.into(), Size::BASE_LP_INDEX)?
      .store_ref(Arc::new(store_assets_nested(&self.assets)?))?
      .store_ref(reserve)?
      .store_ref(basic)?
      .store_ref(proof)?
      .build_ref()
  }
}
