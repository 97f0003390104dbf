//! Message body builders for vault operations.
//!
//! Every builder returns the body as a shared cell so it can be nested
//! inside a transport wrapper (a TON vault message or a jetton transfer)
//! without copying.

use std::sync::Arc;

use torch_core::address::Address;
use torch_core::asset::{Allocation, Asset};
use torch_core::builder::CellBuilder;
use torch_core::cell::{Cell, CellHash};
use torch_core::clock::UnixClock;
use torch_core::error::Result;
use torch_core::nested::{store_assets_nested, store_coins_nested};

use crate::constants::{op, ContractType, NextType, Size};
use crate::payloads::{
  DepositFollowUp, DepositNext, DepositPayload, ExtraPayload, SignedRate,
  SwapFollowUp, SwapNext, SwapPayload, WithdrawMode, WithdrawNext,
  WithdrawPayload,
};

/// Seconds a swap stays valid when no deadline is given.
pub const DEFAULT_DEADLINE_SECS: u64 = 10 * 60;

pub fn signed_rate_cell(rate: &SignedRate) -> Result<Arc<Cell>> {
  let next = rate.next.as_deref().map(signed_rate_cell).transpose()?;
  CellBuilder::new()
    .store_bytes(&rate.signature)?
    .store_ref(rate.payload.clone())?
    .store_maybe_ref(next)?
    .build_ref()
}

/// Shared layout of swap and deposit configs.
struct OperationConfig<'a> {
  min_amount: u128,
  recipient: Option<&'a Address>,
  signed_rate: Option<&'a SignedRate>,
  fulfill_payload: Option<&'a Arc<Cell>>,
  reject_payload: Option<&'a Arc<Cell>>,
  extra_payload: Option<&'a ExtraPayload>,
}

impl OperationConfig<'_> {
  fn to_cell(&self) -> Result<Arc<Cell>> {
    let signed_rate = self.signed_rate.map(signed_rate_cell).transpose()?;
    CellBuilder::new()
      .store_coins(self.min_amount)?
      .store_address(self.recipient)?
      .store_maybe_ref(signed_rate)?
      .store_maybe_ref(self.fulfill_payload.cloned())?
      .store_maybe_ref(self.reject_payload.cloned())?
      .store_dict(self.extra_payload)?
      .build_ref()
  }
}

/// Minimum-output cell of a withdrawal.
///
/// Balanced mode packs the per-asset minimums as a coins list; single mode
/// packs one bare amount and is omitted when that amount is zero.
pub fn pack_min_amount(mode: &WithdrawMode) -> Result<Option<Arc<Cell>>> {
  match mode {
    WithdrawMode::Balanced {
      min_amount_outs: Some(mins),
    } => {
      store_coins_nested(&Allocation::values(mins)).map(|c| Some(Arc::new(c)))
    }
    WithdrawMode::Balanced {
      min_amount_outs: None,
    } => Ok(None),
    WithdrawMode::Single { min_amount_out, .. } if *min_amount_out > 0 => {
      CellBuilder::new()
        .store_coins(*min_amount_out)?
        .build_ref()
        .map(Some)
    }
    WithdrawMode::Single { .. } => Ok(None),
  }
}

fn single_asset_out(mode: Option<&WithdrawMode>) -> Result<Option<Arc<Cell>>> {
  match mode {
    Some(WithdrawMode::Single { asset_out, .. }) => asset_out.to_cell().map(Some),
    _ => Ok(None),
  }
}

pub fn swap_next_cell(next: &SwapNext) -> Result<Arc<Cell>> {
  let follow_up = next.next.as_deref().map(swap_follow_up_cell).transpose()?;
  CellBuilder::new()
    .store_uint(NextType::Swap.into(), Size::NEXT_TYPE)?
    .store_address(Some(&next.next_pool))?
    .store_ref(next.asset_out.to_cell()?)?
    .store_coins(next.min_amount_out)?
    .store_maybe_ref(follow_up)?
    .build_ref()
}

pub fn deposit_next_cell(next: &DepositNext) -> Result<Arc<Cell>> {
  CellBuilder::new()
    .store_uint(NextType::Deposit.into(), Size::NEXT_TYPE)?
    .store_address(Some(&next.next_pool))?
    .store_coins(next.meta_allocation.value)?
    .store_ref(next.meta_allocation.asset.to_cell()?)?
    .store_coins(next.min_lp_amount)?
    .build_ref()
}

pub fn withdraw_next_cell(next: &WithdrawNext) -> Result<Arc<Cell>> {
  let min_amount_out = match &next.mode {
    Some(mode) => pack_min_amount(mode)?,
    None => None,
  };
  CellBuilder::new()
    .store_uint(NextType::Withdraw.into(), Size::NEXT_TYPE)?
    .store_address(Some(&next.next_pool))?
    .store_maybe_ref(single_asset_out(next.mode.as_ref())?)?
    .store_maybe_ref(min_amount_out)?
    .build_ref()
}

pub fn swap_follow_up_cell(next: &SwapFollowUp) -> Result<Arc<Cell>> {
  match next {
    SwapFollowUp::Swap(next) => swap_next_cell(next),
    SwapFollowUp::Withdraw(next) => withdraw_next_cell(next),
  }
}

pub fn deposit_follow_up_cell(next: &DepositFollowUp) -> Result<Arc<Cell>> {
  match next {
    DepositFollowUp::Swap(next) => swap_next_cell(next),
    DepositFollowUp::Deposit(next) => deposit_next_cell(next),
  }
}

/// Swap body sent to the vault of the input asset.
///
/// The clock is read once, only when the config carries no deadline.
pub fn swap_body(
  payload: &SwapPayload,
  clock: &impl UnixClock,
) -> Result<Arc<Cell>> {
  let deadline = payload
    .config
    .as_ref()
    .and_then(|config| config.deadline)
    .unwrap_or_else(|| clock.now().saturating_add(DEFAULT_DEADLINE_SECS));
  let config = payload
    .config
    .as_ref()
    .map(|config| {
      OperationConfig {
        min_amount: config.min_amount_out,
        recipient: config.recipient.as_ref(),
        signed_rate: config.signed_rate.as_ref(),
        fulfill_payload: config.fulfill_payload.as_ref(),
        reject_payload: config.reject_payload.as_ref(),
        extra_payload: config.extra_payload.as_ref(),
      }
      .to_cell()
    })
    .transpose()?;
  let next = payload.next.as_ref().map(swap_follow_up_cell).transpose()?;

  CellBuilder::new()
    .store_uint(op::vault::SWAP.into(), Size::OP)?
    .store_address(Some(&payload.pool))?
    .store_ref(payload.asset_out.to_cell()?)?
    .store_uint(deadline.into(), Size::TIMESTAMP)?
    .store_maybe_ref(config)?
    .store_maybe_ref(next)?
    .build_ref()
}

/// The single funded asset when the pool can take a one-sided deposit.
///
/// That is the case when exactly one allocation is non-zero and the
/// follow-up, if any, is a swap or a deposit without a meta top-up.
#[must_use]
pub fn single_deposit_asset(payload: &DepositPayload) -> Option<Asset> {
  let mut funded = payload.allocations.iter().filter(|alloc| alloc.value > 0);
  let only = funded.next()?;
  if funded.next().is_some() {
    return None;
  }
  let next_allows = match &payload.next {
    None | Some(DepositFollowUp::Swap(_)) => true,
    Some(DepositFollowUp::Deposit(next)) => next.meta_allocation.value == 0,
  };
  next_allows.then_some(only.asset)
}

fn deposit_assets_cell(payload: &DepositPayload) -> Result<Arc<Cell>> {
  match single_deposit_asset(payload) {
    Some(asset) => CellBuilder::new().store_ref(asset.to_cell()?)?.build_ref(),
    None => {
      let assets = payload
        .allocations
        .iter()
        .map(|alloc| alloc.asset)
        .collect::<Vec<_>>();
      store_assets_nested(&assets).map(Arc::new)
    }
  }
}

/// Deposit body sent along with every funded leg.
pub fn deposit_body(payload: &DepositPayload) -> Result<Arc<Cell>> {
  let targets = store_coins_nested(&Allocation::values(&payload.allocations))?;
  let config = payload
    .config
    .as_ref()
    .map(|config| {
      OperationConfig {
        min_amount: config.min_lp_amount,
        recipient: config.recipient.as_ref(),
        signed_rate: config.signed_rate.as_ref(),
        fulfill_payload: config.fulfill_payload.as_ref(),
        reject_payload: config.reject_payload.as_ref(),
        extra_payload: config.extra_payload.as_ref(),
      }
      .to_cell()
    })
    .transpose()?;
  let next = payload
    .next
    .as_ref()
    .map(deposit_follow_up_cell)
    .transpose()?;

  CellBuilder::new()
    .store_uint(op::vault::DEPOSIT.into(), Size::OP)?
    .store_address(Some(&payload.pool))?
    .store_ref(deposit_assets_cell(payload)?)?
    .store_ref(Arc::new(targets))?
    .store_maybe_ref(config)?
    .store_maybe_ref(next)?
    .build_ref()
}

/// Withdraw body forwarded with the LP tokens to the LP vault.
pub fn withdraw_body(payload: &WithdrawPayload) -> Result<Arc<Cell>> {
  let mode = payload.mode.clone().unwrap_or_default();
  let signed_rate = payload
    .signed_rate
    .as_ref()
    .map(signed_rate_cell)
    .transpose()?;
  let limits = CellBuilder::new()
    .store_maybe_ref(pack_min_amount(&mode)?)?
    .store_dict(payload.extra_payload.as_ref())?
    .build_ref()?;
  let next = payload
    .next
    .as_ref()
    .map(withdraw_next_cell)
    .transpose()?;

  CellBuilder::new()
    .store_uint(op::vault::WITHDRAW.into(), Size::OP)?
    .store_address(payload.recipient.as_ref())?
    .store_maybe_ref(signed_rate)?
    .store_maybe_ref(single_asset_out(Some(&mode))?)?
    .store_maybe_ref(Some(limits))?
    .store_maybe_ref(next)?
    .build_ref()
}

/// Identity of an asset's vault, as understood by the factory's
/// `get_address`.
pub fn vault_proof(asset: &Asset) -> Result<CellHash> {
  let cell = CellBuilder::new()
    .store_uint(ContractType::Vault.into(), Size::CONTRACT_TYPE)?
    .store_ref(asset.to_cell()?)?
    .build()?;
  Ok(*cell.hash())
}

/// Wrapper for operations paid in TON: the vault reads the amount from the
/// header and the operation body from the reference.
pub fn ton_vault_body(
  op: u32,
  query_id: u64,
  amount: u128,
  body: Arc<Cell>,
) -> Result<Arc<Cell>> {
  CellBuilder::new()
    .store_uint(op.into(), Size::OP)?
    .store_uint(query_id.into(), Size::QUERY_ID)?
    .store_coins(amount)?
    .store_ref(body)?
    .build_ref()
}

/// Standard jetton `transfer` request sent to the owner's jetton wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JettonTransfer {
  pub query_id: u64,
  pub amount: u128,
  pub destination: Address,
  pub response_destination: Address,
  pub forward_ton_amount: u128,
  pub forward_payload: Option<Arc<Cell>>,
}

impl JettonTransfer {
  pub fn to_cell(&self) -> Result<Arc<Cell>> {
    CellBuilder::new()
      .store_uint(op::jetton::TRANSFER.into(), Size::OP)?
      .store_uint(self.query_id.into(), Size::QUERY_ID)?
      .store_coins(self.amount)?
      .store_address(Some(&self.destination))?
      .store_address(Some(&self.response_destination))?
      // No custom payload.
      .store_maybe_ref(None)?
      .store_coins(self.forward_ton_amount)?
      .store_maybe_ref(self.forward_payload.clone())?
      .build_ref()
  }
}
