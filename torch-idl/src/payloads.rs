//! Operation descriptions handed to the message builders.
//!
//! Allocations are expected pre-sorted and normalised to the pool's asset
//! order; the builders never reorder them.

use std::sync::Arc;

use torch_core::address::Address;
use torch_core::asset::{Allocation, Asset};
use torch_core::cell::Cell;
use torch_core::dict::Dictionary;

/// Reserved extension map carried by configs, keyed by 4-bit slots.
pub type ExtraPayload = Dictionary<Arc<Cell>>;

/// Signed relative price for rate-aware pools. Meta pools chain the base
/// pool's rate behind their own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRate {
  pub signature: [u8; 64],
  pub payload: Arc<Cell>,
  pub next: Option<Box<SignedRate>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapConfig {
  /// Unix seconds after which the vault refunds. Defaults to ten minutes
  /// from encoding time.
  pub deadline: Option<u64>,
  pub min_amount_out: u128,
  /// Defaults to the sender when absent.
  pub recipient: Option<Address>,
  pub signed_rate: Option<SignedRate>,
  pub fulfill_payload: Option<Arc<Cell>>,
  pub reject_payload: Option<Arc<Cell>>,
  pub extra_payload: Option<ExtraPayload>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapPayload {
  pub query_id: u64,
  pub pool: Address,
  pub asset_in: Asset,
  pub amount_in: u128,
  pub asset_out: Asset,
  pub config: Option<SwapConfig>,
  pub next: Option<SwapFollowUp>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DepositConfig {
  pub min_lp_amount: u128,
  pub recipient: Option<Address>,
  pub signed_rate: Option<SignedRate>,
  pub fulfill_payload: Option<Arc<Cell>>,
  pub reject_payload: Option<Arc<Cell>>,
  pub extra_payload: Option<ExtraPayload>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositPayload {
  pub query_id: u64,
  pub pool: Address,
  /// One entry per pool asset, zero for assets not deposited.
  pub allocations: Vec<Allocation>,
  pub config: Option<DepositConfig>,
  pub next: Option<DepositFollowUp>,
}

/// How a withdrawal pays out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WithdrawMode {
  /// Proportional payout in every pool asset.
  Balanced {
    min_amount_outs: Option<Vec<Allocation>>,
  },
  /// Payout in one asset only. A zero minimum is not sent.
  Single { asset_out: Asset, min_amount_out: u128 },
}

impl Default for WithdrawMode {
  fn default() -> Self {
    WithdrawMode::Balanced {
      min_amount_outs: None,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawPayload {
  pub query_id: u64,
  pub pool: Address,
  pub burn_lp_amount: u128,
  pub recipient: Option<Address>,
  pub signed_rate: Option<SignedRate>,
  pub extra_payload: Option<ExtraPayload>,
  /// Balanced when absent.
  pub mode: Option<WithdrawMode>,
  pub next: Option<WithdrawNext>,
}

/// Swap in a further pool, fed by the previous hop's output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapNext {
  pub next_pool: Address,
  pub asset_out: Asset,
  pub min_amount_out: u128,
  pub next: Option<Box<SwapFollowUp>>,
}

/// Deposit of the previous hop's LP tokens into a meta pool, optionally
/// topped up with the meta asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositNext {
  pub next_pool: Address,
  pub meta_allocation: Allocation,
  pub min_lp_amount: u128,
}

/// Withdrawal from a further pool. Never carries a signed rate or
/// extension map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawNext {
  pub next_pool: Address,
  pub mode: Option<WithdrawMode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapFollowUp {
  Swap(SwapNext),
  Withdraw(WithdrawNext),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DepositFollowUp {
  Swap(SwapNext),
  Deposit(DepositNext),
}

impl SwapFollowUp {
  /// Number of hops this follow-up adds to the chain.
  #[must_use]
  pub fn depth(&self) -> u32 {
    match self {
      SwapFollowUp::Swap(SwapNext {
        next: Some(next), ..
      }) => 1 + next.depth(),
      SwapFollowUp::Swap(_) | SwapFollowUp::Withdraw(_) => 1,
    }
  }
}

/// Hops a swap's follow-up chain adds, zero without one.
#[must_use]
pub fn next_depth(next: Option<&SwapFollowUp>) -> u32 {
  next.map_or(0, SwapFollowUp::depth)
}

/// Messages relayed for an operation: the head plus each chained hop.
#[must_use]
pub fn hop_count(next_depth: u32) -> u32 {
  1 + next_depth
}

impl SwapPayload {
  #[must_use]
  pub fn next_depth(&self) -> u32 {
    next_depth(self.next.as_ref())
  }
}

impl DepositPayload {
  #[must_use]
  pub fn next_depth(&self) -> u32 {
    u32::from(self.next.is_some())
  }

  /// Every non-zero leg the depositor has to fund, including the meta
  /// asset of a follow-up deposit.
  #[must_use]
  pub fn funding_legs(&self) -> Vec<Allocation> {
    let meta = match &self.next {
      Some(DepositFollowUp::Deposit(next)) => Some(next.meta_allocation),
      _ => None,
    };
    self
      .allocations
      .iter()
      .copied()
      .chain(meta)
      .filter(|alloc| alloc.value > 0)
      .collect()
  }
}

impl WithdrawPayload {
  #[must_use]
  pub fn next_depth(&self) -> u32 {
    u32::from(self.next.is_some())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pool(tag: u8) -> Address {
    Address::new(0, [tag; 32])
  }

  fn swap_next(next: Option<SwapFollowUp>) -> SwapFollowUp {
    SwapFollowUp::Swap(SwapNext {
      next_pool: pool(2),
      asset_out: Asset::Ton,
      min_amount_out: 0,
      next: next.map(Box::new),
    })
  }

  #[test]
  fn chain_depth() {
    let withdraw = SwapFollowUp::Withdraw(WithdrawNext {
      next_pool: pool(3),
      mode: None,
    });
    assert_eq!(next_depth(None), 0);
    assert_eq!(next_depth(Some(&withdraw)), 1);
    assert_eq!(next_depth(Some(&swap_next(None))), 1);
    // Swap, then swap, then withdraw: three messages.
    let short = swap_next(Some(withdraw.clone()));
    assert_eq!(hop_count(next_depth(Some(&short))), 3);
    let chain = swap_next(Some(swap_next(Some(withdraw))));
    assert_eq!(next_depth(Some(&chain)), 3);
    assert_eq!(hop_count(next_depth(Some(&chain))), 4);
    assert_eq!(hop_count(next_depth(None)), 1);
  }

  #[test]
  fn funding_legs_skip_zero_and_add_meta() {
    let meta = Asset::Jetton(pool(9));
    let payload = DepositPayload {
      query_id: 1,
      pool: pool(1),
      allocations: vec![
        Allocation::new(Asset::Ton, 0),
        Allocation::new(Asset::Jetton(pool(5)), 10),
      ],
      config: None,
      next: Some(DepositFollowUp::Deposit(DepositNext {
        next_pool: pool(4),
        meta_allocation: Allocation::new(meta, 7),
        min_lp_amount: 0,
      })),
    };
    let legs = payload.funding_legs();
    assert_eq!(legs.len(), 2);
    assert_eq!(legs[1], Allocation::new(meta, 7));
  }
}
