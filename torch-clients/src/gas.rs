//! Gas attached to vault operations.
//!
//! Every budget is a fixed execution allowance for the head operation and
//! each chained hop, plus the relay fee of the operation body across all
//! of its hops.

use serde::{Deserialize, Serialize};
use torch_core::cell::Cell;
use torch_core::fees::ForwardFeeConfig;
use torch_idl::payloads::hop_count;
use tracing::debug;

/// Execution allowances in nanotons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
  pub jetton_transfer: u128,
  pub deposit: u128,
  pub swap: u128,
  pub withdraw: u128,
  pub swap_next: u128,
  pub deposit_next: u128,
  pub withdraw_next: u128,
}

impl Default for GasConfig {
  fn default() -> Self {
    GasConfig {
      jetton_transfer: 50_000_000,
      deposit: 200_000_000,
      swap: 180_000_000,
      withdraw: 400_000_000,
      swap_next: 50_000_000,
      deposit_next: 50_000_000,
      withdraw_next: 350_000_000,
    }
  }
}

impl GasConfig {
  /// Gas for a swap whose follow-up chain is `next_depth` hops long.
  ///
  /// The last hop of a chain is budgeted as a withdrawal, the hops before
  /// it as swaps.
  #[must_use]
  pub fn swap_gas(
    &self,
    fees: &ForwardFeeConfig,
    body: &Cell,
    next_depth: u32,
  ) -> u128 {
    let chained = match next_depth {
      0 => 0,
      depth => self
        .swap_next
        .saturating_mul(u128::from(depth - 1))
        .saturating_add(self.withdraw_next),
    };
    let fee = fees.estimate(body, hop_count(next_depth));
    let gas = self.swap.saturating_add(chained).saturating_add(fee);
    debug!(next_depth, fee, gas, "swap gas");
    gas
  }

  #[must_use]
  pub fn deposit_gas(
    &self,
    fees: &ForwardFeeConfig,
    body: &Cell,
    has_next: bool,
  ) -> u128 {
    let chained = if has_next { self.deposit_next } else { 0 };
    let fee = fees.estimate(body, hop_count(u32::from(has_next)));
    let gas = self.deposit.saturating_add(chained).saturating_add(fee);
    debug!(has_next, fee, gas, "deposit gas");
    gas
  }

  #[must_use]
  pub fn withdraw_gas(
    &self,
    fees: &ForwardFeeConfig,
    body: &Cell,
    has_next: bool,
  ) -> u128 {
    let chained = if has_next { self.withdraw_next } else { 0 };
    let fee = fees.estimate(body, hop_count(u32::from(has_next)));
    let gas = self.withdraw.saturating_add(chained).saturating_add(fee);
    debug!(has_next, fee, gas, "withdraw gas");
    gas
  }
}
