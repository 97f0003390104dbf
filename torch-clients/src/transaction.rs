use std::sync::Arc;

use torch_core::address::Address;
use torch_core::cell::Cell;

/// One internal message the caller's wallet has to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SenderArguments {
  pub to: Address,
  /// Attached TON in nanotons, gas included.
  pub value: u128,
  pub body: Arc<Cell>,
}
