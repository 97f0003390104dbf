//! Get-method access to deployed contracts.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use torch_core::address::Address;
use torch_core::stack::{StackItem, StackReader};
use tracing::trace;

/// Runs get-methods against live contract state.
#[async_trait]
pub trait ContractProvider: Send + Sync {
  /// Run `method` on the contract at `address`.
  ///
  /// # Errors
  /// Returns error if the call fails or the method exits non-zero.
  async fn run_get_method(
    &self,
    address: Address,
    method: &str,
    args: Vec<StackItem>,
  ) -> Result<Vec<StackItem>>;
}

// Implement ContractProvider for Arc<T> where T: ContractProvider
#[async_trait]
impl<T: ContractProvider + ?Sized> ContractProvider for Arc<T> {
  async fn run_get_method(
    &self,
    address: Address,
    method: &str,
    args: Vec<StackItem>,
  ) -> Result<Vec<StackItem>> {
    (**self).run_get_method(address, method, args).await
  }
}

pub(crate) async fn run<P: ContractProvider + ?Sized>(
  provider: &P,
  address: Address,
  method: &str,
  args: Vec<StackItem>,
) -> Result<Vec<StackItem>> {
  trace!(%address, method, args = args.len(), "running get-method");
  provider
    .run_get_method(address, method, args)
    .await
    .with_context(|| format!("{method} failed on {address}"))
}

/// Runs a get-method and hands back a reader over its result.
pub(crate) async fn query<P: ContractProvider + ?Sized>(
  provider: &P,
  address: Address,
  method: &str,
  args: Vec<StackItem>,
) -> Result<StackReader> {
  run(provider, address, method, args)
    .await
    .map(StackReader::new)
}
