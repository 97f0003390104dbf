//! In-memory contract state for client tests.

#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use torch_clients::provider::ContractProvider;
use torch_core::address::Address;
use torch_core::asset::Asset;
use torch_core::stack::{StackItem, TvmInt};
use torch_idl::message_builders::vault_proof;

struct Stub {
  address: Address,
  method: String,
  /// Matches any arguments when absent.
  args: Option<Vec<StackItem>>,
  result: Vec<StackItem>,
}

/// Answers get-methods from registered stubs and records every call.
#[derive(Default)]
pub struct MockProvider {
  stubs: Vec<Stub>,
  calls: Mutex<Vec<(Address, String, Vec<StackItem>)>>,
}

pub fn address(byte: u8) -> Address {
  Address::new(0, [byte; 32])
}

impl MockProvider {
  pub fn stub(
    &mut self,
    address: Address,
    method: &str,
    args: Option<Vec<StackItem>>,
    result: Vec<StackItem>,
  ) {
    self.stubs.push(Stub {
      address,
      method: method.to_string(),
      args,
      result,
    });
  }

  /// Registers the factory's answer for `asset`'s vault.
  pub fn stub_vault(
    &mut self,
    factory: Address,
    asset: &Asset,
    vault: Address,
  ) {
    let proof = vault_proof(asset).expect("vault proof");
    let result = StackItem::address(&vault).expect("address item");
    self.stub(
      factory,
      "get_address",
      Some(vec![StackItem::Int(TvmInt::from_u256(proof))]),
      vec![result],
    );
  }

  /// Registers `owner`'s wallet for the jetton minted by `master`.
  pub fn stub_wallet(
    &mut self,
    master: Address,
    owner: Address,
    wallet: Address,
  ) {
    let owner = StackItem::address(&owner).expect("address item");
    let wallet = StackItem::address(&wallet).expect("address item");
    self.stub(
      master,
      "get_wallet_address",
      Some(vec![owner]),
      vec![wallet],
    );
  }

  pub fn calls(&self) -> Vec<(Address, String, Vec<StackItem>)> {
    self.calls.lock().expect("calls lock").clone()
  }

  /// Arguments of the last call to `method`.
  pub fn last_args(&self, method: &str) -> Option<Vec<StackItem>> {
    self
      .calls()
      .into_iter()
      .rev()
      .find(|(_, called, _)| called == method)
      .map(|(_, _, args)| args)
  }
}

#[async_trait]
impl ContractProvider for MockProvider {
  async fn run_get_method(
    &self,
    address: Address,
    method: &str,
    args: Vec<StackItem>,
  ) -> Result<Vec<StackItem>> {
    self
      .calls
      .lock()
      .map_err(|_| anyhow!("calls lock poisoned"))?
      .push((address, method.to_string(), args.clone()));
    self
      .stubs
      .iter()
      .find(|stub| {
        stub.address == address
          && stub.method == method
          && stub.args.as_ref().map_or(true, |expected| *expected == args)
      })
      .map(|stub| stub.result.clone())
      .ok_or_else(|| anyhow!("exit code 11: no {method} on {address}"))
  }
}
