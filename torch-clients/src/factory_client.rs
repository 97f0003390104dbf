use std::sync::Arc;

use anyhow::{bail, Context, Result};
use futures::future::try_join_all;
use futures::try_join;
use torch_core::address::Address;
use torch_core::asset::{Allocation, Asset};
use torch_core::cell::{Cell, CellHash};
use torch_core::clock::{SystemClock, UnixClock};
use torch_core::error::CoreError;
use torch_core::fees::ForwardFeeConfig;
use torch_core::stack::{StackItem, TvmInt};
use torch_idl::accounts::FactoryData;
use torch_idl::constants::op;
use torch_idl::message_builders::{
  deposit_body, swap_body, ton_vault_body, vault_proof, withdraw_body,
  JettonTransfer,
};
use torch_idl::payloads::{DepositPayload, SwapPayload, WithdrawPayload};
use tracing::debug;

use crate::gas::GasConfig;
use crate::provider::{query, run, ContractProvider};
use crate::transaction::SenderArguments;

/// Builds the messages that start swaps, deposits and withdrawals.
///
/// Every operation enters through the vault of the asset paid in: TON is
/// sent to the TON vault directly, jettons are transferred from the
/// sender's wallet with the operation as the forward payload.
pub struct FactoryClient<P> {
  address: Address,
  provider: P,
  gas: GasConfig,
  fees: ForwardFeeConfig,
  clock: Arc<dyn UnixClock + Send + Sync>,
}

impl<P: ContractProvider> FactoryClient<P> {
  #[must_use]
  pub fn new(address: Address, provider: P) -> FactoryClient<P> {
    FactoryClient {
      address,
      provider,
      gas: GasConfig::default(),
      fees: ForwardFeeConfig::default(),
      clock: Arc::new(SystemClock),
    }
  }

  #[must_use]
  pub fn with_gas(mut self, gas: GasConfig) -> Self {
    self.gas = gas;
    self
  }

  #[must_use]
  pub fn with_fees(mut self, fees: ForwardFeeConfig) -> Self {
    self.fees = fees;
    self
  }

  /// Replaces the clock used for default swap deadlines.
  #[must_use]
  pub fn with_clock(
    mut self,
    clock: impl UnixClock + Send + Sync + 'static,
  ) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  #[must_use]
  pub fn address(&self) -> Address {
    self.address
  }

  pub async fn factory_data(&self) -> Result<FactoryData> {
    let stack =
      run(&self.provider, self.address, "get_factory_data", vec![]).await?;
    Ok(FactoryData::from_stack(stack)?)
  }

  /// Address the factory deploys the contract identified by `proof` at.
  pub async fn address_of(&self, proof: CellHash) -> Result<Address> {
    let args = vec![StackItem::Int(TvmInt::from_u256(proof))];
    let mut reader =
      query(&self.provider, self.address, "get_address", args).await?;
    Ok(reader.read_address()?)
  }

  pub async fn vault_address(&self, asset: &Asset) -> Result<Address> {
    self.address_of(vault_proof(asset)?).await
  }

  /// The `owner`'s wallet for the jetton minted by `master`.
  pub async fn jetton_wallet(
    &self,
    master: Address,
    owner: Address,
  ) -> Result<Address> {
    let args = vec![StackItem::address(&owner)?];
    let mut reader =
      query(&self.provider, master, "get_wallet_address", args).await?;
    Ok(reader.read_address()?)
  }

  /// Message starting a swap, paid from `sender`.
  ///
  /// # Errors
  /// - `UnsupportedAssetClass` when paying in an extra currency
  /// - Provider failures while resolving vaults and wallets
  pub async fn swap_payload(
    &self,
    sender: Address,
    payload: &SwapPayload,
  ) -> Result<SenderArguments> {
    let body = swap_body(payload, &self.clock.as_ref())?;
    let gas = self.gas.swap_gas(&self.fees, &body, payload.next_depth());
    let leg = Allocation::new(payload.asset_in, payload.amount_in);
    self
      .transport(sender, leg, op::vault::SWAP, payload.query_id, body, gas)
      .await
  }

  /// One message per funded leg, the meta top-up of a chained deposit
  /// included.
  ///
  /// # Errors
  /// - Nothing to fund
  /// - `UnsupportedAssetClass` when a leg is an extra currency
  /// - Provider failures while resolving vaults and wallets
  pub async fn deposit_payload(
    &self,
    sender: Address,
    payload: &DepositPayload,
  ) -> Result<Vec<SenderArguments>> {
    let legs = payload.funding_legs();
    if legs.is_empty() {
      bail!("deposit into {} funds no asset", payload.pool);
    }
    let body = deposit_body(payload)?;
    let has_next = payload.next.is_some();
    let gas = self.gas.deposit_gas(&self.fees, &body, has_next);
    debug!(legs = legs.len(), pool = %payload.pool, "building deposit");
    try_join_all(legs.into_iter().map(|leg| {
      self.transport(
        sender,
        leg,
        op::vault::DEPOSIT,
        payload.query_id,
        body.clone(),
        gas,
      )
    }))
    .await
  }

  /// LP token transfer to the pool's LP vault, carrying the withdrawal.
  pub async fn withdraw_payload(
    &self,
    sender: Address,
    payload: &WithdrawPayload,
  ) -> Result<SenderArguments> {
    let body = withdraw_body(payload)?;
    let has_next = payload.next.is_some();
    let gas = self.gas.withdraw_gas(&self.fees, &body, has_next);
    // The pool is the LP jetton master.
    let leg =
      Allocation::new(Asset::Jetton(payload.pool), payload.burn_lp_amount);
    self
      .transport(sender, leg, op::vault::WITHDRAW, payload.query_id, body, gas)
      .await
  }

  async fn transport(
    &self,
    sender: Address,
    leg: Allocation,
    op: u32,
    query_id: u64,
    body: Arc<Cell>,
    gas: u128,
  ) -> Result<SenderArguments> {
    match leg.asset {
      Asset::Ton => {
        let to = self.vault_address(&Asset::Ton).await?;
        let value = leg
          .value
          .checked_add(gas)
          .context("attached value overflows")?;
        Ok(SenderArguments {
          to,
          value,
          body: ton_vault_body(op, query_id, leg.value, body)?,
        })
      }
      Asset::Jetton(master) => {
        let (vault, wallet) = try_join!(
          self.vault_address(&leg.asset),
          self.jetton_wallet(master, sender)
        )?;
        let transfer = JettonTransfer {
          query_id,
          amount: leg.value,
          destination: vault,
          response_destination: sender,
          forward_ton_amount: gas,
          forward_payload: Some(body),
        };
        Ok(SenderArguments {
          to: wallet,
          value: gas
            .checked_add(self.gas.jetton_transfer)
            .context("attached value overflows")?,
          body: transfer.to_cell()?,
        })
      }
      Asset::ExtraCurrency(id) => Err(
        CoreError::UnsupportedAssetClass(format!("extra currency {id}"))
          .into(),
      ),
    }
  }
}
