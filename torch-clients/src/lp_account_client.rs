use anyhow::Result;
use torch_core::address::Address;
use torch_idl::accounts::LpAccountData;

use crate::provider::{run, ContractProvider};

/// Client for the per-depositor account that gathers deposit legs.
pub struct LpAccountClient<P> {
  address: Address,
  provider: P,
}

impl<P: ContractProvider> LpAccountClient<P> {
  #[must_use]
  pub fn new(address: Address, provider: P) -> LpAccountClient<P> {
    LpAccountClient { address, provider }
  }

  #[must_use]
  pub fn address(&self) -> Address {
    self.address
  }

  pub async fn lp_account_data(&self) -> Result<LpAccountData> {
    let stack =
      run(&self.provider, self.address, "get_lp_account_data", vec![])
        .await?;
    Ok(LpAccountData::from_stack(stack)?)
  }
}
