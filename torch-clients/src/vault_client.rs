use anyhow::Result;
use torch_core::address::Address;
use torch_idl::accounts::VaultData;

use crate::provider::{query, ContractProvider};

pub struct VaultClient<P> {
  address: Address,
  provider: P,
}

impl<P: ContractProvider> VaultClient<P> {
  #[must_use]
  pub fn new(address: Address, provider: P) -> VaultClient<P> {
    VaultClient { address, provider }
  }

  #[must_use]
  pub fn address(&self) -> Address {
    self.address
  }

  /// # Errors
  /// - `UnsupportedAssetClass` for an extra currency vault
  /// - Provider failure or an undecodable data cell
  pub async fn vault_data(&self) -> Result<VaultData> {
    let mut reader =
      query(&self.provider, self.address, "get_vault_data", vec![]).await?;
    Ok(VaultData::from_cell(&*reader.read_cell()?)?)
  }
}
