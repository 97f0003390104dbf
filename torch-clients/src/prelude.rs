pub use anyhow::Result;
pub use torch_core::prelude::*;
pub use torch_idl::payloads::*;

pub use crate::factory_client::FactoryClient;
pub use crate::gas::GasConfig;
pub use crate::lp_account_client::LpAccountClient;
pub use crate::pool_client::{
  PoolClient, SimulateDepositResult, SimulateSwapResult,
  SimulateWithdrawResult, SwapMode,
};
pub use crate::provider::ContractProvider;
pub use crate::transaction::SenderArguments;
pub use crate::vault_client::VaultClient;
