//! Decoded contract state.

pub mod factory;
pub mod lp_account;
pub mod pool;
pub mod vault;

pub use factory::FactoryData;
pub use lp_account::LpAccountData;
pub use pool::{BasicData, PoolData, ProofData, ReserveData};
pub use vault::{VaultData, VaultKind};
