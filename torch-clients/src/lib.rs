//! # Torch Clients
//!
//! Async clients for the Torch Finance stableswap contracts on TON.
//!
//! Clients never send anything themselves: they read contract state
//! through a [`ContractProvider`](provider::ContractProvider) and return
//! [`SenderArguments`](transaction::SenderArguments) for the caller's
//! wallet to sign and send.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use torch_clients::prelude::*;
//!
//! # async fn example(provider: impl ContractProvider) -> Result<()> {
//! let factory_address: Address =
//!   "0:1111111111111111111111111111111111111111111111111111111111111111"
//!     .parse()?;
//! let sender: Address =
//!   "0:2222222222222222222222222222222222222222222222222222222222222222"
//!     .parse()?;
//! let pool: Address =
//!   "0:3333333333333333333333333333333333333333333333333333333333333333"
//!     .parse()?;
//! let usdt: Address =
//!   "0:4444444444444444444444444444444444444444444444444444444444444444"
//!     .parse()?;
//! let factory = FactoryClient::new(factory_address, provider);
//!
//! // Swap 1 TON for USDT
//! let _message = factory
//!   .swap_payload(
//!     sender,
//!     &SwapPayload {
//!       query_id: 0,
//!       pool,
//!       asset_in: Asset::Ton,
//!       amount_in: 1_000_000_000,
//!       asset_out: Asset::Jetton(usdt),
//!       config: None,
//!       next: None,
//!     },
//!   )
//!   .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Clients
//!
//! - [`FactoryClient`](factory_client::FactoryClient) - Swap, deposit and
//!   withdraw messages; vault and jetton wallet resolution
//! - [`PoolClient`](pool_client::PoolClient) - Pool state and simulations
//! - [`VaultClient`](vault_client::VaultClient) - Vault state
//! - [`LpAccountClient`](lp_account_client::LpAccountClient) - Pending
//!   deposit state

#![allow(clippy::missing_errors_doc)]

pub mod factory_client;
pub mod gas;
pub mod lp_account_client;
pub mod pool_client;
pub mod prelude;
pub mod provider;
pub mod transaction;
pub mod vault_client;
