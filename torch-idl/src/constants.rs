//! Wire constants shared by every Torch contract.

use torch_core::error::{CoreError, Result};

/// Operation codes, grouped by the contract that handles them.
pub mod op {
  pub mod jetton {
    pub const TRANSFER: u32 = 0x0f8a_7ea5;
    pub const INTERNAL_TRANSFER: u32 = 0x178d_4519;
    pub const NOTIFICATION: u32 = 0x7362_d09c;
    pub const PROVIDE_WALLET_ADDRESS: u32 = 0x2c76_b973;
    pub const TAKE_WALLET_ADDRESS: u32 = 0xd173_5400;
    pub const BURN_NOTIFICATION: u32 = 0x7bdd_97de;
  }

  pub mod factory {
    pub const DEPLOY: u32 = 0xd372_158c;
    pub const TOP_UP: u32 = 0xd372_158c;
    pub const CREATE_VAULT: u32 = 0xcbdf_3140;
    pub const CREATE_LP_VAULT: u32 = 0x5482_139c;
    pub const CREATE_BASE_POOL: u32 = 0x18d8_d56e;
    pub const CREATE_META_POOL: u32 = 0x1d1d_68dd;
    pub const DEPOSIT_INTERNAL: u32 = 0xf74b_5f85;
    pub const UPDATE_POOL_CODE: u32 = 0x50ae_945a;
    pub const UPDATE_VAULT_CODE: u32 = 0x1ab1_2b78;
    pub const UPDATE_ADMIN_CONFIG: u32 = 0x9ad3_7959;
    pub const TRANSFER_ADMIN: u32 = 0x2b8a_f82e;
    pub const UPDATE_SIGNER_KEY: u32 = 0xaf74_dd1b;
    pub const STOP_POOL: u32 = 0x4577_6b99;
    pub const UNSTOP_POOL: u32 = 0x88a2_04a9;
    pub const UPDATE: u32 = 0x9825_3578;
  }

  pub mod vault {
    pub const DEPOSIT: u32 = 0x95db_9d39;
    pub const WITHDRAW: u32 = 0xb5de_5f9e;
    pub const SWAP: u32 = 0x2593_8561;
    pub const SWAP_INTERNAL: u32 = 0xfcb1_be1e;
    pub const CREATE_VAULT_SUCCESS: u32 = 0x416c_25f4;
    pub const PAYOUT: u32 = 0x4e2e_a902;
    pub const WITHDRAW_INTERNAL: u32 = 0x1a99_da7b;
  }

  pub mod lp_account {
    pub const DEPOSIT_ALL: u32 = 0xec32_8fb0;
    pub const CANCEL_DEPOSIT: u32 = 0xf31f_8168;
  }

  pub mod pool {
    pub const PREMINT: u32 = 0x4460_77df;
    pub const UPDATE_ADMIN_FEE_NUMERATOR: u32 = 0xbcc2_32f0;
    pub const UPDATE_FEE_NUMERATOR: u32 = 0x3a2e_420d;
    pub const CLAIM_ADMIN_FEE: u32 = 0x913e_42af;
    pub const RAMP_A: u32 = 0xc951_044f;
    pub const STOP_RAMP_A: u32 = 0x7161_43ab;
    pub const DEPOSIT_BETWEEN: u32 = 0xde90_e25c;
    pub const SWAP_BETWEEN: u32 = 0xffae_5893;
    pub const WITHDRAW_BETWEEN: u32 = 0xb496_3cdc;
  }
}

/// Field widths in bits.
pub struct Size;

impl Size {
  pub const OP: usize = 32;
  pub const QUERY_ID: usize = 64;
  pub const TIMESTAMP: usize = 32;
  pub const CONTRACT_TYPE: usize = 5;
  pub const POOL_TYPE: usize = 4;
  pub const ASSET_TYPE: usize = torch_core::asset::ASSET_TYPE_BITS;
  pub const SIGNER_KEY: usize = 256;
  pub const AMPLIFICATION_FACTOR: usize = 20;
  pub const BASE_LP_INDEX: usize = 4;
  pub const NEXT_TYPE: usize = 2;
  pub const SIGNATURE: usize = 512;
  pub const PROOF: usize = 256;
  pub const DICT_KEY: usize = 4;
}

macro_rules! wire_enum {
  ($name:ident, $kind:literal, { $($variant:ident = $value:literal),+ $(,)? }) => {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[repr(u8)]
    pub enum $name {
      $($variant = $value),+
    }

    impl TryFrom<u64> for $name {
      type Error = CoreError;

      fn try_from(value: u64) -> Result<Self> {
        match value {
          $($value => Ok($name::$variant),)+
          other => Err(CoreError::unknown($kind, other)),
        }
      }
    }

    impl From<$name> for u128 {
      fn from(value: $name) -> u128 {
        value as u128
      }
    }
  };
}

wire_enum!(ContractType, "contract type", {
  Factory = 0,
  Vault = 1,
  LpAccount = 2,
  Pool = 3,
});

wire_enum!(PoolType, "pool type", {
  Base = 0,
  Meta = 1,
});

wire_enum!(PoolStatus, "pool status", {
  NotExist = 0,
  Active = 1,
  IsStop = 2,
});

wire_enum!(NextType, "next type", {
  Swap = 0,
  Deposit = 1,
  Withdraw = 2,
});
