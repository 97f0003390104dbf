//! Exit codes raised by Torch contracts, for diagnosing failed transactions.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[repr(u32)]
pub enum ExitCode {
  #[error("Not deployer")]
  NotDeployer = 1000,
  #[error("Not admin")]
  NotAdmin = 1001,
  #[error("Invalid asset type")]
  InvalidAssetType = 1002,
  #[error("Not supported asset type")]
  NotSupportedAssetType = 1003,
  #[error("Not vault")]
  NotVault = 1005,
  #[error("Not factory")]
  NotFactory = 1006,
  #[error("Wrong asset")]
  WrongAsset = 1007,
  #[error("Can only withdraw one")]
  CanOnlyWithdrawOne = 1008,
  #[error("Expired")]
  Expired = 1009,
  #[error("Invalid signature")]
  InvalidSignature = 1010,
  #[error("Minimum amount not met")]
  MinAmountNotMet = 1011,
  #[error("Not a jetton wallet")]
  NotJettonWallet = 1012,
  #[error("Wrong next type")]
  WrongNextType = 1013,
  #[error("Invalid sender")]
  InvalidSender = 1014,
  #[error("Invalid amount")]
  InvalidAmount = 1015,
  #[error("Not an LP vault")]
  NotLpVault = 1016,
  #[error("Not a jetton master")]
  NotJettonMaster = 1017,
  #[error("Asset not found")]
  AssetNotFound = 1018,
  #[error("Invalid deposit one amount")]
  InvalidDepositOneAmount = 1019,
  #[error("Same asset")]
  SameAsset = 1021,
  #[error("Invalid deposit sender")]
  InvalidDepositSender = 1022,
  #[error("Invalid liquidity")]
  InvalidLiquidity = 2001,
  #[error("Invalid ramp A")]
  InvalidRampA = 2003,
  #[error("Invalid ramp time")]
  InvalidRampTime = 2004,
  #[error("No signed rates")]
  NoSignedRates = 2005,
  #[error("Not a pool")]
  NotPool = 2006,
  #[error("Pool in stop state")]
  PoolInStopState = 2007,
  #[error("Invalid admin fee")]
  InvalidAdminFee = 2008,
  #[error("Invalid fee")]
  InvalidFee = 2009,
  #[error("Invalid A change")]
  InvalidAChange = 2010,
  #[error("Wrong base asset")]
  WrongBaseAsset = 3000,
  #[error("Wrong meta asset")]
  WrongMetaAsset = 3001,
  #[error("Wrong base pool")]
  WrongBasePool = 3002,
  #[error("Wrong meta amount")]
  WrongMetaAmount = 4000,
  #[error("Duplicate deposit")]
  DuplicateDeposit = 4001,
  #[error("Undefined opcode")]
  WrongOp = 65535,
}

const ALL: [ExitCode; 36] = [
  ExitCode::NotDeployer,
  ExitCode::NotAdmin,
  ExitCode::InvalidAssetType,
  ExitCode::NotSupportedAssetType,
  ExitCode::NotVault,
  ExitCode::NotFactory,
  ExitCode::WrongAsset,
  ExitCode::CanOnlyWithdrawOne,
  ExitCode::Expired,
  ExitCode::InvalidSignature,
  ExitCode::MinAmountNotMet,
  ExitCode::NotJettonWallet,
  ExitCode::WrongNextType,
  ExitCode::InvalidSender,
  ExitCode::InvalidAmount,
  ExitCode::NotLpVault,
  ExitCode::NotJettonMaster,
  ExitCode::AssetNotFound,
  ExitCode::InvalidDepositOneAmount,
  ExitCode::SameAsset,
  ExitCode::InvalidDepositSender,
  ExitCode::InvalidLiquidity,
  ExitCode::InvalidRampA,
  ExitCode::InvalidRampTime,
  ExitCode::NoSignedRates,
  ExitCode::NotPool,
  ExitCode::PoolInStopState,
  ExitCode::InvalidAdminFee,
  ExitCode::InvalidFee,
  ExitCode::InvalidAChange,
  ExitCode::WrongBaseAsset,
  ExitCode::WrongMetaAsset,
  ExitCode::WrongBasePool,
  ExitCode::WrongMetaAmount,
  ExitCode::DuplicateDeposit,
  ExitCode::WrongOp,
];

impl ExitCode {
  #[must_use]
  pub fn code(self) -> u32 {
    self as u32
  }

  #[must_use]
  pub fn from_code(code: u32) -> Option<ExitCode> {
    ALL.into_iter().find(|exit| exit.code() == code)
  }

  /// Human readable reason for a transaction exit code.
  #[must_use]
  pub fn explain(code: u32) -> String {
    ExitCode::from_code(code)
      .map_or_else(|| format!("Unknown exit code: {code}"), |e| e.to_string())
  }
}
