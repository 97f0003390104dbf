#![allow(clippy::missing_errors_doc)]
#![allow(clippy::wildcard_imports)]

pub mod address;
pub mod asset;
pub mod builder;
pub mod cell;
pub mod clock;
pub mod dict;
pub mod error;
pub mod fees;
pub mod nested;
pub mod slice;
pub mod stack;

pub mod prelude {
  pub use crate::address::Address;
  pub use crate::asset::{Allocation, Asset, AssetType};
  pub use crate::builder::{CellBuilder, MAX_COINS};
  pub use crate::cell::{Cell, CellHash};
  pub use crate::clock::{FixedClock, SystemClock, UnixClock};
  pub use crate::dict::{DictValue, Dictionary};
  pub use crate::error::{CoreError, Result};
  pub use crate::fees::{collect_stats, CellStats, ForwardFeeConfig};
  pub use crate::nested::{
    parse_assets_nested, parse_coins_nested, store_assets_nested,
    store_coins_nested,
  };
  pub use crate::slice::CellSlice;
  pub use crate::stack::{StackItem, StackReader, TvmInt};
}
