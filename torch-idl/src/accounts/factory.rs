use std::sync::Arc;

use torch_core::address::Address;
use torch_core::cell::Cell;
use torch_core::dict::{DictValue, Dictionary};
use torch_core::error::Result;
use torch_core::stack::{StackItem, StackReader, TvmInt};

use crate::constants::{ContractType, Size};

/// Factory state as returned by `get_factory_data`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FactoryData {
  pub contract_type: ContractType,
  pub admin: Address,
  pub base_code: Arc<Cell>,
  pub lp_account_code: Arc<Cell>,
  /// Vault code per asset type.
  pub vault_codes: Dictionary<Arc<Cell>>,
  pub signer_key: [u8; 32],
  /// Pool code per pool type.
  pub pool_codes: Dictionary<Arc<Cell>>,
  pub lp_wallet_code: Arc<Cell>,
  /// Admin fee numerator per pool type.
  pub admin_fee_config: Dictionary<u128>,
}

/// Dictionaries come back as their bare root cell, or null when empty.
pub(crate) fn read_dict<V: DictValue>(
  reader: &mut StackReader,
) -> Result<Dictionary<V>> {
  let root = reader.read_cell_opt()?;
  Dictionary::from_root(Size::DICT_KEY, root.as_deref())
}

pub(crate) fn dict_item<V: DictValue>(
  dict: &Dictionary<V>,
) -> Result<StackItem> {
  Ok(dict.root()?.map_or(StackItem::Null, StackItem::Cell))
}

impl FactoryData {
  pub fn from_stack(stack: Vec<StackItem>) -> Result<FactoryData> {
    let mut reader = StackReader::new(stack);
    Ok(FactoryData {
      contract_type: ContractType::try_from(reader.read_u64()?)?,
      admin: reader.read_address()?,
      base_code: reader.read_cell()?,
      lp_account_code: reader.read_cell()?,
      vault_codes: read_dict(&mut reader)?,
      signer_key: reader.read_int()?.to_u256()?,
      pool_codes: read_dict(&mut reader)?,
      lp_wallet_code: reader.read_cell()?,
      admin_fee_config: read_dict(&mut reader)?,
    })
  }

  /// The stack a factory answers `get_factory_data` with.
  pub fn to_stack(&self) -> Result<Vec<StackItem>> {
    Ok(vec![
      StackItem::int(u128::from(self.contract_type)),
      StackItem::address(&self.admin)?,
      StackItem::Cell(self.base_code.clone()),
      StackItem::Cell(self.lp_account_code.clone()),
      dict_item(&self.vault_codes)?,
      StackItem::Int(TvmInt::from_u256(self.signer_key)),
      dict_item(&self.pool_codes)?,
      StackItem::Cell(self.lp_wallet_code.clone()),
      dict_item(&self.admin_fee_config)?,
    ])
  }
}

#[cfg(test)]
mod tests {
  use torch_core::builder::CellBuilder;
  use torch_core::error::CoreError;

  use super::*;

  fn code(tag: u8) -> Result<Arc<Cell>> {
    CellBuilder::new().store_uint(tag.into(), 8)?.build_ref()
  }

  fn factory() -> Result<FactoryData> {
    let mut vault_codes = Dictionary::new(Size::DICT_KEY);
    vault_codes.insert(0, code(1)?)?;
    vault_codes.insert(1, code(2)?)?;
    let mut admin_fee_config = Dictionary::new(Size::DICT_KEY);
    admin_fee_config.insert(0, 5_000_000_000u128)?;
    Ok(FactoryData {
      contract_type: ContractType::Factory,
      admin: Address::new(0, [0xad; 32]),
      base_code: code(3)?,
      lp_account_code: code(4)?,
      vault_codes,
      signer_key: [0xff; 32],
      pool_codes: Dictionary::new(Size::DICT_KEY),
      lp_wallet_code: code(5)?,
      admin_fee_config,
    })
  }

  #[test]
  fn factory_stack_round_trip() -> Result<()> {
    let data = factory()?;
    let stack = data.to_stack()?;
    // Empty pool code map travels as null.
    assert_eq!(stack[6], StackItem::Null);
    assert_eq!(FactoryData::from_stack(stack)?, data);
    Ok(())
  }

  #[test]
  fn wrong_contract_type() -> Result<()> {
    let mut stack = factory()?.to_stack()?;
    stack[0] = StackItem::int(8u64);
    assert_eq!(
      FactoryData::from_stack(stack),
      Err(CoreError::unknown("contract type", 8))
    );
    Ok(())
  }

  #[test]
  fn short_stack_is_malformed() -> Result<()> {
    let mut stack = factory()?.to_stack()?;
    stack.truncate(4);
    assert!(matches!(
      FactoryData::from_stack(stack),
      Err(CoreError::Malformed(_))
    ));
    Ok(())
  }
}
