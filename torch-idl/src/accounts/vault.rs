use std::sync::Arc;

use torch_core::address::Address;
use torch_core::asset::{Asset, AssetType};
use torch_core::builder::CellBuilder;
use torch_core::cell::Cell;
use torch_core::error::{CoreError, Result};

use crate::constants::{ContractType, Size};

/// What a vault custodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VaultKind {
  Ton,
  Jetton {
    jetton_master: Address,
    /// The vault's own wallet for that jetton.
    jetton_wallet: Address,
  },
}

/// Vault state as returned by `get_vault_data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VaultData {
  pub contract_type: ContractType,
  pub admin: Address,
  pub kind: VaultKind,
}

impl VaultData {
  #[must_use]
  pub fn asset(&self) -> Asset {
    match self.kind {
      VaultKind::Ton => Asset::Ton,
      VaultKind::Jetton { jetton_master, .. } => Asset::Jetton(jetton_master),
    }
  }

  /// # Errors
  /// * `UnsupportedAssetClass` for extra currency vaults
  /// * `UnknownVariant` for unknown contract or asset types
  pub fn from_cell(cell: &Cell) -> Result<VaultData> {
    let mut slice = cell.parse();
    let contract_type =
      ContractType::try_from(slice.load_u64(Size::CONTRACT_TYPE)?)?;
    let asset_type = AssetType::try_from(slice.load_u64(Size::ASSET_TYPE)?)?;
    let admin = slice.load_required_address()?;
    let kind = match asset_type {
      AssetType::Ton => VaultKind::Ton,
      AssetType::Jetton => VaultKind::Jetton {
        jetton_master: slice.load_required_address()?,
        jetton_wallet: slice.load_required_address()?,
      },
      AssetType::ExtraCurrency => {
        return Err(CoreError::UnsupportedAssetClass(
          "extra currency vaults".to_string(),
        ))
      }
    };
    Ok(VaultData {
      contract_type,
      admin,
      kind,
    })
  }

  pub fn to_cell(&self) -> Result<Arc<Cell>> {
    let mut builder = CellBuilder::new();
    builder.store_uint(self.contract_type.into(), Size::CONTRACT_TYPE)?;
    builder.store_uint(self.asset().asset_type() as u128, Size::ASSET_TYPE)?;
    builder.store_address(Some(&self.admin))?;
    if let VaultKind::Jetton {
      jetton_master,
      jetton_wallet,
    } = &self.kind
    {
      builder
        .store_address(Some(jetton_master))?
        .store_address(Some(jetton_wallet))?;
    }
    builder.build_ref()
  }
}
