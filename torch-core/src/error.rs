use thiserror::Error;

/// Failures raised while building or reading cell documents.
///
/// None of these are recoverable: a document that fails to build or parse
/// must not be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
  #[error("Cell capacity exceeded: {0}.")]
  CapacityExceeded(String),
  #[error("Unknown {kind} discriminant: {value}.")]
  UnknownVariant { kind: &'static str, value: u64 },
  #[error("Asset class is not supported on the wire: {0}.")]
  UnsupportedAssetClass(String),
  #[error("Malformed cell document: {0}.")]
  Malformed(String),
  #[error("Invalid address: {0}.")]
  InvalidAddress(String),
}

impl CoreError {
  #[must_use]
  pub fn capacity(detail: impl Into<String>) -> CoreError {
    CoreError::CapacityExceeded(detail.into())
  }

  #[must_use]
  pub fn malformed(detail: impl Into<String>) -> CoreError {
    CoreError::Malformed(detail.into())
  }

  #[must_use]
  pub fn unknown(kind: &'static str, value: u64) -> CoreError {
    CoreError::UnknownVariant { kind, value }
  }
}

pub type Result<T> = std::result::Result<T, CoreError>;
