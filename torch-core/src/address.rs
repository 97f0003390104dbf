//! Standard internal account addresses.

use std::fmt;
use std::str::FromStr;

use base64::prelude::{Engine, BASE64_STANDARD, BASE64_URL_SAFE};

use crate::error::CoreError;

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TESTNET: u8 = 0x80;

/// Account address on a workchain: `addr_std` without anycast.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
  workchain: i8,
  hash: [u8; 32],
}

impl Address {
  /// Width of `addr_std` on the wire: tag, anycast bit, workchain, account.
  pub const STD_BITS: usize = 2 + 1 + 8 + 256;

  #[must_use]
  pub const fn new(workchain: i8, hash: [u8; 32]) -> Address {
    Address { workchain, hash }
  }

  #[must_use]
  pub fn workchain(&self) -> i8 {
    self.workchain
  }

  #[must_use]
  pub fn hash(&self) -> &[u8; 32] {
    &self.hash
  }

  /// Raw `workchain:hex` form.
  #[must_use]
  pub fn to_raw_string(&self) -> String {
    format!("{}:{}", self.workchain, hex::encode(self.hash))
  }

  /// User-friendly base64url form with checksum.
  #[must_use]
  pub fn to_friendly(&self, bounceable: bool, testnet: bool) -> String {
    let mut tag = if bounceable {
      TAG_BOUNCEABLE
    } else {
      TAG_NON_BOUNCEABLE
    };
    if testnet {
      tag |= TAG_TESTNET;
    }
    let mut bytes = Vec::with_capacity(36);
    bytes.push(tag);
    bytes.push(self.workchain.to_be_bytes()[0]);
    bytes.extend_from_slice(&self.hash);
    let crc = crc16(&bytes);
    bytes.extend_from_slice(&crc.to_be_bytes());
    BASE64_URL_SAFE.encode(bytes)
  }

  fn parse_raw(src: &str) -> Result<Address, CoreError> {
    let (workchain, hash) = src
      .split_once(':')
      .ok_or_else(|| CoreError::InvalidAddress(src.to_string()))?;
    let workchain = workchain
      .parse::<i8>()
      .map_err(|e| CoreError::InvalidAddress(format!("{src}: {e}")))?;
    let hash: [u8; 32] = hex::decode(hash)
      .map_err(|e| CoreError::InvalidAddress(format!("{src}: {e}")))?
      .try_into()
      .map_err(|_| CoreError::InvalidAddress(format!("{src}: not 32 bytes")))?;
    Ok(Address::new(workchain, hash))
  }

  fn parse_friendly(src: &str) -> Result<Address, CoreError> {
    let bytes = if src.contains(['-', '_']) {
      BASE64_URL_SAFE.decode(src)
    } else {
      BASE64_STANDARD.decode(src)
    }
    .map_err(|e| CoreError::InvalidAddress(format!("{src}: {e}")))?;
    if bytes.len() != 36 {
      return Err(CoreError::InvalidAddress(format!(
        "{src}: expected 36 bytes, got {}",
        bytes.len()
      )));
    }
    let tag = bytes[0] & !TAG_TESTNET;
    if tag != TAG_BOUNCEABLE && tag != TAG_NON_BOUNCEABLE {
      return Err(CoreError::InvalidAddress(format!(
        "{src}: unknown tag {:#04x}",
        bytes[0]
      )));
    }
    let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
    if crc16(&bytes[..34]) != expected {
      return Err(CoreError::InvalidAddress(format!("{src}: bad checksum")));
    }
    let workchain = i8::from_be_bytes([bytes[1]]);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes[2..34]);
    Ok(Address::new(workchain, hash))
  }
}

impl FromStr for Address {
  type Err = CoreError;

  fn from_str(src: &str) -> Result<Self, Self::Err> {
    if src.contains(':') {
      Address::parse_raw(src)
    } else {
      Address::parse_friendly(src)
    }
  }
}

impl fmt::Display for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_friendly(true, false))
  }
}

impl fmt::Debug for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Address({})", self.to_raw_string())
  }
}

/// CRC16/XMODEM as used by user-friendly addresses.
fn crc16(data: &[u8]) -> u16 {
  let mut crc = 0u16;
  for byte in data {
    crc ^= u16::from(*byte) << 8;
    for _ in 0..8 {
      crc = if crc & 0x8000 != 0 {
        (crc << 1) ^ 0x1021
      } else {
        crc << 1
      };
    }
  }
  crc
}

#[cfg(test)]
mod tests {
  use super::*;

  const FACTORY: &str = "EQCphoE6MwHy2kvnim6RrRr71oY6KSTMXiTMAEu-qRS4QUwV";

  #[test]
  fn friendly_round_trip() -> Result<(), CoreError> {
    let address = Address::from_str(FACTORY)?;
    assert_eq!(address.workchain(), 0);
    assert_eq!(address.to_string(), FACTORY);
    Ok(())
  }

  #[test]
  fn raw_round_trip() -> Result<(), CoreError> {
    let address = Address::from_str(FACTORY)?;
    let raw = address.to_raw_string();
    assert_eq!(Address::from_str(&raw)?, address);
    Ok(())
  }

  #[test]
  fn non_bounceable_testnet_parses() -> Result<(), CoreError> {
    let address = Address::from_str(FACTORY)?;
    let friendly = address.to_friendly(false, true);
    assert!(friendly.starts_with('0'));
    assert_eq!(Address::from_str(&friendly)?, address);
    Ok(())
  }

  #[test]
  fn masterchain_raw() -> Result<(), CoreError> {
    let raw = format!("-1:{}", "33".repeat(32));
    let address = Address::from_str(&raw)?;
    assert_eq!(address.workchain(), -1);
    assert_eq!(address.hash(), &[0x33; 32]);
    Ok(())
  }

  #[test]
  fn rejects_bad_checksum() {
    let corrupted = FACTORY.replace("QUwV", "QUwW");
    assert!(matches!(
      Address::from_str(&corrupted),
      Err(CoreError::InvalidAddress(_))
    ));
  }

  #[test]
  fn rejects_short_hash() {
    assert!(Address::from_str("0:abcd").is_err());
  }
}
