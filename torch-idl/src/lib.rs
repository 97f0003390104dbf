//! Protocol definitions for the Torch stableswap contracts: constants,
//! operation payloads, message builders and state decoders.

#![allow(clippy::missing_errors_doc)]

pub mod accounts;
pub mod constants;
pub mod exit_code;
pub mod message_builders;
pub mod payloads;
