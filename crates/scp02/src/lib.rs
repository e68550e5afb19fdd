//! GlobalPlatform SCP02 secure messaging
//!
//! This crate provides [`Scp02Session`], a
//! [`SecureMessaging`](apdu_sm_core::SecureMessaging) engine for an SCP02
//! secure channel whose session keys have already been established. It
//! applies C-MAC, optional C-DECRYPTION and optional R-MAC verification to
//! exchanges driven by [`apdu_sm_core::send_apdu`].
//!
//! Channel initiation (INITIALIZE UPDATE, EXTERNAL AUTHENTICATE and key
//! derivation) is left to the caller.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]

pub mod crypto;
pub mod error;
pub mod secure_messaging;
pub mod session;

pub use error::{Error, Result};
pub use session::{Scp02Level, Scp02Options, Scp02Session, SessionKeys};
