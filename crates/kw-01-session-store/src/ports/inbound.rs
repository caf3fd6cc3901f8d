//! # Inbound Ports
//!
//! API trait defining what the session subsystem can do.

use async_trait::async_trait;
use shared_types::{
    Password, PublicKeyHash, SecretString, Settings, SignedPayload, WalletResult, WalletState,
};

/// Session API - inbound port.
///
/// Every account, key and settings operation fails with `NotReady` unless
/// the session is unlocked.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Front-end view of the session.
    fn state(&self) -> WalletState;

    /// Create a vault and unlock it.
    async fn new_wallet(
        &self,
        password: &Password,
        mnemonic: Option<&SecretString>,
    ) -> WalletResult<()>;

    /// Unlock (or re-authenticate) the session.
    async fn unlock(&self, password: &Password) -> WalletResult<()>;

    /// Lock the session.
    fn lock(&self) -> WalletResult<()>;

    /// Derive a new HD account.
    async fn create_account(&self, name: Option<&str>) -> WalletResult<()>;

    /// Reveal an account's private key.
    async fn reveal_private_key(
        &self,
        pkh: &PublicKeyHash,
        password: &Password,
    ) -> WalletResult<SecretString>;

    /// Reveal the vault mnemonic.
    async fn reveal_mnemonic(&self, password: &Password) -> WalletResult<SecretString>;

    /// Reveal an account's public key.
    async fn reveal_public_key(&self, pkh: &PublicKeyHash) -> WalletResult<String>;

    /// Remove an account.
    async fn remove_account(&self, pkh: &PublicKeyHash, password: &Password) -> WalletResult<()>;

    /// Rename an account.
    async fn edit_account(&self, pkh: &PublicKeyHash, name: &str) -> WalletResult<()>;

    /// Import a raw private key.
    async fn import_account(
        &self,
        private_key: &SecretString,
        enc_password: Option<&Password>,
    ) -> WalletResult<()>;

    /// Import an account from a mnemonic.
    async fn import_mnemonic_account(
        &self,
        mnemonic: &SecretString,
        password: Option<&Password>,
        derivation_path: Option<&str>,
    ) -> WalletResult<()>;

    /// Import an account from fundraiser credentials.
    async fn import_fundraiser_account(
        &self,
        email: &str,
        password: &Password,
        mnemonic: &SecretString,
    ) -> WalletResult<()>;

    /// Merge settings.
    async fn update_settings(&self, settings: &Settings) -> WalletResult<()>;

    /// Sign bytes. Consent must already have been given.
    async fn sign(
        &self,
        pkh: &PublicKeyHash,
        bytes: &str,
        watermark: Option<&str>,
        password: &Password,
    ) -> WalletResult<SignedPayload>;
}
