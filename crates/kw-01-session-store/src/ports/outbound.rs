//! # Outbound Ports
//!
//! The vault capability. Key derivation, encryption and signing live behind
//! these traits and are opaque to the session subsystem.

use async_trait::async_trait;
use shared_types::{Account, Password, PublicKeyHash, SecretString, Settings, SignedPayload, VaultError};
use std::sync::Arc;

/// Vault access that does not need an unlocked session.
///
/// The reveal/remove/sign operations re-authenticate with the password on
/// every call.
#[async_trait]
pub trait VaultProvider: Send + Sync {
    /// Whether a vault has been created.
    async fn exists(&self) -> Result<bool, VaultError>;

    /// Create a new vault, optionally from an existing mnemonic.
    async fn spawn(
        &self,
        password: &Password,
        mnemonic: Option<&SecretString>,
    ) -> Result<(), VaultError>;

    /// Decrypt the vault and open a session on it.
    async fn setup(&self, password: &Password) -> Result<Arc<dyn UnlockedVault>, VaultError>;

    /// Reveal the vault's mnemonic.
    async fn reveal_mnemonic(&self, password: &Password) -> Result<SecretString, VaultError>;

    /// Reveal an account's private key.
    async fn reveal_private_key(
        &self,
        pkh: &PublicKeyHash,
        password: &Password,
    ) -> Result<SecretString, VaultError>;

    /// Remove an account. Returns the updated account list.
    async fn remove_account(
        &self,
        pkh: &PublicKeyHash,
        password: &Password,
    ) -> Result<Vec<Account>, VaultError>;

    /// Sign bytes with an account key.
    async fn sign(
        &self,
        pkh: &PublicKeyHash,
        bytes: &str,
        watermark: Option<&str>,
        password: &Password,
    ) -> Result<SignedPayload, VaultError>;
}

/// An opened vault. Held only while the session is Ready.
///
/// Every mutation returns the vault's updated view.
#[async_trait]
pub trait UnlockedVault: Send + Sync {
    /// All accounts.
    async fn fetch_accounts(&self) -> Result<Vec<Account>, VaultError>;

    /// Current settings.
    async fn fetch_settings(&self) -> Result<Settings, VaultError>;

    /// Derive the next HD account.
    async fn create_hd_account(&self, name: Option<&str>) -> Result<Vec<Account>, VaultError>;

    /// Public key of an account.
    async fn reveal_public_key(&self, pkh: &PublicKeyHash) -> Result<String, VaultError>;

    /// Rename an account.
    async fn edit_account_name(
        &self,
        pkh: &PublicKeyHash,
        name: &str,
    ) -> Result<Vec<Account>, VaultError>;

    /// Import a raw private key, optionally encrypted.
    async fn import_account(
        &self,
        private_key: &SecretString,
        enc_password: Option<&Password>,
    ) -> Result<Vec<Account>, VaultError>;

    /// Import an account from a foreign mnemonic.
    async fn import_mnemonic_account(
        &self,
        mnemonic: &SecretString,
        password: Option<&Password>,
        derivation_path: Option<&str>,
    ) -> Result<Vec<Account>, VaultError>;

    /// Import an account from fundraiser credentials.
    async fn import_fundraiser_account(
        &self,
        email: &str,
        password: &Password,
        mnemonic: &SecretString,
    ) -> Result<Vec<Account>, VaultError>;

    /// Merge a partial settings mapping.
    async fn update_settings(&self, settings: &Settings) -> Result<Settings, VaultError>;
}
