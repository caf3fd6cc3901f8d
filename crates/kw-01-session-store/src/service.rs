//! # Session Service
//!
//! Account, key and settings operations over the [`SessionStore`].
//!
//! Every operation is guarded by `with_ready`. Names are validated before
//! the vault is touched, and mutations publish the vault's returned view.

use crate::domain::validate_account_name;
use crate::ports::SessionApi;
use crate::store::SessionStore;
use async_trait::async_trait;
use shared_types::{
    Password, PublicKeyHash, SecretString, Settings, SignedPayload, WalletResult, WalletState,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Session API implementation.
pub struct SessionService {
    store: Arc<SessionStore>,
}

impl SessionService {
    /// Create a service over `store`.
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }
}

#[async_trait]
impl SessionApi for SessionService {
    fn state(&self) -> WalletState {
        self.store.snapshot()
    }

    async fn new_wallet(
        &self,
        password: &Password,
        mnemonic: Option<&SecretString>,
    ) -> WalletResult<()> {
        self.store.spawn_and_unlock(password, mnemonic).await
    }

    async fn unlock(&self, password: &Password) -> WalletResult<()> {
        self.store.unlock(password).await
    }

    fn lock(&self) -> WalletResult<()> {
        self.store.lock()
    }

    async fn create_account(&self, name: Option<&str>) -> WalletResult<()> {
        self.store
            .with_ready(|session| async move {
                // An empty name means "let the vault pick one".
                let name = match name {
                    Some(n) if !n.is_empty() => Some(validate_account_name(n)?),
                    _ => None,
                };
                let accounts = session.vault.create_hd_account(name.as_deref()).await?;
                info!(accounts = accounts.len(), "HD account created");
                self.store.accounts_updated(&session, accounts);
                Ok(())
            })
            .await
    }

    async fn reveal_private_key(
        &self,
        pkh: &PublicKeyHash,
        password: &Password,
    ) -> WalletResult<SecretString> {
        self.store
            .with_ready(|_| async move {
                let key = self.store.vault().reveal_private_key(pkh, password).await?;
                debug!(pkh = %pkh, "Private key revealed");
                Ok(key)
            })
            .await
    }

    async fn reveal_mnemonic(&self, password: &Password) -> WalletResult<SecretString> {
        self.store
            .with_ready(|_| async move { Ok(self.store.vault().reveal_mnemonic(password).await?) })
            .await
    }

    async fn reveal_public_key(&self, pkh: &PublicKeyHash) -> WalletResult<String> {
        self.store
            .with_ready(|session| async move { Ok(session.vault.reveal_public_key(pkh).await?) })
            .await
    }

    async fn remove_account(&self, pkh: &PublicKeyHash, password: &Password) -> WalletResult<()> {
        self.store
            .with_ready(|session| async move {
                let accounts = self.store.vault().remove_account(pkh, password).await?;
                info!(pkh = %pkh, "Account removed");
                self.store.accounts_updated(&session, accounts);
                Ok(())
            })
            .await
    }

    async fn edit_account(&self, pkh: &PublicKeyHash, name: &str) -> WalletResult<()> {
        self.store
            .with_ready(|session| async move {
                let name = validate_account_name(name)?;
                let accounts = session.vault.edit_account_name(pkh, &name).await?;
                self.store.accounts_updated(&session, accounts);
                Ok(())
            })
            .await
    }

    async fn import_account(
        &self,
        private_key: &SecretString,
        enc_password: Option<&Password>,
    ) -> WalletResult<()> {
        self.store
            .with_ready(|session| async move {
                let accounts = session.vault.import_account(private_key, enc_password).await?;
                info!(accounts = accounts.len(), "Account imported");
                self.store.accounts_updated(&session, accounts);
                Ok(())
            })
            .await
    }

    async fn import_mnemonic_account(
        &self,
        mnemonic: &SecretString,
        password: Option<&Password>,
        derivation_path: Option<&str>,
    ) -> WalletResult<()> {
        self.store
            .with_ready(|session| async move {
                let accounts = session
                    .vault
                    .import_mnemonic_account(mnemonic, password, derivation_path)
                    .await?;
                info!(accounts = accounts.len(), "Mnemonic account imported");
                self.store.accounts_updated(&session, accounts);
                Ok(())
            })
            .await
    }

    async fn import_fundraiser_account(
        &self,
        email: &str,
        password: &Password,
        mnemonic: &SecretString,
    ) -> WalletResult<()> {
        self.store
            .with_ready(|session| async move {
                let accounts = session
                    .vault
                    .import_fundraiser_account(email, password, mnemonic)
                    .await?;
                info!(accounts = accounts.len(), "Fundraiser account imported");
                self.store.accounts_updated(&session, accounts);
                Ok(())
            })
            .await
    }

    async fn update_settings(&self, settings: &Settings) -> WalletResult<()> {
        self.store
            .with_ready(|session| async move {
                let updated = session.vault.update_settings(settings).await?;
                self.store.settings_updated(&session, updated);
                Ok(())
            })
            .await
    }

    async fn sign(
        &self,
        pkh: &PublicKeyHash,
        bytes: &str,
        watermark: Option<&str>,
        password: &Password,
    ) -> WalletResult<SignedPayload> {
        self.store
            .with_ready(|_| async move {
                let signed = self.store.vault().sign(pkh, bytes, watermark, password).await?;
                info!(pkh = %pkh, "Payload signed");
                Ok(signed)
            })
            .await
    }
}
