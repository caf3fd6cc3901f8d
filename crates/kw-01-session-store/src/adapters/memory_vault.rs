//! # In-Memory Vault
//!
//! A vault for tests and local development. Keys are derived by hashing and
//! signatures are keyed digests; none of this is real cryptography.

use crate::ports::{UnlockedVault, VaultProvider};
use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use shared_types::{
    Account, AccountType, Password, PublicKeyHash, SecretString, Settings, SignedPayload,
    VaultError,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Valid mnemonic lengths.
const MNEMONIC_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

const WORDS: [&str; 16] = [
    "amber", "basket", "cactus", "dolphin", "ember", "falcon", "garden", "harbor", "island",
    "jungle", "kettle", "lantern", "meadow", "nectar", "orbit", "pepper",
];

struct StoredAccount {
    account: Account,
    private_key: SecretString,
}

struct VaultData {
    password_digest: [u8; 32],
    mnemonic: SecretString,
    accounts: Vec<StoredAccount>,
    settings: Settings,
    next_hd_index: u32,
}

fn digest(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn derive_account(
    seed: &[u8],
    path: &str,
    name: String,
    account_type: AccountType,
    hd_index: Option<u32>,
) -> StoredAccount {
    let secret = digest(&[b"secret", seed, path.as_bytes()]);
    let public = digest(&[b"public", &secret]);
    StoredAccount {
        account: Account {
            public_key_hash: PublicKeyHash::new(format!("tz1{}", &hex::encode(public)[..33])),
            name,
            default: false,
            account_type,
            hd_index,
        },
        private_key: SecretString::new(format!("edsk{}", hex::encode(secret))),
    }
}

fn public_key_of(private_key: &SecretString) -> String {
    let public = digest(&[b"pk", private_key.expose().as_bytes()]);
    format!("edpk{}", &hex::encode(public)[..50])
}

fn check_mnemonic(mnemonic: &SecretString) -> Result<(), VaultError> {
    let words = mnemonic.expose().split_whitespace().count();
    if MNEMONIC_WORD_COUNTS.contains(&words) {
        Ok(())
    } else {
        Err(VaultError::InvalidMnemonic)
    }
}

impl VaultData {
    fn check_password(&self, password: &Password) -> Result<(), VaultError> {
        if digest(&[password.expose().as_bytes()]) == self.password_digest {
            Ok(())
        } else {
            Err(VaultError::InvalidPassword)
        }
    }

    fn accounts(&self) -> Vec<Account> {
        self.accounts.iter().map(|a| a.account.clone()).collect()
    }

    fn find(&self, pkh: &PublicKeyHash) -> Result<&StoredAccount, VaultError> {
        self.accounts
            .iter()
            .find(|a| &a.account.public_key_hash == pkh)
            .ok_or_else(|| VaultError::AccountNotFound(pkh.clone()))
    }

    fn insert(&mut self, mut stored: StoredAccount) -> Result<Vec<Account>, VaultError> {
        let pkh = &stored.account.public_key_hash;
        if self.accounts.iter().any(|a| &a.account.public_key_hash == pkh) {
            return Err(VaultError::AccountAlreadyExists(pkh.clone()));
        }
        stored.account.default = self.accounts.is_empty();
        self.accounts.push(stored);
        Ok(self.accounts())
    }

    fn next_name(&self) -> String {
        format!("Account {}", self.accounts.len() + 1)
    }

    fn derive_hd(&mut self, name: Option<&str>) -> StoredAccount {
        let index = self.next_hd_index;
        self.next_hd_index += 1;
        let name = name.map(str::to_string).unwrap_or_else(|| self.next_name());
        derive_account(
            self.mnemonic.expose().as_bytes(),
            &format!("m/44'/1729'/{index}'/0'"),
            name,
            AccountType::Hd,
            Some(index),
        )
    }
}

type SharedData = Arc<Mutex<Option<VaultData>>>;

/// Vault held entirely in memory.
#[derive(Clone, Default)]
pub struct InMemoryVault {
    data: SharedData,
    calls: Arc<AtomicU64>,
}

impl InMemoryVault {
    /// An empty vault store (no vault created yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vault calls made so far, across all sessions.
    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn track(&self, op: &'static str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(op, "Vault call");
    }

    fn with_data<T>(
        &self,
        f: impl FnOnce(&mut VaultData) -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        let mut guard = self.data.lock();
        let data = guard.as_mut().ok_or(VaultError::NotFound)?;
        f(data)
    }
}

#[async_trait]
impl VaultProvider for InMemoryVault {
    async fn exists(&self) -> Result<bool, VaultError> {
        self.track("exists");
        Ok(self.data.lock().is_some())
    }

    async fn spawn(
        &self,
        password: &Password,
        mnemonic: Option<&SecretString>,
    ) -> Result<(), VaultError> {
        self.track("spawn");
        let mnemonic = match mnemonic {
            Some(m) => {
                check_mnemonic(m)?;
                m.clone()
            }
            None => {
                let entropy = digest(&[uuid::Uuid::new_v4().as_bytes()]);
                let words: Vec<&str> = entropy[..12]
                    .iter()
                    .map(|b| WORDS[(*b as usize) % WORDS.len()])
                    .collect();
                SecretString::new(words.join(" "))
            }
        };

        let mut guard = self.data.lock();
        if guard.is_some() {
            return Err(VaultError::Storage("Vault already exists".to_string()));
        }
        let mut data = VaultData {
            password_digest: digest(&[password.expose().as_bytes()]),
            mnemonic,
            accounts: Vec::new(),
            settings: Settings::new(),
            next_hd_index: 0,
        };
        let first = data.derive_hd(None);
        data.insert(first)?;
        *guard = Some(data);
        Ok(())
    }

    async fn setup(&self, password: &Password) -> Result<Arc<dyn UnlockedVault>, VaultError> {
        self.track("setup");
        self.with_data(|data| data.check_password(password))?;
        Ok(Arc::new(InMemorySession {
            vault: self.clone(),
        }))
    }

    async fn reveal_mnemonic(&self, password: &Password) -> Result<SecretString, VaultError> {
        self.track("reveal_mnemonic");
        self.with_data(|data| {
            data.check_password(password)?;
            Ok(data.mnemonic.clone())
        })
    }

    async fn reveal_private_key(
        &self,
        pkh: &PublicKeyHash,
        password: &Password,
    ) -> Result<SecretString, VaultError> {
        self.track("reveal_private_key");
        self.with_data(|data| {
            data.check_password(password)?;
            Ok(data.find(pkh)?.private_key.clone())
        })
    }

    async fn remove_account(
        &self,
        pkh: &PublicKeyHash,
        password: &Password,
    ) -> Result<Vec<Account>, VaultError> {
        self.track("remove_account");
        self.with_data(|data| {
            data.check_password(password)?;
            data.find(pkh)?;
            if data.accounts.len() == 1 {
                return Err(VaultError::LastAccount);
            }
            data.accounts.retain(|a| &a.account.public_key_hash != pkh);
            if !data.accounts.iter().any(|a| a.account.default) {
                if let Some(first) = data.accounts.first_mut() {
                    first.account.default = true;
                }
            }
            Ok(data.accounts())
        })
    }

    async fn sign(
        &self,
        pkh: &PublicKeyHash,
        bytes: &str,
        watermark: Option<&str>,
        password: &Password,
    ) -> Result<SignedPayload, VaultError> {
        self.track("sign");
        let payload = hex::decode(bytes)
            .map_err(|e| VaultError::Signing(format!("bytes are not hex: {e}")))?;
        let watermark = match watermark {
            Some(w) => hex::decode(w)
                .map_err(|e| VaultError::Signing(format!("watermark is not hex: {e}")))?,
            None => Vec::new(),
        };
        self.with_data(|data| {
            data.check_password(password)?;
            let key = data.find(pkh)?.private_key.expose().as_bytes().to_vec();
            let mut raw = digest(&[&key, &watermark, &payload]).to_vec();
            raw.extend_from_slice(&digest(&[&raw, &key]));
            let raw_hex = hex::encode(&raw);
            Ok(SignedPayload {
                bytes: bytes.to_string(),
                signature: format!("edsig{raw_hex}"),
                signed_bytes: format!("{bytes}{raw_hex}"),
            })
        })
    }
}

/// Session opened by [`InMemoryVault::setup`].
struct InMemorySession {
    vault: InMemoryVault,
}

#[async_trait]
impl UnlockedVault for InMemorySession {
    async fn fetch_accounts(&self) -> Result<Vec<Account>, VaultError> {
        self.vault.track("fetch_accounts");
        self.vault.with_data(|data| Ok(data.accounts()))
    }

    async fn fetch_settings(&self) -> Result<Settings, VaultError> {
        self.vault.track("fetch_settings");
        self.vault.with_data(|data| Ok(data.settings.clone()))
    }

    async fn create_hd_account(&self, name: Option<&str>) -> Result<Vec<Account>, VaultError> {
        self.vault.track("create_hd_account");
        self.vault.with_data(|data| {
            let stored = data.derive_hd(name);
            data.insert(stored)
        })
    }

    async fn reveal_public_key(&self, pkh: &PublicKeyHash) -> Result<String, VaultError> {
        self.vault.track("reveal_public_key");
        self.vault
            .with_data(|data| Ok(public_key_of(&data.find(pkh)?.private_key)))
    }

    async fn edit_account_name(
        &self,
        pkh: &PublicKeyHash,
        name: &str,
    ) -> Result<Vec<Account>, VaultError> {
        self.vault.track("edit_account_name");
        self.vault.with_data(|data| {
            data.find(pkh)?;
            for stored in &mut data.accounts {
                if &stored.account.public_key_hash == pkh {
                    stored.account.name = name.to_string();
                }
            }
            Ok(data.accounts())
        })
    }

    async fn import_account(
        &self,
        private_key: &SecretString,
        enc_password: Option<&Password>,
    ) -> Result<Vec<Account>, VaultError> {
        self.vault.track("import_account");
        let key = private_key.expose().trim();
        if key.is_empty() {
            return Err(VaultError::InvalidPrivateKey);
        }
        let seed = match enc_password {
            Some(p) => format!("{key}:{}", p.expose()),
            None => key.to_string(),
        };
        self.vault.with_data(|data| {
            let name = data.next_name();
            let stored = derive_account(seed.as_bytes(), "imported", name, AccountType::Imported, None);
            data.insert(stored)
        })
    }

    async fn import_mnemonic_account(
        &self,
        mnemonic: &SecretString,
        password: Option<&Password>,
        derivation_path: Option<&str>,
    ) -> Result<Vec<Account>, VaultError> {
        self.vault.track("import_mnemonic_account");
        check_mnemonic(mnemonic)?;
        let seed = format!(
            "{}:{}",
            mnemonic.expose(),
            password.map(|p| p.expose()).unwrap_or_default()
        );
        let path = derivation_path.unwrap_or("m/44'/1729'/0'/0'");
        self.vault.with_data(|data| {
            let name = data.next_name();
            let stored = derive_account(seed.as_bytes(), path, name, AccountType::Imported, None);
            data.insert(stored)
        })
    }

    async fn import_fundraiser_account(
        &self,
        email: &str,
        password: &Password,
        mnemonic: &SecretString,
    ) -> Result<Vec<Account>, VaultError> {
        self.vault.track("import_fundraiser_account");
        check_mnemonic(mnemonic)?;
        let seed = format!("{}:{email}{}", mnemonic.expose(), password.expose());
        self.vault.with_data(|data| {
            let name = data.next_name();
            let stored = derive_account(
                seed.as_bytes(),
                "fundraiser",
                name,
                AccountType::Fundraiser,
                None,
            );
            data.insert(stored)
        })
    }

    async fn update_settings(&self, settings: &Settings) -> Result<Settings, VaultError> {
        self.vault.track("update_settings");
        self.vault.with_data(|data| {
            for (key, value) in settings {
                data.settings.insert(key.clone(), value.clone());
            }
            Ok(data.settings.clone())
        })
    }
}
