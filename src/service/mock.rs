//! In-memory fakes of the service seam for tests.

use super::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateAccount { email: String },
    SignIn { email: String },
    SignInFederated { provider_id: String },
    UpdateDisplayName { uid: String, name: String },
    GetDocument { collection: String, key: String },
    PutDocument { collection: String, key: String },
}

/// Call log shared between the fakes so tests can assert cross-service order.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }
}

#[derive(Default)]
pub struct FakeIdentityService {
    log: CallLog,
    accounts: Mutex<HashMap<String, (String, Identity)>>,
    federated: Mutex<Option<Identity>>,
    fail_with: Mutex<Option<AuthError>>,
    next_uid: Mutex<u32>,
    gate: Option<Arc<Notify>>,
}

impl FakeIdentityService {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    /// Every call waits on `gate` before answering.
    pub fn gated(log: CallLog, gate: Arc<Notify>) -> Self {
        Self {
            log,
            gate: Some(gate),
            ..Default::default()
        }
    }

    /// Credential the fake issues to `uid` on every sign-in.
    pub fn credential_for(uid: &str) -> Credential {
        Credential::bearer(format!("token-{}", uid))
    }

    pub fn with_account(self, email: &str, password: &str, identity: Identity) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), identity));
        self
    }

    pub fn with_federated(self, identity: Identity) -> Self {
        *self.federated.lock().unwrap() = Some(identity);
        self
    }

    pub fn failing(self, message: &str) -> Self {
        *self.fail_with.lock().unwrap() = Some(AuthError::new(message));
        self
    }

    async fn pass_gate(&self) -> Result<(), AuthError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.fail_with.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IdentityService for FakeIdentityService {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.log.push(Call::CreateAccount {
            email: email.to_string(),
        });
        self.pass_gate().await?;

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::new("Firebase: Error (auth/email-already-in-use).")
                .with_code("auth/email-already-in-use"));
        }
        let mut next = self.next_uid.lock().unwrap();
        *next += 1;
        let uid = format!("uid-{}", *next);
        let identity = Identity::new(&uid).with_email(email);
        accounts.insert(
            email.to_string(),
            (password.to_string(), identity.clone()),
        );
        Ok(identity.with_credential(Self::credential_for(&uid)))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.log.push(Call::SignIn {
            email: email.to_string(),
        });
        self.pass_gate().await?;

        match self.accounts.lock().unwrap().get(email) {
            Some((stored, identity)) if stored == password => Ok(identity
                .clone()
                .with_credential(Self::credential_for(&identity.uid))),
            _ => Err(AuthError::new("Firebase: Error (auth/invalid-credential).")
                .with_code("auth/invalid-credential")),
        }
    }

    async fn sign_in_federated(
        &self,
        provider: &ProviderDescriptor,
    ) -> Result<Identity, AuthError> {
        self.log.push(Call::SignInFederated {
            provider_id: provider.provider_id.clone(),
        });
        self.pass_gate().await?;

        self.federated
            .lock()
            .unwrap()
            .clone()
            .map(|identity| {
                let credential = Self::credential_for(&identity.uid);
                identity.with_credential(credential)
            })
            .ok_or_else(|| AuthError::new("Firebase: Error (auth/popup-closed-by-user)."))
    }

    async fn update_display_name(&self, identity: &Identity, name: &str) -> Result<(), AuthError> {
        self.log.push(Call::UpdateDisplayName {
            uid: identity.uid.clone(),
            name: name.to_string(),
        });
        if identity.credential != Self::credential_for(&identity.uid) {
            return Err(AuthError::new("No signed-in user"));
        }
        for (_, stored) in self.accounts.lock().unwrap().values_mut() {
            if stored.uid == identity.uid {
                stored.display_name = Some(name.to_string());
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    log: CallLog,
    docs: Mutex<HashMap<(String, String), Document>>,
    writers: Mutex<HashMap<(String, String), Credential>>,
    read_error: Option<StoreError>,
    write_error: Option<StoreError>,
}

impl MemoryDocumentStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn fail_reads(mut self, message: &str) -> Self {
        self.read_error = Some(StoreError::new(message));
        self
    }

    pub fn fail_writes(mut self, message: &str) -> Self {
        self.write_error = Some(StoreError::new(message));
        self
    }

    /// Credential the last write of this document was made with.
    pub fn written_with(&self, collection: &str, key: &str) -> Option<Credential> {
        self.writers
            .lock()
            .unwrap()
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
    }

    pub fn get(&self, collection: &str, key: &str) -> Option<Document> {
        self.docs
            .lock()
            .unwrap()
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_document(
        &self,
        _credential: &Credential,
        collection: &str,
        key: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.log.push(Call::GetDocument {
            collection: collection.to_string(),
            key: key.to_string(),
        });
        if let Some(err) = &self.read_error {
            return Err(err.clone());
        }
        Ok(self.get(collection, key))
    }

    async fn put_document(
        &self,
        credential: &Credential,
        collection: &str,
        key: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        self.log.push(Call::PutDocument {
            collection: collection.to_string(),
            key: key.to_string(),
        });
        if let Some(err) = &self.write_error {
            return Err(err.clone());
        }
        let slot = (collection.to_string(), key.to_string());
        self.writers
            .lock()
            .unwrap()
            .insert(slot.clone(), credential.clone());
        self.docs.lock().unwrap().insert(slot, fields);
        Ok(())
    }
}
