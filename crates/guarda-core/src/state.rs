use crate::auth::{Action, Role, Session};
use crate::error::Result;
use crate::ledger::{Ledger, LedgerStats};
use crate::model::{ItemRecord, NewItem};
use crate::storage::{decode_items, encode_items, BlobStore, StorageError, ITEMS_KEY};
use std::fmt;

/// Avisos não fatais que a interface mostra uma vez e descarta
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Blob ilegível ou malformado; o livro começou vazio
    PersistenceReadFailure(String),
    /// Mutação aplicada em memória mas não gravada
    PersistenceWriteFailure(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PersistenceReadFailure(reason) => {
                write!(f, "estado salvo ilegível, começando vazio: {reason}")
            }
            Notice::PersistenceWriteFailure(reason) => {
                write!(f, "falha ao salvar o estado (alteração só em memória): {reason}")
            }
        }
    }
}

/// Estado do processo: sessão + livro-razão + espelho persistente.
///
/// Ciclo de vida: `open` carrega o snapshot, cada mutação bem-sucedida
/// grava a coleção inteira de volta no blob.
pub struct LedgerStore<S: BlobStore> {
    blobs: S,
    ledger: Ledger,
    session: Session,
    notices: Vec<Notice>,
}

impl<S: BlobStore> LedgerStore<S> {
    pub fn open(blobs: S) -> Self {
        let mut notices = Vec::new();
        let ledger = match load_ledger(&blobs) {
            Ok(ledger) => {
                tracing::info!(items = ledger.len(), "livro-razão carregado");
                ledger
            }
            Err(err) => {
                tracing::warn!(error = %err, "estado salvo ilegível; começando vazio");
                notices.push(Notice::PersistenceReadFailure(err.to_string()));
                Ledger::new()
            }
        };

        Self {
            blobs,
            ledger,
            session: Session::default(),
            notices,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Devolve e limpa os avisos pendentes
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn login(&mut self, role: Role, identifier: &str, secret: &str) -> Result<Role> {
        match self.session.login(role, identifier, secret) {
            Ok(role) => {
                tracing::info!(%role, "sessão iniciada");
                Ok(role)
            }
            Err(err) => {
                tracing::warn!(%role, "login rejeitado");
                Err(err)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(role) = self.session.role() {
            tracing::info!(%role, "sessão encerrada");
        }
        self.session.logout();
    }

    pub fn add_item(&mut self, form: NewItem) -> Result<ItemRecord> {
        self.session.require(Action::AddItem)?;
        let actor = self.session.actor().unwrap_or_default();
        let record = self.ledger.add_item(form, &actor)?;
        tracing::info!(
            id = %record.id,
            qr = %record.qr_code,
            department = %record.department,
            created_by = %record.created_by,
            "item registrado"
        );
        self.persist();
        Ok(record)
    }

    pub fn pickup_item(&mut self, id: &str) -> Result<ItemRecord> {
        self.session.require(Action::PickupItem)?;
        let record = self.ledger.pickup_item(id)?;
        tracing::info!(id = %record.id, "item entregue");
        self.persist();
        Ok(record)
    }

    pub fn archive_item(&mut self, id: &str) -> Result<ItemRecord> {
        self.session.require(Action::ArchiveItem)?;
        let record = self.ledger.archive_item(id)?;
        tracing::info!(id = %record.id, "item arquivado");
        self.persist();
        Ok(record)
    }

    /// Itens que a sessão atual enxerga: cliente vê os seus, equipe vê tudo
    pub fn visible_items(&self) -> Result<Vec<&ItemRecord>> {
        match self.session.require(Action::ViewOwnItems) {
            Ok(_) => {
                let phone = self.session.identifier().unwrap_or_default();
                Ok(self.ledger.items_for_client(phone))
            }
            Err(_) => {
                self.session.require(Action::ViewAllItems)?;
                Ok(self.ledger.items().iter().collect())
            }
        }
    }

    pub fn stats(&self) -> Result<LedgerStats> {
        self.session.require(Action::ViewAllItems)?;
        Ok(self.ledger.stats())
    }

    /// Serializa a coleção atual no formato do blob
    pub fn snapshot(&self) -> std::result::Result<String, StorageError> {
        encode_items(self.ledger.items())
    }

    fn persist(&mut self) {
        let outcome = self
            .snapshot()
            .and_then(|blob| self.blobs.write(ITEMS_KEY, &blob));

        if let Err(err) = outcome {
            tracing::error!(error = %err, "falha ao gravar o estado");
            self.notices
                .push(Notice::PersistenceWriteFailure(err.to_string()));
        }
    }
}

fn load_ledger<S: BlobStore>(blobs: &S) -> std::result::Result<Ledger, StorageError> {
    match blobs.read(ITEMS_KEY)? {
        Some(blob) => Ok(Ledger::from_items(decode_items(&blob)?)),
        None => Ok(Ledger::new()),
    }
}
