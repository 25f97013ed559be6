//! Núcleo da GUARDA: livro-razão de itens guardados na chapelaria.
//!
//! O crate reúne:
//!  - o modelo de itens e departamentos (`model`)
//!  - o portão de papéis/sessão (`auth`)
//!  - o livro-razão com a regra de capacidade por departamento (`ledger`)
//!  - o espelho de persistência em um único blob JSON (`storage`)
//!  - o objeto de estado que amarra tudo isso (`state`)
//!
//! Tudo é síncrono e de escritor único: quem muta o estado precisa de `&mut`.

pub mod auth;
pub mod error;
pub mod ledger;
pub mod model;
pub mod state;
pub mod storage;

pub use auth::{authenticate, Action, Role, Session};
pub use error::{LedgerError, Result};
pub use ledger::{DepartmentLoad, Ledger, LedgerStats};
pub use model::{Ceiling, Department, ItemRecord, ItemStatus, NewItem};
pub use state::{LedgerStore, Notice};
pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore, StorageError, ITEMS_KEY};
