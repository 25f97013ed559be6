use crate::auth::{Action, Role};
use crate::model::{Department, ItemStatus};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Erros reportados ao usuário pelas operações do livro-razão.
///
/// Nenhum deles é fatal: o estado em memória continua íntegro e a ação
/// pode ser refeita.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("credenciais inválidas para o papel '{role}'")]
    AuthRejected { role: Role },

    #[error("nenhuma sessão ativa; faça login primeiro")]
    NotAuthenticated,

    #[error("o papel '{role}' não tem permissão para {action}")]
    Forbidden { role: Role, action: Action },

    #[error("departamento '{department}' lotado (limite de {ceiling} itens)")]
    CapacityExceeded { department: Department, ceiling: usize },

    #[error("valor inválido em '{field}': precisa ser um número finito")]
    InvalidAmount { field: &'static str },

    #[error("item '{id}' não encontrado")]
    NotFound { id: String },

    #[error("item '{id}' não pode passar de '{from}' para '{to}'")]
    InvalidStateTransition {
        id: String,
        from: ItemStatus,
        to: ItemStatus,
    },
}
