//! Portão de papéis da chapelaria.
//!
//! As senhas da equipe são constantes em texto puro e a checagem acontece
//! só do lado do cliente. Isso NÃO protege nada: um sistema real precisa
//! verificar credenciais num servidor.

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identificador gravado em `createdBy` quando a equipe entra sem nome
const FALLBACK_ACTOR: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Cliente: entra com o telefone e sem senha
    Client,
    Cashier,
    Admin,
    Creator,
    /// Superusuário nomeado
    Nikitovsky,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Client,
        Role::Cashier,
        Role::Admin,
        Role::Creator,
        Role::Nikitovsky,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Cashier => "cashier",
            Role::Admin => "admin",
            Role::Creator => "creator",
            Role::Nikitovsky => "nikitovsky",
        }
    }

    pub fn is_staff(self) -> bool {
        self != Role::Client
    }

    fn staff_secret(self) -> Option<&'static str> {
        match self {
            Role::Client => None,
            Role::Cashier => Some("25"),
            Role::Admin => Some("2025"),
            Role::Creator => Some("202505"),
            Role::Nikitovsky => Some("20252025"),
        }
    }

    pub fn allows(self, action: Action) -> bool {
        match action {
            Action::ViewOwnItems => self == Role::Client,
            Action::ViewAllItems | Action::PickupItem => self.is_staff(),
            Action::AddItem | Action::ArchiveItem => {
                matches!(self, Role::Admin | Role::Creator | Role::Nikitovsky)
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("papel desconhecido: '{0}' (use client, cashier, admin, creator ou nikitovsky)")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Ações controladas pelo papel da sessão
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewOwnItems,
    ViewAllItems,
    AddItem,
    PickupItem,
    ArchiveItem,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Action::ViewOwnItems => "ver os próprios itens",
            Action::ViewAllItems => "ver todos os itens",
            Action::AddItem => "adicionar itens",
            Action::PickupItem => "entregar itens",
            Action::ArchiveItem => "arquivar itens",
        };
        f.write_str(text)
    }
}

/// Valida um par (identificador, senha) para o papel pedido.
///
/// Cliente: identificador não vazio e senha vazia. Equipe: senha idêntica
/// à constante do papel.
pub fn authenticate(role: Role, identifier: &str, secret: &str) -> Result<Role> {
    let accepted = match role.staff_secret() {
        None => !identifier.trim().is_empty() && secret.trim().is_empty(),
        Some(expected) => secret == expected,
    };

    if accepted {
        Ok(role)
    } else {
        Err(LedgerError::AuthRejected { role })
    }
}

/// Máquina de dois estados: sem sessão ou autenticado como um papel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated { role: Role, identifier: String },
}

impl Session {
    /// Tenta entrar. Em caso de rejeição o estado atual não muda.
    pub fn login(&mut self, role: Role, identifier: &str, secret: &str) -> Result<Role> {
        let role = authenticate(role, identifier, secret)?;
        *self = Session::Authenticated {
            role,
            identifier: identifier.to_string(),
        };
        Ok(role)
    }

    pub fn logout(&mut self) {
        *self = Session::Unauthenticated;
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Session::Unauthenticated => None,
            Session::Authenticated { role, .. } => Some(*role),
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match self {
            Session::Unauthenticated => None,
            Session::Authenticated { identifier, .. } => Some(identifier),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.role().is_some()
    }

    /// Nome gravado como autor de um item novo
    pub fn actor(&self) -> Option<String> {
        let identifier = self.identifier()?.trim();
        if identifier.is_empty() {
            Some(FALLBACK_ACTOR.to_string())
        } else {
            Some(identifier.to_string())
        }
    }

    /// Exige sessão ativa com permissão para `action`
    pub fn require(&self, action: Action) -> Result<Role> {
        let role = self.role().ok_or(LedgerError::NotAuthenticated)?;
        if role.allows(action) {
            Ok(role)
        } else {
            Err(LedgerError::Forbidden { role, action })
        }
    }
}
