//! Modelo de dados dos itens guardados.

use crate::error::{LedgerError, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Departamentos fixos da chapelaria
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Department {
    #[default]
    Documents,
    Photos,
    Cards,
    Other,
}

impl Department {
    pub const ALL: [Department; 4] = [
        Department::Documents,
        Department::Photos,
        Department::Cards,
        Department::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Department::Documents => "documents",
            Department::Photos => "photos",
            Department::Cards => "cards",
            Department::Other => "other",
        }
    }

    /// Teto de itens guardados simultaneamente neste departamento
    pub fn ceiling(self) -> Ceiling {
        CEILINGS.get(&self).copied().unwrap_or(Ceiling::Unbounded)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("departamento desconhecido: '{0}' (use documents, photos, cards ou other)")]
pub struct UnknownDepartment(pub String);

impl FromStr for Department {
    type Err = UnknownDepartment;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDepartment(s.to_string()))
    }
}

/// Capacidade de um departamento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ceiling {
    Limited(usize),
    Unbounded,
}

impl Ceiling {
    /// Diz se cabe mais um item quando já existem `stored` guardados
    pub fn admits(self, stored: usize) -> bool {
        match self {
            Ceiling::Limited(max) => stored < max,
            Ceiling::Unbounded => true,
        }
    }
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceiling::Limited(max) => write!(f, "{max}"),
            Ceiling::Unbounded => write!(f, "sem limite"),
        }
    }
}

static CEILINGS: Lazy<BTreeMap<Department, Ceiling>> = Lazy::new(|| {
    BTreeMap::from([
        (Department::Documents, Ceiling::Limited(100)),
        (Department::Photos, Ceiling::Limited(100)),
        (Department::Cards, Ceiling::Limited(100)),
        (Department::Other, Ceiling::Unbounded),
    ])
});

/// Estado de um item. Só avança: stored -> picked_up -> archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Stored,
    PickedUp,
    Archived,
}

impl ItemStatus {
    /// Próximo estado permitido, se houver
    pub fn next(self) -> Option<ItemStatus> {
        match self {
            ItemStatus::Stored => Some(ItemStatus::PickedUp),
            ItemStatus::PickedUp => Some(ItemStatus::Archived),
            ItemStatus::Archived => None,
        }
    }

    pub fn can_advance_to(self, target: ItemStatus) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Stored => write!(f, "stored"),
            ItemStatus::PickedUp => write!(f, "picked_up"),
            ItemStatus::Archived => write!(f, "archived"),
        }
    }
}

/// Campos preenchidos no formulário de entrada de um item
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub item_name: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub department: Department,
    pub deposit_amount: f64,
    pub pickup_amount: f64,
    pub deposit_date: String,
    pub pickup_date: String,
}

impl NewItem {
    /// NaN e infinito não sobrevivem ao JSON (viram `null`)
    pub fn validate(&self) -> Result<()> {
        for (field, amount) in [
            ("depositAmount", self.deposit_amount),
            ("pickupAmount", self.pickup_amount),
        ] {
            if !amount.is_finite() {
                return Err(LedgerError::InvalidAmount { field });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: String,
    pub qr_code: String,
    pub item_name: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub department: Department,
    pub deposit_amount: f64,
    pub pickup_amount: f64,
    pub deposit_date: String,
    pub pickup_date: String,
    pub status: ItemStatus,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picked_up_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl ItemRecord {
    pub fn new(form: NewItem, created_by: String, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_item_id(),
            qr_code: generate_qr_code(now),
            item_name: form.item_name,
            first_name: form.first_name,
            last_name: form.last_name,
            phone: form.phone,
            email: form.email,
            department: form.department,
            deposit_amount: form.deposit_amount,
            pickup_amount: form.pickup_amount,
            deposit_date: form.deposit_date,
            pickup_date: form.pickup_date,
            status: ItemStatus::Stored,
            created_by,
            picked_up_at: None,
            archived_at: None,
        }
    }

    pub fn owner_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Marca como entregue ao cliente
    pub fn mark_picked_up(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.advance(ItemStatus::PickedUp)?;
        self.picked_up_at = Some(now);
        Ok(())
    }

    /// Marca como arquivado (somente depois de entregue)
    pub fn mark_archived(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.advance(ItemStatus::Archived)?;
        self.archived_at = Some(now);
        Ok(())
    }

    fn advance(&mut self, target: ItemStatus) -> Result<()> {
        if !self.status.can_advance_to(target) {
            return Err(LedgerError::InvalidStateTransition {
                id: self.id.clone(),
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}

fn generate_item_id() -> String {
    format!("item-{}", uuid::Uuid::new_v4().simple())
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Código impresso na etiqueta: `QR-<millis>-<9 caracteres base36>`.
/// Unicidade só probabilística.
pub fn generate_qr_code(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("QR-{}-{}", now.timestamp_millis(), suffix)
}
