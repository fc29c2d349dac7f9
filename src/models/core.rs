// src/models/core.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable customer identifier. Survives merges: the surviving record keeps
/// its id, the absorbed record's id is retired by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub Uuid);

impl CustomerId {
    pub fn new() -> Self {
        CustomerId(Uuid::new_v4())
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The comparable fields of a customer record, in canonical order.
/// Conflict sequences and per-field score maps follow this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Document,
    Email,
    Phone,
    Name,
    Address,
    City,
    State,
    PostalCode,
    BirthDate,
    Profession,
}

impl FieldKind {
    pub const ALL: [FieldKind; 10] = [
        FieldKind::Document,
        FieldKind::Email,
        FieldKind::Phone,
        FieldKind::Name,
        FieldKind::Address,
        FieldKind::City,
        FieldKind::State,
        FieldKind::PostalCode,
        FieldKind::BirthDate,
        FieldKind::Profession,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Document => "document_id",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Name => "name",
            FieldKind::Address => "address",
            FieldKind::City => "city",
            FieldKind::State => "state",
            FieldKind::PostalCode => "postal_code",
            FieldKind::BirthDate => "birth_date",
            FieldKind::Profession => "profession",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unified customer record. Data fields are optional strings; empty or
/// whitespace-only values are treated as absent everywhere in the core.
/// Field-format validation (CPF digits, email shape) happens upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(default)]
    pub id: CustomerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,

    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_confidence")]
    pub confidence_score: f64,
    #[serde(default)]
    pub change_count: u32,
}

fn default_confidence() -> f64 {
    1.0
}

impl CustomerRecord {
    /// Fresh record with no data fields set.
    pub fn new(source: &str) -> Self {
        let now = Utc::now();
        CustomerRecord {
            id: CustomerId::new(),
            name: None,
            email: None,
            document_id: None,
            phone: None,
            address: None,
            city: None,
            state: None,
            postal_code: None,
            birth_date: None,
            profession: None,
            sources: vec![source.to_string()],
            created_at: now,
            updated_at: now,
            confidence_score: 1.0,
            change_count: 0,
        }
    }

    /// Raw value of a field, `None` when unset or blank.
    pub fn field(&self, kind: FieldKind) -> Option<&str> {
        let value = match kind {
            FieldKind::Document => &self.document_id,
            FieldKind::Email => &self.email,
            FieldKind::Phone => &self.phone,
            FieldKind::Name => &self.name,
            FieldKind::Address => &self.address,
            FieldKind::City => &self.city,
            FieldKind::State => &self.state,
            FieldKind::PostalCode => &self.postal_code,
            FieldKind::BirthDate => &self.birth_date,
            FieldKind::Profession => &self.profession,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn set_field(&mut self, kind: FieldKind, value: Option<String>) {
        let slot = match kind {
            FieldKind::Document => &mut self.document_id,
            FieldKind::Email => &mut self.email,
            FieldKind::Phone => &mut self.phone,
            FieldKind::Name => &mut self.name,
            FieldKind::Address => &mut self.address,
            FieldKind::City => &mut self.city,
            FieldKind::State => &mut self.state,
            FieldKind::PostalCode => &mut self.postal_code,
            FieldKind::BirthDate => &mut self.birth_date,
            FieldKind::Profession => &mut self.profession,
        };
        *slot = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    }

    /// True when every data field is absent.
    pub fn is_empty(&self) -> bool {
        FieldKind::ALL.iter().all(|kind| self.field(*kind).is_none())
    }
}
