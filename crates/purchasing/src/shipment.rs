use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use grainbridge_core::{DomainError, Entity, ShipmentId, UserId};

/// Rice varieties a supplier can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropType {
    Basmati,
    Kainat,
    #[serde(rename = "Irri-6")]
    Irri6,
    Sella,
    Brown,
}

impl CropType {
    /// Label used for the fuzzy category match against inventory.
    pub fn label(&self) -> &'static str {
        match self {
            CropType::Basmati => "Basmati",
            CropType::Kainat => "Kainat",
            CropType::Irri6 => "Irri-6",
            CropType::Sella => "Sella",
            CropType::Brown => "Brown",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "Basmati" => Ok(CropType::Basmati),
            "Kainat" => Ok(CropType::Kainat),
            "Irri-6" => Ok(CropType::Irri6),
            "Sella" => Ok(CropType::Sella),
            "Brown" => Ok(CropType::Brown),
            other => Err(DomainError::validation(format!("Invalid crop type: {other}"))),
        }
    }
}

impl core::fmt::Display for CropType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "Pending",
            ShipmentStatus::Approved => "Approved",
            ShipmentStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "Pending" => Ok(ShipmentStatus::Pending),
            "Approved" => Ok(ShipmentStatus::Approved),
            "Rejected" => Ok(ShipmentStatus::Rejected),
            other => Err(DomainError::validation(format!("Invalid shipment status: {other}"))),
        }
    }
}

impl core::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: ShipmentId,
    pub supplier: UserId,
    pub crop_type: CropType,
    pub quantity: i64,
    pub expected_date: DateTime<Utc>,
    pub status: ShipmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Shipment {
    type Id = ShipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input: a supplier proposes a delivery.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShipment {
    pub crop_type: CropType,
    pub quantity: i64,
    #[serde(deserialize_with = "date_or_datetime")]
    pub expected_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
fn date_or_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid expectedDate: {raw}")))
}

/// Outcome of an admin decision. `credit` is the number of bags to add to the
/// matching inventory item, present only for approvals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipmentDecision {
    pub status: ShipmentStatus,
    pub credit: Option<i64>,
}

pub fn validate_new_shipment(input: NewShipment) -> Result<NewShipment, DomainError> {
    if input.quantity <= 0 {
        return Err(DomainError::validation("quantity must be greater than zero"));
    }
    Ok(NewShipment {
        notes: input.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        ..input
    })
}

impl Shipment {
    pub fn create(supplier: UserId, input: NewShipment, now: DateTime<Utc>) -> Self {
        Self {
            id: ShipmentId::new(),
            supplier,
            crop_type: input.crop_type,
            quantity: input.quantity,
            expected_date: input.expected_date,
            status: ShipmentStatus::Pending,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Decide what `requested` would do to this shipment, without mutating.
    ///
    /// A shipment is decided at most once.
    pub fn decide(&self, requested: ShipmentStatus) -> Result<ShipmentDecision, DomainError> {
        match self.status {
            ShipmentStatus::Approved => return Err(DomainError::invariant("Already approved")),
            ShipmentStatus::Rejected => return Err(DomainError::invariant("Already rejected")),
            ShipmentStatus::Pending => {}
        }
        match requested {
            ShipmentStatus::Approved => Ok(ShipmentDecision {
                status: ShipmentStatus::Approved,
                credit: Some(self.quantity),
            }),
            ShipmentStatus::Rejected => Ok(ShipmentDecision {
                status: ShipmentStatus::Rejected,
                credit: None,
            }),
            ShipmentStatus::Pending => Err(DomainError::validation(
                "status must be Approved or Rejected",
            )),
        }
    }

    pub fn apply(&mut self, decision: &ShipmentDecision, now: DateTime<Utc>) {
        self.status = decision.status;
        self.updated_at = now;
    }
}
