use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::policy::AvailabilityPolicy;

/// The two service variants the marketplace offers. Both share the same
/// capability set (working-hours policy, team roster, equipment roster);
/// dispatch is by matching on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderKind {
    Photographer,
    Videographer,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Photographer => write!(f, "photographer"),
            ProviderKind::Videographer => write!(f, "videographer"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "photographer" => Ok(ProviderKind::Photographer),
            "videographer" => Ok(ProviderKind::Videographer),
            _ => Err(format!("Invalid provider kind: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for ProviderKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for ProviderKind {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = self.to_string();
        <String as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&s, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ProviderKind {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse::<ProviderKind>().map_err(|e| e.into())
    }
}

/// An assignable person on a provider's roster. Inactive members never count
/// toward capacity and are never assignable.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub role: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>, // TIMESTAMPTZ
}

/// An assignable equipment unit. `is_available = false` means permanently
/// withdrawn (e.g. broken), which is distinct from being committed to a
/// booking.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub kind: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>, // TIMESTAMPTZ
}

/// A bookable provider with its rosters and availability policy. Bookings
/// reference rosters by id only; there are no embedded back-references.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: Uuid,
    pub kind: ProviderKind,
    pub display_name: String,
    pub policy: AvailabilityPolicy,
    pub team_members: Vec<TeamMember>,
    pub equipment: Vec<Equipment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    pub fn active_team_ids(&self) -> Vec<Uuid> {
        self.team_members
            .iter()
            .filter(|m| m.is_active)
            .map(|m| m.id)
            .collect()
    }

    pub fn available_equipment_ids(&self) -> Vec<Uuid> {
        self.equipment
            .iter()
            .filter(|e| e.is_available)
            .map(|e| e.id)
            .collect()
    }

    pub fn team_member(&self, id: Uuid) -> Option<&TeamMember> {
        self.team_members.iter().find(|m| m.id == id)
    }

    pub fn equipment_unit(&self, id: Uuid) -> Option<&Equipment> {
        self.equipment.iter().find(|e| e.id == id)
    }
}
