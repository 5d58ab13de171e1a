//! Minimal domain entities for the data-access layer.
//!
//! Only the fields the client layer itself needs are modeled; the full
//! wire shape of each entity is owned by the backend and the UI layer's
//! own view models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(rename = "nextCursor", default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlumniProfile {
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "classYear", default)]
    pub class_year: Option<i32>,
    #[serde(rename = "currentRole", default)]
    pub current_role: Option<String>,
}

impl AlumniProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(rename = "startsAt")]
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Donation {
    pub id: String,
    #[serde(rename = "donorId")]
    pub donor_id: String,
    #[serde(rename = "amountCents")]
    pub amount_cents: i64,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(rename = "donatedAt")]
    pub donated_at: DateTime<Utc>,
}

/// Fields accepted when updating an alumni profile. `None` means "leave
/// unchanged" and is omitted from the request body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlumniPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "classYear", skip_serializing_if = "Option::is_none")]
    pub class_year: Option<i32>,
    #[serde(rename = "currentRole", skip_serializing_if = "Option::is_none")]
    pub current_role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewDonation {
    #[serde(rename = "amountCents")]
    pub amount_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
}

/// Flat listing parameters shared by the domain services. Absent values
/// are dropped from the query string.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn limited(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("limit", self.limit.map(|l| l.to_string())),
            ("cursor", self.cursor.clone()),
            ("search", self.search.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alumni_profile_parses_wire_shape() {
        let json = r#"{
            "id": "a_1",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@alumnet.example",
            "classYear": 1998
        }"#;
        let profile: AlumniProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.full_name(), "Ada Lovelace");
        assert_eq!(profile.class_year, Some(1998));
        assert!(profile.current_role.is_none());
    }

    #[test]
    fn test_page_without_cursor() {
        let json = r#"{"items":[{"id":"d_1","donorId":"a_1","amountCents":5000,"donatedAt":"2026-01-15T12:00:00Z"}]}"#;
        let page: Page<Donation> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].amount_cents, 5000);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_patch_omits_unset_fields() {
        let patch = AlumniPatch {
            email: Some("new@alumnet.example".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "email": "new@alumnet.example" })
        );
    }

    #[test]
    fn test_list_query_params_keep_absent_keys_as_none() {
        let query = ListQuery::limited(5);
        let params = query.to_params();
        assert_eq!(params[0], ("limit", Some("5".to_string())));
        assert_eq!(params[1], ("cursor", None));
    }
}
