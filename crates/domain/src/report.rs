//! Structured incident report and its merge rules.
//!
//! Spoken calls reveal facts incrementally, and extraction passes over a
//! growing transcript may momentarily "forget" a fact the caller already
//! confirmed. The merge model makes confirmed fields sticky: once a field
//! holds a non-empty value, a later extraction can elaborate on it but
//! never erase or replace it.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The severity scale used by dispatch: 1 = non-emergency or prank,
/// 2–3 = non-life-threatening, 4–5 = critical.
pub const IMPORTANCE_MIN: u8 = 1;
pub const IMPORTANCE_MAX: u8 = 5;

/// A structured emergency report distilled from the call transcript.
///
/// All fields start absent and are filled in as extraction passes run.
/// The wire name for `importance` is `important_level`; both the model's
/// JSON-mode output and the persisted record use that spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentReport {
    /// Short cause description ("wypadek samochodowy", "pożar", …).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Location of the incident, as precise as the caller disclosed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,

    /// Casualty count and condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victims: Option<String>,

    /// Severity on the 1–5 scale. Immutable once set.
    #[serde(
        rename = "important_level",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub importance: Option<u8>,
}

impl IncidentReport {
    /// True when no field has been extracted yet.
    pub fn is_empty(&self) -> bool {
        self.reason.is_none()
            && self.place.is_none()
            && self.victims.is_none()
            && self.importance.is_none()
    }

    /// Parse a report from model output, leniently.
    ///
    /// The payload must be a JSON object (anything else is an error the
    /// caller treats as "no new information"), but individual fields that
    /// are missing or of the wrong type simply decode to absent. The
    /// severity also tolerates a numeric string and is clamped into range.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw.trim())?;
        if !value.is_object() {
            return Err(crate::error::Error::Other(
                "report payload is not a JSON object".into(),
            ));
        }

        Ok(Self {
            reason: text_field(&value, "reason"),
            place: text_field(&value, "place"),
            victims: text_field(&value, "victims"),
            importance: importance_field(&value),
        })
    }

    /// Serialize to the JSON string form used by the persisted record.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".into())
    }

    /// Merge a newly proposed report into this one, field by field.
    ///
    /// Pure and total. Text fields keep the existing value unless the
    /// proposal strictly elaborates on it (contains it verbatim), in which
    /// case the elaboration wins. An empty proposal never erases anything,
    /// and `importance` never changes once set.
    pub fn merge(&self, proposed: &IncidentReport) -> IncidentReport {
        IncidentReport {
            reason: merge_text(&self.reason, &proposed.reason),
            place: merge_text(&self.place, &proposed.place),
            victims: merge_text(&self.victims, &proposed.victims),
            importance: self.importance.or(proposed.importance.map(clamp_importance)),
        }
    }

    /// Number of fields a merge with `proposed` would newly fill or extend.
    pub fn fields_adopted_from(&self, proposed: &IncidentReport) -> usize {
        let merged = self.merge(proposed);
        [
            merged.reason != self.reason,
            merged.place != self.place,
            merged.victims != self.victims,
            merged.importance != self.importance,
        ]
        .iter()
        .filter(|changed| **changed)
        .count()
    }
}

/// Labeled read-only rendering shared by the live display and the final
/// summary view. Absent fields read "brak danych".
impl std::fmt::Display for IncidentReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let missing = "brak danych";
        writeln!(f, "Powód: {}", self.reason.as_deref().unwrap_or(missing))?;
        writeln!(f, "Miejsce: {}", self.place.as_deref().unwrap_or(missing))?;
        writeln!(
            f,
            "Poszkodowani: {}",
            self.victims.as_deref().unwrap_or(missing)
        )?;
        match self.importance {
            Some(level) => write!(f, "Ważność: {level}/5"),
            None => write!(f, "Ważność: {missing}"),
        }
    }
}

/// Merge rule for the free-text fields.
fn merge_text(existing: &Option<String>, proposed: &Option<String>) -> Option<String> {
    let proposed = proposed
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (existing.as_deref(), proposed) {
        (None, p) => p.map(String::from),
        (Some(e), Some(p)) if p != e && p.contains(e) => Some(p.to_owned()),
        (Some(e), _) => Some(e.to_owned()),
    }
}

fn clamp_importance(level: u8) -> u8 {
    level.clamp(IMPORTANCE_MIN, IMPORTANCE_MAX)
}

fn text_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn importance_field(value: &serde_json::Value) -> Option<u8> {
    let raw = value.get("important_level")?;
    let level = match raw {
        serde_json::Value::Number(n) => n.as_u64()?,
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    Some(clamp_importance(level.min(u8::MAX as u64) as u8))
}
