use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: String,
    pub company: String,
    pub role: String,
    pub deadline: Deadline,
    pub status: ApplicationStatus,
}

/// Body of a create request. Any `id` sent by the caller is ignored, and
/// absent fields are stored empty rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewApplication {
    pub company: String,
    pub role: String,
    pub deadline: Deadline,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// Calendar-day deadline. The raw text is kept as received; `date()` is
/// the only way date arithmetic sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deadline(String);

impl Deadline {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.0.trim(), "%Y-%m-%d").ok()
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApplicationStatus {
    Researching,
    Interested,
    Applied,
    Interviewed,
    Offered,
    Rejected,
    PendingResponse,
    /// `"Other"` itself or any unrecognized value, kept verbatim.
    Other(String),
}

impl ApplicationStatus {
    /// Labels in the order the status distribution is reported.
    pub const DISPLAY_ORDER: [&'static str; 8] = [
        "Applied",
        "Interviewed",
        "Offered",
        "Rejected",
        "Pending Response",
        "Interested",
        "Researching",
        "Other",
    ];

    /// Statuses offered by selectors, in workflow order.
    pub fn choices() -> [ApplicationStatus; 8] {
        [
            ApplicationStatus::Researching,
            ApplicationStatus::Interested,
            ApplicationStatus::Applied,
            ApplicationStatus::Interviewed,
            ApplicationStatus::Offered,
            ApplicationStatus::Rejected,
            ApplicationStatus::PendingResponse,
            ApplicationStatus::other(),
        ]
    }

    pub fn other() -> Self {
        ApplicationStatus::Other("Other".to_string())
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "Researching" => ApplicationStatus::Researching,
            "Interested" => ApplicationStatus::Interested,
            "Applied" => ApplicationStatus::Applied,
            "Interviewed" => ApplicationStatus::Interviewed,
            "Offered" => ApplicationStatus::Offered,
            "Rejected" => ApplicationStatus::Rejected,
            "Pending Response" => ApplicationStatus::PendingResponse,
            other => ApplicationStatus::Other(other.to_string()),
        }
    }

    /// Wire form; for `Other` this is the raw value.
    pub fn as_str(&self) -> &str {
        match self {
            ApplicationStatus::Researching => "Researching",
            ApplicationStatus::Interested => "Interested",
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interviewed => "Interviewed",
            ApplicationStatus::Offered => "Offered",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::PendingResponse => "Pending Response",
            ApplicationStatus::Other(raw) => raw,
        }
    }

    /// Aggregation bucket: one of `DISPLAY_ORDER`.
    pub fn bucket(&self) -> &'static str {
        match self {
            ApplicationStatus::Researching => "Researching",
            ApplicationStatus::Interested => "Interested",
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interviewed => "Interviewed",
            ApplicationStatus::Offered => "Offered",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::PendingResponse => "Pending Response",
            ApplicationStatus::Other(_) => "Other",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Applied
                | ApplicationStatus::PendingResponse
                | ApplicationStatus::Interested
                | ApplicationStatus::Researching
        )
    }

    /// Next entry of `choices()`, wrapping. Unrecognized values restart at the top.
    pub fn cycle(&self) -> ApplicationStatus {
        let choices = Self::choices();
        let pos = choices.iter().position(|s| s == self);
        match pos {
            Some(i) => choices[(i + 1) % choices.len()].clone(),
            None => choices[0].clone(),
        }
    }
}

/// An absent status is kept as an empty `Other`.
impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::Other(String::new())
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ApplicationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ApplicationStatus::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_is_preserved_but_bucketed_as_other() {
        let status: ApplicationStatus = serde_json::from_str("\"Ghosted\"").unwrap();
        assert_eq!(status, ApplicationStatus::Other("Ghosted".to_string()));
        assert_eq!(status.bucket(), "Other");
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Ghosted\"");
    }

    #[test]
    fn pending_response_uses_spaced_label() {
        let status: ApplicationStatus = serde_json::from_str("\"Pending Response\"").unwrap();
        assert_eq!(status, ApplicationStatus::PendingResponse);
        assert_eq!(status.to_string(), "Pending Response");
    }

    #[test]
    fn deadline_keeps_raw_text_and_parses_calendar_days() {
        let deadline = Deadline::new("2025-08-10");
        assert_eq!(deadline.date(), NaiveDate::from_ymd_opt(2025, 8, 10));
        assert_eq!(Deadline::new("next friday").date(), None);
        assert_eq!(Deadline::new("next friday").as_str(), "next friday");
    }

    #[test]
    fn new_application_tolerates_absent_fields() {
        let app: NewApplication =
            serde_json::from_str(r#"{"company":"Acme","role":"Eng","status":"Applied"}"#).unwrap();
        assert_eq!(app.company, "Acme");
        assert_eq!(app.deadline.as_str(), "");
        assert_eq!(app.deadline.date(), None);
        assert_eq!(app.status, ApplicationStatus::Applied);

        let empty: NewApplication = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.status, ApplicationStatus::Other(String::new()));
        assert_eq!(empty.status.bucket(), "Other");
    }

    #[test]
    fn cycle_wraps_and_restarts_unknown_values() {
        assert_eq!(ApplicationStatus::Researching.cycle(), ApplicationStatus::Interested);
        assert_eq!(ApplicationStatus::other().cycle(), ApplicationStatus::Researching);
        assert_eq!(
            ApplicationStatus::Other("Ghosted".to_string()).cycle(),
            ApplicationStatus::Researching
        );
    }
}
