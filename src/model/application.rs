use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::attachment::AttachedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationType {
    Computer,
    Printer,
    Notebook,
    As,
    Inquiry,
}

impl ApplicationType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "computer" => Some(ApplicationType::Computer),
            "printer" => Some(ApplicationType::Printer),
            "notebook" => Some(ApplicationType::Notebook),
            "as" => Some(ApplicationType::As),
            "inquiry" => Some(ApplicationType::Inquiry),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationType::Computer => "computer",
            ApplicationType::Printer => "printer",
            ApplicationType::Notebook => "notebook",
            ApplicationType::As => "as",
            ApplicationType::Inquiry => "inquiry",
        }
    }
}

/// `apply` is the canonical initial state; `registration` is accepted as
/// an input alias for older clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[serde(alias = "registration")]
    Apply,
    InProgress,
    Completed,
    Cancelled,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Apply => "apply",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Completed => "completed",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "apply" | "registration" => Some(ApplicationStatus::Apply),
            "in_progress" => Some(ApplicationStatus::InProgress),
            "completed" => Some(ApplicationStatus::Completed),
            "cancelled" => Some(ApplicationStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal soft-deleted state; required before a hard delete.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Cancelled)
    }
}

/// Type-specific request payload, one variant per service category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ApplicationDetails {
    Computer {
        purpose: String,
        budget: Option<String>,
        parts_request: Option<String>,
    },
    Printer {
        printer_model: String,
        symptom: String,
    },
    Notebook {
        notebook_model: String,
        usage: Option<String>,
        budget: Option<String>,
    },
    As {
        device: String,
        symptom: String,
    },
    Inquiry {
        title: String,
        message: String,
    },
}

impl ApplicationDetails {
    pub fn kind(&self) -> ApplicationType {
        match self {
            ApplicationDetails::Computer { .. } => ApplicationType::Computer,
            ApplicationDetails::Printer { .. } => ApplicationType::Printer,
            ApplicationDetails::Notebook { .. } => ApplicationType::Notebook,
            ApplicationDetails::As { .. } => ApplicationType::As,
            ApplicationDetails::Inquiry { .. } => ApplicationType::Inquiry,
        }
    }

    /// The free-text field shown in listings for this variant.
    pub fn summary(&self) -> &str {
        match self {
            ApplicationDetails::Computer { purpose, .. } => purpose,
            ApplicationDetails::Printer { symptom, .. } => symptom,
            ApplicationDetails::Notebook { notebook_model, .. } => notebook_model,
            ApplicationDetails::As { symptom, .. } => symptom,
            ApplicationDetails::Inquiry { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub details: ApplicationDetails,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_comment: Option<String>,
    #[serde(default)]
    pub files: Vec<AttachedFile>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_accepts_legacy_alias() {
        assert_eq!(ApplicationStatus::parse("apply"), Some(ApplicationStatus::Apply));
        assert_eq!(ApplicationStatus::parse("registration"), Some(ApplicationStatus::Apply));
        assert_eq!(ApplicationStatus::parse("in_progress"), Some(ApplicationStatus::InProgress));
        assert_eq!(ApplicationStatus::parse("done"), None);
    }

    #[test]
    fn test_only_cancelled_is_terminal() {
        assert!(ApplicationStatus::Cancelled.is_terminal());
        assert!(!ApplicationStatus::Apply.is_terminal());
        assert!(!ApplicationStatus::Completed.is_terminal());
    }

    #[test]
    fn test_details_tagging() {
        let details = ApplicationDetails::Printer {
            printer_model: "LBP-2900".to_string(),
            symptom: "paper jam".to_string(),
        };
        assert_eq!(details.kind(), ApplicationType::Printer);
        assert_eq!(details.summary(), "paper jam");

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["type"], "printer");
    }
}
