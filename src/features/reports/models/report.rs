use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

/// Sex of the captured animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnimalSex {
    Male,
    Female,
    Unknown,
}

impl AnimalSex {
    pub const ALL: [AnimalSex; 3] = [AnimalSex::Male, AnimalSex::Female, AnimalSex::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalSex::Male => "male",
            AnimalSex::Female => "female",
            AnimalSex::Unknown => "unknown",
        }
    }

    /// Human-readable label for forms, mail and CSV
    pub fn label(&self) -> &'static str {
        match self {
            AnimalSex::Male => "Male",
            AnimalSex::Female => "Female",
            AnimalSex::Unknown => "Unknown",
        }
    }
}

impl std::str::FromStr for AnimalSex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimalSex::ALL
            .into_iter()
            .find(|sex| sex.as_str().eq_ignore_ascii_case(s.trim()) || sex.label() == s.trim())
            .ok_or_else(|| format!("Unknown sex '{}'", s))
    }
}

/// Database model for an activity report
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: i64,
    pub report_number: String,
    /// Account name of the submitter
    pub user_name: String,
    pub activity_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub method: String,
    pub hunter: String,
    /// Comma-joined names
    pub team_members: Option<String>,
    pub location: String,
    pub animal: String,
    pub sex: AnimalSex,
    /// Comma-joined task names
    pub tasks: String,
    pub tail_submitted: bool,
    pub email_sent: bool,
    pub email_sent_at: Option<NaiveDateTime>,
    pub email_sent_by: Option<String>,
    /// Cleared once the retention sweep removes the photos
    pub photo_upload_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// Select list matching `Report`'s fields
pub const REPORT_COLUMNS: &str = r#"
    id, report_number, user_name, activity_date, start_time, end_time, method,
    hunter, team_members, location, animal, sex, tasks, tail_submitted,
    email_sent, email_sent_at, email_sent_by, photo_upload_date, created_at
"#;

/// Split a comma-joined column back into its entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_parse() {
        assert_eq!("male".parse::<AnimalSex>().unwrap(), AnimalSex::Male);
        assert_eq!("Female".parse::<AnimalSex>().unwrap(), AnimalSex::Female);
        assert_eq!(" UNKNOWN ".parse::<AnimalSex>().unwrap(), AnimalSex::Unknown);
        assert!("both".parse::<AnimalSex>().is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("Patrol, Capture,,"), vec!["Patrol", "Capture"]);
        assert!(split_list("").is_empty());
    }
}
