use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Report counts shown above the export form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExportStatsDto {
    pub total_reports: i64,
    /// Reports whose activity date falls in the current month
    pub this_month_reports: i64,
    /// Distinct submitting accounts
    pub unique_users: i64,
}

/// CSV export options. Dates are `YYYY-MM-DD`; a blank bound is ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// Earliest activity date (inclusive)
    pub start_date: Option<String>,
    /// Latest activity date (inclusive)
    pub end_date: Option<String>,
    /// Add the hunter's six licence columns
    #[serde(default)]
    pub include_member_info: bool,
    /// Add the number of stored photos
    #[serde(default)]
    pub include_photos: bool,
}
