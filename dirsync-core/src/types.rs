use std::collections::HashMap;

use serde::Deserialize;

/// One raw entry as returned by the directory-query endpoint.
///
/// Known attributes are decoded into explicit optional fields under their
/// external spellings. Anything else the endpoint starts returning lands in
/// `extra` and is ignored by the mapper, so new upstream attributes never
/// break a sync.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUserRecord {
    #[serde(rename = "userPrincipalName")]
    pub user_principal_name: Option<String>,
    pub mail: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "samaccountname")]
    pub sam_account_name: Option<String>,
    #[serde(rename = "EmployeeID")]
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub office: Option<String>,
    #[serde(rename = "officephone")]
    pub office_phone: Option<String>,
    #[serde(rename = "employeeType")]
    pub employee_type: Option<String>,
    #[serde(rename = "extensionattribute1")]
    pub extension_attribute1: Option<String>,
    #[serde(rename = "extensionattribute2")]
    pub extension_attribute2: Option<String>,
    #[serde(rename = "extensionattribute3")]
    pub extension_attribute3: Option<String>,
    #[serde(rename = "extensionattribute4")]
    pub extension_attribute4: Option<String>,
    #[serde(rename = "extensionattribute5")]
    pub extension_attribute5: Option<String>,
    #[serde(rename = "extensionattribute6")]
    pub extension_attribute6: Option<String>,
    #[serde(rename = "extensionattribute7")]
    pub extension_attribute7: Option<String>,
    #[serde(rename = "extensionattribute10")]
    pub extension_attribute10: Option<String>,
    #[serde(rename = "mailnickname")]
    pub mail_nickname: Option<String>,
    #[serde(rename = "memberof")]
    pub member_of: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A normalized identity row, keyed by UPN.
///
/// This is exactly the set of columns the store owns, minus the two system
/// timestamps (`created_at`, `updated_at`) which the store manages itself.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct UserIdentity {
    pub upn: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub unique_name: Option<String>,
    pub sam_account_name: Option<String>,
    pub school_status: Option<String>,
    pub identity_type: Option<String>,
    pub employee_id: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub office: Option<String>,
    pub office_phone: Option<String>,
    pub employee_type: Option<String>,
    pub funding_type_or_admission_year: Option<String>,
    pub student_category_primary: Option<String>,
    pub student_category_detail: Option<String>,
    pub student_nationality_type: Option<String>,
    pub residential_college: Option<String>,
    pub staff_role: Option<String>,
    pub mail_nickname: Option<String>,
    /// Group names derived from the `memberof` distinguished-name list.
    pub tags: Vec<String>,
}

/// Counts for one pipeline run, for the final log line and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub sources_total: usize,
    pub sources_failed: usize,
    pub records_fetched: usize,
    /// Fetched records dropped before the store because they carried no
    /// usable UPN.
    pub records_missing_upn: usize,
    pub records_upserted: u64,
    pub records_deleted: u64,
}
