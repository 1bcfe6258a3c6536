use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{RawUserRecord, UserIdentity};

// Matches one `CN=<value>` component of a distinguished-name list.
static COMMON_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"CN=([^,]+)").expect("common-name pattern is valid"));

/// Extract every CN component from a comma-separated distinguished-name
/// string, in encounter order. An absent value yields an empty list, never
/// an error.
pub fn extract_group_names(member_of: Option<&str>) -> Vec<String> {
    let Some(member_of) = member_of else {
        return Vec::new();
    };

    COMMON_NAME
        .captures_iter(member_of)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Map one raw directory record into an identity row.
///
/// Returns `None` when the record has no usable UPN; such a record cannot
/// be persisted and is counted by the caller rather than treated as an
/// error. Attributes the mapper does not know about are ignored.
pub fn map_record(raw: RawUserRecord) -> Option<UserIdentity> {
    let upn = raw.user_principal_name.filter(|upn| !upn.is_empty())?;

    let tags = extract_group_names(raw.member_of.as_deref());

    Some(UserIdentity {
        upn,
        email: raw.mail,
        display_name: raw.display_name,
        unique_name: raw.name.clone(),
        sam_account_name: raw.sam_account_name,
        school_status: raw.extension_attribute5,
        identity_type: raw.extension_attribute7,
        employee_id: raw.employee_id,
        name: raw.name,
        department: raw.department,
        title: raw.title,
        office: raw.office,
        office_phone: raw.office_phone,
        employee_type: raw.employee_type,
        funding_type_or_admission_year: raw.extension_attribute1,
        student_category_primary: raw.extension_attribute2,
        student_category_detail: raw.extension_attribute3,
        student_nationality_type: raw.extension_attribute4,
        residential_college: raw.extension_attribute6,
        staff_role: raw.extension_attribute10,
        mail_nickname: raw.mail_nickname,
        tags,
    })
}
