// src/process/correct.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::process::pipeline::KeyedRecord;

/// Collapse rules for department names published under several spellings.
/// Each rule rewrites everything from the first occurrence of its token to the
/// end of the value, so `"bogota, d.c."` and `"bogota dc"` both become `"bogota"`.
static DEPARTMENT_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [("bogota.*", "bogota"), ("san andres.*", "san andres")]
        .into_iter()
        .filter_map(|(pattern, canonical)| Regex::new(pattern).ok().map(|re| (re, canonical)))
        .collect()
});

/// Canonicalize a single, already normalized department name.
pub fn correct_department(department: &str) -> String {
    let mut out = department.to_string();
    for (re, canonical) in DEPARTMENT_RULES.iter() {
        if re.is_match(&out) {
            out = re.replace_all(&out, *canonical).into_owned();
        }
    }
    out
}

/// Apply the department collapse rules to every record.
pub fn correct_departments(records: Vec<KeyedRecord>) -> Vec<KeyedRecord> {
    records
        .into_iter()
        .map(|mut r| {
            r.department = correct_department(&r.department);
            r
        })
        .collect()
}
