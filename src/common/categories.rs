//! Category tables: the static category -> department routing used when the
//! backend has not assigned a department itself, and the keyword sets that
//! drive priority derivation at submission time.

use crate::common::models::Priority;

/// English category name -> responsible municipal department.
pub const CATEGORY_DEPARTMENTS: &[(&str, &str)] = &[
    ("Road Damage", "Public Works Department"),
    ("Water Issues", "Jal Kal Vibhag"),
    ("Electricity Issues", "KESCO"),
    ("Garbage & Sanitation", "Nagar Nigam Sanitation Wing"),
    ("Street Lights", "Street Lighting Division"),
    ("Sewage & Drainage", "Sewerage Maintenance Division"),
    ("Traffic Issues", "Traffic Police Kanpur"),
    ("Stray Animals", "Veterinary & Cattle Catching Wing"),
    ("Parks & Trees", "Horticulture Department"),
    ("Others", "General Administration"),
];

/// Keywords (English and Hindi) that escalate a submission to high priority.
pub const HIGH_PRIORITY_KEYWORDS: &[&str] = &[
    "emergency",
    "urgent",
    "danger",
    "dangerous",
    "accident",
    "flood",
    "fire",
    "आपातकाल",
    "खतरा",
    "तुरंत",
    "दुर्घटना",
];

/// Categories that are high priority on their own.
pub const HIGH_PRIORITY_CATEGORIES: &[&str] =
    &["Water Issues", "Electricity Issues", "Sewage & Drainage"];

/// Category strings coming from forms and the backend are often bilingual
/// composites like "Water Issues / जल समस्या". Take the part before the
/// first slash; a string without a slash passes through untouched.
pub fn english_part(category: &str) -> &str {
    category.split('/').next().unwrap_or(category).trim()
}

/// Resolve the responsible department for a (possibly bilingual) category.
pub fn department_for_category(category: &str) -> Option<&'static str> {
    let wanted = english_part(category);
    CATEGORY_DEPARTMENTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|(_, dept)| *dept)
}

/// Naive keyword/category matching: high when the description or any
/// category mentions an escalation keyword, or any category belongs to the
/// high-priority set; medium otherwise.
pub fn derive_priority(description: &str, categories: &[String]) -> Priority {
    let description = description.to_lowercase();
    let keyword_hit = HIGH_PRIORITY_KEYWORDS.iter().any(|kw| {
        description.contains(&kw.to_lowercase())
            || categories
                .iter()
                .any(|c| c.to_lowercase().contains(&kw.to_lowercase()))
    });
    let category_hit = categories.iter().any(|c| {
        HIGH_PRIORITY_CATEGORIES
            .iter()
            .any(|hp| hp.eq_ignore_ascii_case(english_part(c)))
    });
    if keyword_hit || category_hit {
        Priority::High
    } else {
        Priority::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilingual_category_maps_to_department() {
        assert_eq!(
            department_for_category("Water Issues / जल समस्या"),
            Some("Jal Kal Vibhag")
        );
        assert_eq!(department_for_category("road damage"), Some("Public Works Department"));
        assert_eq!(department_for_category("Alien Invasion"), None);
    }

    #[test]
    fn english_part_is_defensive_on_malformed_strings() {
        assert_eq!(english_part("Street Lights"), "Street Lights");
        assert_eq!(english_part(" / "), "");
        assert_eq!(english_part(""), "");
        assert_eq!(english_part("A / B / C"), "A");
    }

    #[test]
    fn emergency_keyword_derives_high_priority() {
        let cats = vec!["Water Issues / जल समस्या".to_string()];
        assert_eq!(
            derive_priority("EMERGENCY: main pipe burst near the crossing", &cats),
            Priority::High
        );
    }

    #[test]
    fn high_priority_category_alone_is_enough() {
        let cats = vec!["Electricity Issues".to_string()];
        assert_eq!(derive_priority("pole light flickers at night", &cats), Priority::High);
    }

    #[test]
    fn hindi_keyword_derives_high_priority() {
        let cats = vec!["Road Damage".to_string()];
        assert_eq!(derive_priority("सड़क पर खतरा बना हुआ है", &cats), Priority::High);
    }

    #[test]
    fn plain_report_defaults_to_medium() {
        let cats = vec!["Street Lights".to_string()];
        assert_eq!(derive_priority("one lamp is out on our street", &cats), Priority::Medium);
    }
}
