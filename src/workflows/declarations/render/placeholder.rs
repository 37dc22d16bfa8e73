//! Pure text preparation for declaration letters: `{{token}}` substitution
//! and the locale formatting the templates rely on.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::super::domain::UserProfile;

/// Replace every `{{name}}` occurrence for each supplied value.
///
/// Tokens without a supplied value stay verbatim so template gaps surface in
/// the issued document instead of failing the batch.
pub fn substitute(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut rendered = template.to_string();
    for (name, value) in values {
        let token = format!("{{{{{name}}}}}");
        rendered = rendered.replace(&token, value);
    }
    rendered
}

/// Normalize a postal code into `NNNNN-NNN`: strip non-digits, left-pad with
/// zeros to eight digits, split five/three.
pub fn format_postal_code(raw: &str) -> String {
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    while digits.len() < 8 {
        digits.insert(0, '0');
    }
    format!("{}-{}", &digits[..5], &digits[5..])
}

const MONTHS_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Brazilian long date used by the `current_date` placeholder, e.g.
/// `5 de agosto de 2026`.
pub fn long_date_pt(date: NaiveDate) -> String {
    let month = MONTHS_PT[date.month0() as usize];
    format!("{} de {} de {}", date.day(), month, date.year())
}

/// Placeholder values for one requester at the given issue date.
///
/// The optional address complement is prefixed with a single space so
/// templates can write `{{house_number}}{{complement}}` and read naturally
/// whether or not a complement exists.
pub fn declaration_context(profile: &UserProfile, today: NaiveDate) -> BTreeMap<String, String> {
    let complement = profile
        .address
        .complement
        .as_deref()
        .map(|complement| format!(" {complement}"))
        .unwrap_or_default();

    let mut values = BTreeMap::new();
    values.insert("name".to_string(), profile.name.clone());
    values.insert("street".to_string(), profile.address.street.clone());
    values.insert(
        "house_number".to_string(),
        profile.address.house_number.clone(),
    );
    values.insert("complement".to_string(), complement);
    values.insert(
        "neighborhood".to_string(),
        profile.address.neighborhood.clone(),
    );
    values.insert("city".to_string(), profile.address.city.clone());
    values.insert("state".to_string(), profile.address.state.clone());
    values.insert(
        "postal_code".to_string(),
        format_postal_code(&profile.address.postal_code),
    );
    values.insert("rg".to_string(), profile.documents.rg.clone());
    values.insert("cpf".to_string(), profile.documents.cpf.clone());
    values.insert(
        "issuing_agency".to_string(),
        profile.documents.issuing_agency.clone(),
    );
    values.insert("current_date".to_string(), long_date_pt(today));
    values
}
