use crate::normalize::{clean_email, clean_name, clean_phone};

const NAME_ALIASES: &[&str] = &[
    "name",
    "full name",
    "full_name",
    "first name",
    "student name",
    "customer name",
];
const PHONE_ALIASES: &[&str] = &[
    "phone",
    "phone number",
    "phone_number",
    "mobile",
    "contact",
    "contact number",
    "cell",
];
/// Cells read as missing by the usual spreadsheet tooling; written back empty.
const MISSING_VALUE_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];
const EMAIL_ALIASES: &[&str] = &["email", "email address", "email_address", "e-mail", "mail"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetColumn {
    FullName,
    PhoneNumber,
    Email,
}

impl TargetColumn {
    /// Output column order.
    pub const ALL: [TargetColumn; 3] = [
        TargetColumn::FullName,
        TargetColumn::PhoneNumber,
        TargetColumn::Email,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            TargetColumn::FullName => "full_name",
            TargetColumn::PhoneNumber => "phone_number",
            TargetColumn::Email => "email",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            TargetColumn::FullName => NAME_ALIASES,
            TargetColumn::PhoneNumber => PHONE_ALIASES,
            TargetColumn::Email => EMAIL_ALIASES,
        }
    }

    fn matches(&self, header: &str) -> bool {
        let normalized = header.trim().to_lowercase();
        self.aliases().contains(&normalized.as_str())
    }

    pub fn clean(&self, value: &str) -> String {
        if is_missing(value) {
            return String::new();
        }
        match self {
            TargetColumn::FullName => clean_name(value),
            TargetColumn::PhoneNumber => clean_phone(value),
            TargetColumn::Email => clean_email(value),
        }
    }
}

fn is_missing(value: &str) -> bool {
    MISSING_VALUE_TOKENS.contains(&value)
}

/// Source column index for each target column that was found, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    found: Vec<(TargetColumn, usize)>,
}

impl ColumnMapping {
    /// The first header matching a target's aliases wins; later duplicates are ignored.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let headers: Vec<&str> = headers.into_iter().collect();
        let found = TargetColumn::ALL
            .iter()
            .filter_map(|target| {
                headers
                    .iter()
                    .position(|header| target.matches(header))
                    .map(|index| (*target, index))
            })
            .collect();
        Self { found }
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    pub fn columns(&self) -> &[(TargetColumn, usize)] {
        &self.found
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.found.iter().map(|(target, _)| target.header()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_aliases_case_and_space_insensitively() {
        let mapping = ColumnMapping::from_headers([" E-Mail ", "Customer Name", "Mobile"]);
        assert_eq!(
            mapping.columns(),
            &[
                (TargetColumn::FullName, 1),
                (TargetColumn::PhoneNumber, 2),
                (TargetColumn::Email, 0),
            ]
        );
        assert_eq!(mapping.headers(), vec!["full_name", "phone_number", "email"]);
    }

    #[test]
    fn first_matching_column_wins() {
        let mapping = ColumnMapping::from_headers(["name", "full name", "cell"]);
        assert_eq!(
            mapping.columns(),
            &[(TargetColumn::FullName, 0), (TargetColumn::PhoneNumber, 2)]
        );
    }

    #[test]
    fn unrelated_headers_map_to_nothing() {
        let mapping = ColumnMapping::from_headers(["id", "address", "notes"]);
        assert!(mapping.is_empty());
    }

    #[test]
    fn missing_value_markers_become_empty() {
        for token in ["NA", "N/A", "null", "None", "nan", "#N/A"] {
            assert_eq!(TargetColumn::FullName.clean(token), "", "{token}");
            assert_eq!(TargetColumn::Email.clean(token), "", "{token}");
            assert_eq!(TargetColumn::PhoneNumber.clean(token), "", "{token}");
        }
        assert_eq!(TargetColumn::FullName.clean("Nan Smith"), "Nan Smith");
        assert_eq!(TargetColumn::Email.clean("NULL@X.IO"), "null@x.io");
    }

    #[test]
    fn empty_cells_stay_empty() {
        assert_eq!(TargetColumn::PhoneNumber.clean(""), "");
        assert_eq!(TargetColumn::Email.clean(" BOB@X.IO"), "bob@x.io");
    }
}
