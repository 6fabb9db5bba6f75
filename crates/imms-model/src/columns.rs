//! Canonical extract headers.

/// Headers every extract must provide (after column mapping).
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "SCHOOL NAME",
    "CLIENT ID",
    "FIRST NAME",
    "LAST NAME",
    "DATE OF BIRTH",
    "CITY",
    "POSTAL CODE",
    "PROVINCE/TERRITORY",
    "OVERDUE DISEASE",
    "IMMS GIVEN",
    "STREET ADDRESS LINE 1",
    "STREET ADDRESS LINE 2",
];

/// Headers carried through when present verbatim; never fuzzy-matched.
pub const OPTIONAL_COLUMNS: [&str; 6] = [
    "AGE",
    "SCHOOL ID",
    "SCHOOL TYPE",
    "BOARD NAME",
    "BOARD ID",
    "UNIQUE ID",
];
