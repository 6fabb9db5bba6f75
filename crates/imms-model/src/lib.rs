#![deny(unsafe_code)]

pub mod batch;
pub mod client;
pub mod columns;
pub mod enums;
pub mod error;
pub mod facility;
pub mod row;

pub use batch::Batch;
pub use client::{
    BoardInfo, ClientMetadata, ClientRecord, ContactInfo, PersonInfo, PhixValidation,
    ReceivedEntry, SchoolInfo,
};
pub use columns::{OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
pub use enums::{BatchStrategy, Language, MatchStrategy, MatchType, UnmatchedPolicy};
pub use error::ParseEnumError;
pub use facility::{Facility, FacilityMatch};
pub use row::StudentRow;
