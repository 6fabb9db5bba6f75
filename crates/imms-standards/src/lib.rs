#![deny(unsafe_code)]

pub mod cache;
pub mod error;
pub mod hash;
pub mod reference;
pub mod registry;

pub use crate::cache::RegistryCache;
pub use crate::error::{Result, StandardsError};
pub use crate::hash::{sha256_file, sha256_hex};
pub use crate::reference::{DiseaseMap, DiseaseRef, VaccineReference};
pub use crate::registry::{
    FacilityRegistry, PHIX_SHEET_NAME, normalize_facility_name, normalize_phu_label,
};
