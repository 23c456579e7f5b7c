// Gateway module for the station catalog files the archive publishes
mod catalog;
mod countries;

pub use catalog::{country_of, StationCatalog, StationInfo};
pub use countries::CountryTable;
