//! Offline data preparation: spreadsheet exports of vehicles and incidents
//! converted into request records.

pub mod import;
pub mod sheet;
