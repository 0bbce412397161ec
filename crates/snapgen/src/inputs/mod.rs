//! Request inputs: the catalog of allowed values, the data model and the
//! store that owns it.

pub mod catalog;
pub mod model;
pub mod store;

pub use catalog::{check_period, default_prepared_date, year_options, Quarter, ReportingPeriod, DEFAULT_COMPANIES};
pub use model::{
    CancelHandle, FileCategory, RequestInputs, SpreadsheetSlot, UploadStatus, UploadedFile,
};
pub use store::InputStore;
