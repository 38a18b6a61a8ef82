pub mod chart;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod render;
pub mod scene_dump;
pub mod selection;
pub mod source;
pub mod theme;
pub mod tree;
pub mod viewport;
pub mod visibility;

pub use chart::{ChartEvent, ChartUpdate, EventOutcome, OrgChart, UpdateOutcome};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{ChartConfig, Config};
pub use ir::{CellValue, Column, ColumnRole, DataTable, EmployeeRecord, SelectionKey};
pub use selection::{SelectionHost, SelectionRequest};
