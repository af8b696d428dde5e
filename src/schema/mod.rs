pub mod arrow;
pub mod columns;
pub mod csvw;

pub use self::arrow::{build_arrow_schema, map_to_arrow_type, to_record_batch};
pub use columns::{header_row, Column, Component, COLUMNS};
pub use csvw::{write_schema, write_transform_metadata};
