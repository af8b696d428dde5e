// src/schema/columns.rs

/// Columns of the published tidy table, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Year,
    ReasonForMigration,
    MigrationFlow,
    IpsCitizenship,
    Ci,
    Value,
    IpsMarker,
    MeasureType,
    Unit,
}

pub const COLUMNS: [Column; 9] = [
    Column::Year,
    Column::ReasonForMigration,
    Column::MigrationFlow,
    Column::IpsCitizenship,
    Column::Ci,
    Column::Value,
    Column::IpsMarker,
    Column::MeasureType,
    Column::Unit,
];

/// The linked-data role a column plays in the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Dimension,
    Attribute,
    Measure,
    MeasureType,
    Unit,
}

impl Column {
    /// CSV header text.
    pub fn title(self) -> &'static str {
        match self {
            Column::Year => "Year",
            Column::ReasonForMigration => "Reason for migration",
            Column::MigrationFlow => "Migration Flow",
            Column::IpsCitizenship => "IPS Citizenship",
            Column::Ci => "CI",
            Column::Value => "Value",
            Column::IpsMarker => "IPS Marker",
            Column::MeasureType => "Measure Type",
            Column::Unit => "Unit",
        }
    }

    /// CSVW column name, usable in URI templates.
    pub fn name(self) -> &'static str {
        match self {
            Column::Year => "year",
            Column::ReasonForMigration => "reason_for_migration",
            Column::MigrationFlow => "migration_flow",
            Column::IpsCitizenship => "ips_citizenship",
            Column::Ci => "ci",
            Column::Value => "value",
            Column::IpsMarker => "ips_marker",
            Column::MeasureType => "measure_type",
            Column::Unit => "unit",
        }
    }

    /// Path segment used for component and codelist URIs.
    pub fn slug(self) -> &'static str {
        match self {
            Column::Year => "year",
            Column::ReasonForMigration => "reason-for-migration",
            Column::MigrationFlow => "migration-flow",
            Column::IpsCitizenship => "ips-citizenship",
            Column::Ci => "ci",
            Column::Value => "value",
            Column::IpsMarker => "ips-marker",
            Column::MeasureType => "measure-type",
            Column::Unit => "unit",
        }
    }

    pub fn component(self) -> Component {
        match self {
            Column::Year
            | Column::ReasonForMigration
            | Column::MigrationFlow
            | Column::IpsCitizenship => Component::Dimension,
            Column::Ci | Column::IpsMarker => Component::Attribute,
            Column::Value => Component::Measure,
            Column::MeasureType => Component::MeasureType,
            Column::Unit => Component::Unit,
        }
    }

    /// String-coded columns whose values form a codelist.
    pub fn is_categorical(self) -> bool {
        matches!(
            self,
            Column::ReasonForMigration
                | Column::MigrationFlow
                | Column::IpsCitizenship
                | Column::IpsMarker
                | Column::MeasureType
                | Column::Unit
        )
    }

    /// XSD datatype name for CSVW.
    pub fn datatype(self) -> &'static str {
        match self {
            Column::Year => "integer",
            Column::Value => "number",
            _ => "string",
        }
    }

    /// Blank cells are allowed in these columns.
    pub fn is_optional(self) -> bool {
        matches!(self, Column::Value | Column::IpsMarker | Column::Ci)
    }
}

pub fn header_row() -> Vec<&'static str> {
    COLUMNS.iter().map(|c| c.title()).collect()
}
