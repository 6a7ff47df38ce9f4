//! Column names of the dataframes passed between the pipeline stages. Indicator value columns are
//! named after the indicator key from the configuration (e.g. `gdp_per_cap`) and so are not
//! listed here.

// Long-format indicator tables and the merged table
pub const COUNTRY_NAME: &str = "country_name";
pub const COUNTRY_CODE: &str = "country_code";
pub const YEAR: &str = "year";

// Boundary tables
pub const BOUNDARY_NAME: &str = "boundary_name";
pub const BOUNDARY_FORMAL_NAME: &str = "boundary_formal_name";
pub const GEOMETRY: &str = "geometry";

// Final country table
pub const NAME: &str = "name";
pub const CODE: &str = "code";

/// Header names of the identifier columns in World Bank indicator exports.
pub mod source {
    pub const COUNTRY_NAME: &str = "Country Name";
    pub const COUNTRY_CODE: &str = "Country Code";
}
