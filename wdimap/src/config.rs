use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::geo::SimplifyMethod;
use crate::palette::Palette;

/// Number of rows preceding the header row in World Bank spreadsheet exports.
pub const WORLD_BANK_HEADER_ROWS: usize = 3;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub indicators: Vec<IndicatorSource>,
    pub boundaries: BoundarySource,
    pub land_archive: String,
    pub year: i64,
    pub simplify: SimplifyConfig,
    /// Proj-style definition of the equal-area projection, e.g. `+proj=eqearth`
    pub projection: String,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indicators: vec![
                IndicatorSource {
                    key: "gdp_per_cap".into(),
                    path: "data/API_NY.GDP.PCAP.CD_DS2_en_excel_v2.xls".into(),
                    header_rows: WORLD_BANK_HEADER_ROWS,
                    sheet: None,
                    title: "GDP per capita (current US$)".into(),
                    classification: Classification {
                        breaks: vec![
                            f64::NEG_INFINITY,
                            1000.0,
                            2500.0,
                            5000.0,
                            10000.0,
                            25000.0,
                            50000.0,
                            f64::INFINITY,
                        ],
                        labels: [
                            "Under $1,000",
                            "$1,000 to $2,500",
                            "$2,500 to $5,000",
                            "$5,000 to $10,000",
                            "$10,000 to $25,000",
                            "$25,000 to $50,000",
                            "Over $50,000",
                        ]
                        .map(String::from)
                        .to_vec(),
                        palette: Palette::YlGn,
                    },
                },
                IndicatorSource {
                    key: "life_exp".into(),
                    path: "data/API_SP.DYN.LE00.IN_DS2_en_excel_v2.xls".into(),
                    header_rows: WORLD_BANK_HEADER_ROWS,
                    sheet: None,
                    title: "Life expectancy at birth (years)".into(),
                    classification: Classification {
                        breaks: vec![
                            f64::NEG_INFINITY,
                            55.0,
                            60.0,
                            65.0,
                            70.0,
                            75.0,
                            80.0,
                            f64::INFINITY,
                        ],
                        labels: [
                            "Under 55",
                            "55 to 60",
                            "60 to 65",
                            "65 to 70",
                            "70 to 75",
                            "75 to 80",
                            "Over 80",
                        ]
                        .map(String::from)
                        .to_vec(),
                        palette: Palette::RdYlGn,
                    },
                },
            ],
            boundaries: BoundarySource::default(),
            land_archive: "data/ne_110m_land.zip".into(),
            year: 2015,
            simplify: SimplifyConfig::default(),
            projection: "+proj=eqearth".into(),
            render: RenderConfig::default(),
        }
    }
}

impl Config {
    pub fn indicator_keys(&self) -> Vec<&str> {
        self.indicators.iter().map(|i| i.key.as_str()).collect()
    }
}

/// A wide-format indicator spreadsheet and how to draw it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IndicatorSource {
    /// Name of the value column this indicator produces
    pub key: String,
    pub path: String,
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,
    /// Worksheet to read, the first one when unset. Ignored for CSV sources.
    pub sheet: Option<String>,
    pub title: String,
    pub classification: Classification,
}

fn default_header_rows() -> usize {
    WORLD_BANK_HEADER_ROWS
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BoundarySource {
    pub archive: String,
    pub code_field: String,
    pub name_field: String,
    pub formal_name_field: String,
}

impl Default for BoundarySource {
    fn default() -> Self {
        Self {
            archive: "data/ne_110m_admin_0_countries.zip".into(),
            code_field: "ISO_A3".into(),
            name_field: "NAME".into(),
            formal_name_field: "FORMAL_EN".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Tolerance in the units of the source data: a distance in degrees for Douglas-Peucker, an
    /// area in square degrees for Visvalingam-Whyatt
    pub tolerance: f64,
    pub method: SimplifyMethod,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            method: SimplifyMethod::VisvalingamWhyatt,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub output: String,
    /// Width and height in pixels of each indicator panel
    pub panel_width: u32,
    pub panel_height: u32,
    /// Labels whose size would fall below this are not drawn
    pub label_min_font: f64,
    pub label_max_font: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: "wdimap.svg".into(),
            panel_width: 1400,
            panel_height: 760,
            label_min_font: 7.0,
            label_max_font: 16.0,
        }
    }
}
