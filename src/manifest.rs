//! Source manifest: which files feed the pipeline and how each is shaped.
//!
//! Each source declares its country column, how its year dimension is
//! encoded (explicit column, baked into column names, or a constant
//! reference year), and which columns become which output metrics. The
//! manifest is YAML-loadable so new dataset vintages can be wired in
//! without a rebuild; [`Manifest::default`] mirrors the dataset family the
//! tool was built around.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// The base source; the pipeline cannot run without it.
    pub base: SourceDescriptor,
    /// Derived families, outer-joined onto the base in declared order.
    /// Within a family, sources are unioned first-wins in declared order,
    /// so the most authoritative source comes first.
    pub families: Vec<SourceFamily>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFamily {
    pub name: String,
    pub sources: Vec<SourceDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    /// File name resolved relative to the data directory.
    pub file: String,
    #[serde(flatten)]
    pub shape: SourceShape,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SourceShape {
    /// Explicit country and year columns; every other column passes
    /// through as a metric.
    Keyed { country: String, year: String },
    /// Year-suffixed wide columns (`<Metric>_<Year>`), extracted one
    /// declared group at a time.
    YearSuffixed {
        country: String,
        groups: Vec<YearGroup>,
    },
    /// Numerically-suffixed observation columns (prefix + digits), later
    /// mean-aggregated to one row per country at a constant year.
    PrefixedAggregate {
        country: String,
        prefix: String,
        year: i64,
    },
    /// Flat columns with no year encoding, assigned a constant year.
    ConstantYear {
        country: String,
        year: i64,
        columns: Vec<ColumnMap>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearGroup {
    pub year: i64,
    pub columns: Vec<ColumnMap>,
    /// Drop rows where every extracted metric is null (the rank
    /// extractions carry many empty cells).
    #[serde(default)]
    pub require_value: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMap {
    /// Column name as it appears in the source header.
    pub source: String,
    /// Output metric name.
    pub rename: String,
}

impl ColumnMap {
    pub fn new(source: &str, rename: &str) -> Self {
        Self {
            source: source.to_string(),
            rename: rename.to_string(),
        }
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Reading manifest from {path:?}"))?;
        serde_yaml::from_str(&text).with_context(|| format!("Parsing manifest {path:?}"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_yaml::to_string(self).context("Serializing manifest")?;
        fs::write(path, text).with_context(|| format!("Writing manifest to {path:?}"))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing manifest")
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            base: SourceDescriptor {
                name: "economy".to_string(),
                file: "Global Economy Indicators.csv".to_string(),
                shape: SourceShape::Keyed {
                    country: "Country".to_string(),
                    year: "Year".to_string(),
                },
            },
            families: vec![
                SourceFamily {
                    name: "standard_of_living".to_string(),
                    sources: vec![
                        SourceDescriptor {
                            name: "sol_2024".to_string(),
                            file: "standard-of-living-by-country-2025 (1).csv".to_string(),
                            shape: SourceShape::YearSuffixed {
                                country: "country".to_string(),
                                groups: vec![
                                    YearGroup {
                                        year: 2024,
                                        columns: vec![
                                            ColumnMap::new(
                                                "QualityofLifeScoreNumbeo_2024",
                                                "QualityofLifeScoreNumbeo",
                                            ),
                                            ColumnMap::new(
                                                "QualityofLifeScoreCEOWorld_2024",
                                                "QualityofLifeScoreCEOWorld",
                                            ),
                                        ],
                                        require_value: false,
                                    },
                                    YearGroup {
                                        year: 2022,
                                        columns: vec![ColumnMap::new(
                                            "QualityofLifeRankUSNews_2022",
                                            "QualityofLifeRankUSNews",
                                        )],
                                        require_value: true,
                                    },
                                ],
                            },
                        },
                        SourceDescriptor {
                            name: "sol_2023".to_string(),
                            file: "standard-of-living-by-country-2025 (2).csv".to_string(),
                            shape: SourceShape::YearSuffixed {
                                country: "country".to_string(),
                                groups: vec![YearGroup {
                                    year: 2023,
                                    columns: vec![
                                        ColumnMap::new(
                                            "QualityofLifeScoreNumbeo_2023",
                                            "QualityofLifeScoreNumbeo",
                                        ),
                                        ColumnMap::new(
                                            "QualityofLifeScoreUSNews_2023",
                                            "QualityofLifeScoreUSNews",
                                        ),
                                        ColumnMap::new(
                                            "HumanDevelopmentIndex_2023",
                                            "HumanDevelopmentIndex",
                                        ),
                                    ],
                                    require_value: false,
                                }],
                            },
                        },
                        SourceDescriptor {
                            name: "sol_2022".to_string(),
                            file: "standard-of-living-by-country-2025 (3).csv".to_string(),
                            shape: SourceShape::YearSuffixed {
                                country: "country".to_string(),
                                groups: vec![YearGroup {
                                    year: 2022,
                                    columns: vec![ColumnMap::new(
                                        "HumanDevelopmentIndex_2022",
                                        "HumanDevelopmentIndex",
                                    )],
                                    require_value: false,
                                }],
                            },
                        },
                    ],
                },
                SourceFamily {
                    name: "cost_of_living".to_string(),
                    sources: vec![SourceDescriptor {
                        name: "col".to_string(),
                        file: "cost-of-living_v2.csv".to_string(),
                        shape: SourceShape::PrefixedAggregate {
                            country: "country".to_string(),
                            prefix: "x".to_string(),
                            year: 2024,
                        },
                    }],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_manifest_round_trips_through_yaml() {
        let manifest = Manifest::default();
        let yaml = manifest.to_yaml().unwrap();
        let reloaded: Manifest = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(reloaded.base.name, "economy");
        assert_eq!(reloaded.families.len(), 2);
        assert_eq!(reloaded.families[0].sources.len(), 3);
    }

    #[test]
    fn year_group_require_value_defaults_to_false() {
        let yaml = "\
year: 2023
columns:
  - source: HDI_2023
    rename: HDI
";
        let group: YearGroup = serde_yaml::from_str(yaml).unwrap();
        assert!(!group.require_value);
    }
}
