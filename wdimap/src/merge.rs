//! Merging of long-format indicator tables into a single table restricted to ISO-3166 countries.

use anyhow::Result;
use itertools::Itertools;
use log::{debug, info};
use nonempty::NonEmpty;
use polars::prelude::*;

use crate::indicators::IndicatorTable;
use crate::{iso3166, COL};

/// Join all indicator tables on country name, country code and year, then keep only rows whose
/// country code is an ISO-3166 alpha-3 code.
///
/// Rows for regional and income-group aggregates (e.g. `WLD`, `EUU`) are dropped without error.
/// Since each input has unique (country code, year) pairs, so does the output.
pub fn merge_indicators(tables: NonEmpty<IndicatorTable>) -> Result<DataFrame> {
    let keys = [col(COL::COUNTRY_NAME), col(COL::COUNTRY_CODE), col(COL::YEAR)];
    let NonEmpty { head, tail } = tables;
    debug!(
        "Merging indicators: {:?}",
        std::iter::once(&head)
            .chain(tail.iter())
            .map(|table| format!("{} ({} rows)", table.key, table.height()))
            .collect_vec()
    );
    let joined = tail
        .into_iter()
        .fold(head.df.lazy(), |merged, table| {
            merged.join(
                table.df.lazy(),
                keys.clone(),
                keys.clone(),
                JoinArgs::new(JoinType::Inner),
            )
        })
        .collect()?;

    let iso_codes = Series::new("iso3", iso3166::alpha3_codes());
    let merged = joined
        .clone()
        .lazy()
        .filter(col(COL::COUNTRY_CODE).is_in(lit(iso_codes)))
        .sort(
            [COL::COUNTRY_CODE, COL::YEAR],
            SortMultipleOptions::default(),
        )
        .collect()?;

    let dropped = joined.height() - merged.height();
    info!(
        "Merged indicators with shape: {:?}, dropped {dropped} rows outside ISO-3166",
        merged.shape()
    );
    debug!(
        "Codes outside ISO-3166: {:?}",
        joined
            .column(COL::COUNTRY_CODE)?
            .str()?
            .into_iter()
            .flatten()
            .filter(|code| !iso3166::is_alpha3(code))
            .unique()
            .collect_vec()
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use nonempty::nonempty;

    use super::*;

    fn table(key: &str, rows: &[(&str, &str, i64, Option<f64>)]) -> IndicatorTable {
        let df = df!(
            COL::COUNTRY_NAME => rows.iter().map(|r| r.0).collect_vec(),
            COL::COUNTRY_CODE => rows.iter().map(|r| r.1).collect_vec(),
            COL::YEAR => rows.iter().map(|r| r.2).collect_vec(),
            key => rows.iter().map(|r| r.3).collect_vec()
        )
        .unwrap();
        IndicatorTable {
            key: key.into(),
            df,
        }
    }

    fn gdp() -> IndicatorTable {
        table(
            "gdp_per_cap",
            &[
                ("France", "FRA", 2014, Some(42955.2)),
                ("France", "FRA", 2015, Some(36526.8)),
                ("World", "WLD", 2015, Some(10196.0)),
                ("Norway", "NOR", 2015, Some(74355.5)),
                ("Kosovo", "XKX", 2015, Some(3571.3)),
            ],
        )
    }

    fn life_exp() -> IndicatorTable {
        table(
            "life_exp",
            &[
                ("France", "FRA", 2014, Some(82.6)),
                ("France", "FRA", 2015, Some(82.3)),
                ("World", "WLD", 2015, Some(71.7)),
                ("Kosovo", "XKX", 2015, Some(71.1)),
            ],
        )
    }

    #[test]
    fn merged_table_should_only_contain_iso_codes() -> anyhow::Result<()> {
        let merged = merge_indicators(nonempty![gdp(), life_exp()])?;
        let codes = merged
            .column(COL::COUNTRY_CODE)?
            .str()?
            .into_iter()
            .flatten()
            .collect_vec();
        assert!(codes.iter().all(|code| iso3166::is_alpha3(code)));
        assert_eq!(codes, vec!["FRA", "FRA"]);
        Ok(())
    }

    #[test]
    fn merged_table_should_have_one_column_per_indicator() -> anyhow::Result<()> {
        let merged = merge_indicators(nonempty![gdp(), life_exp()])?;
        assert_eq!(merged.shape(), (2, 5));
        let years = merged.column(COL::YEAR)?.i64()?.into_iter().collect_vec();
        assert_eq!(years, vec![Some(2014), Some(2015)]);
        let life = merged.column("life_exp")?.f64()?.into_iter().collect_vec();
        assert_eq!(life, vec![Some(82.6), Some(82.3)]);
        Ok(())
    }

    #[test]
    fn merged_rows_should_be_unique_per_code_and_year() -> anyhow::Result<()> {
        let merged = merge_indicators(nonempty![gdp(), life_exp()])?;
        let pairs = merged
            .column(COL::COUNTRY_CODE)?
            .str()?
            .into_iter()
            .zip(merged.column(COL::YEAR)?.i64()?.into_iter())
            .collect_vec();
        assert!(pairs.iter().all_unique());
        Ok(())
    }

    #[test]
    fn single_table_is_only_filtered() -> anyhow::Result<()> {
        let merged = merge_indicators(nonempty![gdp()])?;
        let codes = merged
            .column(COL::COUNTRY_CODE)?
            .str()?
            .into_iter()
            .flatten()
            .collect_vec();
        assert_eq!(codes, vec!["FRA", "FRA", "NOR"]);
        Ok(())
    }
}
