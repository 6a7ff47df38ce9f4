use comfy_table::{presets::NOTHING, *};
use polars::frame::DataFrame;
use wdimap::COL;

const NO_DATA: &str = "-";

/// Format an indicator value for display, using thousands separators for large values.
fn format_value(value: Option<f64>) -> String {
    match value {
        None => NO_DATA.to_string(),
        Some(v) if v.is_nan() => NO_DATA.to_string(),
        Some(v) if v.abs() >= 1000.0 => {
            let rounded = format!("{:.0}", v.abs());
            let digits = rounded.as_bytes();
            let mut grouped = String::new();
            for (idx, digit) in digits.iter().enumerate() {
                if idx > 0 && (digits.len() - idx) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(*digit as char);
            }
            if v < 0.0 {
                format!("-{grouped}")
            } else {
                grouped
            }
        }
        Some(v) => format!("{v:.1}"),
    }
}

/// Build the table of countries with one column per indicator, `titles` giving the indicator
/// column names and their headers.
pub fn countries_table(
    countries: &DataFrame,
    titles: &[(&str, &str)],
    max_results: Option<usize>,
) -> anyhow::Result<Table> {
    let df_to_show = match max_results {
        Some(max) => countries.head(Some(max)),
        None => countries.clone(),
    };
    let mut header = vec![
        Cell::new("Code").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
    ];
    header.extend(
        titles
            .iter()
            .map(|(_, title)| Cell::new(title).add_attribute(Attribute::Bold)),
    );
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header)
        .set_style(comfy_table::TableComponent::BottomBorder, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, '─')
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::BottomBorderIntersections, '─')
        .set_style(comfy_table::TableComponent::TopBorder, '─')
        .set_style(comfy_table::TableComponent::TopBorderIntersections, '─');

    let codes = df_to_show.column(COL::CODE)?.str()?;
    let names = df_to_show.column(COL::NAME)?.str()?;
    let values = titles
        .iter()
        .map(|(key, _)| -> anyhow::Result<Vec<Option<f64>>> {
            let column = df_to_show
                .column(key)?
                .cast(&polars::prelude::DataType::Float64)?;
            Ok(column.f64()?.into_iter().collect())
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    for (idx, (code, name)) in codes.into_iter().zip(names.into_iter()).enumerate() {
        let mut row = vec![
            Cell::new(code.unwrap_or_default()),
            Cell::new(name.unwrap_or_default()),
        ];
        row.extend(
            values
                .iter()
                .map(|column| Cell::new(format_value(column[idx])).set_alignment(CellAlignment::Right)),
        );
        table.add_row(row);
    }
    Ok(table)
}

pub fn display_countries(
    countries: &DataFrame,
    titles: &[(&str, &str)],
    max_results: Option<usize>,
) -> anyhow::Result<()> {
    let table = countries_table(countries, titles, max_results)?;
    println!("\n{}", table);
    Ok(())
}
