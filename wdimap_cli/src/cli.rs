use std::fs::File;
use std::path::Path;

use anyhow::Context;
use clap::{command, Args, Parser, Subcommand};
use enum_dispatch::enum_dispatch;
use itertools::Itertools;
use log::{info, warn};
use polars::frame::DataFrame;
use serde::{Deserialize, Serialize};
use spinners::{Spinner, Spinners};
use strum_macros::EnumString;
use wdimap::{
    config::Config,
    formatters::{
        CSVFormatter, GeoFormat, GeoJSONFormatter, GeoJSONSeqFormatter, OutputFormatter,
        OutputGenerator,
    },
    Wdimap,
};

use crate::display::display_countries;
use crate::error::WdimapCliResult;

const DEFAULT_PROGRESS_SPINNER: Spinners = Spinners::Dots;
const COMPLETE_PROGRESS_STRING: &str = "✔";
const RUNNING_TAIL_STRING: &str = "...";
const LOADING_STRING: &str = "Loading indicators and boundaries";

/// Defines the output formats we are able to produce data in.
#[derive(Clone, Debug, Deserialize, Serialize, EnumString, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum OutputFormat {
    GeoJSON,
    GeoJSONSeq,
    Csv,
}

fn formatter(output_format: &OutputFormat, wkb: bool) -> OutputFormatter {
    match output_format {
        OutputFormat::GeoJSON => OutputFormatter::GeoJSON(GeoJSONFormatter),
        OutputFormat::GeoJSONSeq => OutputFormatter::GeoJSONSeq(GeoJSONSeqFormatter),
        OutputFormat::Csv => OutputFormatter::Csv(CSVFormatter {
            geo_format: Some(if wkb { GeoFormat::Wkb } else { GeoFormat::Wkt }),
        }),
    }
}

fn write_output<T, U>(
    output_generator: T,
    mut data: DataFrame,
    output_file: Option<U>,
) -> WdimapCliResult<()>
where
    T: OutputGenerator,
    U: AsRef<Path>,
{
    if let Some(output_file) = output_file {
        let mut f = File::create(output_file).context("Failed to write output")?;
        output_generator.save(&mut f, &mut data)?;
    } else {
        let mut stdout_lock = std::io::stdout().lock();
        output_generator.save(&mut stdout_lock, &mut data)?;
    };
    Ok(())
}

fn start_spinner(quiet: bool, message: &str) -> Option<Spinner> {
    (!quiet).then(|| {
        Spinner::with_timer(
            DEFAULT_PROGRESS_SPINNER,
            message.to_string() + RUNNING_TAIL_STRING,
        )
    })
}

fn stop_spinner(sp: Option<Spinner>) {
    if let Some(mut s) = sp {
        s.stop_with_symbol(COMPLETE_PROGRESS_STRING);
    }
}

/// Trait that defines what to run when a given subcommand is invoked.
#[enum_dispatch]
pub trait RunCommand {
    fn run(&self, config: Config) -> WdimapCliResult<()>;
}

/// The `render` command draws the choropleth map of every configured indicator to an SVG file.
#[derive(Args, Debug)]
pub struct RenderCommand {
    #[arg(
        short = 'o',
        long,
        help = "Output SVG file, defaults to the `render.output` setting"
    )]
    output_file: Option<String>,
    #[arg(short, long, help = "Year to map, defaults to the `year` setting")]
    year: Option<i64>,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for RenderCommand {
    fn run(&self, config: Config) -> WdimapCliResult<()> {
        info!("Running `render` subcommand");
        let year = self.year.unwrap_or(config.year);
        let output = self
            .output_file
            .clone()
            .unwrap_or_else(|| config.render.output.clone());
        let sp = start_spinner(self.quiet, &format!("Rendering map for {year}"));
        let wdimap = Wdimap::new_with_config(config);
        let result = wdimap.render(year, Path::new(&output));
        stop_spinner(sp);
        result?;
        println!("Map written to {output}");
        Ok(())
    }
}

/// The `export` command writes the country table for a year, with geometries, in a given format.
#[derive(Args, Debug)]
pub struct ExportCommand {
    #[arg(
        short = 'f',
        long,
        value_name = "geojson|geojsonseq|csv",
        help = "Output format for the results"
    )]
    output_format: OutputFormat,
    #[arg(
        long,
        help = "Encode CSV geometries as hex well-known binary instead of well-known text"
    )]
    wkb: bool,
    #[arg(short = 'o', long, help = "Output file to place the results")]
    output_file: Option<String>,
    #[arg(short, long, help = "Year to export, defaults to the `year` setting")]
    year: Option<i64>,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for ExportCommand {
    fn run(&self, config: Config) -> WdimapCliResult<()> {
        info!("Running `export` subcommand");
        if self.wkb && self.output_format != OutputFormat::Csv {
            warn!("--wkb only applies to CSV output and is ignored");
        }
        let year = self.year.unwrap_or(config.year);
        let sp = start_spinner(self.quiet, LOADING_STRING);
        let wdimap = Wdimap::new_with_config(config);
        let countries = wdimap.countries(year);
        stop_spinner(sp);
        write_output(
            formatter(&self.output_format, self.wkb),
            countries?,
            self.output_file.as_deref(),
        )
    }
}

/// The `countries` command prints the country table for a year.
#[derive(Args, Debug)]
pub struct CountriesCommand {
    #[arg(short = 'n', long, help = "Maximum number of countries to show")]
    max_results: Option<usize>,
    #[arg(short, long, help = "Year to show, defaults to the `year` setting")]
    year: Option<i64>,
    #[arg(from_global)]
    quiet: bool,
}

impl RunCommand for CountriesCommand {
    fn run(&self, config: Config) -> WdimapCliResult<()> {
        info!("Running `countries` subcommand");
        let year = self.year.unwrap_or(config.year);
        let sp = start_spinner(self.quiet, LOADING_STRING);
        let wdimap = Wdimap::new_with_config(config);
        let countries = wdimap.countries(year);
        stop_spinner(sp);
        let countries = countries?;
        let titles = wdimap
            .config
            .indicators
            .iter()
            .map(|indicator| (indicator.key.as_str(), indicator.title.as_str()))
            .collect_vec();
        println!(
            "\n{} countries with boundaries and indicators for {year}:",
            countries.height()
        );
        display_countries(&countries, &titles, self.max_results)?;
        Ok(())
    }
}

/// The entrypoint for the CLI.
#[derive(Parser, Debug)]
#[command(version, about="Map World Bank development indicators by country", long_about = None, name="wdimap")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[arg(
        short = 'q',
        long = "quiet",
        help = "\
            Do not print progress bar to stdout. Results and logs (when `RUST_LOG` is set)\n\
            will still be printed.",
        global = true
    )]
    quiet: bool,
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Configuration file, defaults to `<config dir>/wdimap/config.toml`",
        global = true
    )]
    pub config: Option<String>,
}

/// Commands contains the list of subcommands avaliable for use in the CLI.
/// Each command should implmement the RunCommand trait and specify the list
/// of required args for that command.
#[derive(Subcommand, Debug)]
#[enum_dispatch(RunCommand)]
pub enum Commands {
    /// Render the choropleth map of each indicator to an SVG file
    Render(RenderCommand),
    /// Export the country table with geometries
    Export(ExportCommand),
    /// List the countries with boundaries and indicators
    Countries(CountriesCommand),
}
