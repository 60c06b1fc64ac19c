use crate::app::connectivity::{GridSearchParams, Hemisphere, VolumetricDownload};
use crate::config::toml_config::ClientConfig;
use crate::core::filter::quote_string;
use crate::core::Value;
use crate::utils::error::Result;
use crate::app::export::ExportFormat;
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "rma-query")]
#[command(about = "Compile and run RMA queries against the mouse connectivity atlas")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML client configuration")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Response format: json or xml")]
    pub format: Option<String>,

    #[arg(long, global = true, help = "Override the RMA endpoint")]
    pub rma_endpoint: Option<String>,

    #[arg(long, global = true, help = "Print the compiled URL and exit")]
    pub url_only: bool,

    #[arg(long, global = true, help = "Write the payload to a .json or .csv file")]
    pub output: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Experiments of the projection product
    Experiments {
        #[arg(long)]
        structure_id: Option<i64>,
    },
    /// Detailed metadata for one experiment
    Detail { experiment_id: i64 },
    /// Meta-information of one projection image
    ImageMeta {
        experiment_id: i64,
        section_number: i64,
    },
    /// Projection signal statistics of one experiment
    SignalStats {
        section_data_set_id: i64,
        #[arg(long)]
        is_injection: Option<bool>,
    },
    /// Projection grid search service
    GridSearch(GridSearchArgs),
    /// Download a 3-D reference volume
    DownloadVolume(VolumeArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HemisphereArg {
    Left,
    Right,
}

impl From<HemisphereArg> for Hemisphere {
    fn from(h: HemisphereArg) -> Self {
        match h {
            HemisphereArg::Left => Hemisphere::Left,
            HemisphereArg::Right => Hemisphere::Right,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct GridSearchArgs {
    /// Structure ids or acronyms
    #[arg(long, value_delimiter = ',')]
    pub injection_structures: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub target_domain: Vec<String>,
    #[arg(long, value_enum)]
    pub injection_hemisphere: Option<HemisphereArg>,
    #[arg(long, value_enum)]
    pub target_hemisphere: Option<HemisphereArg>,
    /// Transgenic line ids or names; names are quoted automatically
    #[arg(long, value_delimiter = ',')]
    pub transgenic_lines: Vec<String>,
    #[arg(long, value_delimiter = ',')]
    pub injection_domain: Vec<String>,
    #[arg(long)]
    pub primary_structure_only: Option<bool>,
    #[arg(long)]
    pub start_row: Option<u32>,
    #[arg(long)]
    pub num_rows: Option<u32>,
}

/// Numeric tokens become integers, everything else a bare identifier.
fn id_or_acronym(token: &str) -> Value {
    token
        .parse::<i64>()
        .map(Value::Integer)
        .unwrap_or_else(|_| Value::ident(token))
}

fn id_or_quoted_name(token: &str) -> Value {
    token
        .parse::<i64>()
        .map(Value::Integer)
        .unwrap_or_else(|_| Value::String(quote_string(token)))
}

fn list_param(tokens: &[String], convert: fn(&str) -> Value) -> Option<Value> {
    if tokens.is_empty() {
        None
    } else {
        Some(Value::List(tokens.iter().map(|t| convert(t)).collect()))
    }
}

impl From<&GridSearchArgs> for GridSearchParams {
    fn from(args: &GridSearchArgs) -> Self {
        GridSearchParams {
            injection_structures: list_param(&args.injection_structures, id_or_acronym),
            target_domain: list_param(&args.target_domain, id_or_acronym),
            injection_hemisphere: args.injection_hemisphere.map(Hemisphere::from),
            target_hemisphere: args.target_hemisphere.map(Hemisphere::from),
            transgenic_lines: list_param(&args.transgenic_lines, id_or_quoted_name),
            injection_domain: list_param(&args.injection_domain, id_or_acronym),
            primary_structure_only: args.primary_structure_only,
            start_row: args.start_row,
            num_rows: args.num_rows,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct VolumeArgs {
    /// average_template, ara_nissl, annotation/ccf_2015, ...
    pub data: String,
    pub file_name: String,
    #[arg(long)]
    pub save_file_path: Option<PathBuf>,
    #[arg(long)]
    pub release: Option<String>,
    /// mouse_ccf (default) or mouse_annotation
    #[arg(long)]
    pub coordinate_framework: Option<String>,
}

impl From<&VolumeArgs> for VolumetricDownload {
    fn from(args: &VolumeArgs) -> Self {
        VolumetricDownload {
            data: args.data.clone(),
            file_name: args.file_name.clone(),
            save_file_path: args.save_file_path.clone(),
            release: args.release.clone(),
            coordinate_framework: args.coordinate_framework.clone(),
        }
    }
}

impl CliConfig {
    /// Config file (or defaults) with command line overrides applied, validated.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(format) = &self.format {
            config.query.format = Some(format.clone());
        }
        if let Some(endpoint) = &self.rma_endpoint {
            config.endpoints.rma = endpoint.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(output) = &self.output {
            ExportFormat::from_path(output)?;
        }
        Ok(())
    }
}
