use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "formwright",
    version,
    about = "Build forms from typed fields, validate submissions and keep every response"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    #[arg(long, global = true, default_value = "formwright.yaml")]
    pub config: PathBuf,

    /// Storage location; overrides the config file and FORMWRIGHT_DB
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Storage backend: sqlite | file | memory
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// tracing filter, e.g. "debug" or "formwright_core=trace"
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    Init(InitArgs),
    Field(FieldArgs),
    Validate(DataArgs),
    Submit(DataArgs),
    Responses(ResponsesArgs),
    Doctor(DoctorArgs),
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Seed the schema with the starter form when it is empty
    #[arg(long)]
    pub starter: bool,
}

#[derive(Args, Clone)]
pub struct FieldArgs {
    #[command(subcommand)]
    pub cmd: FieldSub,
}

#[derive(Subcommand, Clone)]
pub enum FieldSub {
    /// Append a field: title | text | dropdown | checkbox | radio
    Add { field_type: String },
    /// Show the schema in render order
    List {
        #[arg(long, default_value = "text")]
        format: String, // text|json
    },
    Delete { field: String },
    Duplicate { field: String },
    /// Move the field at FROM so it ends up at TO (0-based)
    Move { from: usize, to: usize },
    Update(UpdateArgs),
    /// Edit the options of a dropdown or radio field
    #[command(name = "option")]
    Choices(OptionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    pub field: String,

    #[arg(long)]
    pub label: Option<String>,

    #[arg(long)]
    pub required: Option<bool>,

    #[arg(long, conflicts_with = "clear_placeholder")]
    pub placeholder: Option<String>,

    #[arg(long)]
    pub clear_placeholder: bool,

    /// plain | email | password | textarea
    #[arg(long)]
    pub input_type: Option<String>,

    /// Comma separated, replaces the whole list
    #[arg(long, value_delimiter = ',')]
    pub options: Option<Vec<String>>,

    /// Option text for dropdown/radio, true|false for checkbox, "" to clear
    #[arg(long)]
    pub default: Option<String>,
}

#[derive(Args, Clone)]
pub struct OptionArgs {
    #[command(subcommand)]
    pub cmd: OptionSub,
}

#[derive(Subcommand, Clone)]
pub enum OptionSub {
    Add { field: String },
    Set { field: String, index: usize, value: String },
    Remove { field: String, index: usize },
}

#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// FIELD=VALUE, where FIELD is an id, an id prefix or a label
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub values: Vec<String>,

    /// JSON object of field id -> value, applied before --set
    #[arg(long)]
    pub data: Option<PathBuf>,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

#[derive(Args, Clone)]
pub struct ResponsesArgs {
    #[command(subcommand)]
    pub cmd: ResponsesSub,
}

#[derive(Subcommand, Clone)]
pub enum ResponsesSub {
    List {
        #[arg(long, default_value = "text")]
        format: String, // text|json
    },
    /// Delete every stored response
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Write the raw response log as JSON
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct DoctorArgs {
    #[arg(long, default_value = "text")]
    pub format: String, // text|json

    #[arg(long)]
    pub out: Option<PathBuf>,
}
