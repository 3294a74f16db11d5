use super::args::*;
use formwright_core::config::{self, BackendKind, FormwrightConfig};
use formwright_core::model::{starter_schema, FieldDefinition, FieldId, FieldKind};
use formwright_core::{FormBuilder, Persistence, SchemaStore};

pub mod data;
pub mod doctor;
pub mod field;
pub mod responses;
pub mod validate;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const VALIDATION_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

/// Resolved configuration plus the adapter it opens.
pub struct Context {
    pub config: FormwrightConfig,
    pub persistence: Persistence,
}

impl Context {
    pub fn builder(&self) -> FormBuilder {
        FormBuilder::open(self.persistence.clone())
    }
}

/// Config file, then environment, then flags.
pub fn resolve_config(global: &GlobalArgs) -> anyhow::Result<FormwrightConfig> {
    let mut cfg = config::load_config(&global.config, false)?;
    config::apply_env(&mut cfg);
    if let Some(db) = &global.db {
        cfg.storage.path = db.clone();
    }
    if let Some(b) = &global.backend {
        cfg.storage.backend = parse_backend(b)?;
    }
    if let Some(level) = &global.log_level {
        cfg.log_level = level.clone();
    }
    Ok(cfg)
}

fn parse_backend(s: &str) -> anyhow::Result<BackendKind> {
    match s.trim().to_ascii_lowercase().as_str() {
        "sqlite" => Ok(BackendKind::Sqlite),
        "file" => Ok(BackendKind::File),
        "memory" => Ok(BackendKind::Memory),
        other => anyhow::bail!("unknown backend '{}' (expected sqlite, file or memory)", other),
    }
}

pub fn dispatch(cli: Cli, cfg: FormwrightConfig) -> anyhow::Result<i32> {
    if let Command::Version = cli.cmd {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(exit_codes::OK);
    }
    if let Command::Init(args) = &cli.cmd {
        return cmd_init(args, &cli.global, &cfg);
    }

    let ctx = Context {
        persistence: open_storage(&cfg),
        config: cfg,
    };

    match cli.cmd {
        Command::Field(args) => field::run(args, &ctx),
        Command::Validate(args) => validate::run(args, &ctx),
        Command::Submit(args) => data::cmd_submit(args, &ctx),
        Command::Responses(args) => responses::run(args, &ctx),
        Command::Doctor(args) => doctor::run(args, &ctx),
        Command::Init(_) | Command::Version => Ok(exit_codes::OK),
    }
}

fn cmd_init(args: &InitArgs, global: &GlobalArgs, cfg: &FormwrightConfig) -> anyhow::Result<i32> {
    let cfg = if global.config.exists() {
        eprintln!("note: {} already exists", global.config.display());
        cfg.clone()
    } else {
        if let Some(parent) = global.config.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        config::write_sample_config(&global.config)?;
        eprintln!("created {}", global.config.display());
        // Storage paths in the new file are relative to it.
        resolve_config(global)?
    };

    if args.starter {
        let persistence = open_storage(&cfg);
        let store = SchemaStore::load(persistence.clone());
        if store.is_empty() {
            SchemaStore::with_fields(persistence, starter_schema());
            eprintln!("seeded starter form");
        } else {
            eprintln!("note: schema already has {} field(s), not seeding", store.len());
        }
    }
    Ok(exit_codes::OK)
}

/// Opens the configured storage, telling the user when it fell back to
/// memory. `doctor` turns the same condition into an error.
fn open_storage(cfg: &FormwrightConfig) -> Persistence {
    let persistence = cfg.storage.open();
    match persistence.open_failure() {
        Some(fault) => {
            eprintln!("warning: {}; changes will not be saved", fault.message);
        }
        None => {
            tracing::debug!(backend = persistence.backend_name(), "storage ready");
        }
    }
    persistence
}

/// Finds a field by exact id, then exact label, then unique id prefix.
/// Falls back to the raw token so unknown references reach the store as
/// no-ops instead of errors.
pub fn resolve_field(fields: &[FieldDefinition], token: &str) -> FieldId {
    if let Some(f) = fields.iter().find(|f| f.id.as_str() == token) {
        return f.id.clone();
    }
    let by_label: Vec<_> = fields.iter().filter(|f| f.label == token).collect();
    if let [only] = by_label.as_slice() {
        return only.id.clone();
    }
    if token.len() >= 4 {
        let by_prefix: Vec<_> = fields
            .iter()
            .filter(|f| f.id.as_str().starts_with(token))
            .collect();
        if let [only] = by_prefix.as_slice() {
            return only.id.clone();
        }
    }
    FieldId::from(token)
}

/// Text from the command line typed for the field it is meant for.
pub fn coerce_value(field: Option<&FieldDefinition>, raw: &str) -> serde_json::Value {
    match field.map(|f| &f.kind) {
        Some(FieldKind::Checkbox { .. }) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "on" => serde_json::Value::Bool(true),
            "false" | "no" | "n" | "0" | "off" => serde_json::Value::Bool(false),
            _ => serde_json::Value::String(raw.to_string()),
        },
        _ => serde_json::Value::String(raw.to_string()),
    }
}
