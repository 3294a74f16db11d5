use formwright_core::model::{FieldDefinition, FormData};
use formwright_core::report::console::render_errors;
use formwright_core::SubmitOutcome;
use serde_json::json;

use super::{coerce_value, exit_codes, resolve_field, Context};
use crate::cli::args::DataArgs;

/// Reads `--data` then applies each `--set`. `Err` carries a user-facing
/// message for input that names no field.
pub fn collect_values(
    args: &DataArgs,
    fields: &[FieldDefinition],
) -> anyhow::Result<Result<FormData, String>> {
    let mut data = FormData::new();

    if let Some(path) = &args.data {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let obj: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(obj) => obj,
            Err(e) => {
                return Ok(Err(format!(
                    "{} must hold a JSON object of field id to value: {}",
                    path.display(),
                    e
                )))
            }
        };
        for (key, value) in obj {
            let id = resolve_field(fields, &key);
            if !fields.iter().any(|f| f.id == id) {
                return Ok(Err(format!("{}: no field matches '{}'", path.display(), key)));
            }
            data.insert(id, value);
        }
    }

    for pair in &args.values {
        let Some((name, raw)) = pair.split_once('=') else {
            return Ok(Err(format!("expected FIELD=VALUE, got '{}'", pair)));
        };
        let id = resolve_field(fields, name.trim());
        let Some(field) = fields.iter().find(|f| f.id == id) else {
            return Ok(Err(format!("no field matches '{}'", name.trim())));
        };
        data.insert(id, coerce_value(Some(field), raw));
    }

    Ok(Ok(data))
}

pub fn cmd_submit(args: DataArgs, ctx: &Context) -> anyhow::Result<i32> {
    let mut builder = ctx.builder();
    let data = match collect_values(&args, builder.fields())? {
        Ok(data) => data,
        Err(msg) => {
            eprintln!("error: {}", msg);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    builder.set_values(data);

    match builder.submit() {
        SubmitOutcome::Accepted { total } => {
            if args.format == "json" {
                println!("{}", serde_json::to_string_pretty(&json!({ "ok": true, "total": total }))?);
            } else {
                eprintln!("✔ Response saved ({} total)", total);
            }
            Ok(exit_codes::OK)
        }
        SubmitOutcome::Rejected(errors) => {
            if args.format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "ok": false, "errors": errors }))?
                );
            } else {
                eprint!("{}", render_errors(builder.fields(), &errors));
            }
            Ok(exit_codes::VALIDATION_FAILED)
        }
    }
}
