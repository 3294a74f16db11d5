use formwright_core::report::console::render_errors;
use formwright_core::validate;
use serde_json::json;

use super::data::collect_values;
use super::{exit_codes, Context};
use crate::cli::args::DataArgs;

/// Dry run of submit: same draft, same rules, nothing stored.
pub fn run(args: DataArgs, ctx: &Context) -> anyhow::Result<i32> {
    let mut builder = ctx.builder();
    let data = match collect_values(&args, builder.fields())? {
        Ok(data) => data,
        Err(msg) => {
            eprintln!("error: {}", msg);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    builder.set_values(data);

    let errors = validate(builder.fields(), builder.values());

    if args.format == "json" {
        let output = json!({
            "schema_version": 1,
            "ok": errors.is_empty(),
            "errors": errors,
            "summary": {
                "field_count": builder.fields().len(),
                "error_count": errors.len()
            }
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if errors.is_empty() {
        eprintln!("✔ Validation OK");
    } else {
        eprint!("{}", render_errors(builder.fields(), &errors));
    }

    if errors.is_empty() {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::VALIDATION_FAILED)
    }
}
