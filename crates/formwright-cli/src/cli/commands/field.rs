use formwright_core::model::{FieldKind, FieldPatch, FieldType, InputType};
use formwright_core::report::console::render_schema;
use formwright_core::FormBuilder;

use super::{coerce_value, exit_codes, resolve_field, Context};
use crate::cli::args::{FieldArgs, FieldSub, OptionSub, UpdateArgs};

pub fn run(args: FieldArgs, ctx: &Context) -> anyhow::Result<i32> {
    let mut builder = ctx.builder();

    match args.cmd {
        FieldSub::Add { field_type } => {
            let Some(t) = FieldType::parse(&field_type) else {
                eprintln!(
                    "error: unknown field type '{}' (expected one of: {})",
                    field_type,
                    type_names()
                );
                return Ok(exit_codes::CONFIG_ERROR);
            };
            let id = builder.add_field(t);
            println!("{}", id);
            Ok(exit_codes::OK)
        }
        FieldSub::List { format } => {
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(builder.fields())?);
            } else {
                print!("{}", render_schema(builder.fields(), None));
            }
            Ok(exit_codes::OK)
        }
        FieldSub::Delete { field } => {
            let id = resolve_field(builder.fields(), &field);
            if builder.delete_field(&id) {
                eprintln!("deleted {}", id);
            } else {
                not_found(&field);
            }
            Ok(exit_codes::OK)
        }
        FieldSub::Duplicate { field } => {
            let id = resolve_field(builder.fields(), &field);
            match builder.duplicate_field(&id) {
                Some(new_id) => println!("{}", new_id),
                None => not_found(&field),
            }
            Ok(exit_codes::OK)
        }
        FieldSub::Move { from, to } => match builder.reorder_field(from, to) {
            Ok(()) => Ok(exit_codes::OK),
            Err(e) => {
                eprintln!("error: {}", e);
                Ok(exit_codes::CONFIG_ERROR)
            }
        },
        FieldSub::Update(update) => cmd_update(&mut builder, update),
        FieldSub::Choices(opt) => cmd_option(&mut builder, opt.cmd),
    }
}

fn cmd_update(builder: &mut FormBuilder, args: UpdateArgs) -> anyhow::Result<i32> {
    let id = resolve_field(builder.fields(), &args.field);
    let target = builder.schema().get(&id).cloned();

    let input_type = match args.input_type.as_deref().map(|s| (s, InputType::parse(s))) {
        None => None,
        Some((_, Some(t))) => Some(t),
        Some((raw, None)) => {
            eprintln!(
                "error: unknown input type '{}' (expected plain, email, password or textarea)",
                raw
            );
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let placeholder = if args.clear_placeholder {
        Some(None)
    } else {
        args.placeholder.map(Some)
    };

    let default_value = args.default.as_deref().map(|raw| match target.as_ref() {
        // Empty input clears choice defaults but is not a checkbox state.
        Some(f) if raw.is_empty() && !matches!(f.kind, FieldKind::Checkbox { .. }) => {
            serde_json::Value::Null
        }
        f => coerce_value(f, raw),
    });

    let patch = FieldPatch {
        label: args.label,
        required: args.required,
        placeholder,
        input_type,
        options: args.options,
        default_value,
        ..FieldPatch::new(id)
    };

    match builder.update_field(&patch) {
        Ok(true) => Ok(exit_codes::OK),
        Ok(false) => {
            not_found(&args.field);
            Ok(exit_codes::OK)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(exit_codes::CONFIG_ERROR)
        }
    }
}

fn cmd_option(builder: &mut FormBuilder, sub: OptionSub) -> anyhow::Result<i32> {
    let token = match &sub {
        OptionSub::Add { field } | OptionSub::Set { field, .. } | OptionSub::Remove { field, .. } => {
            field.clone()
        }
    };
    let id = resolve_field(builder.fields(), &token);

    if builder
        .schema()
        .get(&id)
        .is_some_and(|f| f.kind.options().is_none())
    {
        eprintln!("error: field '{}' has no options to edit", token);
        return Ok(exit_codes::CONFIG_ERROR);
    }

    let result = match sub {
        OptionSub::Add { .. } => Ok(builder.schema_mut().add_option(&id)),
        OptionSub::Set { index, value, .. } => builder.schema_mut().update_option(&id, index, value),
        OptionSub::Remove { index, .. } => builder.schema_mut().remove_option(&id, index),
    };

    match result {
        Ok(true) => Ok(exit_codes::OK),
        Ok(false) => {
            not_found(&token);
            Ok(exit_codes::OK)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(exit_codes::CONFIG_ERROR)
        }
    }
}

fn not_found(token: &str) {
    eprintln!("note: no field matches '{}', nothing changed", token);
}

fn type_names() -> String {
    FieldType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
