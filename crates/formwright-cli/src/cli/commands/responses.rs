use formwright_core::report::ResponseTable;

use super::{exit_codes, Context};
use crate::cli::args::{ResponsesArgs, ResponsesSub};

pub fn run(args: ResponsesArgs, ctx: &Context) -> anyhow::Result<i32> {
    let mut builder = ctx.builder();

    match args.cmd {
        ResponsesSub::List { format } => {
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(builder.responses())?);
            } else {
                let table = ResponseTable::build(builder.fields(), builder.responses());
                print!("{}", table.render());
            }
            Ok(exit_codes::OK)
        }
        ResponsesSub::Clear { yes } => {
            if !yes {
                eprintln!(
                    "refusing to delete {} response(s) without --yes",
                    builder.responses().len()
                );
                return Ok(exit_codes::CONFIG_ERROR);
            }
            let dropped = builder.responses().len();
            builder.clear_responses();
            eprintln!("cleared {} response(s)", dropped);
            Ok(exit_codes::OK)
        }
        ResponsesSub::Export { out } => {
            let rendered = serde_json::to_string_pretty(builder.responses())?;
            std::fs::write(&out, rendered)?;
            eprintln!("wrote file: {}", out.display());
            Ok(exit_codes::OK)
        }
    }
}
