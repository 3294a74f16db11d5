use formwright_core::doctor::{doctor, model::Severity};

use super::{exit_codes, Context};
use crate::cli::args::DoctorArgs;

pub fn run(args: DoctorArgs, ctx: &Context) -> anyhow::Result<i32> {
    let report = doctor(&ctx.persistence);

    let rendered = if args.format == "json" {
        serde_json::to_string_pretty(&report)?
    } else {
        let mut s = String::new();
        s.push_str(&format!("Formwright Doctor (v{})\n", report.formwright_version));
        s.push_str(&format!(
            "Storage: {} at {}\n",
            report.storage.backend,
            ctx.config.storage.path.display()
        ));
        s.push_str(&format!(
            "Fields: {}\n",
            report
                .schema
                .as_ref()
                .map(|c| c.field_count.to_string())
                .unwrap_or_else(|| "<none>".into())
        ));
        s.push_str(&format!(
            "Responses: {}\n",
            report
                .responses
                .as_ref()
                .map(|r| r.record_count.to_string())
                .unwrap_or_else(|| "<none>".into())
        ));
        if !report.issues.is_empty() {
            s.push_str("\nIssues:\n");
            for i in &report.issues {
                let tag = match i.severity {
                    Severity::Error => "error",
                    Severity::Warn => "warn",
                    Severity::Info => "info",
                };
                s.push_str(&format!("- [{}] {}: {}\n", tag, i.code, i.message));
            }
        }
        s
    };

    if let Some(p) = args.out {
        std::fs::write(&p, rendered)?;
        eprintln!("wrote file: {}", p.display());
    } else if args.format == "json" {
        println!("{}", rendered);
    } else {
        eprintln!("{}", rendered);
    }

    if report.has_errors() {
        Ok(exit_codes::VALIDATION_FAILED)
    } else {
        Ok(exit_codes::OK)
    }
}
