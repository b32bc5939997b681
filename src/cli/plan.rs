//! Plan command.
//!
//! Dry run of the scan: lists the secrets that `run` would read and the
//! variables that would be filled from them. Never contacts Vault and never
//! prints values.

use serde::Serialize;

use crate::cli::output;
use crate::core::plan::Plan;
use crate::error::Result;

#[derive(Serialize)]
struct PlanReport<'a> {
    default_path: &'a str,
    secrets: Vec<SecretReport<'a>>,
    malformed: Vec<&'a str>,
    dropped: &'a [String],
}

#[derive(Serialize)]
struct SecretReport<'a> {
    path: &'a str,
    variables: Vec<TargetReport<'a>>,
}

#[derive(Serialize)]
struct TargetReport<'a> {
    name: &'a str,
    field: &'a str,
}

impl<'a> PlanReport<'a> {
    fn new(plan: &'a Plan) -> Self {
        Self {
            default_path: &plan.default_path,
            secrets: plan
                .groups
                .iter()
                .map(|group| SecretReport {
                    path: &group.path,
                    variables: group
                        .targets
                        .iter()
                        .map(|t| TargetReport {
                            name: &t.env_name,
                            field: &t.field,
                        })
                        .collect(),
                })
                .collect(),
            malformed: plan.malformed.iter().map(|m| m.env_name.as_str()).collect(),
            dropped: &plan.dropped,
        }
    }
}

/// Print the plan for the current environment.
pub fn execute(json: bool, default_path: Option<&str>) -> Result<()> {
    let plan = Plan::scan(std::env::vars_os(), default_path);
    let report = PlanReport::new(&plan);

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(std::io::Error::other)?;
        println!("{}", rendered);
        return Ok(());
    }

    output::header("Default path");
    output::kv("prefix:", report.default_path);
    output::blank();

    output::header("Secrets");
    if report.secrets.is_empty() {
        output::dimmed("  no secret references found");
    }
    for secret in &report.secrets {
        println!("  {}", output::path(secret.path));
        for target in &secret.variables {
            output::list_item(&format!("{} <- {}", target.name, target.field));
        }
    }

    if !report.malformed.is_empty() {
        output::blank();
        output::header("Malformed (passed through unchanged)");
        for name in &report.malformed {
            output::list_item(name);
        }
    }

    if !report.dropped.is_empty() {
        output::blank();
        output::header("Not forwarded");
        for name in report.dropped {
            output::list_item(name);
        }
    }

    Ok(())
}
