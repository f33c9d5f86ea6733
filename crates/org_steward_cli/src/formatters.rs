//! Renderers for plans, results, and posture findings.
//!
//! Every renderer is a pure function over the engine's plan/result types
//! (or their structural serialization); nothing here talks to the network
//! or mutates state. Terminal output colors the Terraform-style symbols;
//! markdown output targets GitHub step summaries and pull-request comments.

use colored::Colorize;

use org_steward_core::{Finding, Severity, SyncAction, SyncPlan, SyncResult};

#[cfg(test)]
#[path = "formatters_tests.rs"]
mod tests;

const TERMINAL_RULE: &str =
    "============================================================";

/// Markdown section headers with the action kinds they group.
const MARKDOWN_CATEGORIES: &[(&str, &[&str])] = &[
    ("Members", &["member_invite", "member_remove", "member_update_role"]),
    ("Teams", &["team_create", "team_update", "team_delete"]),
    (
        "Team Membership",
        &["team_member_add", "team_member_remove", "team_member_update_role"],
    ),
    (
        "Team Permissions",
        &["team_repo_add", "team_repo_remove", "team_repo_update"],
    ),
    (
        "Branch Protection",
        &["branch_protection_set", "branch_protection_delete"],
    ),
    ("Repository Settings", &["repo_update"]),
];

fn colored_symbol(action: &SyncAction) -> String {
    match action.symbol() {
        '+' => "+".green().to_string(),
        '~' => "~".yellow().to_string(),
        '-' => "-".red().to_string(),
        other => other.to_string(),
    }
}

/// Renders a plan for terminal output.
pub fn format_plan_terminal(plan: &SyncPlan) -> String {
    let mut lines = Vec::new();
    lines.push(TERMINAL_RULE.to_string());
    lines.push("  Organization Sync Plan".to_string());
    lines.push(TERMINAL_RULE.to_string());
    lines.push(String::new());

    if !plan.validation_errors.is_empty() {
        lines.push("VALIDATION ERRORS:".to_string());
        for err in &plan.validation_errors {
            lines.push(format!("  ! {err}"));
        }
        return lines.join("\n");
    }

    if !plan.has_changes() {
        lines.push("  No changes - organization is in sync.".to_string());
        return lines.join("\n");
    }

    lines.push(format!("  {}", plan.summary()));
    lines.push(String::new());

    for action in plan.sorted_actions() {
        lines.push(format!("  {} {}", colored_symbol(action), action.description()));
    }

    if !plan.warnings.is_empty() {
        lines.push(String::new());
        lines.push("  WARNINGS:".to_string());
        for warning in &plan.warnings {
            lines.push(format!("    - {warning}"));
        }
    }

    lines.push(String::new());
    lines.push(format!("  Estimated API calls: {}", plan.estimated_api_calls()));
    lines.push(TERMINAL_RULE.to_string());

    lines.join("\n")
}

/// Renders a plan as GitHub-flavored markdown, grouped by resource
/// category inside `diff` code fences.
pub fn format_plan_markdown(plan: &SyncPlan) -> String {
    let mut lines = Vec::new();
    lines.push("## Organization Sync Plan".to_string());
    lines.push(String::new());

    if !plan.validation_errors.is_empty() {
        lines.push("### Validation Errors".to_string());
        lines.push(String::new());
        for err in &plan.validation_errors {
            lines.push(format!("- {err}"));
        }
        lines.push(String::new());
        return lines.join("\n");
    }

    if !plan.has_changes() {
        lines.push("**No changes detected** - organization is in sync with config.".to_string());
        lines.push(String::new());
        lines.push(format!("> Plan generated at {}", plan.timestamp));
        return lines.join("\n");
    }

    lines.push(format!("**{}**", plan.summary()));
    lines.push(String::new());

    for (category, kinds) in MARKDOWN_CATEGORIES {
        let actions: Vec<&SyncAction> = plan
            .sorted_actions()
            .into_iter()
            .filter(|a| kinds.contains(&a.kind.name()))
            .collect();
        if actions.is_empty() {
            continue;
        }

        lines.push(format!("### {category}"));
        lines.push(String::new());
        lines.push("```diff".to_string());
        for action in actions {
            let prefix = match action.symbol() {
                '~' => '!',
                symbol => symbol,
            };
            lines.push(format!("{prefix} {}", action.description()));
        }
        lines.push("```".to_string());
        lines.push(String::new());
    }

    if !plan.warnings.is_empty() {
        lines.push("### Warnings".to_string());
        lines.push(String::new());
        for warning in &plan.warnings {
            lines.push(format!("- {warning}"));
        }
        lines.push(String::new());
    }

    lines.push("---".to_string());
    lines.push(format!(
        "> Plan generated at {} | {} API calls estimated",
        plan.timestamp,
        plan.estimated_api_calls()
    ));

    lines.join("\n")
}

/// Renders the structural form of a plan as pretty-printed JSON.
pub fn format_plan_json(plan: &SyncPlan) -> String {
    serde_json::to_string_pretty(&plan.to_value()).unwrap_or_else(|_| "{}".to_string())
}

/// Renders a drift-detection report for scheduled runs.
pub fn format_drift_report(plan: &SyncPlan) -> String {
    let mut lines = Vec::new();
    lines.push("## Drift Detection Report".to_string());
    lines.push(String::new());
    lines.push(format!("*Detected at: {}*", plan.timestamp));
    lines.push(String::new());

    if !plan.has_changes() {
        lines.push("No drift detected - organization matches configuration.".to_string());
        return lines.join("\n");
    }

    lines.push(format!("**Drift detected: {}**", plan.summary()));
    lines.push(String::new());
    lines.push(
        "The following differences were found between the configuration files and the actual \
         GitHub organization state:"
            .to_string(),
    );
    lines.push(String::new());

    for action in plan.sorted_actions() {
        lines.push(format!("- {} {}", action.symbol(), action.description()));
    }

    if !plan.warnings.is_empty() {
        lines.push(String::new());
        lines.push("### Warnings".to_string());
        lines.push(String::new());
        for warning in &plan.warnings {
            lines.push(format!("- {warning}"));
        }
    }

    lines.push(String::new());
    lines.push(
        "To resolve this drift, either update the config files to match the current state, or \
         run the sync workflow to enforce the config."
            .to_string(),
    );

    lines.join("\n")
}

/// Renders a sync result for terminal output.
pub fn format_result_terminal(result: &SyncResult) -> String {
    let mut lines = Vec::new();
    let mode = if result.dry_run { "DRY RUN" } else { "LIVE" };
    lines.push(format!("=== Sync Result ({mode}) ==="));
    lines.push(format!("Success: {}", result.success_count));
    lines.push(format!("Failed:  {}", result.failure_count));
    lines.push(format!("Skipped: {}", result.skipped_count));

    let failed: Vec<&SyncAction> = result
        .plan
        .actions
        .iter()
        .filter(|a| a.status == org_steward_core::ActionStatus::Failed)
        .collect();
    if !failed.is_empty() {
        lines.push(String::new());
        lines.push("Failed actions:".to_string());
        for action in failed {
            lines.push(format!("  ! {}: {}", action.description(), action.error));
        }
    }

    lines.join("\n")
}

/// Renders a sync result as a GitHub Actions step summary.
pub fn format_step_summary(result: &SyncResult) -> String {
    let mut lines = Vec::new();
    let mode = if result.dry_run { "Dry Run" } else { "Live" };
    let status = if result.success() { "Success" } else { "Failed" };

    lines.push(format!("## Org Sync - {status} ({mode})"));
    lines.push(String::new());
    lines.push("| Metric | Count |".to_string());
    lines.push("|--------|-------|".to_string());
    lines.push(format!("| Succeeded | {} |", result.success_count));
    lines.push(format!("| Failed | {} |", result.failure_count));
    lines.push(format!("| Skipped | {} |", result.skipped_count));
    lines.push(String::new());

    if result.failure_count > 0 {
        lines.push("### Failures".to_string());
        lines.push(String::new());
        for action in &result.plan.actions {
            if action.status == org_steward_core::ActionStatus::Failed {
                lines.push(format!("- {}: {}", action.description(), action.error));
            }
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Renders posture findings for terminal output, most severe first.
pub fn format_findings_terminal(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "No security posture findings.".to_string();
    }

    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by_key(|f| match f.severity {
        Severity::High => 0,
        Severity::Medium => 1,
        Severity::Low => 2,
    });

    let mut lines = Vec::new();
    lines.push(format!("{} finding(s):", ordered.len()));
    for finding in ordered {
        let severity = match finding.severity {
            Severity::High => "HIGH".red().bold().to_string(),
            Severity::Medium => "MEDIUM".yellow().to_string(),
            Severity::Low => "LOW".normal().to_string(),
        };
        lines.push(format!(
            "  [{severity}] {} ({}): {}",
            finding.resource,
            finding.category.as_str(),
            finding.message
        ));
    }

    lines.join("\n")
}

/// Renders posture findings as pretty-printed JSON.
pub fn format_findings_json(findings: &[Finding]) -> String {
    serde_json::to_string_pretty(findings).unwrap_or_else(|_| "[]".to_string())
}
