//! Run command - process every labelled open PR once

use crate::cli::context::{RunContext, RunSettings};
use crate::cli::style::{Stylize, arrow, check, cross};
use anstream::println;
use pr_automerge::error::{Error, Result};
use pr_automerge::merge::{Resolution, Resolver};
use pr_automerge::run::{RunSummary, run};

/// Options for the run command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Print the summary as JSON instead of styled text
    pub json: bool,
}

/// Run the bot against one repository
pub async fn run_automerge(settings: RunSettings, options: RunOptions) -> Result<RunSummary> {
    let ctx = RunContext::new(settings).await?;
    let resolver = Resolver::new(
        ctx.platform.as_ref(),
        ctx.git.as_ref(),
        &ctx.policy,
        ctx.sync_target.clone(),
    );

    let summary = run(ctx.platform.as_ref(), &resolver, &ctx.policy).await?;

    if options.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| Error::Parse(format!("cannot serialize summary: {e}")))?;
        println!("{json}");
    } else {
        print_summary(&ctx.platform.config().slug(), &summary);
    }

    Ok(summary)
}

fn print_summary(slug: &str, summary: &RunSummary) {
    if summary.open == 0 {
        println!("{}", format!("No open pull requests in {slug}.").muted());
        return;
    }

    println!(
        "{} {} open, {} selected",
        slug.emphasis(),
        summary.open.accent(),
        summary.selected.accent()
    );

    for report in &summary.reports {
        let label = format!("#{}", report.number);
        match (&report.resolution, &report.error) {
            (Some(resolution @ (Resolution::Merged { .. } | Resolution::AlreadyMerged)), _) => {
                println!("  {} {} {}", check(), label.accent(), resolution);
            }
            (Some(resolution), _) => {
                println!("  {} {} {}", arrow(), label.accent(), resolution);
            }
            (None, Some(error)) => {
                println!(
                    "  {} {} {}",
                    cross().for_stdout(),
                    label.accent(),
                    error.error().for_stdout()
                );
            }
            (None, None) => {}
        }
        println!("    {}", report.title.muted());
    }

    if summary.failures() > 0 {
        println!(
            "{}",
            format!("{} pull request(s) failed", summary.failures())
                .warn()
                .for_stdout()
        );
    }
}
