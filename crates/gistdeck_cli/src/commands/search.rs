use std::sync::Arc;

use gistdeck::GistApi;
use gistdeck::search::{SearchOrchestrator, SearchOutcome};
use gistdeck::validate::validate_search_query;

use crate::commands::shared::Context;
use crate::config::Config;
use crate::output::{self, OutputFormat};

pub(crate) async fn handle_search(
    ctx: &Context,
    config: &Config,
    query: &str,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let problems = validate_search_query(query);
    if !problems.is_empty() {
        return Err(problems.join("\n").into());
    }

    let api: Arc<dyn GistApi> = ctx.client.clone();
    let orchestrator = SearchOrchestrator::with_config(api, config.search_config());

    match orchestrator.search(query).await? {
        SearchOutcome::Single(gist) => output::print_gist_detail(&gist, output)?,
        SearchOutcome::Many(gists) => {
            if output == OutputFormat::Table {
                println!("{}", summary_line(gists.len(), query));
            }
            output::print_gists(&gists, output)?;
        }
        SearchOutcome::Cleared | SearchOutcome::Empty => match output {
            OutputFormat::Table => println!("No gists match {:?}.", query.trim()),
            OutputFormat::Json => println!("[]"),
        },
    }
    Ok(())
}

fn summary_line(count: usize, query: &str) -> String {
    let noun = if count == 1 { "gist" } else { "gists" };
    format!("{} {} matching {:?}", count, noun, query.trim())
}
