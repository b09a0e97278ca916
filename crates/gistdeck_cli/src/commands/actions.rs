use std::sync::Arc;

use gistdeck::mutation::{Action, ActionKind, MutationCoordinator, MutationOutcome};
use gistdeck::search::GistRef;
use gistdeck::GistApi;

use crate::commands::shared::Context;
use crate::output;

pub(crate) async fn handle_action(
    ctx: &Context,
    action: Action,
    id_or_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    ctx.ensure_current_user().await;
    let gist = ctx.resolve_gist(id_or_url).await?;

    let api: Arc<dyn GistApi> = ctx.client.clone();
    let coordinator = MutationCoordinator::new(api);

    if action.kind() == ActionKind::Star {
        coordinator.load_star_state(&gist).await;
    }

    let outcome = match action {
        Action::Star => coordinator.star(&gist).await,
        Action::Unstar => coordinator.unstar(&gist).await,
        Action::Fork => coordinator.fork(&gist).await,
    };

    report(action, gist.title(), outcome)
}

fn report(
    action: Action,
    title: &str,
    outcome: MutationOutcome,
) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        MutationOutcome::Committed { navigate_to } => {
            output::success(&committed_message(action, title));
            if let Some(id) = navigate_to {
                println!("{}", GistRef::api_url(&id));
                println!("Run `gistdeck show {}` to view it.", id);
            }
            Ok(())
        }
        MutationOutcome::RolledBack { message } | MutationOutcome::Rejected { message, .. } => {
            output::failure(&message);
            Err(message.into())
        }
        MutationOutcome::Ignored => Ok(()),
    }
}

fn committed_message(action: Action, title: &str) -> String {
    match action {
        Action::Star => format!("Starred \"{}\"", title),
        Action::Unstar => format!("Unstarred \"{}\"", title),
        Action::Fork => format!("Forked \"{}\"", title),
    }
}
