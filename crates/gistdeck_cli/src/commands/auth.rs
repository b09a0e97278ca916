//! Sign-in state commands. Tokens are personal access tokens; the session
//! file keeps the token together with the login it belongs to.

use console::{Term, style};
use gistdeck::GistError;

use crate::commands::shared::Context;
use crate::output;

pub(crate) async fn handle_login(
    ctx: &Context,
    token: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = match token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        Some(token) => token,
        None => prompt_token()?,
    };

    ctx.session.sign_in(token, None);
    let user = match ctx.client.refresh_current_user().await {
        Ok(user) => user,
        Err(GistError::AuthRequired) => {
            ctx.session.sign_out();
            return Err("GitHub rejected the token. Check that it is valid and has the gist scope.".into());
        }
        Err(e) => {
            ctx.session.sign_out();
            return Err(e.into());
        }
    };

    ctx.save_session();
    output::success(&format!("Logged in as {}", style(&user.login).cyan()));
    Ok(())
}

pub(crate) fn handle_logout(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    if !ctx.session.is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }
    ctx.session.sign_out();
    ctx.save_session();
    output::success("Logged out");
    Ok(())
}

pub(crate) async fn handle_whoami(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    if !ctx.session.is_authenticated() {
        println!("Not logged in. Run `gistdeck login` to sign in.");
        return Ok(());
    }
    ctx.ensure_current_user().await;
    match ctx.session.current_user() {
        Some(user) => match user.name {
            Some(name) => println!("{} ({})", style(&user.login).cyan(), name),
            None => println!("{}", style(&user.login).cyan()),
        },
        None => println!("Logged in (user details unavailable)"),
    }
    Ok(())
}

fn prompt_token() -> Result<String, Box<dyn std::error::Error>> {
    let term = Term::stderr();
    if !term.is_term() {
        return Err("No token given. Pass --token or set GISTDECK_GITHUB__TOKEN.".into());
    }
    term.write_str("GitHub personal access token: ")?;
    let token = term.read_secure_line()?;
    let token = token.trim();
    if token.is_empty() {
        return Err("Token cannot be empty".into());
    }
    Ok(token.to_string())
}
