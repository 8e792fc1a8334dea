use anyhow::Result;
use owo_colors::OwoColorize;

use crate::commands::Context;
use crate::render::Render;

pub fn run() -> Result<()> {
    let ctx = Context::load()?;
    let session = ctx.session().snapshot();

    println!("{}", session.state().render());
    if !session.is_authenticated() {
        return Ok(());
    }

    match session.user_id() {
        Some(id) => println!("User id: {}", id),
        None => println!("{}", "User id: unknown".dimmed()),
    }

    let roles = session.user.as_ref().map(|u| u.roles()).unwrap_or_default();
    if roles.is_empty() {
        println!("{}", "Roles: none".dimmed());
    } else {
        println!("Roles: {}", roles.join(", "));
    }

    Ok(())
}
