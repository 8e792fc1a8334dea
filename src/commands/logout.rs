use agenda_core::auth;
use anyhow::Result;

use crate::commands::Context;

pub fn run() -> Result<()> {
    let ctx = Context::load()?;
    auth::logout(&ctx.session())?;

    println!("Logged out.");
    Ok(())
}
