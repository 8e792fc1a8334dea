use agenda_core::auth::{self, Credentials};
use anyhow::{Context as _, Result};
use dialoguer::Input;

use crate::commands::Context;
use crate::render::Render;

pub async fn run(email: Option<String>) -> Result<()> {
    let ctx = Context::load()?;
    let session = ctx.session();

    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("User").interact_text()?,
    };
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let credentials = Credentials { email, password };
    let state = auth::login(&ctx.api, &session, &credentials).await?;

    println!("{}", state.render());
    if state.is_employee() {
        println!("Your justificantes now show up in `agenda calendar`.");
    }
    Ok(())
}
