use anyhow::Result;
use tutor_core::auth::{Credentials, SignupForm};

use super::ClientContext;

pub async fn login(context: &mut ClientContext, identity: String, password: String) -> Result<()> {
    let session = context
        .store
        .login(context.gateway.as_ref(), Credentials::new(identity, password))
        .await?;
    println!("Signed in as {}", session.user_identity);
    Ok(())
}

pub async fn signup(
    context: &mut ClientContext,
    identity: String,
    password: String,
    confirm: String,
) -> Result<()> {
    let form = SignupForm::new(identity, password, confirm);
    let session = context.store.signup(context.gateway.as_ref(), form).await?;
    println!("Account created. Signed in as {}", session.user_identity);
    Ok(())
}

pub fn logout(context: &mut ClientContext) -> Result<()> {
    context.store.logout()?;
    println!("Signed out.");
    Ok(())
}

pub fn whoami(context: &ClientContext) {
    match context.store.session() {
        Some(session) => println!("{} ({})", session.user_identity, context.config.base_url),
        None => println!("Not signed in."),
    }
}
