use super::App;

pub async fn login(app: &App, username: &str, password: &str) -> anyhow::Result<()> {
    app.client.login(username, password).await?;
    println!("Signed in as {username}.");
    Ok(())
}

pub async fn register(
    app: &App,
    username: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> anyhow::Result<()> {
    app.client.register(username, email, password, confirm).await?;
    println!("Account created. Sign in with `researchflow login`.");
    Ok(())
}

pub async fn logout(app: &App) -> anyhow::Result<()> {
    app.client.logout().await?;
    println!("Signed out.");
    Ok(())
}
