use super::{settle, App};
use anyhow::{bail, Context};
use researchflow_core::{ChatMode, ChatRole, DocumentChatSurface, DocumentSource};
use researchflow_saved::SavedItemsRegistry;
use std::path::Path;
use std::sync::Arc;

fn mount(app: &App) -> DocumentChatSurface {
    DocumentChatSurface::mount(Arc::clone(&app.store))
}

/// Resolve exactly one of the three source flags
fn source(
    app: &App,
    url: Option<String>,
    file: Option<&Path>,
    saved: Option<String>,
) -> anyhow::Result<DocumentSource> {
    match (url, file, saved) {
        (Some(url), None, None) => Ok(DocumentSource::Url(url)),
        (None, Some(path), None) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("could not read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(DocumentSource::File { name, bytes })
        }
        (None, None, Some(url)) => {
            let registry = SavedItemsRegistry::new(Arc::clone(&app.store));
            match registry.find(&url)? {
                Some(saved) => Ok(DocumentSource::Url(saved.item.url)),
                None => bail!("`{url}` is not among your saved articles"),
            }
        }
        _ => bail!("pass one of --url, --file or --saved"),
    }
}

pub async fn open(
    app: &App,
    url: Option<String>,
    file: Option<&Path>,
    saved: Option<String>,
) -> anyhow::Result<()> {
    let source = source(app, url, file, saved)?;
    let mut surface = mount(app);
    if matches!(surface.mode(), ChatMode::Chat | ChatMode::Failed(_)) {
        surface.switch_document()?;
    }
    let completion = surface.open(&app.client, source).await?;
    settle(completion)?;
    if let Some(greeting) = surface.greeting() {
        println!("{greeting}");
    }
    Ok(())
}

pub async fn ask(app: &App, message: &str) -> anyhow::Result<()> {
    let mut surface = mount(app);
    if surface.context().is_none() {
        bail!("no document is open; start with `researchflow doc open`");
    }
    let completion = surface.ask(&app.client, message).await?;
    settle(completion)?;
    if let Some(reply) = surface.dialogue().last() {
        println!("{}", reply.content);
    }
    Ok(())
}

pub fn switch(app: &App) -> anyhow::Result<()> {
    let mut surface = mount(app);
    if matches!(surface.mode(), ChatMode::Setup) {
        println!("No document is open.");
        return Ok(());
    }
    surface.switch_document()?;
    println!("Document closed.");
    Ok(())
}

pub fn show(app: &App) -> anyhow::Result<()> {
    let surface = mount(app);
    let Some(greeting) = surface.greeting() else {
        println!("No document is open. Paste a URL or pick a PDF with `researchflow doc open`.");
        return Ok(());
    };
    println!("{greeting}\n");
    for message in surface.dialogue() {
        let speaker = match message.role {
            ChatRole::User => "you",
            ChatRole::Assistant => "assistant",
        };
        println!("{speaker}: {}\n", message.content);
    }
    Ok(())
}
