use super::{render, App};
use anyhow::bail;
use researchflow_core::ExploreSurface;
use researchflow_saved::{SaveOutcome, SavedItemsRegistry};
use std::sync::Arc;

fn registry(app: &App) -> SavedItemsRegistry {
    SavedItemsRegistry::new(Arc::clone(&app.store))
}

pub fn list(app: &App) -> anyhow::Result<()> {
    print!("{}", render::saved_items(&registry(app).list()?));
    Ok(())
}

/// Save the `n`-th (1-based) article of the most recent result set
pub fn add(app: &App, n: usize) -> anyhow::Result<()> {
    let surface = ExploreSurface::mount(Arc::clone(&app.store), &app.config);
    let Some(rs) = surface.transcript().last_result_set() else {
        bail!("there are no search results to save from");
    };
    let Some(item) = n.checked_sub(1).and_then(|i| rs.items.get(i)) else {
        bail!("pick a number between 1 and {}", rs.items.len());
    };

    let title = item.title.clone();
    match registry(app).save(item.clone())? {
        SaveOutcome::Saved => println!("Saved \"{title}\"."),
        SaveOutcome::Duplicate => println!("\"{title}\" is already saved."),
    }
    Ok(())
}

pub fn remove(app: &App, url: &str) -> anyhow::Result<()> {
    if registry(app).delete(url)? {
        println!("Removed {url}.");
    } else {
        println!("{url} was not saved.");
    }
    Ok(())
}
