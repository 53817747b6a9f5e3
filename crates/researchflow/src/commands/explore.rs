use super::{render, settle, App};
use crate::cli::FilterArgs;
use researchflow_core::{ExploreSurface, SearchFilters, Turn};
use researchflow_saved::{SavedIndex, SavedItemsRegistry};
use std::sync::Arc;

fn mount(app: &App) -> ExploreSurface {
    ExploreSurface::mount(Arc::clone(&app.store), &app.config)
}

fn print_latest(app: &App, surface: &ExploreSurface) -> anyhow::Result<()> {
    let registry = SavedItemsRegistry::new(Arc::clone(&app.store));
    let index = SavedIndex::build(&registry)?;
    if let Some(Turn::ResultSet(rs)) = surface.transcript().last() {
        print!("{}", render::result_set(rs, Some(&index)));
    }
    Ok(())
}

pub async fn search(app: &App, query: &str) -> anyhow::Result<()> {
    let mut surface = mount(app);
    let completion = surface.search(&app.client, query).await?;
    settle(completion)?;
    print_latest(app, &surface)
}

pub async fn more(app: &App) -> anyhow::Result<()> {
    let mut surface = mount(app);
    match surface.more(&app.client).await? {
        Some(completion) => {
            settle(completion)?;
            print_latest(app, &surface)
        }
        None => {
            println!("No more results to load.");
            Ok(())
        }
    }
}

/// Overlay the given flags on the surface's current filters
pub fn merge_filters(current: &SearchFilters, args: FilterArgs) -> SearchFilters {
    SearchFilters {
        sort_by: args.sort.unwrap_or(current.sort_by),
        year_from: args.year_from.unwrap_or(current.year_from),
        year_to: args.year_to.unwrap_or(current.year_to),
        open_access: args.open_access.unwrap_or(current.open_access),
    }
}

pub async fn filter(app: &App, args: FilterArgs) -> anyhow::Result<()> {
    let mut surface = mount(app);
    let filters = merge_filters(surface.filters(), args);
    match surface.refine(&app.client, filters).await? {
        Some(completion) => {
            settle(completion)?;
            print_latest(app, &surface)
        }
        None => {
            println!("Filters stored. They apply to the next search.");
            Ok(())
        }
    }
}

pub fn new_conversation(app: &App) -> anyhow::Result<()> {
    mount(app).new_conversation()?;
    println!("Started a new conversation.");
    Ok(())
}

pub fn history(app: &App, json: bool) -> anyhow::Result<()> {
    let surface = mount(app);
    if json {
        println!("{}", serde_json::to_string_pretty(surface.transcript().turns())?);
        return Ok(());
    }
    if surface.transcript().is_empty() {
        println!("What would you like to research today?");
        return Ok(());
    }
    let registry = SavedItemsRegistry::new(Arc::clone(&app.store));
    let index = SavedIndex::build(&registry)?;
    print!("{}", render::turns(surface.transcript().turns(), Some(&index)));
    Ok(())
}
