mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, DocAction, SavedAction};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        return commands::version::run();
    }

    let app = commands::App::open()?;
    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&app, &username, &password).await
        }
        Commands::Register {
            username,
            email,
            password,
            confirm,
        } => commands::auth::register(&app, &username, &email, &password, &confirm).await,
        Commands::Logout => commands::auth::logout(&app).await,
        Commands::Search { query } => commands::explore::search(&app, &query.join(" ")).await,
        Commands::More => commands::explore::more(&app).await,
        Commands::Filter(args) => commands::explore::filter(&app, args).await,
        Commands::New => commands::explore::new_conversation(&app),
        Commands::History { json } => commands::explore::history(&app, json),
        Commands::Doc { action } => match action {
            DocAction::Open { url, file, saved } => {
                commands::doc::open(&app, url, file.as_deref(), saved).await
            }
            DocAction::Ask { message } => commands::doc::ask(&app, &message.join(" ")).await,
            DocAction::Switch => commands::doc::switch(&app),
            DocAction::Show => commands::doc::show(&app),
        },
        Commands::Saved { action } => match action {
            Some(SavedAction::List) | None => commands::saved::list(&app),
            Some(SavedAction::Add { n }) => commands::saved::add(&app, n),
            Some(SavedAction::Remove { url }) => commands::saved::remove(&app, &url),
        },
        Commands::Format { file, style, out } => {
            commands::format::run(&app, &file, &style, out.as_deref()).await
        }
        Commands::Version => commands::version::run(),
    }
}
