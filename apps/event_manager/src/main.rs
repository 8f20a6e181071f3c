use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use client_core::{
    load_event_detail, load_events_page, view, EventDetail, EventStore, EventsPage, Notification,
    NotificationKind, PageAction, RestEventStore, StaticEventStore,
};
use shared::{
    domain::{CategoryId, EventId, UserId},
    protocol::{EventPatch, NewEvent, DEFAULT_CREATOR},
    time::parse_timestamp,
};
use tokio::sync::mpsc;
use tracing::debug;

mod config;
mod render;

use config::{load_settings, DataSource, Settings};

#[derive(Parser, Debug)]
#[command(name = "event_manager", about = "Browse, search and edit events")]
struct Cli {
    /// Base URL of the events API.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, value_enum, global = true)]
    source: Option<DataSource>,
    /// Path or URL of the static `events.json` catalog.
    #[arg(long, global = true)]
    catalog: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List events matching a search term and category.
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        category: Option<CategoryId>,
    },
    /// Show one event with its creator.
    Show { id: EventId },
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete { id: EventId },
    Categories,
    Users,
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    location: String,
    #[arg(long, value_parser = parse_timestamp)]
    start: DateTime<Utc>,
    #[arg(long, value_parser = parse_timestamp)]
    end: DateTime<Utc>,
    #[arg(long, default_value = "")]
    image: String,
    #[arg(long = "category")]
    categories: Vec<CategoryId>,
    #[arg(long, default_value_t = DEFAULT_CREATOR.0)]
    created_by: i64,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: EventId,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    image: Option<String>,
    #[arg(long, value_parser = parse_timestamp)]
    start: Option<DateTime<Utc>>,
    #[arg(long, value_parser = parse_timestamp)]
    end: Option<DateTime<Utc>>,
}

impl UpdateArgs {
    fn patch(&self) -> EventPatch {
        EventPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            location: self.location.clone(),
            start_time: self.start,
            end_time: self.end,
            category_ids: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = apply_overrides(load_settings()?, &cli);
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();
    debug!(?settings, "event_manager: settings resolved");

    let store = open_store(&settings).await?;
    match cli.command {
        Command::List { search, category } => list_events(store, search, category).await,
        Command::Show { id } => show_event(store, id).await,
        Command::Create(args) => create_event(store.as_ref(), args).await,
        Command::Update(args) => update_event(store.as_ref(), args).await,
        Command::Delete { id } => delete_event(store.as_ref(), id).await,
        Command::Categories => {
            let categories = store.list_categories().await.context("failed to list categories")?;
            println!("{}", render::category_table(&categories));
            Ok(())
        }
        Command::Users => {
            let users = store.list_users().await.context("failed to list users")?;
            println!("{}", render::user_table(&users));
            Ok(())
        }
    }
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(api_url) = &cli.api_url {
        settings.api_url = api_url.clone();
    }
    if let Some(source) = cli.source {
        settings.source = source;
    }
    if let Some(catalog) = &cli.catalog {
        settings.static_catalog = Some(catalog.clone());
    }
    settings
}

async fn open_store(settings: &Settings) -> Result<Arc<dyn EventStore>> {
    match settings.source {
        DataSource::Rest => {
            let store = RestEventStore::new(&settings.api_url)
                .with_context(|| format!("invalid api url {:?}", settings.api_url))?;
            Ok(Arc::new(store))
        }
        DataSource::Static => {
            let http = reqwest::Client::new();
            let store = match &settings.static_catalog {
                Some(location) => StaticEventStore::load(&http, location)
                    .await
                    .with_context(|| format!("failed to load catalog from {location}"))?,
                None => StaticEventStore::fetch(&http, &settings.api_url)
                    .await
                    .with_context(|| {
                        format!("failed to load the catalog served by {}", settings.api_url)
                    })?,
            };
            Ok(Arc::new(store))
        }
    }
}

/// Prints notifications and reports whether any of them was an error.
fn report(notifications: Vec<Notification>) -> bool {
    let mut failed = false;
    for notification in &notifications {
        failed |= notification.kind == NotificationKind::Error;
        eprintln!("{}", render::notification(notification));
    }
    failed
}

async fn list_events(
    store: Arc<dyn EventStore>,
    search: String,
    category: Option<CategoryId>,
) -> Result<()> {
    let mut page = EventsPage::new();
    page.apply(PageAction::SearchChanged(search));
    page.apply(PageAction::CategorySelected(category));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _task = load_events_page(store, tx);
    while let Some(action) = rx.recv().await {
        page.apply(action);
    }

    report(page.take_notifications());
    if page.events_failed() {
        bail!("could not load events");
    }
    let visible = page.visible_events();
    println!(
        "{}",
        render::event_list(&visible, |event| page.category_label(event))
    );
    Ok(())
}

async fn show_event(store: Arc<dyn EventStore>, id: EventId) -> Result<()> {
    let mut detail = EventDetail::new(id);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _task = load_event_detail(store, id, tx);
    while let Some(action) = rx.recv().await {
        detail.apply(action);
    }

    report(detail.take_notifications());
    let Some(event) = detail.event() else {
        bail!("event {id} could not be loaded");
    };
    println!("{}", render::event_detail(event, detail.creator()));
    Ok(())
}

async fn create_event(store: &dyn EventStore, args: CreateArgs) -> Result<()> {
    let new_event = NewEvent::new(
        args.title,
        args.description,
        args.location,
        args.start,
        args.end,
    )
    .with_image(args.image)
    .with_creator(UserId(args.created_by))
    .with_categories(args.categories);
    new_event.validate().context("invalid event")?;

    let mut page = EventsPage::new();
    page.apply(view::create_event(store, &new_event).await);
    if report(page.take_notifications()) {
        bail!("event was not created");
    }
    if let Some(created) = page.events().first() {
        println!("created event {}", created.id);
    }
    Ok(())
}

async fn update_event(store: &dyn EventStore, args: UpdateArgs) -> Result<()> {
    let patch = args.patch();
    if patch.is_empty() {
        bail!("nothing to update; pass at least one field");
    }
    let current = store
        .get_event(args.id)
        .await
        .with_context(|| format!("failed to load event {}", args.id))?;
    patch.validate_against(&current).context("invalid update")?;

    let mut detail = EventDetail::new(args.id);
    detail.apply(view::update_event(store, &current, &patch).await);
    if report(detail.take_notifications()) {
        bail!("event {} was not updated", args.id);
    }
    if let Some(event) = detail.event() {
        println!("updated event {} ({})", event.id, event.title);
    }
    Ok(())
}

async fn delete_event(store: &dyn EventStore, id: EventId) -> Result<()> {
    let mut detail = EventDetail::new(id);
    detail.apply(view::delete_event(store, id).await);
    report(detail.take_notifications());
    if !detail.should_leave() {
        bail!("event {id} was not deleted");
    }
    Ok(())
}
