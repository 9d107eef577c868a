/// Stride Reel Sim - headless driver for the reels feed
///
/// Loads a feed from the backend (or a JSON fixture), swipes through it with
/// synthetic scroll frames and logs every event the feed emits.
mod config;
mod error;
mod fixture;
mod media;

use clap::Parser;
use config::SimConfig;
use fixture::FixtureApi;
use media::{ResourceEvents, SimMediaFactory};
use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use stride_core::{CurrentUser, ReelsApi, UserId};
use stride_reels::{FeedSession, ReelFeed};
use stride_server_client::{ServerConfig, StrideClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "stride-reel-sim")]
#[command(about = "Scroll a Stride reels feed without a UI", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve reels from a JSON fixture instead of the backend
    #[arg(short, long)]
    fixture: Option<PathBuf>,

    /// Number of swipes to simulate
    #[arg(short, long)]
    steps: Option<usize>,

    /// Backend URL (overrides the config file)
    #[arg(long, env = "STRIDE_SERVER_URL")]
    server_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stride_reel_sim=info,stride_reels=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = SimConfig::load(cli.config.as_deref())?;
    if let Some(fixture) = cli.fixture {
        config.sim.fixture = Some(fixture);
    }
    if let Some(steps) = cli.steps {
        config.sim.steps = steps;
    }
    if let Some(url) = cli.server_url {
        config.server.url = Some(url);
    }
    config.validate()?;

    let viewer_id = UserId::new(config.viewer.user_id.clone());
    let viewer = CurrentUser::with_following(
        viewer_id.clone(),
        config.viewer.following.iter().map(UserId::new),
    );

    let factory = SimMediaFactory::new();
    let resource_events = factory.events();
    let feed = ReelFeed::new(&config.feed, viewer, Box::new(factory));

    tracing::info!("Starting Stride reel sim");
    tracing::info!("Viewer: {}", viewer_id);

    match (&config.sim.fixture, &config.server.url) {
        (Some(path), _) => {
            let api = FixtureApi::from_path(path, viewer_id)?;
            let session = FeedSession::new(feed, Arc::new(api));
            run(session, &config, &resource_events).await
        }
        (None, Some(url)) => {
            let server = ServerConfig {
                url: url.clone(),
                access_token: config.server.access_token.clone(),
            };
            let client = StrideClient::new(server)?;
            tracing::info!("Server: {}", client.url().await);
            let session = FeedSession::new(feed, Arc::new(client));
            run(session, &config, &resource_events).await
        }
        (None, None) => anyhow::bail!("no reel source configured"),
    }
}

async fn run<A: ReelsApi>(
    mut session: FeedSession<A>,
    config: &SimConfig,
    resource_events: &ResourceEvents,
) -> anyhow::Result<()> {
    let count = session.load().await?;
    tracing::info!(
        count,
        visible = session.feed().visible_ids().len(),
        "Feed loaded"
    );

    let item_height = config.feed.item_height_px;
    let viewport_height = config.sim.viewport_height_px;
    let dwell = config.feed.dwell();
    let mut clock = Instant::now();

    // First frame: the top cell settles into place
    session.feed_mut().on_scroll(0.0, viewport_height, clock);
    clock += dwell;
    session.feed_mut().poll(clock);
    pump(&mut session, resource_events);

    for step in 1..=config.sim.steps {
        let Some(index) = session.feed().active_index() else {
            tracing::info!("Nothing to play");
            break;
        };
        let target = index + 1;
        if target >= session.feed().visible_ids().len() {
            tracing::info!(step, "Reached the end of the feed");
            break;
        }

        let offset = target as f32 * item_height;
        let feed = session.feed_mut();
        feed.begin_gesture();
        feed.on_scroll(offset - item_height / 2.0, viewport_height, clock);
        clock += FRAME;
        feed.on_scroll(offset, viewport_height, clock);
        clock += dwell;
        if let Some(change) = feed.settle(clock) {
            tracing::info!(step, current = ?change.current, "Swiped");
        }
        pump(&mut session, resource_events);

        if step == 2 {
            exercise_interactions(&mut session).await;
            pump(&mut session, resource_events);
        }
    }

    // App goes to the background and comes back
    session.feed_mut().set_screen_focused(false);
    pump(&mut session, resource_events);
    session.feed_mut().set_screen_focused(true);
    pump(&mut session, resource_events);

    if let Some(active) = session.feed().active_reel_id().cloned() {
        match session.open_comments(&active).await {
            Ok(thread) => tracing::info!(
                reel_id = %active,
                comments = thread.len(),
                rows = thread.rows().len(),
                "Opened comments"
            ),
            Err(e) => tracing::warn!(error = %e, "Could not open comments"),
        }
        session.close_comments();
    }

    session.feed_mut().unmount();
    pump(&mut session, resource_events);
    tracing::info!(
        live = session.feed().controller().live_resource_count(),
        "Feed unmounted"
    );

    Ok(())
}

/// Like the active reel and flip the mute switch twice
async fn exercise_interactions<A: ReelsApi>(session: &mut FeedSession<A>) {
    let Some(active) = session.feed().active_reel_id().cloned() else {
        return;
    };

    match session.toggle_like(&active).await {
        Ok(Some(liked)) => tracing::info!(reel_id = %active, liked, "Toggled like"),
        Ok(None) => tracing::info!(reel_id = %active, "Like already in flight"),
        Err(e) => tracing::warn!(error = %e, "Like failed"),
    }

    let muted = session.feed_mut().toggle_mute();
    tracing::info!(muted, "Toggled mute");
    session.feed_mut().toggle_mute();
}

/// Deliver queued resource callbacks and log the feed's events
fn pump<A: ReelsApi>(session: &mut FeedSession<A>, resource_events: &ResourceEvents) {
    loop {
        let pending = resource_events.drain();
        if pending.is_empty() {
            break;
        }
        for (reel_id, event) in pending {
            session.feed_mut().on_resource_event(&reel_id, event);
        }
    }

    for event in session.feed_mut().drain_events() {
        tracing::info!(event = ?event, "Feed event");
    }
}
