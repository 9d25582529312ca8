use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use marta_live_core::config::ClientConfig;
use marta_live_core::feed::HttpFeed;
use marta_live_core::geolocate::FixedLocation;
use marta_live_core::session::{Action, SessionRunner};
use marta_live_core::transit::spatial::GeoPoint;
use tracing::{info, Level};

mod map;
mod presenter;

use map::HeadlessMap;
use presenter::LogPresenter;

#[derive(Parser, Debug)]
#[command(
    name = "route-watch",
    author,
    version,
    about = "Follow one route live from the terminal",
    long_about = "Loads a route's shape and stops, then follows its buses as updates \
                  arrive, logging the next bus in each direction relative to your \
                  position.\n\n\
                  Updates come over Socket.IO when --push-url is given and reachable, \
                  otherwise the realtime feed is polled."
)]
struct Args {
    /// Server root serving /marta/route, /marta/realtime and /marta/upcoming
    #[arg(short, long, env = "ROUTE_WATCH_BASE_URL")]
    base_url: Option<String>,

    /// Route to follow
    #[arg(short, long, env = "ROUTE_WATCH_ROUTE")]
    route: Option<String>,

    /// Socket.IO endpoint for push updates
    #[arg(long, env = "ROUTE_WATCH_PUSH_URL")]
    push_url: Option<String>,

    /// Push event name for vehicle batches
    #[arg(long)]
    queue: Option<String>,

    /// Seconds between realtime polls when push is unavailable
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Your latitude
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Your longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Use this stop as your position
    #[arg(long)]
    stop: Option<String>,

    /// JSON client config; command-line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(route) = &self.route {
            config.route = route.clone();
        }
        if let Some(push_url) = &self.push_url {
            config.push_url = Some(push_url.clone());
        }
        if let Some(queue) = &self.queue {
            config.push_queue = queue.clone();
        }
        if let Some(secs) = self.poll_interval {
            config.poll_interval_secs = secs;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn location(&self) -> Result<Option<GeoPoint>> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => {
                Ok(Some(GeoPoint::try_new(lat, lng).context("invalid --lat/--lng")?))
            }
            _ => Ok(None),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let config = args.client_config()?;
    let location = args.location()?;
    info!(route = %config.route, base_url = %config.base_url, "watching route");

    let feed = Arc::new(HttpFeed::new(config.base_url.clone()));
    let runner = SessionRunner::new(
        config,
        feed,
        Arc::new(FixedLocation(location)),
        LogPresenter,
        HeadlessMap::default(),
    )?;

    let handle = runner.handle();
    if let Some(stop) = &args.stop {
        handle.action(Action::MarkMe(stop.as_str().into())).await;
    }

    let mut task = tokio::spawn(runner.run());
    let session = tokio::select! {
        finished = &mut task => finished.context("session task failed")??,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            handle.shutdown().await;
            task.await.context("session task failed")??
        }
    };

    info!(
        vehicles = session.vehicles().len(),
        mode = ?session.channel_mode(),
        "session ended"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config_defaults() {
        let args = Args::try_parse_from([
            "route-watch",
            "--base-url",
            "http://localhost:5000",
            "--route",
            "110",
            "--poll-interval",
            "10",
            "--lat",
            "33.7490",
            "--lng",
            "-84.3880",
        ])
        .unwrap();

        let config = args.client_config().unwrap();
        assert_eq!(config.route, "110");
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.push_queue, "marta");
        assert_eq!(args.location().unwrap(), Some(GeoPoint::new(33.7490, -84.3880)));
    }

    #[test]
    fn test_lat_requires_lng() {
        assert!(Args::try_parse_from(["route-watch", "--lat", "33.7490"]).is_err());
    }
}
