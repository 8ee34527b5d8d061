//! Display-shell engine: fire-and-forget fetch workers feeding a single
//! foreground render loop through a message queue.
//!
//! Every submitted query gets a monotonically increasing [`RequestId`].
//! Only the outcome of the latest issued request reaches the [`Renderer`];
//! anything older is dropped when it arrives, so two overlapping fetches can
//! never leave a mixture of both on screen.

use std::sync::Arc;

use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinSet,
};
use tracing::{debug, info, warn};

use crate::{
    error::WeatherError,
    format::{DAILY_SHOWN, HOURLY_SHOWN},
    icon::{Bitmap, IconSize},
    model::{CurrentWeather, ForecastResult, UnitSystem},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub city: String,
    pub units: UnitSystem,
}

/// Which icons a worker fetches after the data arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconPlan {
    pub hourly: usize,
    pub hourly_size: IconSize,
    pub daily: usize,
    pub daily_size: IconSize,
}

impl IconPlan {
    pub const NONE: IconPlan = IconPlan {
        hourly: 0,
        hourly_size: IconSize::HOURLY,
        daily: 0,
        daily_size: IconSize::DAILY,
    };
}

impl Default for IconPlan {
    fn default() -> Self {
        Self {
            hourly: HOURLY_SHOWN,
            hourly_size: IconSize::HOURLY,
            daily: DAILY_SHOWN,
            daily_size: IconSize::DAILY,
        }
    }
}

/// Everything one worker fetched for one query.
#[derive(Debug, Clone)]
pub struct WeatherSnapshot {
    pub query: Query,
    pub current: CurrentWeather,
    pub forecast: ForecastResult,
    /// Parallel to the leading `forecast.hourly` entries; `None` where the icon failed.
    pub hourly_icons: Vec<Option<Bitmap>>,
    /// Parallel to the leading `forecast.daily` entries.
    pub daily_icons: Vec<Option<Bitmap>>,
}

/// Terminal consumer of snapshots. Only ever called from the task driving [`Shell::apply_next`].
pub trait Renderer {
    fn render(&mut self, snapshot: &WeatherSnapshot);

    fn show_error(&mut self, message: &str);
}

/// What [`Shell::apply_next`] did with one arrived outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Rendered(RequestId),
    Failed(RequestId),
    /// A newer request was issued after this one.
    Discarded(RequestId),
}

#[derive(Debug)]
enum Outcome {
    Loaded(Box<WeatherSnapshot>),
    Failed(String),
}

#[derive(Debug)]
struct Message {
    id: RequestId,
    outcome: Outcome,
}

pub struct Shell<R: Renderer> {
    provider: Arc<dyn WeatherProvider>,
    renderer: R,
    icons: IconPlan,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    issued: u64,
    in_flight: usize,
    last_query: Option<Query>,
}

impl<R: Renderer> Shell<R> {
    pub fn new(provider: Arc<dyn WeatherProvider>, renderer: R) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            provider,
            renderer,
            icons: IconPlan::default(),
            tx,
            rx,
            issued: 0,
            in_flight: 0,
            last_query: None,
        }
    }

    pub fn with_icons(mut self, icons: IconPlan) -> Self {
        self.icons = icons;
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn last_query(&self) -> Option<&Query> {
        self.last_query.as_ref()
    }

    /// Requests whose outcome has not been applied yet.
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Start fetching `city` in the background.
    ///
    /// A blank city is reported to the renderer and nothing is spawned.
    /// Must be called from within a Tokio runtime.
    pub fn submit(&mut self, city: &str, units: UnitSystem) -> Option<RequestId> {
        let city = city.trim();
        if city.is_empty() {
            self.renderer.show_error("Please enter a city name.");
            return None;
        }

        let query = Query {
            city: city.to_string(),
            units,
        };
        self.last_query = Some(query.clone());
        Some(self.spawn(query))
    }

    /// Fetch the last submitted city and units again.
    pub fn refresh(&mut self) -> Option<RequestId> {
        let query = self.last_query.clone()?;
        Some(self.spawn(query))
    }

    fn spawn(&mut self, query: Query) -> RequestId {
        self.issued += 1;
        self.in_flight += 1;
        let id = RequestId(self.issued);

        info!(%id, city = %query.city, units = %query.units, "fetch started");

        let provider = Arc::clone(&self.provider);
        let icons = self.icons;
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = match tokio::spawn(load(provider, query, icons)).await {
                Ok(Ok(snapshot)) => Outcome::Loaded(Box::new(snapshot)),
                Ok(Err(err)) => Outcome::Failed(err.to_string()),
                Err(join) => Outcome::Failed(format!("Weather fetch aborted: {join}")),
            };

            if tx.send(Message { id, outcome }).is_err() {
                debug!(%id, "shell dropped before the outcome arrived");
            }
        });

        id
    }

    /// Wait for the next worker to finish and apply its outcome.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn apply_next(&mut self) -> Option<Applied> {
        if self.in_flight == 0 {
            return None;
        }

        let Message { id, outcome } = self.rx.recv().await?;
        self.in_flight -= 1;

        if id.0 != self.issued {
            debug!(%id, latest = self.issued, "dropping stale outcome");
            return Some(Applied::Discarded(id));
        }

        match outcome {
            Outcome::Loaded(snapshot) => {
                info!(%id, city = %snapshot.current.city, "rendering");
                self.renderer.render(&snapshot);
                Some(Applied::Rendered(id))
            }
            Outcome::Failed(message) => {
                warn!(%id, %message, "fetch failed");
                self.renderer.show_error(&message);
                Some(Applied::Failed(id))
            }
        }
    }

    /// Apply outcomes until no request is in flight.
    pub async fn settle(&mut self) -> Vec<Applied> {
        let mut applied = Vec::new();
        while let Some(step) = self.apply_next().await {
            applied.push(step);
        }
        applied
    }
}

async fn load(
    provider: Arc<dyn WeatherProvider>,
    query: Query,
    icons: IconPlan,
) -> Result<WeatherSnapshot, WeatherError> {
    let current = provider.fetch_current(&query.city, query.units).await?;
    let forecast = provider.fetch_forecast(&query.city, query.units).await?;

    let hourly_codes = forecast
        .hourly
        .iter()
        .take(icons.hourly)
        .map(|e| e.icon.clone())
        .collect();
    let daily_codes = forecast
        .daily
        .iter()
        .take(icons.daily)
        .map(|e| e.icon.clone())
        .collect();
    let (hourly_icons, daily_icons) = tokio::join!(
        fetch_icons(&provider, hourly_codes, icons.hourly_size),
        fetch_icons(&provider, daily_codes, icons.daily_size),
    );

    Ok(WeatherSnapshot {
        query,
        current,
        forecast,
        hourly_icons,
        daily_icons,
    })
}

/// Fetch all `codes` at once. The result is in `codes` order.
async fn fetch_icons(
    provider: &Arc<dyn WeatherProvider>,
    codes: Vec<String>,
    size: IconSize,
) -> Vec<Option<Bitmap>> {
    let mut tasks = JoinSet::new();
    for (slot, code) in codes.into_iter().enumerate() {
        let provider = Arc::clone(provider);
        tasks.spawn(async move {
            let bitmap = icon_or_none(provider.as_ref(), &code, size).await;
            (slot, bitmap)
        });
    }

    let mut bitmaps = vec![None; tasks.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((slot, bitmap)) => bitmaps[slot] = bitmap,
            Err(err) => warn!(error = %err, "icon task aborted"),
        }
    }
    bitmaps
}

/// Icons are decoration: a failed one leaves a placeholder instead of failing the fetch.
async fn icon_or_none(
    provider: &dyn WeatherProvider,
    code: &str,
    size: IconSize,
) -> Option<Bitmap> {
    match provider.fetch_icon(code, size).await {
        Ok(bitmap) => Some(bitmap),
        Err(err) => {
            warn!(icon = code, error = %err, "icon unavailable");
            None
        }
    }
}
