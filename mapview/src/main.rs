mod app;
mod config;
mod map;
mod views;

use anyhow::Context;
use app::{MapView, Message};
use clap::Parser;
use config::{Args, ClientConfig};
use hankkicore::api::ApiClient;
use hankkicore::session::{Session, UserStore};
use iced::{time, Subscription, Theme};
use log::info;
use std::time::Duration;

/// How often a pending debounce is checked while the map is moving.
const DEBOUNCE_TICK: Duration = Duration::from_millis(50);

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = ClientConfig::from_args(&args)?;
    let client = ApiClient::new(&config.api_config())
        .with_context(|| format!("creating API client for {}", config.api_base_url))?;
    let session = match &config.session_file {
        Some(path) => Session::restore(UserStore::new(path)),
        None => Session::anonymous(),
    };
    info!(
        "mapview starting against {} (debounce {}ms, signed in: {})",
        config.api_base_url,
        config.debounce_ms,
        session.is_logged_in()
    );

    iced::application(
        move || MapView::boot(&config, client.clone(), session.clone()),
        MapView::update,
        views::view,
    )
    .title(application_title)
    .subscription(application_subscription)
    .theme(application_theme)
    .run()?;
    Ok(())
}

fn application_title(_: &MapView) -> String {
    "아주한끼".into()
}

/// Ticks only while a viewport change is waiting out its debounce.
fn application_subscription(state: &MapView) -> Subscription<Message> {
    if state.home.has_pending_bounds() {
        time::every(DEBOUNCE_TICK).map(|_| Message::Tick)
    } else {
        Subscription::none()
    }
}

fn application_theme(_: &MapView) -> Theme {
    Theme::Light
}
