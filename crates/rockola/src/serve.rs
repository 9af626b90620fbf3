// SPDX-FileCopyrightText: 2026 Rockola Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rockola serve` command implementation.
//!
//! Wires the configured adapters into the request engine, restores
//! persisted state, spawns the three maintenance timers (notification poll,
//! ledger prune, notification sweep), starts the HTTP gateway, and exports
//! state on graceful shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::FixedOffset;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use rockola_config::model::RockolaConfig;
use rockola_core::types::GeoPoint;
use rockola_core::{
    Blocklist, Catalog, ContentFilter, DocumentStore, GeofenceCheck, RockolaError, Transport,
};
use rockola_engine::{
    AccountStore, HaversineGeofence, NotificationScheduler, PlazaBounds, QueuePriorityEngine,
    RepetitionLedger, RequestEngine, SecurityLimits, SecurityScreen,
};
use rockola_gateway::{AuthConfig, GatewayState, ServerConfig};
use rockola_store::{JsonStore, StoredBlocklist};
use rockola_tiers::{DailyLimits, TierRegistry};

use crate::adapters::{HttpCatalog, LogTransport, WebhookTransport, WordListFilter};
use crate::shutdown;

const ACCOUNTS_KEY: &str = "accounts";
const LEDGER_KEY: &str = "ledger";

/// Runs the `rockola serve` command.
pub async fn run_serve(config: RockolaConfig) -> Result<(), RockolaError> {
    init_tracing(&config.agent.log_level);

    info!(name = config.agent.name.as_str(), "starting rockola serve");

    // Persistence.
    let store: Arc<dyn DocumentStore> = Arc::new(JsonStore::open(&config.storage.data_dir).await?);
    let blocklist: Arc<dyn Blocklist> = Arc::new(StoredBlocklist::load(store.clone()).await?);

    // Plaza-local timezone for the calendar-day quota reset.
    let tz = FixedOffset::east_opt(config.plaza.utc_offset_minutes * 60).ok_or_else(|| {
        RockolaError::Config(format!(
            "invalid plaza.utc_offset_minutes: {}",
            config.plaza.utc_offset_minutes
        ))
    })?;

    // Stores, restored from their persisted snapshots.
    let accounts = Arc::new(AccountStore::new(tz));
    let ledger = Arc::new(RepetitionLedger::new());
    restore_state(&store, &accounts, &ledger).await?;

    // Tier registry seeded from configured limits.
    let tiers = Arc::new(TierRegistry::new(DailyLimits {
        normal: config.limits.normal_daily,
        premium: config.limits.premium_daily,
        vip: config.limits.vip_daily,
    }));

    // Collaborator adapters.
    let catalog: Arc<dyn Catalog> = match &config.catalog.base_url {
        Some(base_url) => Arc::new(HttpCatalog::new(base_url.clone())),
        None => {
            return Err(RockolaError::Config(
                "catalog.base_url is required for serve".to_string(),
            ))
        }
    };
    let transport: Arc<dyn Transport> = match &config.transport.webhook_url {
        Some(url) => Arc::new(WebhookTransport::new(url.clone())),
        None => {
            warn!("transport.webhook_url not set; outbound messages will only be logged");
            Arc::new(LogTransport)
        }
    };
    let filter: Arc<dyn ContentFilter> = Arc::new(WordListFilter::new(
        config.filter.warn_words.clone(),
        config.filter.block_words.clone(),
    ));
    let geofence: Arc<dyn GeofenceCheck> = Arc::new(HaversineGeofence);

    let plaza = PlazaBounds {
        center: GeoPoint {
            lat: config.plaza.latitude,
            lon: config.plaza.longitude,
        },
        radius_km: config.plaza.radius_km,
    };

    // Engine assembly.
    let queue = Arc::new(QueuePriorityEngine::new(
        catalog.clone(),
        ledger.clone(),
        accounts.clone(),
        plaza,
        geofence.clone(),
    ));
    let notifier = Arc::new(NotificationScheduler::new(
        catalog.clone(),
        transport,
        accounts.clone(),
        tiers.clone(),
    ));
    let engine = Arc::new(RequestEngine::new(
        tiers,
        accounts.clone(),
        ledger.clone(),
        queue,
        notifier.clone(),
        catalog,
        filter,
        blocklist,
        geofence,
        SecurityScreen::new(SecurityLimits {
            rate_limit_per_minute: config.security.rate_limit_per_minute,
            flood_threshold: config.security.flood_threshold,
            flood_window_secs: config.security.flood_window_secs,
            temp_block_minutes: config.security.temp_block_minutes,
            max_message_len: config.security.max_message_len,
        }),
        plaza,
    ));

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    spawn_timers(&config, notifier.clone(), ledger.clone(), cancel.clone());

    // Start the gateway (webhook bridge + admin panel).
    if config.gateway.enabled {
        let server_config = ServerConfig {
            host: config.gateway.host.clone(),
            port: config.gateway.port,
        };
        let state = GatewayState {
            engine: engine.clone(),
            auth: AuthConfig {
                bearer_token: config.gateway.bearer_token.clone(),
            },
            start_time: Instant::now(),
        };
        let gw_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = rockola_gateway::start_server(&server_config, state) => {
                    if let Err(e) = result {
                        error!(error = %e, "gateway server exited");
                    }
                }
                _ = gw_cancel.cancelled() => {
                    info!("gateway shutting down");
                }
            }
        });
        info!(
            host = config.gateway.host.as_str(),
            port = config.gateway.port,
            "gateway started"
        );
    } else {
        warn!("gateway disabled; no inbound messages will be received");
    }

    // Run until a shutdown signal arrives.
    cancel.cancelled().await;

    // Export state for the next start.
    persist_state(&store, &accounts, &ledger).await?;

    info!("rockola serve shutdown complete");
    Ok(())
}

/// Spawns the three forever-running maintenance timers.
///
/// Each loop skips tokio's immediate first tick and then fires on its
/// configured interval until shutdown.
fn spawn_timers(
    config: &RockolaConfig,
    notifier: Arc<NotificationScheduler>,
    ledger: Arc<RepetitionLedger>,
    cancel: CancellationToken,
) {
    // Notification scheduler poll.
    {
        let notifier = notifier.clone();
        let cancel = cancel.clone();
        let interval_secs = config.timers.notify_poll_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = notifier.tick(chrono::Utc::now()).await {
                            warn!(error = %e, "notification poll failed (non-fatal)");
                        }
                    }
                    _ = cancel.cancelled() => {
                        info!("notification poll shutting down");
                        break;
                    }
                }
            }
        });
    }

    // Repetition ledger prune.
    {
        let cancel = cancel.clone();
        let interval_secs = config.timers.ledger_prune_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        ledger.prune(chrono::Utc::now()).await;
                    }
                    _ = cancel.cancelled() => {
                        info!("ledger prune shutting down");
                        break;
                    }
                }
            }
        });
    }

    // Pending-notification sweep.
    {
        let cancel = cancel.clone();
        let interval_secs = config.timers.notification_sweep_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        notifier.sweep(chrono::Utc::now()).await;
                    }
                    _ = cancel.cancelled() => {
                        info!("notification sweep shutting down");
                        break;
                    }
                }
            }
        });
    }
}

/// Restores accounts and the repetition ledger from the document store.
async fn restore_state(
    store: &Arc<dyn DocumentStore>,
    accounts: &Arc<AccountStore>,
    ledger: &Arc<RepetitionLedger>,
) -> Result<(), RockolaError> {
    if let Some(doc) = store.load(ACCOUNTS_KEY).await? {
        match serde_json::from_value(doc) {
            Ok(records) => accounts.import(records).await,
            Err(e) => warn!(error = %e, "accounts document unreadable; starting fresh"),
        }
    }

    if let Some(doc) = store.load(LEDGER_KEY).await? {
        match serde_json::from_value(doc) {
            Ok(entries) => ledger.import(entries).await,
            Err(e) => warn!(error = %e, "ledger document unreadable; starting fresh"),
        }
    }

    Ok(())
}

/// Exports accounts and the repetition ledger to the document store.
async fn persist_state(
    store: &Arc<dyn DocumentStore>,
    accounts: &Arc<AccountStore>,
    ledger: &Arc<RepetitionLedger>,
) -> Result<(), RockolaError> {
    let account_records = accounts.export().await;
    let doc = serde_json::to_value(&account_records)
        .map_err(|e| RockolaError::Storage { source: Box::new(e) })?;
    store.save(ACCOUNTS_KEY, &doc).await?;

    let ledger_entries = ledger.export().await;
    let doc = serde_json::to_value(&ledger_entries)
        .map_err(|e| RockolaError::Storage { source: Box::new(e) })?;
    store.save(LEDGER_KEY, &doc).await?;

    info!(
        accounts = account_records.len(),
        ledger_entries = ledger_entries.len(),
        "state persisted"
    );
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rockola={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
