//! Watchlist Refresh Task
//!
//! Background task that keeps quotes for a fixed set of symbols fresh by
//! bypassing the cache on a timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::service::{MarketDataService, Session};

/// Spawns a task refreshing quotes for `symbols` every `interval`.
///
/// The first refresh runs immediately. Failures are logged and the task keeps
/// going; the previous entry for the watchlist stays dropped until the next
/// successful refresh. Ticks are skipped while logged out, and a token refused
/// by the brokerage ends the session.
///
/// # Arguments
/// * `market` - Service whose quotes cache is refreshed
/// * `session` - Session that must be active for a refresh to run
/// * `symbols` - Watchlist, cached as one quotes entry
/// * `interval` - Time between refreshes; must be non-zero
pub fn spawn_watchlist_task(
    market: Arc<MarketDataService>,
    session: Arc<Session>,
    symbols: Vec<String>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting watchlist refresh for {} symbols every {:?}",
            symbols.len(),
            interval
        );
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;

            if !session.is_authenticated() {
                debug!("Watchlist refresh skipped: not logged in");
                continue;
            }

            match market.refresh_quotes(&symbols).await {
                Ok(quotes) => debug!("Watchlist refresh: {} quotes", quotes.len()),
                Err(ServiceError::Remote(err)) if err.is_auth_failure() => {
                    warn!("Watchlist refresh rejected: {}", err);
                    session.set_authenticated(false).await;
                }
                Err(err) => warn!("Watchlist refresh failed: {}", err),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheRegistry;
    use crate::testkit::{MockSource, Operation};

    struct Fixture {
        source: Arc<MockSource>,
        caches: CacheRegistry,
        market: Arc<MarketDataService>,
        session: Arc<Session>,
    }

    fn setup() -> Fixture {
        let source = Arc::new(MockSource::new());
        source.set_quote("AAA", 10.0, 9.0);
        let caches = CacheRegistry::default();
        let market = Arc::new(MarketDataService::new(
            source.clone(),
            &caches,
            Duration::from_secs(15),
        ));
        let session = Arc::new(Session::new(caches.clone(), true));
        Fixture {
            source,
            caches,
            market,
            session,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchlist_refreshes_on_interval() {
        let Fixture {
            source,
            caches,
            market,
            session,
        } = setup();
        let symbols = vec!["AAA".to_string()];

        let handle = spawn_watchlist_task(market, session, symbols.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(65)).await;

        // Immediate tick plus two interval ticks
        assert_eq!(source.calls(Operation::Quotes), 3);
        assert!(caches
            .quotes
            .write()
            .await
            .has(&MarketDataService::quotes_key(&symbols)));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchlist_survives_failures() {
        let fixture = setup();
        fixture.source.set_failing(Operation::Quotes, true);

        let handle = spawn_watchlist_task(
            fixture.market,
            fixture.session.clone(),
            vec!["AAA".to_string()],
            Duration::from_secs(30),
        );

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert!(!handle.is_finished());
        assert_eq!(fixture.source.calls(Operation::Quotes), 2);
        assert!(fixture.session.is_authenticated());

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchlist_idle_while_logged_out() {
        let fixture = setup();
        fixture.session.logout().await;

        let handle = spawn_watchlist_task(
            fixture.market,
            fixture.session,
            vec!["AAA".to_string()],
            Duration::from_secs(30),
        );

        tokio::time::sleep(Duration::from_secs(65)).await;
        assert_eq!(fixture.source.calls(Operation::Quotes), 0);
        assert!(fixture.caches.quotes.read().await.is_empty());

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchlist_rejected_token_ends_session() {
        let fixture = setup();
        fixture.source.set_failure_status(401);
        fixture.source.set_failing(Operation::Quotes, true);

        let handle = spawn_watchlist_task(
            fixture.market,
            fixture.session.clone(),
            vec!["AAA".to_string()],
            Duration::from_secs(30),
        );

        tokio::time::sleep(Duration::from_secs(65)).await;
        assert!(!fixture.session.is_authenticated());
        // Only the first tick reached the brokerage
        assert_eq!(fixture.source.calls(Operation::Quotes), 1);

        handle.abort();
    }
}
