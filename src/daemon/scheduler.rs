use std::time::Duration;

use anyhow::Result;
use tokio::{sync::mpsc, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use crate::{
    browser_api::BrowserApi,
    daemon::{
        accounting::{
            accountant::{Sample, TimeAccountant},
            state::AccountantState,
        },
        presentation::Presenter,
        storage::kv_store::KeyValueStore,
    },
    messaging::InboundMessage,
    utils::{clock::Clock, time::until_next_midnight},
};

/// Drives the accountant. Sampling, flushing, the midnight wake-up and browser events are
/// branches of a single loop, so every callback runs to completion before the next one starts and
/// the runtime state needs no locking.
pub struct Scheduler<S, P, B> {
    accountant: TimeAccountant<S, P>,
    browser: B,
    inbound: mpsc::Receiver<InboundMessage>,
    shutdown: CancellationToken,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore, P: Presenter, B: BrowserApi> Scheduler<S, P, B> {
    pub fn new(
        accountant: TimeAccountant<S, P>,
        browser: B,
        inbound: mpsc::Receiver<InboundMessage>,
        shutdown: CancellationToken,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            accountant,
            browser,
            inbound,
            shutdown,
            clock,
        }
    }

    /// Executes the scheduler event loop until shutdown is requested or the browser disconnects.
    /// Pending seconds are flushed on the way out.
    pub async fn run(mut self) -> Result<()> {
        let now = self.clock.time();
        let mut state = AccountantState::new(now);
        if let Err(e) = self.accountant.startup(now).await {
            error!("Failed to prepare stored records {e:?}");
        }

        let sample_interval = self.accountant.config().sample_interval;
        let flush_interval = self.accountant.config().flush_interval;
        let start = self.clock.instant();
        let mut sample_point = start + sample_interval;
        let mut flush_point = start + flush_interval;
        let mut midnight_point = start + until_next_midnight(now);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                message = self.inbound.recv() => {
                    let Some(message) = message else {
                        info!("Browser disconnected");
                        break;
                    };
                    let span = info_span!("Handling browser message");
                    if let Err(e) = self.handle_message(&mut state, message).instrument(span).await {
                        error!("Encountered an error handling a browser message {e:?}");
                    }
                }
                _ = self.clock.sleep_until(midnight_point) => {
                    let now = self.clock.time();
                    info!("Midnight wake-up at {now}");
                    if let Err(e) = self.accountant.midnight_tick(&mut state, now).await {
                        error!("Encountered an error during rollover {e:?}");
                    }
                    // Days differ in length, so the next wake-up is computed from scratch.
                    midnight_point = self.clock.instant() + until_next_midnight(self.clock.time());
                }
                _ = self.clock.sleep_until(flush_point) => {
                    flush_point = next_deadline(flush_point, flush_interval, self.clock.instant());
                    if let Err(e) = self.accountant.flush(&mut state, self.clock.time()).await {
                        error!("Encountered an error during flush {e:?}");
                    }
                }
                _ = self.clock.sleep_until(sample_point) => {
                    sample_point = next_deadline(sample_point, sample_interval, self.clock.instant());
                    let sample = Sample::collect(&mut self.browser, self.clock.time());
                    if let Err(e) = self.accountant.sample_tick(&mut state, sample).await {
                        error!("Encountered an error during sampling {e:?}");
                    }
                }
            }
        }

        self.shutdown.cancel();
        let result = self.accountant.flush(&mut state, self.clock.time()).await;
        if let Err(e) = &result {
            error!("Failed to flush on shutdown {e:?}");
        }
        result
    }

    async fn handle_message(
        &mut self,
        state: &mut AccountantState,
        message: InboundMessage,
    ) -> Result<()> {
        debug!("Received {message:?}");
        self.browser.observe(&message);
        let now = self.clock.time();
        match message {
            InboundMessage::TabActivated { .. }
            | InboundMessage::WindowFocusChanged { focused: false, .. } => {
                self.accountant.session_interrupted(state, now).await
            }
            InboundMessage::UpdateBadge => self.accountant.refresh_badge(now).await,
            InboundMessage::TabUpdated { .. }
            | InboundMessage::WindowFocusChanged { focused: true, .. }
            | InboundMessage::IdleStateChanged { .. }
            | InboundMessage::VideoStateChange { .. } => Ok(()),
        }
    }
}

/// Advances a periodic deadline. Ticks missed while the process was suspended are skipped rather
/// than replayed, otherwise a resumed host would credit the whole suspension at once.
fn next_deadline(deadline: Instant, interval: Duration, now: Instant) -> Instant {
    let next = deadline + interval;
    if next <= now {
        now + interval
    } else {
        next
    }
}
