use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::{
    browser_api::{BrowserApi, IdleState},
    daemon::{
        config::AccountantConfig,
        presentation::Presenter,
        storage::{entities::DayRecord, kv_store::KeyValueStore, tally_store::TallyStore},
    },
};

use super::{
    badge::{projected_minutes, Badge},
    hostname::hostname_from_url,
    rollover::current_day,
    state::AccountantState,
};

/// What the browser looked like at one sampling point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub now: DateTime<Local>,
    /// Normalized hostname of the focused tab.
    pub hostname: Option<String>,
    pub idle_state: IdleState,
    pub video_playing: bool,
}

impl Sample {
    /// Reads the browser. A tab that can't be read counts as no tab and an idle state that can't
    /// be read counts as locked, neither is an error.
    pub fn collect(browser: &mut impl BrowserApi, now: DateTime<Local>) -> Self {
        let hostname = match browser.get_active_tab_url() {
            Ok(url) => url.as_deref().and_then(hostname_from_url),
            Err(e) => {
                debug!("Couldn't read the active tab {e:?}");
                None
            }
        };
        let idle_state = browser.get_idle_state().unwrap_or_else(|e| {
            debug!("Couldn't read the idle state {e:?}");
            IdleState::Locked
        });
        Self {
            now,
            hostname,
            idle_state,
            video_playing: browser.is_video_playing(),
        }
    }

    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

/// Converts samples into persisted per-site seconds. Runtime state is kept outside in
/// [AccountantState] and handed to every tick, the accountant itself only holds its collaborators.
pub struct TimeAccountant<S, P> {
    store: TallyStore<S>,
    presenter: P,
    config: AccountantConfig,
}

impl<S: KeyValueStore, P: Presenter> TimeAccountant<S, P> {
    pub fn new(store: TallyStore<S>, presenter: P, config: AccountantConfig) -> Self {
        Self {
            store,
            presenter,
            config,
        }
    }

    pub fn config(&self) -> &AccountantConfig {
        &self.config
    }

    /// Creates missing records, rolls a stale day over and paints the persisted total.
    pub async fn startup(&mut self, now: DateTime<Local>) -> Result<()> {
        self.store.initialize(now.date_naive()).await?;
        let day = self.current_day(now.date_naive()).await?;
        info!(
            "Starting with {}s recorded for {}",
            day.total_seconds(),
            day.date()
        );
        self.presenter
            .show_badge(&Badge::from_minutes(day.total_minutes()))
    }

    /// Handles one sample: closes the open session when tracking stops or moves to another
    /// hostname, accumulates the sample otherwise and repaints the badge.
    pub async fn sample_tick(&mut self, state: &mut AccountantState, sample: Sample) -> Result<()> {
        let sites = self.store.tracked_sites().await?;
        let tracked = sample
            .hostname
            .as_deref()
            .filter(|hostname| sites.find_match(hostname, self.config.match_mode).is_some())
            .filter(|_| self.is_active(&sample));

        debug!(
            "Sampled {:?} ({}), tracking {:?}",
            sample.hostname, sample.idle_state, tracked
        );

        let continues = tracked.is_some_and(|hostname| state.continues_session(hostname));
        if !continues && state.current_hostname.is_some() {
            self.close_session(state, sample.now).await?;
        }

        if let Some(hostname) = tracked {
            state.record_active(hostname, self.seconds_per_sample(), sample.now);
        }

        self.paint_projection(state, sample.today()).await
    }

    /// Commits unflushed seconds to the persisted day. Does nothing without a hostname or
    /// without unflushed seconds. On failure the seconds stay in memory for the next attempt.
    pub async fn flush(&mut self, state: &mut AccountantState, now: DateTime<Local>) -> Result<()> {
        let Some(hostname) = state.current_hostname.clone() else {
            return Ok(());
        };
        if state.unflushed_seconds == 0 {
            return Ok(());
        }

        let mut day = self.current_day(now.date_naive()).await?;
        day.credit(&hostname, state.unflushed_seconds);
        let crossed_hours = day.advance_hour_watermark();
        self.store.save_today(&day).await?;

        info!(
            "Flushed {}s for {hostname}, {} total is {}s",
            state.unflushed_seconds,
            day.date(),
            day.total_seconds()
        );
        state.mark_flushed(now);

        for hours in crossed_hours {
            info!("Reached {hours}h on tracked sites");
            // The watermark is already saved, a failed notification is not retried.
            if let Err(e) = self.presenter.notify_milestone(hours) {
                warn!("Lost the {hours}h notification {e:?}");
            }
        }
        self.presenter
            .show_badge(&Badge::from_minutes(day.total_minutes()))
    }

    /// Runs at local midnight: commits what is pending and makes sure the new day has started.
    pub async fn midnight_tick(
        &mut self,
        state: &mut AccountantState,
        now: DateTime<Local>,
    ) -> Result<()> {
        self.flush(state, now).await?;
        let day = self.current_day(now.date_naive()).await?;
        self.presenter.show_badge(&Badge::from_minutes(projected_minutes(
            day.total_seconds(),
            state.unflushed_seconds,
        )))
    }

    /// Another tab became active or the browser lost focus.
    pub async fn session_interrupted(
        &mut self,
        state: &mut AccountantState,
        now: DateTime<Local>,
    ) -> Result<()> {
        self.close_session(state, now).await
    }

    /// Repaints the badge out of persisted state only. A record from another day counts as
    /// nothing tracked yet, it is left for the next flush to roll over.
    pub async fn refresh_badge(&mut self, now: DateTime<Local>) -> Result<()> {
        let seconds = self.persisted_seconds(now.date_naive()).await?;
        self.presenter
            .show_badge(&Badge::from_minutes(projected_minutes(seconds, 0)))
    }

    async fn close_session(&mut self, state: &mut AccountantState, now: DateTime<Local>) -> Result<()> {
        if let (Some(hostname), Some(start)) = (&state.current_hostname, state.session_start) {
            info!(
                "Closing session on {hostname} after {}s",
                (now - start).num_seconds()
            );
        }
        self.flush(state, now).await?;
        state.close_session();
        Ok(())
    }

    async fn paint_projection(&mut self, state: &AccountantState, today: NaiveDate) -> Result<()> {
        let persisted = self.persisted_seconds(today).await?;
        self.presenter.show_badge(&Badge::from_minutes(projected_minutes(
            persisted,
            state.unflushed_seconds,
        )))
    }

    async fn persisted_seconds(&self, today: NaiveDate) -> Result<u64> {
        let day = self.store.today(today).await?;
        Ok(if day.date() == today {
            day.total_seconds()
        } else {
            0
        })
    }

    async fn current_day(&self, today: NaiveDate) -> Result<DayRecord> {
        current_day(&self.store, today, self.config.history_limit).await
    }

    fn is_active(&self, sample: &Sample) -> bool {
        match sample.idle_state {
            IdleState::Active => true,
            IdleState::Idle => self.config.count_video_as_active && sample.video_playing,
            IdleState::Locked => false,
        }
    }

    fn seconds_per_sample(&self) -> u64 {
        self.config.sample_interval.as_secs().max(1)
    }
}
