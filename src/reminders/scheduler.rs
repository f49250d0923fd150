//! Background loop announcing due reminders.
//!
//! Ticks once a minute, asks the store which reminders match the current
//! `HH:MM`, and speaks them through the shared speaker stack. Failures
//! are logged and never stop the loop.

use crate::config::ReminderConfig;
use crate::reminders::store::{Reminder, ReminderStore};
use crate::tts::{SpeakerStack, VoiceProfile};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Interval between scheduler ticks (seconds).
const TICK_INTERVAL_SECS: u64 = 60;

/// Background scheduler announcing due reminders.
pub struct ReminderScheduler {
    store: ReminderStore,
    speaker: Arc<SpeakerStack>,
    voice: VoiceProfile,
    announce_prefix: String,
}

impl ReminderScheduler {
    /// Create a scheduler over an open store.
    #[must_use]
    pub fn new(
        store: ReminderStore,
        speaker: Arc<SpeakerStack>,
        voice: VoiceProfile,
        config: &ReminderConfig,
    ) -> Self {
        Self {
            store,
            speaker,
            voice,
            announce_prefix: config.announce_prefix.clone(),
        }
    }

    /// Run until the cancellation token fires.
    ///
    /// The tick interval is shorter than a minute boundary, so each
    /// `HH:MM` value is processed at most once.
    pub async fn run(self, cancel: CancellationToken) {
        info!("reminder scheduler started");
        let mut ticker = tokio::time::interval(Duration::from_secs(TICK_INTERVAL_SECS));
        let mut last_minute = String::new();

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let minute = Local::now().format("%H:%M").to_string();
                    if minute == last_minute {
                        continue;
                    }
                    last_minute.clone_from(&minute);

                    match self.store.due(&minute) {
                        Ok(due) => {
                            for reminder in due {
                                self.announce(&reminder).await;
                            }
                        }
                        Err(e) => error!("reminder lookup failed: {e}"),
                    }
                }
            }
        }
        info!("reminder scheduler stopped");
    }

    /// Speak one reminder and record the announcement.
    async fn announce(&self, reminder: &Reminder) {
        let text = format!("{}{}", self.announce_prefix, reminder.message);
        info!("announcing reminder {}: {}", reminder.id, reminder.message);

        let speaker = Arc::clone(&self.speaker);
        let voice = self.voice;
        let spoken = tokio::task::spawn_blocking(move || speaker.speak(&text, voice)).await;

        match spoken {
            Ok(Ok(())) => {
                if let Err(e) = self.store.mark_announced(reminder.id) {
                    warn!("could not record announcement: {e}");
                }
            }
            Ok(Err(e)) => warn!("reminder announcement failed: {e}"),
            Err(e) => warn!("reminder announcement task failed: {e}"),
        }
    }
}
