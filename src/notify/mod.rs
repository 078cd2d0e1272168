pub mod discord;

use chrono::{DateTime, Utc};

use crate::filter::CurrentEvent;
use discord::DiscordNotifier;

pub const ATTRIBUTION: &str = "Data provided by feeds.livep2000.nl";

/// Sent once per cycle that replaced the current event.
#[derive(Debug, Clone)]
pub struct EventNotification {
    pub sensor: String,
    pub event: CurrentEvent,
    pub ts: DateTime<Utc>,
}

impl EventNotification {
    pub fn new(sensor: impl Into<String>, event: CurrentEvent) -> Self {
        Self {
            sensor: sensor.into(),
            event,
            ts: Utc::now(),
        }
    }

    pub fn title(&self) -> String {
        format!("{}: {}", self.sensor, self.event.message)
    }

    pub fn description(&self) -> String {
        let ev = &self.event;
        let mut lines = vec![
            format!("**Time:** {}", ev.timestamp.format("%Y-%m-%d %H:%M:%S")),
            format!("**Distance:** {} m", ev.distance_m),
        ];
        if let Some(region) = ev.region_name.as_ref().or(ev.region.as_ref()) {
            lines.push(format!("**Region:** {region}"));
        }
        if let Some(d) = &ev.discipline {
            lines.push(format!("**Discipline:** {d}"));
        }
        if let Some(c) = &ev.capcode {
            lines.push(format!("**Capcode:** {c}"));
        }
        lines.push(format!("_{ATTRIBUTION}_"));
        lines.join("\n")
    }
}

/// Fan-out to every configured channel. Always logs; channel failures are
/// logged and never propagate.
#[derive(Clone, Default)]
pub struct NotifierMux {
    discord: Option<DiscordNotifier>,
}

impl NotifierMux {
    /// `DISCORD_WEBHOOK_URL` enables the Discord channel.
    pub fn from_env() -> Self {
        match std::env::var("DISCORD_WEBHOOK_URL") {
            Ok(url) if !url.trim().is_empty() => {
                Self::default().with_discord(DiscordNotifier::new(url))
            }
            _ => Self::default(),
        }
    }

    pub fn with_discord(mut self, notifier: DiscordNotifier) -> Self {
        self.discord = Some(notifier);
        self
    }

    pub fn channels(&self) -> usize {
        usize::from(self.discord.is_some())
    }

    pub async fn notify(&self, n: &EventNotification) {
        tracing::info!(
            target: "p2000",
            sensor = %n.sensor,
            message = %n.event.message,
            distance_m = n.event.distance_m,
            "notify"
        );
        if let Some(d) = &self.discord {
            if let Err(e) = d.send(n).await {
                tracing::warn!(target: "p2000", error = %e, "discord notify failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event() -> CurrentEvent {
        CurrentEvent {
            message: "A1 Damrak Amsterdam".into(),
            latitude: 52.37,
            longitude: 4.89,
            distance_m: 412,
            timestamp: NaiveDate::from_ymd_opt(2026, 10, 18)
                .unwrap()
                .and_hms_opt(14, 2, 11)
                .unwrap(),
            published: "Sat, 18 Oct 2026 14:02:11 +0200".into(),
            capcode: Some("1301001".into()),
            region: Some("13".into()),
            region_name: Some("Amsterdam-Amstelland".into()),
            discipline: None,
            link: None,
        }
    }

    #[test]
    fn description_lists_known_attributes_only() {
        let n = EventNotification::new("P2000", event());
        let d = n.description();
        assert!(d.contains("**Distance:** 412 m"));
        assert!(d.contains("Amsterdam-Amstelland"));
        assert!(d.contains("1301001"));
        assert!(!d.contains("Discipline"));
        assert_eq!(n.title(), "P2000: A1 Damrak Amsterdam");
    }

    #[test]
    fn mux_without_env_has_no_channels() {
        assert_eq!(NotifierMux::default().channels(), 0);
    }

    #[test]
    fn discord_channel_counts_once() {
        let mux = NotifierMux::default()
            .with_discord(DiscordNotifier::new("http://127.0.0.1:9/hook".into()));
        assert_eq!(mux.channels(), 1);
    }
}
