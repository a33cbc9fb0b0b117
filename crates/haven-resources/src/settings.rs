// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user preferences.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::{Display, EnumString};

use haven_core::{CommitOutcome, HavenError, ResourceKey};
use haven_resolver::{LiveResource, PrimaryCall, Resolution, Resolver, SecondaryCall};

use crate::{address, pending, rest_path};

const RESOURCE: &str = "settings";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    #[serde(other)]
    System,
}

/// Preferences. Missing fields take their defaults, so partial payloads
/// from either backend decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    #[serde(alias = "notificationsEnabled")]
    pub notifications_enabled: bool,
    /// Local time of the daily check-in reminder, `HH:MM`.
    #[serde(alias = "dailyReminder", alias = "reminderTime")]
    pub daily_reminder: Option<String>,
    pub theme: Theme,
    #[serde(alias = "shareWithTherapist")]
    pub share_with_therapist: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            daily_reminder: None,
            theme: Theme::System,
            share_with_therapist: false,
        }
    }
}

impl UserSettings {
    pub fn validate(&self) -> Result<(), HavenError> {
        let Some(reminder) = &self.daily_reminder else {
            return Ok(());
        };
        let valid = reminder
            .split_once(':')
            .and_then(|(h, m)| Some((h.parse::<u8>().ok()?, m.parse::<u8>().ok()?)))
            .is_some_and(|(h, m)| h < 24 && m < 60 && reminder.len() == 5);
        if valid {
            Ok(())
        } else {
            Err(HavenError::Validation(format!(
                "daily reminder must be HH:MM, got {reminder:?}"
            )))
        }
    }
}

#[derive(Clone)]
pub struct Settings {
    resolver: Resolver,
}

impl Settings {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    fn read_calls(user_id: &str) -> (PrimaryCall, Result<SecondaryCall, HavenError>) {
        (
            PrimaryCall::new("settings:get", json!({"userId": user_id})),
            rest_path(&[RESOURCE, user_id]).map(SecondaryCall::get),
        )
    }

    /// Current settings; defaults when nothing is reachable.
    pub async fn get(&self, user_id: &str) -> Resolution<UserSettings> {
        let target = address(user_id, RESOURCE, std::iter::empty());
        let (primary, secondary) = Self::read_calls(user_id);
        target
            .resolve(&self.resolver, &primary, secondary, UserSettings::default())
            .await
    }

    /// Replace the stored settings.
    pub async fn update(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> Result<CommitOutcome<Value>, HavenError> {
        settings.validate()?;
        let key = ResourceKey::new(user_id, RESOURCE)?;
        let body = serde_json::to_value(settings)?;

        self.resolver
            .commit(
                &key,
                &PrimaryCall::new(
                    "settings:update",
                    json!({"userId": user_id, "settings": body}),
                ),
                &SecondaryCall::put(rest_path(&[RESOURCE, user_id])?, body.clone()),
                pending(user_id, RESOURCE, "settings:update", body),
            )
            .await
    }

    /// Keep settings current for display.
    pub fn watch(&self, user_id: &str) -> Result<LiveResource<UserSettings>, HavenError> {
        let key = ResourceKey::new(user_id, RESOURCE)?;
        let (primary, secondary) = Self::read_calls(user_id);
        Ok(LiveResource::start(
            self.resolver.clone(),
            key,
            primary,
            secondary?,
            UserSettings::default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use haven_core::{HttpMethod, Tier};
    use haven_test_utils::{MemoryCache, MockPrimary, MockSecondary};

    #[test]
    fn partial_payload_fills_defaults() {
        let s: UserSettings =
            serde_json::from_value(json!({"theme": "dark", "reminderTime": "21:30"})).unwrap();
        assert_eq!(s.theme, Theme::Dark);
        assert_eq!(s.daily_reminder.as_deref(), Some("21:30"));
        assert!(s.notifications_enabled);
        assert!(!s.share_with_therapist);
    }

    #[test]
    fn unknown_theme_falls_back_to_system() {
        let s: UserSettings = serde_json::from_value(json!({"theme": "solarized"})).unwrap();
        assert_eq!(s.theme, Theme::System);
    }

    #[test]
    fn reminder_format_is_checked() {
        let mut s = UserSettings::default();
        for bad in ["7:00", "24:00", "12:60", "noon"] {
            s.daily_reminder = Some(bad.into());
            assert!(s.validate().is_err(), "{bad}");
        }
        s.daily_reminder = Some("07:05".into());
        assert!(s.validate().is_ok());
    }

    #[tokio::test]
    async fn get_defaults_when_offline() {
        let settings = Settings::new(Resolver::new(Arc::new(MemoryCache::new())));
        let r = settings.get("u1").await;
        assert_eq!(r.value, UserSettings::default());
        assert_eq!(r.tier(), Tier::Default);
    }

    #[tokio::test]
    async fn update_puts_full_document() {
        let secondary = MockSecondary::succeeding(json!({}));
        let settings = Settings::new(
            Resolver::new(Arc::new(MemoryCache::new()))
                .with_primary(Arc::new(MockPrimary::failing()))
                .with_secondary(Arc::new(secondary.clone())),
        );
        let update = UserSettings {
            theme: Theme::Light,
            ..UserSettings::default()
        };
        settings.update("u1", &update).await.unwrap();

        let req = &secondary.requests().await[0];
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "/settings/u1");
        assert_eq!(req.body.as_ref().unwrap()["theme"], json!("light"));
    }

    #[tokio::test]
    async fn watch_follows_live_settings() {
        let primary = MockPrimary::failing();
        primary
            .enable_live(vec![json!({"theme": "dark", "notificationsEnabled": false})])
            .await;
        let settings = Settings::new(
            Resolver::new(Arc::new(MemoryCache::new())).with_primary(Arc::new(primary)),
        );
        let mut live = settings.watch("u1").unwrap();
        let snap = live.loaded().await;
        assert_eq!(snap.data.theme, Theme::Dark);
        assert!(!snap.data.notifications_enabled);
    }
}
