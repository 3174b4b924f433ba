use anyhow::Result;
use chrono::{DateTime, Local, NaiveTime};

use crate::alarm::model::{Alarm, FiredAlarm, next_target};

/// Owns the in-memory alarm list. All mutation happens on the UI thread;
/// `tick` is driven by the app's poll cadence.
pub struct AlarmManager {
    alarms: Vec<Alarm>,
    next_id: u64,
}

impl AlarmManager {
    pub fn new() -> Self {
        Self {
            alarms: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add(&mut self, label: &str, time: NaiveTime, now: DateTime<Local>) -> Result<u64> {
        let target = next_target(&now, time)?;
        let id = self.next_id;
        self.next_id += 1;
        let label = if label.trim().is_empty() {
            format!("Alarm {}", target.format("%H:%M"))
        } else {
            label.trim().to_string()
        };
        self.alarms.push(Alarm {
            id,
            label,
            target,
            enabled: true,
        });
        Ok(id)
    }

    /// Retargets an existing alarm and re-enables it. Returns false when the
    /// id is unknown.
    pub fn edit(
        &mut self,
        id: u64,
        label: &str,
        time: NaiveTime,
        now: DateTime<Local>,
    ) -> Result<bool> {
        let Some(alarm) = self.alarms.iter_mut().find(|alarm| alarm.id == id) else {
            return Ok(false);
        };
        alarm.target = next_target(&now, time)?;
        if !label.trim().is_empty() {
            alarm.label = label.trim().to_string();
        }
        alarm.enabled = true;
        Ok(true)
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.alarms.len();
        self.alarms.retain(|alarm| alarm.id != id);
        self.alarms.len() != before
    }

    /// Disabling is unconditional; enabling an alarm whose target has passed
    /// first rolls the target forward to the next wall-clock occurrence.
    pub fn set_enabled(&mut self, id: u64, enabled: bool, now: DateTime<Local>) -> Result<bool> {
        let Some(alarm) = self.alarms.iter_mut().find(|alarm| alarm.id == id) else {
            return Ok(false);
        };
        if enabled && alarm.target <= now {
            alarm.target = next_target(&now, alarm.target.time())?;
        }
        alarm.enabled = enabled;
        Ok(true)
    }

    /// Fires every enabled alarm whose target is no longer in the future.
    /// Each alarm fires exactly once: it is disabled as part of firing.
    pub fn tick(&mut self, now: DateTime<Local>) -> Vec<FiredAlarm> {
        let mut fired = Vec::new();
        for alarm in &mut self.alarms {
            if alarm.enabled && now >= alarm.target {
                alarm.enabled = false;
                fired.push(FiredAlarm {
                    id: alarm.id,
                    label: alarm.label.clone(),
                    target: alarm.target,
                });
            }
        }
        fired
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn future_time(now: DateTime<Local>, seconds: i64) -> NaiveTime {
        (now + chrono::Duration::seconds(seconds)).time()
    }

    #[test]
    fn enabled_alarm_fires_exactly_once() {
        let now = Local::now();
        let mut manager = AlarmManager::new();
        let id = manager
            .add("wake", future_time(now, 2), now)
            .expect("alarm added");

        assert!(manager.tick(now).is_empty());

        let after = now + chrono::Duration::seconds(3);
        let fired = manager.tick(after);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, id);
        assert_eq!(fired[0].label, "wake");
        assert!(!manager.alarms()[0].enabled);

        let again = manager.tick(after + chrono::Duration::seconds(60));
        assert!(again.is_empty());
    }

    #[test]
    fn disabled_alarm_never_fires() {
        let now = Local::now();
        let mut manager = AlarmManager::new();
        let id = manager
            .add("quiet", future_time(now, 1), now)
            .expect("alarm added");
        manager
            .set_enabled(id, false, now)
            .expect("toggle succeeds");

        let fired = manager.tick(now + chrono::Duration::seconds(5));
        assert!(fired.is_empty());
    }

    #[test]
    fn reenabling_fired_alarm_targets_next_day() {
        let now = Local::now();
        let mut manager = AlarmManager::new();
        let id = manager
            .add("daily-ish", future_time(now, 1), now)
            .expect("alarm added");

        let after = now + chrono::Duration::seconds(2);
        assert_eq!(manager.tick(after).len(), 1);
        let fired_target = manager.alarms()[0].target;

        manager
            .set_enabled(id, true, after)
            .expect("toggle succeeds");
        let alarm = &manager.alarms()[0];
        assert!(alarm.enabled);
        assert!(alarm.target > after);
        assert_eq!(alarm.target.time(), fired_target.time());
    }

    #[test]
    fn edit_retargets_and_reenables() {
        let now = Local::now();
        let mut manager = AlarmManager::new();
        let id = manager
            .add("meeting", future_time(now, 1), now)
            .expect("alarm added");
        assert_eq!(manager.tick(now + chrono::Duration::seconds(2)).len(), 1);

        let updated = manager
            .edit(id, "standup", future_time(now, 90), now)
            .expect("edit succeeds");
        assert!(updated);
        let alarm = &manager.alarms()[0];
        assert!(alarm.enabled);
        assert_eq!(alarm.label, "standup");
        assert!(alarm.target > now);

        assert!(!manager.edit(999, "", future_time(now, 90), now).expect("no-op"));
    }

    #[test]
    fn default_label_names_the_target_time() {
        let now = Local::now();
        let mut manager = AlarmManager::new();
        manager
            .add("   ", future_time(now, 60), now)
            .expect("alarm added");
        let alarm = &manager.alarms()[0];
        assert_eq!(alarm.label, format!("Alarm {}", alarm.target.format("%H:%M")));
    }

    #[test]
    fn remove_reports_whether_anything_was_deleted() {
        let now = Local::now();
        let mut manager = AlarmManager::new();
        let id = manager
            .add("gone", future_time(now, 60), now)
            .expect("alarm added");
        assert!(manager.remove(id));
        assert!(!manager.remove(id));
        assert!(manager.is_empty());
    }
}
