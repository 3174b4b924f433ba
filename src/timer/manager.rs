use std::time::Duration;

use crate::timer::model::CountdownTimer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: u64,
    pub name: String,
}

/// Display duplicate of the single active timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTimerView {
    pub id: u64,
    pub name: String,
    pub remaining: Duration,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerView {
    pub id: u64,
    pub name: String,
    pub remaining: Duration,
    pub active: bool,
}

/// Owns the in-memory countdown list. At most one timer is active at a time;
/// activating one pauses every other.
pub struct TimerManager {
    timers: Vec<CountdownTimer>,
    next_id: u64,
}

impl TimerManager {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
        }
    }

    /// New timers start paused with the full duration remaining. An empty
    /// name becomes `Timer N`.
    pub fn add(&mut self, name: &str, duration: Duration) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let name = if name.trim().is_empty() {
            format!("Timer {id}")
        } else {
            name.trim().to_string()
        };
        self.timers.push(CountdownTimer {
            id,
            name,
            duration,
            remaining: duration,
            active: false,
        });
        id
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Flips one timer. Activating deactivates every other timer; pausing
    /// preserves the remaining duration.
    pub fn toggle(&mut self, id: u64) -> bool {
        let Some(index) = self.timers.iter().position(|timer| timer.id == id) else {
            return false;
        };
        let was_active = self.timers[index].active;
        if !was_active {
            for timer in &mut self.timers {
                timer.active = false;
            }
        }
        self.timers[index].active = !was_active;
        true
    }

    /// Advances the active countdown by the measured elapsed time. Reaching
    /// zero fires exactly once per activation: the timer deactivates and its
    /// remaining duration resets so it can be re-armed.
    pub fn tick(&mut self, elapsed: Duration) -> Option<FiredTimer> {
        let timer = self.timers.iter_mut().find(|timer| timer.active)?;
        timer.remaining = timer.remaining.saturating_sub(elapsed);
        if !timer.remaining.is_zero() {
            return None;
        }
        timer.active = false;
        timer.remaining = timer.duration;
        Some(FiredTimer {
            id: timer.id,
            name: timer.name.clone(),
        })
    }

    /// Timers ordered by remaining time, shortest first.
    pub fn sorted_views(&self) -> Vec<TimerView> {
        let mut views: Vec<TimerView> = self
            .timers
            .iter()
            .map(|timer| TimerView {
                id: timer.id,
                name: timer.name.clone(),
                remaining: timer.remaining,
                active: timer.active,
            })
            .collect();
        views.sort_by_key(|view| (view.remaining, view.id));
        views
    }

    pub fn active_view(&self) -> Option<ActiveTimerView> {
        self.timers
            .iter()
            .find(|timer| timer.active)
            .map(|timer| ActiveTimerView {
                id: timer.id,
                name: timer.name.clone(),
                remaining: timer.remaining,
                duration: timer.duration,
            })
    }

    pub fn name_of(&self, id: u64) -> Option<&str> {
        self.timers
            .iter()
            .find(|timer| timer.id == id)
            .map(|timer| timer.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn activating_a_timer_deactivates_the_others() {
        let mut manager = TimerManager::new();
        let first = manager.add("first", Duration::from_secs(60));
        let second = manager.add("second", Duration::from_secs(120));
        let third = manager.add("third", Duration::from_secs(180));

        assert!(manager.toggle(first));
        assert!(manager.toggle(second));

        let active: Vec<u64> = manager
            .sorted_views()
            .iter()
            .filter(|view| view.active)
            .map(|view| view.id)
            .collect();
        assert_eq!(active, vec![second]);

        assert!(manager.toggle(third));
        assert_eq!(manager.active_view().expect("active").id, third);
    }

    #[test]
    fn pausing_preserves_remaining_time() {
        let mut manager = TimerManager::new();
        let id = manager.add("pause", Duration::from_secs(10));
        manager.toggle(id);
        assert!(manager.tick(SECOND * 3).is_none());

        manager.toggle(id);
        assert!(manager.tick(SECOND * 100).is_none(), "paused timers do not move");

        let view = &manager.sorted_views()[0];
        assert!(!view.active);
        assert_eq!(view.remaining, Duration::from_secs(7));
    }

    #[test]
    fn countdown_fires_exactly_once_per_activation() {
        let mut manager = TimerManager::new();
        let id = manager.add("brew", Duration::from_secs(3));
        manager.toggle(id);

        assert!(manager.tick(SECOND).is_none());
        assert!(manager.tick(SECOND).is_none());
        let fired = manager.tick(SECOND).expect("fires at zero");
        assert_eq!(fired, FiredTimer { id, name: "brew".to_string() });

        assert!(manager.tick(SECOND).is_none(), "fired timer is deactivated");

        let view = &manager.sorted_views()[0];
        assert!(!view.active);
        assert_eq!(view.remaining, Duration::from_secs(3), "remaining resets");

        manager.toggle(id);
        assert!(manager.tick(SECOND * 5).is_some(), "re-armed timer fires again");
    }

    #[test]
    fn overshooting_tick_still_fires_once() {
        let mut manager = TimerManager::new();
        let id = manager.add("late poll", Duration::from_secs(2));
        manager.toggle(id);
        let fired = manager.tick(SECOND * 30).expect("saturates to zero");
        assert_eq!(fired.id, id);
        assert!(manager.tick(SECOND).is_none());
    }

    #[test]
    fn deleting_the_active_timer_clears_the_active_view() {
        let mut manager = TimerManager::new();
        let keep = manager.add("keep", Duration::from_secs(60));
        let drop = manager.add("drop", Duration::from_secs(30));
        manager.toggle(drop);
        assert_eq!(manager.active_view().expect("active").id, drop);

        assert!(manager.remove(drop));
        assert!(manager.active_view().is_none());
        assert_eq!(manager.sorted_views()[0].id, keep);
    }

    #[test]
    fn views_sort_by_remaining_time() {
        let mut manager = TimerManager::new();
        let long = manager.add("long", Duration::from_secs(300));
        let short = manager.add("short", Duration::from_secs(30));
        let mid = manager.add("mid", Duration::from_secs(90));

        let order: Vec<u64> = manager.sorted_views().iter().map(|view| view.id).collect();
        assert_eq!(order, vec![short, mid, long]);
    }

    #[test]
    fn default_names_count_up() {
        let mut manager = TimerManager::new();
        manager.add("", Duration::from_secs(10));
        manager.add("  ", Duration::from_secs(20));
        let names: Vec<String> = manager
            .sorted_views()
            .iter()
            .map(|view| view.name.clone())
            .collect();
        assert_eq!(names, vec!["Timer 1".to_string(), "Timer 2".to_string()]);
    }

    #[test]
    fn tick_without_active_timer_is_a_no_op() {
        let mut manager = TimerManager::new();
        manager.add("idle", Duration::from_secs(5));
        assert!(manager.tick(SECOND).is_none());
        assert_eq!(manager.sorted_views()[0].remaining, Duration::from_secs(5));
    }
}
