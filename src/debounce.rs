use std::time::{Duration, Instant};

/// Purpose of a delayed task. Each key owns exactly one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebounceKey {
    QueryRecompute,
    CategoryRecompute,
    CategoryOptionSearch,
}

impl DebounceKey {
    const ALL: [DebounceKey; 3] = [
        DebounceKey::QueryRecompute,
        DebounceKey::CategoryRecompute,
        DebounceKey::CategoryOptionSearch,
    ];

    fn slot(self) -> usize {
        match self {
            DebounceKey::QueryRecompute => 0,
            DebounceKey::CategoryRecompute => 1,
            DebounceKey::CategoryOptionSearch => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Recompute,
    FilterCategoryOptions(String),
}

#[derive(Debug, Clone)]
struct Pending {
    deadline: Instant,
    task: Task,
}

/// Three cancellable delayed-task slots. Scheduling into an occupied slot
/// replaces the pending task, so only the latest one can ever fire.
#[derive(Debug, Default)]
pub struct Debouncer {
    slots: [Option<Pending>; 3],
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, key: DebounceKey, now: Instant, delay: Duration, task: Task) {
        let slot = &mut self.slots[key.slot()];
        if slot.is_some() {
            log::debug!("Debouncer: superseding pending {:?}", key);
        }
        *slot = Some(Pending {
            deadline: now + delay,
            task,
        });
        log::debug!("Debouncer: scheduled {:?} in {:?}", key, delay);
    }

    pub fn cancel(&mut self, key: DebounceKey) -> bool {
        self.slots[key.slot()].take().is_some()
    }

    #[cfg(test)]
    pub fn is_pending(&self, key: DebounceKey) -> bool {
        self.slots[key.slot()].is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.iter().flatten().map(|p| p.deadline).min()
    }

    pub fn latest_deadline(&self) -> Option<Instant> {
        self.slots.iter().flatten().map(|p| p.deadline).max()
    }

    /// Removes and returns every task whose deadline has passed, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<(DebounceKey, Task)> {
        let mut due: Vec<(Instant, DebounceKey, Task)> = Vec::new();
        for key in DebounceKey::ALL {
            let slot = &mut self.slots[key.slot()];
            if slot.as_ref().is_some_and(|p| p.deadline <= now) {
                if let Some(p) = slot.take() {
                    due.push((p.deadline, key, p.task));
                }
            }
        }
        due.sort_by_key(|(deadline, _, _)| *deadline);
        due.into_iter().map(|(_, key, task)| (key, task)).collect()
    }
}
