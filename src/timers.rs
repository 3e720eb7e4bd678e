use crate::dom::NodeId;
use crate::{Error, Result};

/// Deferred work the controller hands to the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Task {
    ReleaseScrollThrottle,
    Focus(NodeId),
}

impl Task {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::ReleaseScrollThrottle => "release-scroll-throttle",
            Self::Focus(_) => "focus",
        }
    }
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: i64,
    due_at: i64,
    order: i64,
    task: Task,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
    pub task: &'static str,
}

/// Virtual clock plus timeout queue. Nothing runs until the embedder moves
/// time forward.
#[derive(Debug, Clone)]
pub(crate) struct TimerQueue {
    now_ms: i64,
    next_timer_id: i64,
    next_task_order: i64,
    tasks: Vec<ScheduledTask>,
    step_limit: usize,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self {
            now_ms: 0,
            next_timer_id: 1,
            next_task_order: 0,
            tasks: Vec::new(),
            step_limit: 10_000,
        }
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn step_limit(&self) -> usize {
        self.step_limit
    }

    pub(crate) fn set_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::InvalidAction(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.step_limit = max_steps;
        Ok(())
    }

    pub(crate) fn schedule(&mut self, delay_ms: i64, task: Task) -> (i64, i64) {
        let due_at = self.now_ms.saturating_add(delay_ms.max(0));
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        self.tasks.push(ScheduledTask {
            id,
            due_at,
            order,
            task,
        });
        (id, due_at)
    }

    pub(crate) fn clear(&mut self, id: i64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    pub(crate) fn clear_all(&mut self) -> usize {
        let cleared = self.tasks.len();
        self.tasks.clear();
        cleared
    }

    pub(crate) fn pending(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .tasks
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                task: task.task.label(),
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub(crate) fn advance(&mut self, delta_ms: i64) -> Result<i64> {
        if delta_ms < 0 {
            return Err(Error::InvalidAction(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.now_ms;
        self.now_ms = self.now_ms.saturating_add(delta_ms);
        Ok(from)
    }

    pub(crate) fn advance_to(&mut self, target_ms: i64) -> Result<i64> {
        if target_ms < self.now_ms {
            return Err(Error::InvalidAction(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.now_ms
            )));
        }
        let from = self.now_ms;
        self.now_ms = target_ms;
        Ok(from)
    }

    /// Removes the earliest task due at or before `due_limit` (any task when
    /// `None`). With `advance_clock` the clock jumps forward to its due time.
    pub(crate) fn take_next(
        &mut self,
        due_limit: Option<i64>,
        advance_clock: bool,
    ) -> Option<(i64, i64, Task)> {
        let idx = self.next_task_index(due_limit)?;
        let task = self.tasks.remove(idx);
        if advance_clock && task.due_at > self.now_ms {
            self.now_ms = task.due_at;
        }
        Some((task.id, task.due_at, task.task))
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }
}
