/// Leading-edge throttle: the first call in a window runs, the rest of the
/// window is dropped. The owner schedules [`Throttle::release`] `limit_ms`
/// after every call that [`Throttle::try_acquire`] admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Throttle {
    limit_ms: i64,
    in_throttle: bool,
}

impl Throttle {
    pub(crate) fn new(limit_ms: i64) -> Self {
        Self {
            limit_ms,
            in_throttle: false,
        }
    }

    pub(crate) fn limit_ms(&self) -> i64 {
        self.limit_ms
    }

    pub(crate) fn try_acquire(&mut self) -> bool {
        if self.in_throttle {
            return false;
        }
        self.in_throttle = true;
        true
    }

    pub(crate) fn release(&mut self) {
        self.in_throttle = false;
    }

    pub(crate) fn is_engaged(&self) -> bool {
        self.in_throttle
    }
}
