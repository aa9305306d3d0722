/// Read cursor and limit of the current quota window.
///
/// Both counters only change together through `arm` and `consume` so that they cannot drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quota {
    limit: Option<usize>,
    consumed: usize,
}

/// Outcome of asking the quota for `n` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// All requested bytes fit into the window.
    Full,
    /// Only this many bytes fit before the boundary.
    Partial(usize),
}

impl Quota {
    /// Start a new window. A `limit` of 0 means unlimited.
    pub fn arm(&mut self, limit: usize) {
        self.limit = if limit == 0 { None } else { Some(limit) };
        self.consumed = 0;
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Bytes consumed since the window was armed.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes left in the window or `None` if unlimited.
    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|l| l - self.consumed)
    }

    pub fn admit(&self, n: usize) -> Admission {
        match self.remaining() {
            Some(r) if n > r => Admission::Partial(r),
            _ => Admission::Full,
        }
    }

    /// Account for `n` bytes taken from the source.
    ///
    /// Panics if this would overrun the window. Callers must consult `admit` first.
    pub fn consume(&mut self, n: usize) {
        self.consumed += n;
        if let Some(l) = self.limit {
            assert!(self.consumed <= l);
        }
    }
}
