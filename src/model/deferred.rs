use std::time::Duration;

/// Identifies one game session. Anything scheduled under an older token is
/// dropped instead of fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionToken(u64);

#[derive(Debug)]
struct Pending<A> {
    due: Duration,
    seq: u64,
    token: SessionToken,
    action: A,
}

/// Presentation delays as an explicit queue driven by `advance`.
#[derive(Debug)]
pub struct DeferredQueue<A> {
    clock: Duration,
    token: SessionToken,
    next_seq: u64,
    pending: Vec<Pending<A>>,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self {
            clock: Duration::ZERO,
            token: SessionToken::default(),
            next_seq: 0,
            pending: Vec::new(),
        }
    }
}

impl<A> DeferredQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Starts a new session: pending actions become stale.
    pub fn invalidate(&mut self) -> SessionToken {
        self.token = SessionToken(self.token.0 + 1);
        self.token
    }

    pub fn schedule(&mut self, delay: Duration, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            due: self.clock + delay,
            seq,
            token: self.token,
            action,
        });
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.clock += elapsed;
    }

    /// Removes and returns the earliest due action of the current session.
    pub fn pop_due(&mut self) -> Option<A> {
        let token = self.token;
        self.pending.retain(|pending| pending.token == token);
        let clock = self.clock;
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.due <= clock)
            .min_by_key(|(_, pending)| (pending.due, pending.seq))
            .map(|(idx, _)| idx)?;
        Some(self.pending.remove(idx).action)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.iter().all(|pending| pending.token != self.token)
    }

    /// Time until the next pending action, if any.
    pub fn next_due_in(&self) -> Option<Duration> {
        self.pending
            .iter()
            .filter(|pending| pending.token == self.token)
            .map(|pending| pending.due.saturating_sub(self.clock))
            .min()
    }
}
