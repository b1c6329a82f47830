//! Per-timer-process "maintenance changed, please recompute" flags.
//!
//! The maintenance state machine runs once per server tick on a single
//! thread, but the hosts it updates are also watched by a pool of timer
//! processes that each own a shard of triggers. Rather than wake every
//! timer on every tick, `update_maintenances()` flips one bit per timer in
//! a packed bit array; each timer clears its own bit once it has picked up
//! the change. The array is a handful of `u64` words behind a single
//! `RwLock`: writers (`set_all`, `reset`) take the write lock, readers
//! (`check`) only the read lock, so idle timers never block each other.

use std::sync::RwLock;

const BITS_PER_WORD: usize = u64::BITS as usize;

pub struct TimerFlags {
    words: RwLock<Vec<u64>>,
    num_timers: usize,
}

impl TimerFlags {
    pub fn new(num_timers: usize) -> Self {
        let word_count = (num_timers + BITS_PER_WORD - 1) / BITS_PER_WORD.max(1);
        TimerFlags { words: RwLock::new(vec![0; word_count.max(1)]), num_timers }
    }

    /// Marks every timer as needing to recheck maintenance state. Called
    /// once per `update_maintenances()` pass that actually changed
    /// anything. The final word is masked so only `num_timers` bits end up
    /// set, not a whole extra word's worth of padding.
    pub fn set_all(&self) {
        let mut words = self.words.write().unwrap();
        let last = words.len() - 1;
        for word in words[..last].iter_mut() {
            *word = u64::MAX;
        }
        words[last] = match self.num_timers % BITS_PER_WORD {
            0 if self.num_timers != 0 => u64::MAX,
            0 => 0,
            n => (1u64 << n) - 1,
        };
    }

    /// Whether any timer currently has a pending update to pick up.
    pub fn any_set(&self) -> bool {
        self.words.read().unwrap().iter().any(|&word| word != 0)
    }

    /// Clears the flag for a single timer process after it has picked up
    /// the change.
    pub fn reset(&self, timer_index: usize) {
        assert!(timer_index < self.num_timers, "timer index out of range");
        let mut words = self.words.write().unwrap();
        words[timer_index / BITS_PER_WORD] &= !(1u64 << (timer_index % BITS_PER_WORD));
    }

    /// Whether `timer_index` still has a pending update to pick up.
    pub fn check(&self, timer_index: usize) -> bool {
        assert!(timer_index < self.num_timers, "timer index out of range");
        let words = self.words.read().unwrap();
        words[timer_index / BITS_PER_WORD] & (1u64 << (timer_index % BITS_PER_WORD)) != 0
    }
}
