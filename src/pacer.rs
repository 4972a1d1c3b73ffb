/// Keepalive schedule for idle ticks.
///
/// While no contact exists, idle frames go out after 1, 2, 4, ... idle ticks
/// until the idle bit reaches the pacemaker ceiling; from then on one goes
/// out every `2^ceiling` idle ticks. Any tick with contacts starts over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeartbeatPacer {
    idle_word: u32,
    idle_bit: u8,
}

/// Ceilings above this would overflow the idle counter's period.
pub const PACEMAKER_LIMIT: u8 = 31;

impl HeartbeatPacer {
    pub const fn new() -> Self {
        Self {
            idle_word: 0,
            idle_bit: 0,
        }
    }

    /// Advances by one tick and returns whether an idle frame is due.
    pub fn tick(&mut self, active: bool, pacemaker: u8) -> bool {
        if active {
            self.idle_word = 0;
            self.idle_bit = 0;
            return false;
        }

        let ceiling = pacemaker.min(PACEMAKER_LIMIT);
        self.idle_word = self.idle_word.saturating_add(1);
        if self.idle_bit < ceiling {
            let due = self.idle_word == 1 << self.idle_bit;
            if due {
                self.idle_bit += 1;
            }
            due
        } else {
            let due = self.idle_word >= 1 << ceiling;
            if due {
                self.idle_word = 0;
            }
            due
        }
    }

    pub fn idle_ticks(&self) -> u32 {
        self.idle_word
    }
}
