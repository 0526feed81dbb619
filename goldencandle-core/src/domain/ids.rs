use serde::{Deserialize, Serialize};
use std::fmt;

/// Position identifier, assigned by the ledger in open order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionId(pub u64);

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic position id generator.
#[derive(Debug, Clone, Default)]
pub struct IdGen {
    next: u64,
}

impl IdGen {
    pub fn next_position_id(&mut self) -> PositionId {
        self.next += 1;
        PositionId(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let mut ids = IdGen::default();
        let a = ids.next_position_id();
        let b = ids.next_position_id();
        assert!(b > a);
        assert_eq!(a.to_string(), "#1");
    }
}
