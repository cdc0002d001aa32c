//! Stage identities and turn tokens.

use std::fmt;

use serde::Serialize;

/// Value held by the turn gate. Only the stage whose id matches may enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TurnId(u32);

impl TurnId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Stage> for TurnId {
    fn from(stage: Stage) -> Self {
        stage.turn()
    }
}

/// The three stages of the relay, in hand-off order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Generates the blob and writes it to the store.
    Produce,
    /// Reads the blob and fans out the word-length counts.
    Count,
    /// Selects and emits the most frequent lengths.
    Report,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Produce, Stage::Count, Stage::Report];

    pub const fn id(self) -> u32 {
        match self {
            Stage::Produce => 1,
            Stage::Count => 2,
            Stage::Report => 3,
        }
    }

    pub const fn turn(self) -> TurnId {
        TurnId::new(self.id())
    }

    /// The stage that receives the turn after this one. Report hands back to Produce.
    pub const fn next(self) -> Stage {
        match self {
            Stage::Produce => Stage::Count,
            Stage::Count => Stage::Report,
            Stage::Report => Stage::Produce,
        }
    }

    pub fn from_turn(turn: TurnId) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| s.turn() == turn)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_cycles_back_to_produce() {
        assert_eq!(Stage::Produce.next(), Stage::Count);
        assert_eq!(Stage::Count.next(), Stage::Report);
        assert_eq!(Stage::Report.next(), Stage::Produce);
    }

    #[test]
    fn display_uses_process_numbers() {
        let names: Vec<String> = Stage::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["P1", "P2", "P3"]);
    }

    #[test]
    fn from_turn_rejects_unknown_ids() {
        assert_eq!(Stage::from_turn(TurnId::new(2)), Some(Stage::Count));
        assert_eq!(Stage::from_turn(TurnId::new(0)), None);
        assert_eq!(Stage::from_turn(TurnId::new(4)), None);
    }
}
