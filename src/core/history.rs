use crate::core::game::{Mark, Outcome};
use crate::core::identity::PlayerId;

/// One finished game as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub x_player: PlayerId,
    pub o_player: PlayerId,
    pub outcome: Outcome,
}

impl GameSummary {
    /// True if `player` held the winning mark.
    pub fn won_by(&self, player: &PlayerId) -> bool {
        match self.outcome {
            Outcome::Winner(mark) => {
                let seat = match mark {
                    Mark::X => &self.x_player,
                    Mark::O => &self.o_player,
                };
                seat == player
            }
            Outcome::Draw => false,
        }
    }
}

/// Win/draw/loss split of a room's history from one player's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

impl Tally {
    /// Every game lands in exactly one bucket. A decisive game the player did
    /// not win counts as a loss, whether or not they were seated in it.
    pub fn for_player(history: &[GameSummary], player: &PlayerId) -> Self {
        history.iter().fold(Tally::default(), |mut tally, game| {
            if game.outcome == Outcome::Draw {
                tally.draws += 1;
            } else if game.won_by(player) {
                tally.wins += 1;
            } else {
                tally.losses += 1;
            }
            tally
        })
    }

    pub fn total(&self) -> usize {
        self.wins + self.draws + self.losses
    }
}
