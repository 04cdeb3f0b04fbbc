use nn::encoding::board_tensor;
use nn::policy::{rank_indices, PolicyModel};
use nn::vocab::MoveVocab;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Position};
use std::rc::Rc;

/// A source of moves for one side of a game.
pub trait Agent {
    fn name(&self) -> &str;

    /// Returns the next move to play, or `None` when the source cannot
    /// produce a legal move for this position. Callers must not apply
    /// anything on `None`.
    fn next_move(&mut self, position: &Chess) -> Option<UciMove>;
}

/// Chooses uniformly among the legal moves.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn next_move(&mut self, position: &Chess) -> Option<UciMove> {
        let moves = position.legal_moves();
        moves
            .choose(&mut self.rng)
            .map(|m| m.to_uci(CastlingMode::Standard))
    }
}

/// Plays the trained policy network: encode the position, score the move
/// vocabulary, and take the highest ranked candidate that is legal.
pub struct PolicyAgent {
    model: Rc<PolicyModel>,
    vocab: Rc<MoveVocab>,
}

impl PolicyAgent {
    pub fn new(model: Rc<PolicyModel>, vocab: Rc<MoveVocab>) -> Self {
        Self { model, vocab }
    }
}

impl Agent for PolicyAgent {
    fn name(&self) -> &str {
        "model"
    }

    fn next_move(&mut self, position: &Chess) -> Option<UciMove> {
        let tensor = board_tensor(position);
        let probabilities = self.model.predict(&tensor);
        let ranked = rank_indices(&probabilities);

        first_legal(
            position,
            ranked
                .into_iter()
                .filter_map(|index| self.vocab.decode(index as u32)),
        )
    }
}

/// First candidate whose text parses into a move the position accepts.
/// Returns `None` when the whole list is exhausted, which can happen when
/// the vocabulary lacks every legal move of an unusual position.
pub fn first_legal<'a>(
    position: &Chess,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<UciMove> {
    for text in candidates {
        if let Ok(uci) = text.parse::<UciMove>() {
            if uci.to_move(position).is_ok() {
                return Some(uci);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_legal_skips_illegal_candidates() {
        let position = Chess::default();

        let chosen = first_legal(&position, ["e7e5", "e2e4", "d2d4"]).unwrap();
        assert_eq!(chosen.to_string(), "e2e4");
    }

    #[test]
    fn first_legal_gives_up_when_nothing_fits() {
        let position = Chess::default();

        assert!(first_legal(&position, ["e7e5", "a8a1", "not-a-move"]).is_none());
    }

    #[test]
    fn random_agent_is_reproducible_with_a_seed() {
        let position = Chess::default();

        let m1 = RandomAgent::new(Some(7)).next_move(&position).unwrap();
        let m2 = RandomAgent::new(Some(7)).next_move(&position).unwrap();
        assert_eq!(m1.to_string(), m2.to_string());
    }

    #[test]
    fn random_agent_moves_are_legal() {
        let position = Chess::default();
        let mut agent = RandomAgent::new(Some(11));

        for _ in 0..20 {
            let uci = agent.next_move(&position).unwrap();
            assert!(uci.to_move(&position).is_ok());
        }
    }
}
