use crate::agent::Agent;
use crate::game::{game_over, verdict, GameOutcome};
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Color, Move, Position, Rank, Role, Square};
use std::io::{self, BufRead, Write};

/// Interactive game against a move source. Unlike `play_game`, illegal
/// or unparseable human input retries the same turn instead of aborting;
/// a bad move from the source still ends the game.
pub fn play_human(agent: &mut dyn Agent, human_color: Color) -> GameOutcome {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let mut position = Chess::default();
    println!("{:?}\n", position.board());

    while !game_over(&position) {
        if position.turn() == human_color {
            let mov = match read_human_move(&mut lines, &position) {
                Some(mov) => mov,
                None => {
                    eprintln!("input closed, game aborted");
                    return GameOutcome::Unfinished;
                }
            };
            position.play_unchecked(&mov);
        } else {
            let uci = match agent.next_move(&position) {
                Some(uci) => uci,
                None => {
                    eprintln!("{} has no move to play", agent.name());
                    return GameOutcome::Unfinished;
                }
            };
            let mov = match uci.to_move(&position) {
                Ok(mov) => mov,
                Err(_) => {
                    eprintln!("illegal move {} from {}", uci, agent.name());
                    return GameOutcome::Unfinished;
                }
            };
            println!("{} plays {}", agent.name(), uci);
            position.play_unchecked(&mov);
        }

        println!("{:?}\n", position.board());
    }

    let outcome = verdict(&position);
    println!("Result: {}", outcome);
    outcome
}

/// Prompts until the human enters a legal move or the input closes.
fn read_human_move(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    position: &Chess,
) -> Option<Move> {
    loop {
        print!("your move (uci): ");
        io::stdout().flush().ok();

        let line = lines.next()?.ok()?;
        let text = coerce_queen_promotion(position, line.trim());

        match text.parse::<UciMove>() {
            Ok(uci) => match uci.to_move(position) {
                Ok(mov) => return Some(mov),
                Err(_) => println!("illegal move: {}", text),
            },
            Err(_) => println!("cannot parse move: {}", text),
        }
    }
}

/// Appends the queen promotion letter to a bare 4-character move whose
/// origin holds a pawn bound for the first or last rank. Promotion is
/// always to a queen; under-promotions must be written out explicitly.
pub fn coerce_queen_promotion(position: &Chess, text: &str) -> String {
    if text.len() == 4 {
        let bytes = text.as_bytes();
        if let (Ok(from), Ok(to)) = (
            Square::from_ascii(&bytes[0..2]),
            Square::from_ascii(&bytes[2..4]),
        ) {
            let is_pawn = position.board().role_at(from) == Some(Role::Pawn);
            let last_rank = to.rank() == Rank::First || to.rank() == Rank::Eighth;
            if is_pawn && last_rank {
                return format!("{}q", text);
            }
        }
    }

    text.to_string()
}
