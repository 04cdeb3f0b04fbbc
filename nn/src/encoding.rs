use shakmaty::{Chess, Color, File, Move, Position, Role, Square};

/// Number of input planes: 6 roles x 2 colors, plus the destination mask
pub const NUM_PLANES: usize = 13;

/// Index of the legal-move destination plane
pub const DEST_PLANE: usize = 12;

/// Length of the flattened input tensor
pub const TENSOR_LEN: usize = NUM_PLANES * 64;

fn role_channel(role: Role) -> usize {
    match role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

/// Square the king lands on after castling
fn castle_destination(king: Square, rook: Square) -> Square {
    let file = if king < rook {
        // king side
        File::G
    } else {
        // queen side
        File::C
    };

    Square::from_coords(file, king.rank())
}

/// Destination square of a move as seen on the board (castling lands the king)
fn destination(m: &Move) -> Square {
    match m {
        Move::Castle { king, rook } => castle_destination(*king, *rook),
        _ => m.to(),
    }
}

/// Encodes a position into the network input tensor, plane-major.
///
/// Planes 0-5 hold white pawn/knight/bishop/rook/queen/king occupancy,
/// planes 6-11 the same for black, and plane 12 marks every square that is
/// the destination of at least one legal move for the side to move.
/// Duplicate destinations collapse since the plane is a binary mask.
/// The board is never flipped for black to move.
pub fn board_tensor(position: &Chess) -> [f32; TENSOR_LEN] {
    let mut tensor = [0f32; TENSOR_LEN];

    for (square, piece) in position.board().clone().into_iter() {
        let channel = role_channel(piece.role) + if piece.color == Color::White { 0 } else { 6 };
        tensor[channel * 64 + square as usize] = 1.0;
    }

    for m in position.legal_moves() {
        tensor[DEST_PLANE * 64 + destination(&m) as usize] = 1.0;
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::fen::Fen;
    use shakmaty::CastlingMode;

    fn position(fen: &str) -> Chess {
        fen.parse::<Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap()
    }

    fn plane(tensor: &[f32; TENSOR_LEN], index: usize) -> &[f32] {
        &tensor[index * 64..(index + 1) * 64]
    }

    #[test]
    fn occupancy_planes_sum_to_piece_count() {
        let pos = Chess::default();
        let tensor = board_tensor(&pos);

        let occupancy: f32 = tensor[..DEST_PLANE * 64].iter().sum();
        assert_eq!(occupancy, 32.0);
    }

    #[test]
    fn occupied_square_sets_exactly_one_plane() {
        let pos = position("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3");
        let tensor = board_tensor(&pos);

        for (square, _) in pos.board().clone().into_iter() {
            let set: usize = (0..DEST_PLANE)
                .filter(|channel| tensor[channel * 64 + square as usize] == 1.0)
                .count();
            assert_eq!(set, 1, "square {}", square);
        }
    }

    #[test]
    fn startpos_destination_mask() {
        let tensor = board_tensor(&Chess::default());

        // pawn pushes cover a3..h4; knight destinations are a subset
        for square in 0..64usize {
            let expected = if (16..32).contains(&square) { 1.0 } else { 0.0 };
            assert_eq!(plane(&tensor, DEST_PLANE)[square], expected, "square {}", square);
        }
    }

    #[test]
    fn destination_plane_matches_legal_moves() {
        let pos = position("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3");
        let tensor = board_tensor(&pos);

        let mut expected = [0f32; 64];
        for m in pos.legal_moves() {
            expected[m.to() as usize] = 1.0;
        }
        assert_eq!(plane(&tensor, DEST_PLANE), &expected[..]);
    }

    #[test]
    fn black_to_move_is_not_flipped() {
        // after 1. e4 the white pawn sits on e4 in the white pawn plane
        let pos = position("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
        let tensor = board_tensor(&pos);

        let e4 = Square::E4 as usize;
        let e7 = Square::E7 as usize;
        assert_eq!(plane(&tensor, 0)[e4], 1.0);
        assert_eq!(plane(&tensor, 6)[e7], 1.0);
    }

    #[test]
    fn castle_marks_king_arrival_square() {
        let pos = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let tensor = board_tensor(&pos);

        assert_eq!(plane(&tensor, DEST_PLANE)[Square::G1 as usize], 1.0);
        assert_eq!(plane(&tensor, DEST_PLANE)[Square::C1 as usize], 1.0);
    }
}
