use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{
    piece::{Color, PieceType},
    ChessError, Move, MoveType, Piece, Position,
};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// Halfmove clock value at which the seventy-five-move rule ends the game
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
const FIVEFOLD: usize = 5;

const KNIGHT_STEPS: [(i8, i8); 8] = [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
const KING_STEPS: [(i8, i8); 8] = [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

type Squares = [Option<Piece>; 64];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }
}

impl CastlingRights {
    pub fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    fn clear(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    // A move touching a rook's home corner (moving from it or capturing on it)
    // loses the matching right
    fn clear_corner(&mut self, pos: Position) {
        match (pos.file, pos.rank) {
            (1, 1) => self.white_queenside = false,
            (8, 1) => self.white_kingside = false,
            (1, 8) => self.black_queenside = false,
            (8, 8) => self.black_kingside = false,
            _ => {}
        }
    }
}

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
}

impl Outcome {
    pub fn winner(&self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            Outcome::Stalemate => write!(f, "draw by stalemate"),
            Outcome::InsufficientMaterial => write!(f, "draw by insufficient material"),
            Outcome::SeventyFiveMoves => write!(f, "draw by the seventy-five-move rule"),
            Outcome::FivefoldRepetition => write!(f, "draw by fivefold repetition"),
        }
    }
}

// Everything needed to take a move back
#[derive(Debug, Clone, PartialEq, Eq)]
struct UndoRecord {
    mv: Move,
    moved: Piece,
    captured: Option<(Position, Piece)>,
    castling_rights: CastlingRights,
    en_passant: Option<Position>,
    halfmove_clock: u32,
    key: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: Squares,
    current_turn: Color,
    castling_rights: CastlingRights,
    en_passant: Option<Position>,
    halfmove_clock: u32,
    fullmove_number: u32,
    history: Vec<UndoRecord>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.castling_rights = CastlingRights::default();
        board.setup_initial_position();
        board
    }

    fn empty() -> Self {
        Self {
            squares: [None; 64],
            current_turn: Color::White,
            castling_rights: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    fn setup_initial_position(&mut self) {
        let piece_order = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for (file, &piece_type) in (1..=8).zip(piece_order.iter()) {
            self.put(Position { file, rank: 1 }, Piece::new(piece_type, Color::White));
            self.put(Position { file, rank: 2 }, Piece::new(PieceType::Pawn, Color::White));
            self.put(Position { file, rank: 7 }, Piece::new(PieceType::Pawn, Color::Black));
            self.put(Position { file, rank: 8 }, Piece::new(piece_type, Color::Black));
        }
    }

    fn put(&mut self, pos: Position, piece: Piece) {
        self.squares[pos.index()] = Some(piece);
    }

    pub fn get_piece(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.index()]
    }

    /// All pieces on the board, a1 to h8
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| self.get_piece(pos).map(|piece| (pos, piece)))
    }

    pub fn current_turn(&self) -> Color {
        self.current_turn
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn en_passant(&self) -> Option<Position> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|record| record.mv)
    }

    /// Number of moves played on this board that can still be undone
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    pub fn king_position(&self, color: Color) -> Option<Position> {
        find_king(&self.squares, color)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_position(color) {
            Some(king) => is_attacked(&self.squares, king, color.opposite()),
            None => false,
        }
    }

    /// Legal moves for the side to move
    pub fn legal_moves(&self) -> Vec<Move> {
        self.legal_moves_for(self.current_turn)
    }

    /// The legal moves `color` would have if it were that side's turn. The
    /// board itself is left untouched.
    pub fn legal_moves_for(&self, color: Color) -> Vec<Move> {
        let mut moves = self.pseudo_legal_moves(color);
        moves.retain(|mv| self.leaves_king_safe(mv, color));
        moves
    }

    fn has_legal_move(&self) -> bool {
        let color = self.current_turn;
        self.pseudo_legal_moves(color)
            .iter()
            .any(|mv| self.leaves_king_safe(mv, color))
    }

    fn pseudo_legal_moves(&self, color: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(48);
        for (from, piece) in self.pieces() {
            if piece.color != color {
                continue;
            }
            match piece.piece_type {
                PieceType::Pawn => self.pawn_moves(from, color, &mut moves),
                PieceType::Knight => self.step_moves(from, color, &KNIGHT_STEPS, &mut moves),
                PieceType::Bishop => self.slide_moves(from, color, &BISHOP_DIRECTIONS, &mut moves),
                PieceType::Rook => self.slide_moves(from, color, &ROOK_DIRECTIONS, &mut moves),
                PieceType::Queen => {
                    self.slide_moves(from, color, &ROOK_DIRECTIONS, &mut moves);
                    self.slide_moves(from, color, &BISHOP_DIRECTIONS, &mut moves);
                }
                PieceType::King => {
                    self.step_moves(from, color, &KING_STEPS, &mut moves);
                    self.castling_moves(from, color, &mut moves);
                }
            }
        }
        moves
    }

    fn pawn_moves(&self, from: Position, color: Color, moves: &mut Vec<Move>) {
        let direction = color.forward();
        let start_rank = if color == Color::White { 2 } else { 7 };

        // Forward pushes
        if let Some(one) = from.offset(0, direction) {
            if self.get_piece(one).is_none() {
                push_pawn_move(from, one, color, MoveType::Normal, moves);

                if from.rank == start_rank {
                    if let Some(two) = from.offset(0, 2 * direction) {
                        if self.get_piece(two).is_none() {
                            moves.push(Move::new(from, two));
                        }
                    }
                }
            }
        }

        // Diagonal captures, including en passant for the side to move
        for file_step in [-1, 1] {
            let Some(target) = from.offset(file_step, direction) else {
                continue;
            };
            match self.get_piece(target) {
                Some(victim) if victim.color != color => {
                    push_pawn_move(from, target, color, MoveType::Capture, moves);
                }
                None if color == self.current_turn && self.en_passant == Some(target) => {
                    moves.push(Move::new(from, target).with_type(MoveType::EnPassant));
                }
                _ => {}
            }
        }
    }

    fn step_moves(&self, from: Position, color: Color, steps: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(file_step, rank_step) in steps {
            if let Some(to) = from.offset(file_step, rank_step) {
                match self.get_piece(to) {
                    None => moves.push(Move::new(from, to)),
                    Some(target) if target.color != color => {
                        moves.push(Move::new(from, to).with_type(MoveType::Capture));
                    }
                    Some(_) => {}
                }
            }
        }
    }

    fn slide_moves(&self, from: Position, color: Color, directions: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(file_step, rank_step) in directions {
            let mut current = from;
            while let Some(to) = current.offset(file_step, rank_step) {
                match self.get_piece(to) {
                    None => moves.push(Move::new(from, to)),
                    Some(target) => {
                        if target.color != color {
                            moves.push(Move::new(from, to).with_type(MoveType::Capture));
                        }
                        break;
                    }
                }
                current = to;
            }
        }
    }

    fn castling_moves(&self, from: Position, color: Color, moves: &mut Vec<Move>) {
        let rank = color.back_rank();
        if from != (Position { file: 5, rank }) {
            return;
        }
        let enemy = color.opposite();
        let rook = Some(Piece::new(PieceType::Rook, color));

        if self.castling_rights.kingside(color)
            && self.get_piece(Position { file: 8, rank }) == rook
            && self.path_is_empty(rank, &[6, 7])
            && !self.path_is_attacked(rank, &[5, 6, 7], enemy)
        {
            moves.push(Move::castle(from, Position { file: 7, rank }));
        }

        if self.castling_rights.queenside(color)
            && self.get_piece(Position { file: 1, rank }) == rook
            && self.path_is_empty(rank, &[2, 3, 4])
            && !self.path_is_attacked(rank, &[5, 4, 3], enemy)
        {
            moves.push(Move::castle(from, Position { file: 3, rank }));
        }
    }

    fn path_is_empty(&self, rank: u8, files: &[u8]) -> bool {
        files.iter().all(|&file| self.get_piece(Position { file, rank }).is_none())
    }

    fn path_is_attacked(&self, rank: u8, files: &[u8], by: Color) -> bool {
        files.iter().any(|&file| is_attacked(&self.squares, Position { file, rank }, by))
    }

    // Plays the move on a scratch copy of the squares and checks that the
    // mover's king is not left attacked
    fn leaves_king_safe(&self, mv: &Move, color: Color) -> bool {
        let mut scratch = self.squares;
        apply_to_squares(&mut scratch, mv);
        match find_king(&scratch, color) {
            Some(king) => !is_attacked(&scratch, king, color.opposite()),
            None => true,
        }
    }

    /// Plays a move after checking it against the legal move list. The legal
    /// move with the same origin, destination and promotion is the one applied.
    pub fn make_move(&mut self, chess_move: Move) -> Result<(), ChessError> {
        let Some(legal) = self.legal_moves().into_iter().find(|candidate| *candidate == chess_move) else {
            log::debug!("rejected illegal move {} in {}", chess_move, self.to_fen());
            return Err(ChessError::IllegalMove(chess_move));
        };
        self.push_move(legal)
    }

    /// Plays a move without checking legality. Meant for moves taken straight
    /// from [`Board::legal_moves`]; only an empty or enemy origin square is rejected.
    pub fn push_move(&mut self, chess_move: Move) -> Result<(), ChessError> {
        let moved = match self.get_piece(chess_move.from) {
            Some(piece) if piece.color == self.current_turn => piece,
            _ => {
                log::warn!("no {} piece on {} for move {}", self.current_turn, chess_move.from, chess_move);
                return Err(ChessError::IllegalMove(chess_move));
            }
        };

        let captured = if chess_move.move_type == MoveType::EnPassant {
            let victim_pos = Position { file: chess_move.to.file, rank: chess_move.from.rank };
            self.get_piece(victim_pos).map(|victim| (victim_pos, victim))
        } else {
            self.get_piece(chess_move.to).map(|victim| (chess_move.to, victim))
        };

        self.history.push(UndoRecord {
            mv: chess_move,
            moved,
            captured,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            key: self.position_key(),
        });

        apply_to_squares(&mut self.squares, &chess_move);

        if moved.piece_type == PieceType::King {
            self.castling_rights.clear(moved.color);
        }
        self.castling_rights.clear_corner(chess_move.from);
        self.castling_rights.clear_corner(chess_move.to);

        let rank_diff = (chess_move.to.rank as i8 - chess_move.from.rank as i8).abs();
        self.en_passant = if moved.piece_type == PieceType::Pawn && rank_diff == 2 {
            chess_move.from.offset(0, moved.color.forward())
        } else {
            None
        };

        if moved.piece_type == PieceType::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if self.current_turn == Color::Black {
            self.fullmove_number += 1;
        }
        self.current_turn = self.current_turn.opposite();

        Ok(())
    }

    /// Takes back the last move, restoring the exact previous state
    pub fn undo_move(&mut self) -> Result<Move, ChessError> {
        let record = self.history.pop().ok_or(ChessError::NothingToUndo)?;
        let mv = record.mv;

        self.current_turn = self.current_turn.opposite();
        if self.current_turn == Color::Black {
            self.fullmove_number -= 1;
        }

        self.squares[mv.to.index()] = None;
        self.squares[mv.from.index()] = Some(record.moved);

        if mv.move_type == MoveType::Castle {
            let (rook_from, rook_to) = castle_rook_squares(&mv);
            self.squares[rook_from.index()] = self.squares[rook_to.index()].take();
        }

        if let Some((pos, piece)) = record.captured {
            self.squares[pos.index()] = Some(piece);
        }

        self.castling_rights = record.castling_rights;
        self.en_passant = record.en_passant;
        self.halfmove_clock = record.halfmove_clock;

        Ok(mv)
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_in_check(self.current_turn) && !self.has_legal_move()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_in_check(self.current_turn) && !self.has_legal_move()
    }

    pub fn has_insufficient_material(&self) -> bool {
        let mut minors = Vec::new();

        for (pos, piece) in self.pieces() {
            match piece.piece_type {
                PieceType::King => {}
                PieceType::Knight | PieceType::Bishop => minors.push((pos, piece.piece_type)),
                PieceType::Pawn | PieceType::Rook | PieceType::Queen => return false,
            }
        }

        match minors.as_slice() {
            // Bare kings, or a single minor piece
            [] | [_] => true,
            // Only bishops, all on squares of one colour
            [(first, _), ..] => minors
                .iter()
                .all(|(pos, kind)| *kind == PieceType::Bishop && pos.is_light() == first.is_light()),
        }
    }

    /// How many times the current position has occurred, counting this one
    pub fn repetition_count(&self) -> usize {
        let key = self.position_key();
        // Positions before the last capture or pawn move cannot repeat
        let repeats = self
            .history
            .iter()
            .rev()
            .take(self.halfmove_clock as usize)
            .filter(|record| record.key == key)
            .count();
        repeats + 1
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if !self.has_legal_move() {
            return Some(if self.is_in_check(self.current_turn) {
                Outcome::Checkmate { winner: self.current_turn.opposite() }
            } else {
                Outcome::Stalemate
            });
        }
        if self.has_insufficient_material() {
            return Some(Outcome::InsufficientMaterial);
        }
        if self.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES {
            return Some(Outcome::SeventyFiveMoves);
        }
        if self.repetition_count() >= FIVEFOLD {
            return Some(Outcome::FivefoldRepetition);
        }
        None
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    fn position_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.squares.hash(&mut hasher);
        self.current_turn.hash(&mut hasher);
        self.castling_rights.hash(&mut hasher);
        self.capturable_en_passant().hash(&mut hasher);
        hasher.finish()
    }

    // The en passant square only tells positions apart when the capture can
    // actually be played
    fn capturable_en_passant(&self) -> Option<Position> {
        self.en_passant?;
        self.legal_moves()
            .into_iter()
            .find(|mv| mv.move_type == MoveType::EnPassant)
            .map(|mv| mv.to)
    }

    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let invalid = |reason: &'static str| ChessError::InvalidFen { fen: fen.to_string(), reason };

        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(invalid("expected at least four fields"));
        }

        let mut board = Self::empty();

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid("piece placement must have eight ranks"));
        }
        for (row, rank_text) in ranks.iter().enumerate() {
            let rank = 8 - row as u8;
            let mut file = 1u8;
            for c in rank_text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || file as u32 + skip > 9 {
                        return Err(invalid("rank has more than eight files"));
                    }
                    file += skip as u8;
                } else {
                    let piece = Piece::from_char(c).ok_or_else(|| invalid("unknown piece letter"))?;
                    let pos = Position::new(file, rank).ok_or_else(|| invalid("rank has more than eight files"))?;
                    board.put(pos, piece);
                    file += 1;
                }
            }
            if file != 9 {
                return Err(invalid("rank does not cover eight files"));
            }
        }

        board.current_turn = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(invalid("side to move must be `w` or `b`")),
        };

        if fields[2] != "-" {
            for c in fields[2].chars() {
                match c {
                    'K' => board.castling_rights.white_kingside = true,
                    'Q' => board.castling_rights.white_queenside = true,
                    'k' => board.castling_rights.black_kingside = true,
                    'q' => board.castling_rights.black_queenside = true,
                    _ => return Err(invalid("unknown castling flag")),
                }
            }
        }

        board.en_passant = match fields[3] {
            "-" => None,
            square => Some(Position::from_algebraic(square).ok_or_else(|| invalid("bad en passant square"))?),
        };

        if let Some(clock) = fields.get(4) {
            board.halfmove_clock = clock.parse().map_err(|_| invalid("bad halfmove clock"))?;
        }
        if let Some(number) = fields.get(5) {
            board.fullmove_number = number.parse().map_err(|_| invalid("bad fullmove number"))?;
        }

        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (1..=8).rev() {
            let mut empty = 0;
            for file in 1..=8 {
                match self.get_piece(Position { file, rank }) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 1 {
                fen.push('/');
            }
        }

        fen.push_str(if self.current_turn == Color::White { " w " } else { " b " });

        let rights = self.castling_rights;
        let mut castling = String::new();
        for (flag, c) in [
            (rights.white_kingside, 'K'),
            (rights.white_queenside, 'Q'),
            (rights.black_kingside, 'k'),
            (rights.black_queenside, 'q'),
        ] {
            if flag {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }
        fen.push_str(&castling);

        match self.en_passant {
            Some(pos) => fen.push_str(&format!(" {}", pos)),
            None => fen.push_str(" -"),
        }
        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (1..=8).rev() {
            write!(f, "{} ", rank)?;
            for file in 1..=8 {
                let c = self.get_piece(Position { file, rank }).map_or('.', |piece| piece.to_char());
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

fn push_pawn_move(from: Position, to: Position, color: Color, move_type: MoveType, moves: &mut Vec<Move>) {
    if to.rank == color.promotion_rank() {
        for promotion in PieceType::PROMOTIONS {
            moves.push(Move::with_promotion(from, to, promotion).with_type(move_type));
        }
    } else {
        moves.push(Move::new(from, to).with_type(move_type));
    }
}

fn castle_rook_squares(mv: &Move) -> (Position, Position) {
    let rank = mv.from.rank;
    if mv.to.file == 7 {
        (Position { file: 8, rank }, Position { file: 6, rank })
    } else {
        (Position { file: 1, rank }, Position { file: 4, rank })
    }
}

fn apply_to_squares(squares: &mut Squares, mv: &Move) {
    let Some(mut piece) = squares[mv.from.index()].take() else {
        return;
    };

    match mv.move_type {
        MoveType::EnPassant => {
            squares[Position { file: mv.to.file, rank: mv.from.rank }.index()] = None;
        }
        MoveType::Castle => {
            let (rook_from, rook_to) = castle_rook_squares(mv);
            squares[rook_to.index()] = squares[rook_from.index()].take();
        }
        MoveType::Normal | MoveType::Capture => {}
    }

    if let Some(promotion) = mv.promotion {
        piece.piece_type = promotion;
    }
    squares[mv.to.index()] = Some(piece);
}

fn find_king(squares: &Squares, color: Color) -> Option<Position> {
    let king = Some(Piece::new(PieceType::King, color));
    squares
        .iter()
        .position(|square| *square == king)
        .and_then(Position::from_index)
}

fn is_attacked(squares: &Squares, target: Position, by: Color) -> bool {
    let holds = |pos: Option<Position>, kinds: &[PieceType]| match pos.and_then(|p| squares[p.index()]) {
        Some(piece) => piece.color == by && kinds.contains(&piece.piece_type),
        None => false,
    };

    // A pawn attacks diagonally forward, so look one rank behind the target
    // from the attacker's point of view
    let pawn_rank = -by.forward();
    if holds(target.offset(-1, pawn_rank), &[PieceType::Pawn]) || holds(target.offset(1, pawn_rank), &[PieceType::Pawn]) {
        return true;
    }

    if KNIGHT_STEPS.iter().any(|&(df, dr)| holds(target.offset(df, dr), &[PieceType::Knight])) {
        return true;
    }

    if KING_STEPS.iter().any(|&(df, dr)| holds(target.offset(df, dr), &[PieceType::King])) {
        return true;
    }

    let slider_hits = |directions: &[(i8, i8)], kinds: &[PieceType]| {
        directions.iter().any(|&(df, dr)| {
            let mut current = target;
            while let Some(next) = current.offset(df, dr) {
                if let Some(piece) = squares[next.index()] {
                    return piece.color == by && kinds.contains(&piece.piece_type);
                }
                current = next;
            }
            false
        })
    };

    slider_hits(&ROOK_DIRECTIONS, &[PieceType::Rook, PieceType::Queen])
        || slider_hits(&BISHOP_DIRECTIONS, &[PieceType::Bishop, PieceType::Queen])
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    fn sq(name: &str) -> Position {
        Position::from_algebraic(name).unwrap()
    }

    fn uci(board: &Board, notation: &str) -> Move {
        let wanted = Move::from_uci(notation).unwrap();
        board
            .legal_moves()
            .into_iter()
            .find(|mv| *mv == wanted)
            .unwrap_or_else(|| panic!("{notation} is not legal"))
    }

    fn perft(board: &mut Board, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let mut nodes = 0;
        for mv in board.legal_moves() {
            board.push_move(mv).unwrap();
            nodes += perft(board, depth - 1);
            board.undo_move().unwrap();
        }
        nodes
    }

    #[test]
    fn perft_starting_position() {
        let mut board = Board::new();
        assert_eq!(perft(&mut board, 1), 20);
        assert_eq!(perft(&mut board, 2), 400);
        assert_eq!(perft(&mut board, 3), 8_902);
    }

    #[test]
    fn perft_kiwipete() {
        let mut board = Board::from_fen(KIWIPETE).unwrap();
        assert_eq!(perft(&mut board, 1), 48);
        assert_eq!(perft(&mut board, 2), 2_039);
    }

    #[test]
    fn perft_en_passant_pins() {
        let mut board = Board::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        assert_eq!(perft(&mut board, 1), 14);
        assert_eq!(perft(&mut board, 2), 191);
        assert_eq!(perft(&mut board, 3), 2_812);
    }

    #[test]
    fn perft_promotions_and_castling() {
        let mut board = Board::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1").unwrap();
        assert_eq!(perft(&mut board, 1), 6);
        assert_eq!(perft(&mut board, 2), 264);

        let mut board = Board::from_fen("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8").unwrap();
        assert_eq!(perft(&mut board, 1), 44);
        assert_eq!(perft(&mut board, 2), 1_486);
    }

    #[test]
    fn fen_round_trip() {
        for fen in [START_FEN, KIWIPETE, "8/8/4k3/8/2pP4/8/8/4K3 b - d3 0 40"] {
            assert_eq!(Board::from_fen(fen).unwrap().to_fen(), fen);
        }
        assert_eq!(Board::new().to_fen(), START_FEN);
    }

    #[test]
    fn rejects_malformed_fen() {
        for fen in [
            "",
            "8/8/8/8/8/8/8 w - - 0 1",
            "9/8/8/8/8/8/8/8 w - - 0 1",
            "8/8/8/8/8/8/8/7X w - - 0 1",
            "8/8/8/8/8/8/8/8 x - - 0 1",
            "8/8/8/8/8/8/8/8 w Z - 0 1",
            "8/8/8/8/8/8/8/k0K6 w - - 0 1",
            "8/8/8/8/8/8/8/44k w - - 0 1",
        ] {
            assert!(Board::from_fen(fen).is_err(), "{fen:?} should be rejected");
        }

        // Enough digits to wrap a byte counter must not sneak back to eight files
        let long_rank = format!("{}3/8/8/8/8/8/8/8 w - - 0 1", "9".repeat(29));
        assert!(Board::from_fen(&long_rank).is_err());
    }

    #[test]
    fn undo_restores_exact_state() {
        let mut board = Board::from_fen(KIWIPETE).unwrap();
        let before = board.clone();
        for mv in before.legal_moves() {
            board.push_move(mv).unwrap();
            assert_eq!(board.undo_move().unwrap(), mv);
            assert_eq!(board, before, "undo of {mv} changed the board");
        }
        assert_eq!(board.undo_move(), Err(ChessError::NothingToUndo));
    }

    #[test]
    fn make_move_rejects_illegal_moves() {
        let mut board = Board::new();
        let illegal = Move::from_uci("e2e5").unwrap();
        assert_eq!(board.make_move(illegal), Err(ChessError::IllegalMove(illegal)));
        assert_eq!(board, Board::new());

        board.make_move(Move::from_uci("g1f3").unwrap()).unwrap();
        assert_eq!(board.current_turn(), Color::Black);
        assert_eq!(board.last_move().map(|mv| mv.to_string()), Some("g1f3".to_string()));
    }

    #[test]
    fn castling_moves_the_rook_and_clears_rights() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let castle = uci(&board, "e1g1");
        assert_eq!(castle.move_type, MoveType::Castle);
        board.make_move(castle).unwrap();

        assert_eq!(board.get_piece(sq("f1")), Some(Piece::new(PieceType::Rook, Color::White)));
        assert_eq!(board.get_piece(sq("h1")), None);
        assert!(!board.castling_rights().white_kingside);
        assert!(!board.castling_rights().white_queenside);
        assert!(board.castling_rights().black_queenside);

        board.make_move(uci(&board, "e8c8")).unwrap();
        assert_eq!(board.get_piece(sq("d8")), Some(Piece::new(PieceType::Rook, Color::Black)));
    }

    #[test]
    fn cannot_castle_through_check() {
        // Black rook on f8 covers f1
        let board = Board::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let moves = board.legal_moves();
        assert!(!moves.contains(&Move::new(sq("e1"), sq("g1"))));
        assert!(moves.contains(&Move::new(sq("e1"), sq("c1"))));
    }

    #[test]
    fn en_passant_capture_removes_the_pawn() {
        let mut board = Board::new();
        for notation in ["e2e4", "a7a6", "e4e5", "d7d5"] {
            board.make_move(Move::from_uci(notation).unwrap()).unwrap();
        }
        assert_eq!(board.en_passant(), Some(sq("d6")));

        let capture = uci(&board, "e5d6");
        assert_eq!(capture.move_type, MoveType::EnPassant);
        board.make_move(capture).unwrap();
        assert_eq!(board.get_piece(sq("d5")), None);
        assert_eq!(board.get_piece(sq("d6")), Some(Piece::new(PieceType::Pawn, Color::White)));
    }

    #[test]
    fn promotions_are_distinct_moves() {
        let board = Board::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
        let promotions: Vec<Move> = board
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.from == sq("a7"))
            .collect();
        let kinds: Vec<_> = promotions.iter().filter_map(|mv| mv.promotion).collect();
        assert_eq!(kinds, PieceType::PROMOTIONS.to_vec());
    }

    #[test]
    fn mobility_for_the_side_not_to_move() {
        let board = Board::new();
        assert_eq!(board.legal_moves_for(Color::Black).len(), 20);

        let mut after_e4 = Board::new();
        after_e4.make_move(Move::from_uci("e2e4").unwrap()).unwrap();
        assert_eq!(after_e4.legal_moves_for(Color::White).len(), 30);
        assert_eq!(after_e4.legal_moves().len(), 20);
    }

    #[test]
    fn detects_checkmate_and_stalemate() {
        let fools_mate = Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert!(fools_mate.is_checkmate());
        assert!(!fools_mate.is_stalemate());
        assert_eq!(fools_mate.outcome(), Some(Outcome::Checkmate { winner: Color::Black }));

        let stalemate = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(stalemate.is_stalemate());
        assert!(!stalemate.is_checkmate());
        assert_eq!(stalemate.outcome(), Some(Outcome::Stalemate));

        assert_eq!(Board::new().outcome(), None);
    }

    #[test]
    fn insufficient_material() {
        let cases = [
            ("8/8/4k3/8/8/3K4/8/8 w - - 0 1", true),
            ("8/8/4k3/8/8/3KN3/8/8 w - - 0 1", true),
            ("8/8/4k3/8/8/3KB3/8/8 w - - 0 1", true),
            // Bishops on e3 and c5, both dark squares
            ("8/8/4k3/2b5/8/3KB3/8/8 w - - 0 1", true),
            // Bishops on e3 (dark) and d5 (light)
            ("8/8/4k3/3b4/8/3KB3/8/8 w - - 0 1", false),
            ("8/8/4k3/3n4/8/3KN3/8/8 w - - 0 1", false),
            ("8/8/4k3/8/8/3KP3/8/8 w - - 0 1", false),
        ];
        for (fen, expected) in cases {
            let board = Board::from_fen(fen).unwrap();
            assert_eq!(board.has_insufficient_material(), expected, "{fen}");
        }
    }

    #[test]
    fn seventy_five_move_rule() {
        let board = Board::from_fen("8/8/4k3/8/8/3K4/8/R7 w - - 150 120").unwrap();
        assert_eq!(board.outcome(), Some(Outcome::SeventyFiveMoves));
    }

    #[test]
    fn fivefold_repetition() {
        let mut board = Board::new();
        for _ in 0..4 {
            for notation in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                assert!(!board.is_game_over());
                board.make_move(Move::from_uci(notation).unwrap()).unwrap();
            }
        }
        assert_eq!(board.repetition_count(), 5);
        assert_eq!(board.outcome(), Some(Outcome::FivefoldRepetition));
    }

    #[test]
    fn unusable_en_passant_square_does_not_split_repetitions() {
        // After 1. e4 nothing can take en passant, so shuffling the knights
        // back repeats the position reached right after the push
        let mut board = Board::new();
        board.make_move(Move::from_uci("e2e4").unwrap()).unwrap();
        assert_eq!(board.en_passant(), Some(Position::from_algebraic("e3").unwrap()));
        for notation in ["g8f6", "g1f3", "f6g8", "f3g1"] {
            board.make_move(Move::from_uci(notation).unwrap()).unwrap();
        }
        assert_eq!(board.repetition_count(), 2);

        let pushed = Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        let plain = Board::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        assert_eq!(pushed.position_key(), plain.position_key());
    }

    #[test]
    fn capturable_en_passant_square_counts() {
        let pushed = Board::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        let plain = Board::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - - 0 1").unwrap();
        assert_ne!(pushed.position_key(), plain.position_key());
    }

    #[test]
    fn ascii_diagram() {
        let diagram = Board::new().to_string();
        let lines: Vec<&str> = diagram.lines().collect();
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[7], "1  R N B Q K B N R");
        assert_eq!(lines[8], "   a b c d e f g h");
    }
}
