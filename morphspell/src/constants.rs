use crate::types::Weight;

/// Longest accepted word, in bytes of the dictionary encoding.
pub const MAX_WORD_LEN: usize = 256;

pub const DEFAULT_N_BEST: usize = 15;
pub const DEFAULT_MAX_CANDIDATES: usize = 20_000;

/// Weight of a suggestion produced by a `REP` replacement.
pub const REP_WEIGHT: Weight = 0.75;
