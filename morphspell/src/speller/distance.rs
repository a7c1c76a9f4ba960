//! Weighted edit distance used to rank suggestions.

use crate::affix::AffixData;
use crate::types::Weight;

const FULL: Weight = 1.0;
const CHEAP: Weight = 0.5;

/// Characters next to `ch` on the same keyboard row.
pub(crate) fn keyboard_neighbors(keyboard: &[Vec<char>], ch: char) -> Vec<char> {
    let mut out = vec![];
    for row in keyboard {
        for (i, c) in row.iter().enumerate() {
            if *c != ch {
                continue;
            }
            if i > 0 {
                out.push(row[i - 1]);
            }
            if let Some(next) = row.get(i + 1) {
                out.push(*next);
            }
        }
    }
    out
}

fn adjacent(keyboard: &[Vec<char>], a: char, b: char) -> bool {
    keyboard.iter().any(|row| {
        row.windows(2)
            .any(|pair| (pair[0] == a && pair[1] == b) || (pair[0] == b && pair[1] == a))
    })
}

fn related(affix: &AffixData, a: char, b: char) -> bool {
    affix.related.iter().any(|group| {
        let has = |c: char| group.iter().any(|s| s.chars().eq(std::iter::once(c)));
        has(a) && has(b)
    })
}

fn same_letter(a: char, b: char) -> bool {
    a.to_lowercase().eq(b.to_lowercase())
}

pub(crate) fn substitution_cost(affix: &AffixData, a: char, b: char) -> Weight {
    if a == b {
        0.0
    } else if same_letter(a, b) || adjacent(&affix.keyboard, a, b) || related(affix, a, b) {
        CHEAP
    } else {
        FULL
    }
}

/// Optimal string alignment distance where substitutions of related
/// characters cost half as much as other edits.
pub(crate) fn weighted_distance(affix: &AffixData, a: &str, b: &str) -> Weight {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());

    let mut d = vec![vec![0.0 as Weight; m + 1]; n + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i as Weight;
    }
    for j in 0..=m {
        d[0][j] = j as Weight;
    }

    for i in 1..=n {
        for j in 1..=m {
            let mut best = (d[i - 1][j] + FULL)
                .min(d[i][j - 1] + FULL)
                .min(d[i - 1][j - 1] + substitution_cost(affix, a[i - 1], b[j - 1]));

            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[i - 2][j - 2] + FULL);
            }

            d[i][j] = best;
        }
    }

    d[n][m]
}
