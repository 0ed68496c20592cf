//! Natural ordering for filenames: digit runs compare numerically, so
//! `clip2.wav` sorts before `clip10.wav`.

use std::cmp::Ordering;

/// Sort names in place using [`natural_cmp`]. `sort_by` is stable, so names
/// that compare equal keep their original relative order.
pub fn natural_sort(names: &mut [String]) {
    names.sort_by(|a, b| natural_cmp(a, b));
}

/// Total order over strings: alternating digit/non-digit runs are compared
/// element-wise — digit runs as integers (leading zeros insignificant),
/// non-digit runs case-insensitively, digit runs ordering before text when
/// kinds differ. A fully tied token walk falls back to plain string order so
/// distinct names never compare equal.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut runs_a = Runs { rest: a };
    let mut runs_b = Runs { rest: b };

    loop {
        match (runs_a.next(), runs_b.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some((true, da)), Some((true, db))) => {
                let ord = cmp_digit_runs(da, db);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some((false, ta)), Some((false, tb))) => {
                let ord = cmp_text_runs(ta, tb);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some((true, _)), Some((false, _))) => return Ordering::Less,
            (Some((false, _)), Some((true, _))) => return Ordering::Greater,
        }
    }
}

/// Iterator over maximal runs of digits / non-digits.
struct Runs<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Runs<'a> {
    type Item = (bool, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let is_digit = first.is_ascii_digit();

        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != is_digit)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());

        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some((is_digit, run))
    }
}

/// Compare digit runs as integers of arbitrary length: strip leading zeros,
/// then shorter-means-smaller, then lexicographic.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cmp_text_runs(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
