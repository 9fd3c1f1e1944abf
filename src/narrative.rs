// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Sample-count wording ("Two (02) concrete cubes").

use crate::specimen::SpecimenShape;

const COUNT_WORDS: [&str; 10] = [
    "One (01)",
    "Two (02)",
    "Three (03)",
    "Four (04)",
    "Five (05)",
    "Six (06)",
    "Seven (07)",
    "Eight (08)",
    "Nine (09)",
    "Ten (10)",
];

/// Count prefix for 1..=10, `"<n> samples"` otherwise.
///
/// # Examples
///
/// ```
/// use labcert::narrative::count_words;
/// assert_eq!(count_words(2), "Two (02)");
/// assert_eq!(count_words(11), "11 samples");
/// ```
pub fn count_words(count: usize) -> String {
    match count {
        1..=10 => COUNT_WORDS[count - 1].to_string(),
        n => format!("{} samples", n),
    }
}

/// Full sample description for a batch.
///
/// Counts covered by the word table get the shape noun appended; other counts fall back to the
/// plain `"<n> samples"` form.
pub fn sample_description(count: usize, shape: SpecimenShape) -> String {
    match count {
        1..=10 => format!("{} {}", count_words(count), shape.noun()),
        _ => count_words(count),
    }
}
