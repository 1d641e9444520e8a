/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Integer helpers for cycle derivation.
//!
//! The major cycle is an LCM, the base unit a GCD, and the frame length is
//! rounded up to a divisor of the major cycle.

use crate::error::InvalidInput;

/// Greatest common divisor (Euclid).  `gcd(0, x) == x`.
pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut x, mut y) = (a, b);
    while y > 0 {
        (x, y) = (y, x % y);
    }
    x
}

/// Least common multiple, or [`InvalidInput::CycleOverflow`] when it does not
/// fit in `u64`.  Zero if either operand is zero.
pub fn lcm(a: u64, b: u64) -> Result<u64, InvalidInput> {
    match gcd(a, b) {
        0 => Ok(0),
        g => (a / g)
            .checked_mul(b)
            .ok_or(InvalidInput::CycleOverflow { a, b }),
    }
}

/// LCM of every period; zero for an empty slice.
pub fn lcm_of_slice(periods: &[u64]) -> Result<u64, InvalidInput> {
    let Some((&head, rest)) = periods.split_first() else {
        return Ok(0);
    };
    rest.iter().try_fold(head, |acc, &p| lcm(acc, p))
}

/// GCD of every period; zero for an empty slice.
pub fn gcd_of_slice(periods: &[u64]) -> u64 {
    periods.iter().copied().reduce(gcd).unwrap_or(0)
}

/// Smallest divisor of `n` that is `>= floor`, found by walking divisor pairs
/// up to `√n`.  `None` when `n == 0` or `floor > n`.
pub fn smallest_divisor_at_least(n: u64, floor: u64) -> Option<u64> {
    if n == 0 || floor > n {
        return None;
    }

    (1..)
        .take_while(|&d: &u64| d <= n / d)
        .filter(|&d| n % d == 0)
        .flat_map(|d| [d, n / d])
        .filter(|&d| d >= floor)
        .min()
}
