// Copyright (c) 2017-2021 Fabian Schuiki

//! Four-state logic values
//!
//! This module implements the representation of signal values as they are
//! observed during a simulation. Every bit is one of `0`, `1`, `x`, or `z`. The
//! value is stored as three arbitrary-precision bit planes, such that signals
//! of any width can be sampled and compared.

use crate::error::{Error, Result};
use num::{BigUint, One, Zero};
use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

/// The level of a single bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Logic {
    /// Driven low.
    Zero,
    /// Driven high.
    One,
    /// Unknown or conflicting drivers.
    X,
    /// High impedance; not driven at all.
    Z,
}

impl Logic {
    /// Parse a logic level from its character representation.
    ///
    /// Accepts `0`, `1`, `x`, `z`, and the weak/uninitialized levels `u`, `w`,
    /// and `-`, which all read as `x`. `l` and `h` read as `0` and `1`.
    pub fn from_char(c: char) -> Option<Logic> {
        match c {
            '0' | 'l' | 'L' => Some(Logic::Zero),
            '1' | 'h' | 'H' => Some(Logic::One),
            'x' | 'X' | 'u' | 'U' | 'w' | 'W' | '-' => Some(Logic::X),
            'z' | 'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// The character used to print this level.
    pub fn to_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'x',
            Logic::Z => 'z',
        }
    }

    /// Check whether the bit is driven to a definite 0 or 1.
    pub fn is_resolved(self) -> bool {
        match self {
            Logic::Zero | Logic::One => true,
            Logic::X | Logic::Z => false,
        }
    }
}

impl From<bool> for Logic {
    fn from(v: bool) -> Logic {
        if v {
            Logic::One
        } else {
            Logic::Zero
        }
    }
}

/// A four-state value of a fixed bit width.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LogicValue {
    width: usize,
    /// Bits that read as `1`. Always clear where `unknown` is set.
    value: BigUint,
    /// Bits that read as `x` or `z`.
    unknown: BigUint,
    /// Bits that read as `z`. Always a subset of `unknown`.
    high_z: BigUint,
}

impl LogicValue {
    /// Create a fully resolved value from a `usize`.
    pub fn from_usize(width: usize, value: usize) -> Self {
        Self::from_unsigned(width, value.into())
    }

    /// Create a fully resolved value from an unsigned `BigUint`. Bits beyond
    /// `width` are discarded.
    pub fn from_unsigned(width: usize, value: BigUint) -> Self {
        let value = value % (BigUint::one() << width);
        Self {
            width,
            value,
            unknown: BigUint::zero(),
            high_z: BigUint::zero(),
        }
    }

    /// Create a value with every bit unknown.
    pub fn unknown(width: usize) -> Self {
        Self {
            width,
            value: BigUint::zero(),
            unknown: mask(width),
            high_z: BigUint::zero(),
        }
    }

    /// Create a value with every bit at high impedance.
    pub fn high_z(width: usize) -> Self {
        Self {
            width,
            value: BigUint::zero(),
            unknown: mask(width),
            high_z: mask(width),
        }
    }

    /// Create a value from a sequence of bits, most significant bit first.
    ///
    /// If fewer than `width` bits are given, the value is left-extended: with
    /// `0` if the leftmost given bit is resolved, otherwise with the leftmost
    /// bit itself. If more bits are given, only the rightmost `width` are kept.
    pub fn from_bits_msb<I>(width: usize, bits: I) -> Self
    where
        I: IntoIterator<Item = Logic>,
    {
        let bits: Vec<Logic> = bits.into_iter().collect();
        let fill = match bits.first() {
            Some(&b) if !b.is_resolved() => b,
            _ => Logic::Zero,
        };
        let mut result = Self::from_usize(width, 0);
        for i in 0..width {
            let bit = if i < bits.len() {
                bits[bits.len() - 1 - i]
            } else {
                fill
            };
            result.set_bit(i, bit);
        }
        result
    }

    /// The width of the value in bits.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the level of bit `index`, where bit 0 is the least significant.
    pub fn bit(&self, index: usize) -> Logic {
        let m = BigUint::one() << index;
        if !(&self.high_z & &m).is_zero() {
            Logic::Z
        } else if !(&self.unknown & &m).is_zero() {
            Logic::X
        } else if !(&self.value & &m).is_zero() {
            Logic::One
        } else {
            Logic::Zero
        }
    }

    /// Change the level of bit `index`.
    pub fn set_bit(&mut self, index: usize, bit: Logic) {
        assert!(index < self.width, "bit {} out of range", index);
        let m = BigUint::one() << index;
        let keep = mask(self.width) ^ &m;
        self.value &= &keep;
        self.unknown &= &keep;
        self.high_z &= &keep;
        match bit {
            Logic::Zero => (),
            Logic::One => self.value |= m,
            Logic::X => self.unknown |= m,
            Logic::Z => {
                self.unknown |= &m;
                self.high_z |= m;
            }
        }
    }

    /// Check whether every bit is driven to a definite 0 or 1.
    pub fn is_resolved(&self) -> bool {
        self.unknown.is_zero()
    }

    /// Check whether any bit is at high impedance.
    pub fn has_high_z(&self) -> bool {
        !self.high_z.is_zero()
    }

    /// The integer the value represents, if it is fully resolved.
    pub fn to_unsigned(&self) -> Option<&BigUint> {
        if self.is_resolved() {
            Some(&self.value)
        } else {
            None
        }
    }

    /// Check whether the value is resolved and equal to `other`.
    pub fn eq_unsigned(&self, other: &BigUint) -> bool {
        self.to_unsigned().map(|v| v == other).unwrap_or(false)
    }
}

fn mask(width: usize) -> BigUint {
    (BigUint::one() << width) - BigUint::one()
}

impl FromStr for LogicValue {
    type Err = Error;

    /// Parse a binary string such as `"10xz"`, most significant bit first.
    /// Underscores are ignored.
    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .chars()
            .filter(|&c| c != '_')
            .map(|c| Logic::from_char(c).ok_or(Error::InvalidLogic(c)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_bits_msb(bits.len(), bits))
    }
}

impl Display for LogicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.bit(i).to_char())?;
        }
        Ok(())
    }
}

impl Debug for LogicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "l{} {}", self.width, self)
    }
}

impl From<(usize, usize)> for LogicValue {
    fn from(v: (usize, usize)) -> Self {
        LogicValue::from_usize(v.0, v.1)
    }
}

impl From<(usize, BigUint)> for LogicValue {
    fn from(v: (usize, BigUint)) -> Self {
        LogicValue::from_unsigned(v.0, v.1)
    }
}
