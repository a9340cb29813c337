// Copyright (c) 2017-2021 Fabian Schuiki

//! Symbol encoding
//!
//! This module turns one sample of a watched signal into the character that is
//! appended to its wave string. Unchanged values collapse into `.`, such that
//! the diagram only shows transitions.

use crate::{
    signal::{ColorTag, Edge, Encoding, WatchedSignal},
    value::{Logic, LogicValue},
};

/// One sample of a signal, as drawn in the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    /// The value did not change since the previous sample.
    Repeat,
    /// At least one bit is unknown.
    Unknown,
    /// At least one bit is at high impedance.
    HighZ,
    /// A single-bit level.
    Bit(bool),
    /// A new bus value, with its hexadecimal label.
    Bus(ColorTag, String),
    /// The start of a periodic clock waveform.
    Clock(Edge),
}

impl Symbol {
    /// The wave character of the symbol.
    pub fn wave_char(&self) -> char {
        match self {
            Symbol::Repeat => '.',
            Symbol::Unknown => 'x',
            Symbol::HighZ => 'z',
            Symbol::Bit(false) => '0',
            Symbol::Bit(true) => '1',
            Symbol::Bus(color, _) => color.to_char(),
            Symbol::Clock(Edge::Rising) => 'P',
            Symbol::Clock(Edge::Falling) => 'N',
        }
    }

    /// The data label the symbol contributes, if any.
    pub fn data_token(&self) -> Option<&str> {
        match self {
            Symbol::Bus(_, token) => Some(token),
            _ => None,
        }
    }
}

/// Encode the current value of a signal. Resolved values are remembered as
/// the signal's previous value.
///
/// Unresolved samples are drawn as `z` if any bit floats and `x` otherwise.
/// A resolved sample is drawn as `.` if the sample before it was the same
/// resolved value, and as a new level or bus segment otherwise. A clock is
/// drawn with its periodic symbol at its first resolved sample only.
pub fn encode(signal: &mut WatchedSignal, value: &LogicValue) -> Symbol {
    let current = match value.to_unsigned() {
        Some(v) => v,
        None => {
            signal.settled = false;
            return unresolved(value);
        }
    };
    let settled = std::mem::replace(&mut signal.settled, true);
    let previous = signal.previous.replace(value.clone());

    match signal.encoding {
        Encoding::Clock { edge, .. } => {
            if previous.is_some() {
                Symbol::Repeat
            } else {
                Symbol::Clock(edge)
            }
        }
        _ if settled && previous.as_ref() == Some(value) => Symbol::Repeat,
        Encoding::Scalar => Symbol::Bit(value.bit(0) == Logic::One),
        Encoding::Bus(color) => Symbol::Bus(color, format!("0x{:x}", current)),
    }
}

fn unresolved(value: &LogicValue) -> Symbol {
    if value.has_high_z() {
        Symbol::HighZ
    } else {
        Symbol::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        probe::SharedSignal,
        signal::{Registry, SignalOptions},
        trace::Trace,
    };
    use std::rc::Rc;

    /// Register a single signal and feed it a sequence of values.
    fn run(width: usize, options: SignalOptions, values: &[&str]) -> (String, Option<String>) {
        let mut trace = Trace::new();
        let mut reg = Registry::new();
        reg.register(&mut trace, vec![Rc::new(SharedSignal::new("s", width))], &options)
            .unwrap();
        let signal = &mut reg.signals_mut()[0];
        for v in values {
            let symbol = encode(signal, &v.parse().unwrap());
            trace.entry_mut(signal.slot()).push(&symbol);
        }
        let entry = trace.entry(signal.slot());
        (entry.wave().to_string(), entry.data().map(String::from))
    }

    #[test]
    fn repeated_value_collapses() {
        let (wave, _) = run(1, SignalOptions::data(), &["1", "1", "1", "1"]);
        assert_eq!(wave, "1...");
        let (wave, _) = run(1, SignalOptions::data(), &["0", "1", "1", "0", "0"]);
        assert_eq!(wave, "01.0.");
    }

    #[test]
    fn unresolved_then_zero_is_drawn() {
        let (wave, _) = run(1, SignalOptions::data(), &["x", "0", "z", "0"]);
        assert_eq!(wave, "x0z0");
    }

    #[test]
    fn repeated_unknown_is_redrawn() {
        let (wave, _) = run(1, SignalOptions::data(), &["x", "x", "1"]);
        assert_eq!(wave, "xx1");
    }

    #[test]
    fn bus_values_get_labels() {
        let (wave, data) = run(
            8,
            SignalOptions::data(),
            &["xxxxxxxx", "00001010", "00001010", "00001011"],
        );
        assert_eq!(wave, "x3.3");
        assert_eq!(data.as_deref(), Some("0xa 0xb "));
    }

    #[test]
    fn partially_floating_bus() {
        let (wave, data) = run(4, SignalOptions::data().color(6), &["1zz0", "1x00", "0000"]);
        assert_eq!(wave, "zx6");
        assert_eq!(data.as_deref(), Some("0x0 "));
    }

    #[test]
    fn clock_is_periodic() {
        let (wave, _) = run(1, SignalOptions::clock(Edge::Rising, 1.0), &["0", "0", "0"]);
        assert_eq!(wave, "P..");
        let (wave, _) = run(1, SignalOptions::clock(Edge::Falling, 1.0), &["1", "1"]);
        assert_eq!(wave, "N.");
    }

    #[test]
    fn clock_is_drawn_once() {
        let (wave, _) = run(1, SignalOptions::clock(Edge::Rising, 1.0), &["x", "1", "1", "z", "1"]);
        assert_eq!(wave, "xP.z.");
        let (wave, _) = run(1, SignalOptions::clock(Edge::Falling, 1.0), &["1", "1", "z", "1", "1"]);
        assert_eq!(wave, "N.z..");
    }

    #[test]
    fn resolved_value_after_unknown_is_redrawn() {
        let (wave, data) = run(4, SignalOptions::data(), &["0101", "x101", "0101", "0101"]);
        assert_eq!(wave, "3x3.");
        assert_eq!(data.as_deref(), Some("0x5 0x5 "));
    }

    #[test]
    fn previous_value_is_last_resolved() {
        let mut trace = Trace::new();
        let mut reg = Registry::new();
        reg.register(&mut trace, vec![Rc::new(SharedSignal::new("s", 2))], &SignalOptions::data())
            .unwrap();
        let signal = &mut reg.signals_mut()[0];
        assert_eq!(signal.previous_value(), None);
        encode(signal, &"zz".parse().unwrap());
        assert_eq!(signal.previous_value(), None);
        encode(signal, &"10".parse().unwrap());
        encode(signal, &"1x".parse().unwrap());
        assert_eq!(signal.previous_value(), Some(&"10".parse().unwrap()));
    }

    #[test]
    fn wide_bus_is_not_truncated() {
        let v = format!("1{}", "0".repeat(99));
        let (wave, data) = run(100, SignalOptions::data(), &[v.as_str()]);
        assert_eq!(wave, "3");
        assert_eq!(
            data.as_deref(),
            Some("0x8000000000000000000000000 ")
        );
    }

    #[test]
    fn symbol_characters() {
        assert_eq!(Symbol::Repeat.wave_char(), '.');
        assert_eq!(Symbol::Clock(Edge::Falling).wave_char(), 'N');
        assert_eq!(Symbol::Bit(false).data_token(), None);
    }
}
