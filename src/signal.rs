// Copyright (c) 2017-2021 Fabian Schuiki

//! Signal registration
//!
//! Every signal the sampler watches is described by a [`WatchedSignal`]. The
//! [`Registry`] keeps these records in registration order, validates new
//! registrations, hands out bus colors, and allocates a row for each signal in
//! the trace.

use crate::{
    error::{Error, Result},
    probe::ProbeRef,
    trace::{EntryRef, SignalEntry, Trace},
    value::{Logic, LogicValue},
};
use itertools::Itertools;
use std::{collections::HashSet, fmt};

/// A clock transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// A transition to `1`.
    Rising,
    /// A transition to `0`.
    Falling,
}

impl Edge {
    /// The transition in the other direction.
    pub fn opposite(self) -> Edge {
        match self {
            Edge::Rising => Edge::Falling,
            Edge::Falling => Edge::Rising,
        }
    }

    /// Determine which transition, if any, a clock made between two samples.
    /// Only the least significant bit is considered.
    pub fn between(prev: &LogicValue, now: &LogicValue) -> Option<Edge> {
        if now.width() == 0 || prev.width() == 0 {
            return None;
        }
        match (prev.bit(0), now.bit(0)) {
            (p, Logic::One) if p != Logic::One => Some(Edge::Rising),
            (p, Logic::Zero) if p != Logic::Zero => Some(Edge::Falling),
            _ => None,
        }
    }
}

impl Default for Edge {
    fn default() -> Edge {
        Edge::Rising
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Edge::Rising => write!(f, "posedge"),
            Edge::Falling => write!(f, "negedge"),
        }
    }
}

/// The color of a bus in the rendered diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorTag(u8);

impl ColorTag {
    /// The lowest color index available for buses.
    pub const MIN: u8 = 2;
    /// The highest color index available for buses.
    pub const MAX: u8 = 9;

    /// Create a color tag, rejecting indices outside the renderer's palette.
    pub fn new(index: u8) -> Result<ColorTag> {
        if index >= Self::MIN && index <= Self::MAX {
            Ok(ColorTag(index))
        } else {
            Err(Error::InvalidColor(index))
        }
    }

    /// The palette index.
    pub fn index(self) -> u8 {
        self.0
    }

    /// The wave character that selects this color.
    pub fn to_char(self) -> char {
        (b'0' + self.0) as char
    }
}

/// Automatic bus color assignment.
///
/// Colors are handed out starting at index 3. Once the counter reaches the
/// last palette index, every further bus gets color 3.
#[derive(Debug, Clone)]
pub struct Palette {
    next: u8,
}

impl Palette {
    const FIRST: u8 = 3;

    /// Create a palette positioned at its first color.
    pub fn new() -> Palette {
        Palette { next: Self::FIRST }
    }

    /// Hand out the next color.
    pub fn allocate(&mut self) -> ColorTag {
        if self.next >= ColorTag::MAX {
            return ColorTag(Self::FIRST);
        }
        let tag = ColorTag(self.next);
        self.next += 1;
        tag
    }
}

impl Default for Palette {
    fn default() -> Palette {
        Palette::new()
    }
}

/// The role a signal plays in the diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    /// A clock, drawn as a periodic waveform.
    Clock {
        /// The edge the clock is drawn to be active on.
        edge: Edge,
        /// The clock period relative to the sampling clock.
        period: f64,
    },
    /// Any other signal.
    Data,
}

/// Options for registering signals.
#[derive(Debug, Clone)]
pub struct SignalOptions {
    /// The role of the signals.
    pub role: Role,
    /// The group the signals are nested under, if any.
    pub group: Option<String>,
    /// A fixed bus color; assigned automatically if absent.
    pub color: Option<u8>,
}

impl SignalOptions {
    /// Options for plain data signals.
    pub fn data() -> SignalOptions {
        SignalOptions {
            role: Role::Data,
            group: None,
            color: None,
        }
    }

    /// Options for a clock active on `edge` with the given period.
    pub fn clock(edge: Edge, period: f64) -> SignalOptions {
        SignalOptions {
            role: Role::Clock { edge, period },
            group: None,
            color: None,
        }
    }

    /// Nest the signals under a group.
    pub fn group(mut self, label: impl Into<String>) -> SignalOptions {
        self.group = Some(label.into());
        self
    }

    /// Use a fixed bus color.
    pub fn color(mut self, index: u8) -> SignalOptions {
        self.color = Some(index);
        self
    }
}

impl Default for SignalOptions {
    fn default() -> SignalOptions {
        SignalOptions::data()
    }
}

/// How a signal's samples are turned into wave characters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoding {
    /// A clock drawn with a periodic symbol.
    Clock {
        /// The edge the clock is drawn to be active on.
        edge: Edge,
        /// The clock period relative to the sampling clock.
        period: f64,
    },
    /// A single-bit signal drawn as `0`/`1`.
    Scalar,
    /// A multi-bit signal drawn as colored bus segments with data labels.
    Bus(ColorTag),
}

/// A signal the sampler observes.
pub struct WatchedSignal {
    pub(crate) probe: ProbeRef,
    pub(crate) name: String,
    pub(crate) width: usize,
    pub(crate) encoding: Encoding,
    pub(crate) group: Option<String>,
    /// The last resolved value sampled. Only the encoder changes this.
    pub(crate) previous: Option<LogicValue>,
    /// Whether the last sample was resolved.
    pub(crate) settled: bool,
    pub(crate) slot: EntryRef,
}

impl WatchedSignal {
    /// The signal's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The signal's width in bits.
    pub fn width(&self) -> usize {
        self.width
    }

    /// How the signal is drawn.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The group the signal is nested under.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The bus color, for multi-bit data signals.
    pub fn color(&self) -> Option<ColorTag> {
        match self.encoding {
            Encoding::Bus(c) => Some(c),
            _ => None,
        }
    }

    /// The last resolved value sampled.
    pub fn previous_value(&self) -> Option<&LogicValue> {
        self.previous.as_ref()
    }

    /// The row this signal occupies in the trace.
    pub fn slot(&self) -> EntryRef {
        self.slot
    }
}

impl fmt::Debug for WatchedSignal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: i{} {:?}", self.name, self.width, self.encoding)
    }
}

/// The set of watched signals, in registration order.
#[derive(Default)]
pub struct Registry {
    signals: Vec<WatchedSignal>,
    names: HashSet<String>,
    palette: Palette,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Registry {
        Default::default()
    }

    /// Register a batch of signals and allocate their rows in `trace`.
    ///
    /// The batch is validated as a whole before anything is added: it must
    /// not be empty, every signal must be at least one bit wide, names must be
    /// unique across the registry and the batch, and a fixed color must be a
    /// valid palette index.
    pub fn register(
        &mut self,
        trace: &mut Trace,
        probes: Vec<ProbeRef>,
        options: &SignalOptions,
    ) -> Result<()> {
        if probes.is_empty() {
            return Err(Error::EmptyRegistration);
        }
        let color = options.color.map(ColorTag::new).transpose()?;
        let mut batch = HashSet::new();
        for probe in &probes {
            let name = probe.name();
            if probe.width() == 0 {
                return Err(Error::ZeroWidth(name.to_string()));
            }
            if self.names.contains(name) || !batch.insert(name) {
                return Err(Error::DuplicateSignal(name.to_string()));
            }
        }

        for probe in probes {
            let name = probe.name().to_string();
            let width = probe.width();
            let encoding = match options.role {
                Role::Clock { edge, period } => Encoding::Clock { edge, period },
                Role::Data if width == 1 => Encoding::Scalar,
                Role::Data => Encoding::Bus(match color {
                    Some(c) => c,
                    None => self.palette.allocate(),
                }),
            };
            let entry = SignalEntry::new(&name, width, matches!(encoding, Encoding::Bus(_)));
            let slot = match options.group {
                Some(ref label) => trace.push_grouped(label, entry),
                None => trace.push(entry),
            };
            debug!(
                "Watching {} (i{}, {:?}{})",
                name,
                width,
                encoding,
                options
                    .group
                    .as_ref()
                    .map(|g| format!(", group {}", g))
                    .unwrap_or_default()
            );
            self.names.insert(name.clone());
            self.signals.push(WatchedSignal {
                probe,
                name,
                width,
                encoding,
                group: options.group.clone(),
                previous: None,
                settled: false,
                slot,
            });
        }
        Ok(())
    }

    /// The watched signals, in registration order.
    pub fn signals(&self) -> &[WatchedSignal] {
        &self.signals
    }

    /// Mutable access to the watched signals, in registration order.
    pub fn signals_mut(&mut self) -> &mut [WatchedSignal] {
        &mut self.signals
    }

    /// Find a watched signal by name.
    pub fn get(&self, name: &str) -> Option<&WatchedSignal> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// The number of watched signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Check whether no signals are watched.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.signals.iter().map(|s| &s.name).join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::SharedSignal;
    use std::rc::Rc;

    fn probe(name: &str, width: usize) -> ProbeRef {
        Rc::new(SharedSignal::new(name, width))
    }

    #[test]
    fn palette_sticks_to_first_color() {
        let mut p = Palette::new();
        let tags: Vec<u8> = (0..9).map(|_| p.allocate().index()).collect();
        assert_eq!(tags, vec![3, 4, 5, 6, 7, 8, 3, 3, 3]);
    }

    #[test]
    fn color_range() {
        assert!(ColorTag::new(2).is_ok());
        assert!(ColorTag::new(9).is_ok());
        assert!(matches!(ColorTag::new(1), Err(Error::InvalidColor(1))));
        assert!(matches!(ColorTag::new(10), Err(Error::InvalidColor(10))));
        assert_eq!(ColorTag::new(7).unwrap().to_char(), '7');
    }

    #[test]
    fn buses_get_colors_scalars_do_not() {
        let mut trace = Trace::new();
        let mut reg = Registry::new();
        reg.register(
            &mut trace,
            vec![probe("valid", 1), probe("addr", 32), probe("data", 8)],
            &SignalOptions::data(),
        )
        .unwrap();
        reg.register(&mut trace, vec![probe("resp", 2)], &SignalOptions::data().color(9))
            .unwrap();
        let colors: Vec<_> = reg.signals().iter().map(|s| s.color().map(|c| c.index())).collect();
        assert_eq!(colors, vec![None, Some(3), Some(4), Some(9)]);
        assert_eq!(reg.get("valid").unwrap().encoding(), Encoding::Scalar);
    }

    #[test]
    fn clocks_are_never_buses() {
        let mut trace = Trace::new();
        let mut reg = Registry::new();
        reg.register(
            &mut trace,
            vec![probe("clk", 1)],
            &SignalOptions::clock(Edge::Falling, 0.5),
        )
        .unwrap();
        assert_eq!(
            reg.signals()[0].encoding(),
            Encoding::Clock {
                edge: Edge::Falling,
                period: 0.5
            }
        );
        assert_eq!(reg.signals()[0].color(), None);
    }

    #[test]
    fn rejects_duplicates_atomically() {
        let mut trace = Trace::new();
        let mut reg = Registry::new();
        reg.register(&mut trace, vec![probe("a", 1)], &SignalOptions::data())
            .unwrap();
        let err = reg
            .register(&mut trace, vec![probe("b", 1), probe("a", 4)], &SignalOptions::data())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSignal(ref n) if n == "a"));
        assert_eq!(reg.len(), 1);
        assert_eq!(trace.entries().count(), 1);

        let err = reg
            .register(&mut trace, vec![probe("c", 1), probe("c", 1)], &SignalOptions::data())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSignal(_)));
    }

    #[test]
    fn rejects_empty_and_zero_width() {
        let mut trace = Trace::new();
        let mut reg = Registry::new();
        assert!(matches!(
            reg.register(&mut trace, vec![], &SignalOptions::data()),
            Err(Error::EmptyRegistration)
        ));
        assert!(matches!(
            reg.register(&mut trace, vec![probe("w", 0)], &SignalOptions::data()),
            Err(Error::ZeroWidth(_))
        ));
        assert!(matches!(
            reg.register(&mut trace, vec![probe("w", 4)], &SignalOptions::data().color(0)),
            Err(Error::InvalidColor(0))
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn edges_between_samples() {
        let zero = LogicValue::from_usize(1, 0);
        let one = LogicValue::from_usize(1, 1);
        let x = LogicValue::unknown(1);
        assert_eq!(Edge::between(&zero, &one), Some(Edge::Rising));
        assert_eq!(Edge::between(&one, &zero), Some(Edge::Falling));
        assert_eq!(Edge::between(&x, &one), Some(Edge::Rising));
        assert_eq!(Edge::between(&one, &one), None);
        assert_eq!(Edge::between(&one, &x), None);
        assert_eq!(Edge::Rising.opposite(), Edge::Falling);
    }
}
