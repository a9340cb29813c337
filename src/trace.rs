// Copyright (c) 2017-2021 Fabian Schuiki

//! Trace assembly
//!
//! The [`Trace`] accumulates the wave string of every watched signal as the
//! sampler runs. Its serialized form is a WaveDrom description (WaveJSON):
//!
//! ```text
//! { "signal": [ {"name": .., "wave": .., "data": ..}, ["group", {..}, ..] ],
//!   "config": {"hscale": 2},
//!   "head": {"text": .., "tick": 0, "every": 1},
//!   "foot": {"text": .., "tick": 0, "every": 1} }
//! ```

use crate::{encoder::Symbol, error::Result};
use serde::{
    ser::{SerializeSeq, Serializer},
    Serialize,
};
use std::fmt;

/// The row of a single signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEntry {
    name: String,
    wave: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<f64>,
    #[serde(skip)]
    width: usize,
}

impl SignalEntry {
    /// Create an empty row. Rows with `data` collect a label for every bus
    /// segment.
    pub fn new(name: &str, width: usize, data: bool) -> SignalEntry {
        SignalEntry {
            name: name.to_string(),
            wave: String::new(),
            data: if data { Some(String::new()) } else { None },
            period: None,
            width,
        }
    }

    /// Append one sample.
    pub fn push(&mut self, symbol: &Symbol) {
        self.wave.push(symbol.wave_char());
        if let (Some(data), Some(token)) = (self.data.as_mut(), symbol.data_token()) {
            data.push_str(token);
            data.push(' ');
        }
    }

    /// Attach the clock period. Only the first call has an effect.
    pub fn set_period(&mut self, period: f64) {
        if self.period.is_none() {
            self.period = Some(period);
        }
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wave string, one character per sample.
    pub fn wave(&self) -> &str {
        &self.wave
    }

    /// The space-terminated data labels of a bus.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// The clock period, once known.
    pub fn period(&self) -> Option<f64> {
        self.period
    }

    /// The width of the signal in bits.
    pub fn width(&self) -> usize {
        self.width
    }

    fn annotate_width(&mut self) {
        if self.width > 1 {
            self.name = format!("{}[{}:0]", self.name, self.width - 1);
        }
    }
}

/// A top-level row of the diagram.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// A single signal.
    Signal(SignalEntry),
    /// A labeled bundle of signals, drawn nested under the label.
    Group(String, Vec<SignalEntry>),
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Row::Signal(entry) => entry.serialize(serializer),
            Row::Group(label, entries) => {
                let mut seq = serializer.serialize_seq(Some(entries.len() + 1))?;
                seq.serialize_element(label)?;
                for entry in entries {
                    seq.serialize_element(entry)?;
                }
                seq.end()
            }
        }
    }
}

/// The location of a signal's row in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryRef {
    row: usize,
    member: Option<usize>,
}

/// Diagram-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Horizontal scale of each sample.
    pub hscale: u32,
}

/// A caption above or below the diagram, with optional tick marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caption {
    /// The caption text.
    pub text: String,
    /// The number of the first tick mark.
    pub tick: i64,
    /// Draw a tick mark every `every` samples.
    pub every: u32,
}

impl Caption {
    /// Create a new caption.
    pub fn new(text: impl Into<String>, tick: i64, every: u32) -> Caption {
        Caption {
            text: text.into(),
            tick,
            every,
        }
    }
}

/// A waveform capture.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trace {
    signal: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<Config>,
    #[serde(skip_serializing_if = "Option::is_none")]
    head: Option<Caption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    foot: Option<Caption>,
    #[serde(skip)]
    finalized: bool,
}

impl Trace {
    /// Create an empty trace.
    pub fn new() -> Trace {
        Default::default()
    }

    /// Append a standalone row.
    pub fn push(&mut self, entry: SignalEntry) -> EntryRef {
        self.signal.push(Row::Signal(entry));
        EntryRef {
            row: self.signal.len() - 1,
            member: None,
        }
    }

    /// Append a row to the group `label`, creating the group at the end of the
    /// trace if it does not exist yet.
    pub fn push_grouped(&mut self, label: &str, entry: SignalEntry) -> EntryRef {
        let existing = self
            .signal
            .iter()
            .position(|row| matches!(row, Row::Group(l, _) if l == label));
        let row = match existing {
            Some(row) => row,
            None => {
                self.signal.push(Row::Group(label.to_string(), vec![]));
                self.signal.len() - 1
            }
        };
        match self.signal[row] {
            Row::Group(_, ref mut entries) => {
                entries.push(entry);
                EntryRef {
                    row,
                    member: Some(entries.len() - 1),
                }
            }
            Row::Signal(_) => unreachable!("row {} is not a group", row),
        }
    }

    /// Access a signal's row.
    pub fn entry(&self, at: EntryRef) -> &SignalEntry {
        match (&self.signal[at.row], at.member) {
            (Row::Signal(e), None) => e,
            (Row::Group(_, entries), Some(i)) => &entries[i],
            _ => panic!("stale entry reference {:?}", at),
        }
    }

    /// Mutably access a signal's row.
    pub fn entry_mut(&mut self, at: EntryRef) -> &mut SignalEntry {
        match (&mut self.signal[at.row], at.member) {
            (Row::Signal(e), None) => e,
            (Row::Group(_, entries), Some(i)) => &mut entries[i],
            _ => panic!("stale entry reference {:?}", at),
        }
    }

    /// Iterate over every signal row, descending into groups.
    pub fn entries(&self) -> impl Iterator<Item = &SignalEntry> {
        self.signal.iter().flat_map(|row| match row {
            Row::Signal(e) => std::slice::from_ref(e).iter(),
            Row::Group(_, entries) => entries.iter(),
        })
    }

    /// Find a signal row by display name.
    pub fn find(&self, name: &str) -> Option<&SignalEntry> {
        self.entries().find(|e| e.name == name)
    }

    /// The top-level rows.
    pub fn rows(&self) -> &[Row] {
        &self.signal
    }

    /// Freeze the trace. Multi-bit signal names are annotated with their bit
    /// range and the diagram settings are attached. Returns `false` if the
    /// trace was already finalized, in which case nothing changes.
    pub fn finalize(&mut self, config: Config, head: Caption, foot: Caption) -> bool {
        if self.finalized {
            return false;
        }
        self.finalized = true;
        for row in &mut self.signal {
            match row {
                Row::Signal(e) => e.annotate_width(),
                Row::Group(_, entries) => entries.iter_mut().for_each(|e| e.annotate_width()),
            }
        }
        self.config = Some(config);
        self.head = Some(head);
        self.foot = Some(foot);
        true
    }

    /// Check whether the trace has been finalized.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The diagram settings, once finalized.
    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    /// The head caption, once finalized.
    pub fn head(&self) -> Option<&Caption> {
        self.head.as_ref()
    }

    /// The foot caption, once finalized.
    pub fn foot(&self) -> Option<&Caption> {
        self.foot.as_ref()
    }

    /// Serialize the trace as compact WaveJSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize the trace as WaveJSON indented by four spaces.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}
