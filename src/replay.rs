// Copyright (c) 2017-2021 Fabian Schuiki

//! Replaying a Value Change Dump.
//!
//! [`VcdReplay`] stands in for a live simulation: it reads a VCD file one
//! timestamp at a time and applies the value changes to the probes that were
//! requested from it. This allows waveforms to be drawn from recorded
//! simulations.

use crate::{
    error::{Error, Result},
    probe::{Probe, SharedSignal},
    sampler::Scheduler,
    value::{Logic, LogicValue},
};
use std::{collections::HashMap, io};
use vcd::{IdCode, ScopeItem};

/// A scheduler that replays a VCD file.
pub struct VcdReplay<R: io::Read> {
    parser: vcd::Parser<R>,
    header: vcd::Header,
    probes: HashMap<IdCode, Vec<SharedSignal>>,
    time: u64,
    next_time: Option<u64>,
    done: bool,
}

impl<R: io::Read> VcdReplay<R> {
    /// Read the header of a dump.
    pub fn new(reader: R) -> Result<VcdReplay<R>> {
        let mut parser = vcd::Parser::new(reader);
        let header = parser.parse_header().map_err(dump_error)?;
        Ok(VcdReplay {
            parser,
            header,
            probes: HashMap::new(),
            time: 0,
            next_time: None,
            done: false,
        })
    }

    /// Get a probe for the variable at the dot-separated hierarchical `path`,
    /// for example `top.dut.clk`. The probe is named after the last path
    /// component.
    pub fn probe(&mut self, path: &str) -> Result<SharedSignal> {
        let parts: Vec<&str> = path.split('.').collect();
        let (code, width, name) = find_var(&self.header.items, &parts)
            .map(|v| (v.code, v.size as usize, v.reference.clone()))
            .ok_or_else(|| Error::UnknownVariable(path.to_string()))?;
        let probe = SharedSignal::new(name, width);
        debug!("Replaying {} as {:?} (i{})", path, code, width);
        self.probes
            .entry(code)
            .or_insert_with(Vec::new)
            .push(probe.clone());
        Ok(probe)
    }

    /// The time of the last applied timestamp, in units of the timescale.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// The timescale declared by the dump.
    pub fn timescale(&self) -> Option<(u32, vcd::TimescaleUnit)> {
        self.header.timescale
    }

    fn apply(&self, code: IdCode, bits: &[vcd::Value]) -> Result<()> {
        if let Some(probes) = self.probes.get(&code) {
            for probe in probes {
                let width = probe.value().width();
                let value = LogicValue::from_bits_msb(width, bits.iter().map(|&b| logic(b)));
                trace!("{} = {} @ {}", probe.name(), value, self.time);
                probe.set(value)?;
            }
        }
        Ok(())
    }
}

impl<R: io::Read> Scheduler for VcdReplay<R> {
    /// Apply all changes of the next timestamp.
    fn advance(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if let Some(t) = self.next_time.take() {
            self.time = t;
        }
        let mut changed = false;
        while let Some(command) = self.parser.next() {
            match command.map_err(dump_error)? {
                vcd::Command::Timestamp(t) if changed => {
                    self.next_time = Some(t);
                    return Ok(true);
                }
                vcd::Command::Timestamp(t) => self.time = t,
                vcd::Command::ChangeScalar(code, v) => {
                    self.apply(code, &[v])?;
                    changed = true;
                }
                vcd::Command::ChangeVector(code, bits) => {
                    self.apply(code, &bits)?;
                    changed = true;
                }
                _ => (),
            }
        }
        self.done = true;
        Ok(changed)
    }
}

fn find_var<'a>(items: &'a [ScopeItem], path: &[&str]) -> Option<&'a vcd::Var> {
    let (first, rest) = path.split_first()?;
    items.iter().find_map(|item| match item {
        ScopeItem::Scope(scope) if scope.identifier == *first && !rest.is_empty() => {
            find_var(&scope.children, rest)
        }
        ScopeItem::Var(var) if rest.is_empty() && base_name(&var.reference) == *first => {
            Some(var)
        }
        _ => None,
    })
}

/// Strip a trailing bit range such as `[7:0]` from a variable reference.
fn base_name(reference: &str) -> &str {
    match reference.find('[') {
        Some(i) => reference[..i].trim_end(),
        None => reference,
    }
}

fn logic(v: vcd::Value) -> Logic {
    match v {
        vcd::Value::V0 => Logic::Zero,
        vcd::Value::V1 => Logic::One,
        vcd::Value::X => Logic::X,
        vcd::Value::Z => Logic::Z,
    }
}

fn dump_error(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::InvalidData {
        Error::MalformedDump(e.to_string())
    } else {
        Error::Io(e)
    }
}
