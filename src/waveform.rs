// Copyright (c) 2017-2021 Fabian Schuiki

//! The waveform sampler front-end
//!
//! A [`Waveform`] watches a set of signals of a running simulation and records
//! them once per cycle of a sampling clock. When stopped, the recording is
//! frozen into a [`Trace`] that can be exported as a WaveDrom diagram.

use crate::{
    encoder::{encode, Symbol},
    error::{Error, Result},
    export::{self, Renderer},
    probe::{Probe, ProbeRef},
    sampler::{Sampler, SamplerState, Scheduler, StopHandle},
    signal::{Edge, Encoding, Registry, SignalOptions},
    trace::{Caption, Config, Trace},
};
use num::BigUint;
use std::{
    fmt,
    path::PathBuf,
    rc::Rc,
};

/// Settings of a waveform.
#[derive(Debug, Clone)]
pub struct WaveformConfig {
    /// The name of the diagram; also names the exported files.
    pub name: String,
    /// Horizontal scale of each sample in the diagram.
    pub hscale: u32,
    /// The edge of the sampling clock that opens a cycle.
    pub edge: Edge,
    /// Start sampling as soon as the waveform is created.
    pub autostart: bool,
    /// The caption above the diagram.
    pub head: Caption,
    /// The caption below the diagram.
    pub foot: Caption,
    /// The directory exported files are written to.
    pub output_dir: PathBuf,
}

impl WaveformConfig {
    /// Create the default settings for a diagram called `name`.
    pub fn new(name: impl Into<String>) -> WaveformConfig {
        let name = name.into();
        WaveformConfig {
            head: Caption::new(name.clone(), 0, 1),
            foot: Caption::new(concat!("Generated by ", env!("CARGO_PKG_NAME")), 0, 1),
            name,
            hscale: 2,
            edge: Edge::Rising,
            autostart: true,
            output_dir: PathBuf::from("."),
        }
    }

    /// Use a different horizontal scale.
    pub fn hscale(mut self, hscale: u32) -> WaveformConfig {
        self.hscale = hscale;
        self
    }

    /// Open cycles on a different clock edge.
    pub fn edge(mut self, edge: Edge) -> WaveformConfig {
        self.edge = edge;
        self
    }

    /// Choose whether sampling starts right away.
    pub fn autostart(mut self, autostart: bool) -> WaveformConfig {
        self.autostart = autostart;
        self
    }

    /// Write exported files to `dir`.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> WaveformConfig {
        self.output_dir = dir.into();
        self
    }
}

/// A condition that must hold for a cycle to be recorded.
struct Trigger {
    probe: ProbeRef,
    expected: BigUint,
}

impl Trigger {
    fn holds(&self) -> bool {
        self.probe.value().eq_unsigned(&self.expected)
    }
}

/// A waveform recording of simulation signals.
pub struct Waveform {
    config: WaveformConfig,
    clock: ProbeRef,
    registry: Registry,
    trace: Trace,
    trigger: Option<Trigger>,
    sampler: Sampler,
    samples: usize,
}

impl Waveform {
    /// Create a waveform sampled on `clock`. The clock is watched as the first
    /// signal of the diagram.
    pub fn new<P: Probe + 'static>(clock: P, config: WaveformConfig) -> Result<Waveform> {
        let clock: ProbeRef = Rc::new(clock);
        let mut registry = Registry::new();
        let mut trace = Trace::new();
        registry.register(
            &mut trace,
            vec![clock.clone()],
            &SignalOptions::clock(config.edge, 1.0),
        )?;
        info!(
            "Waveform {} sampled on {} {} ({} {})",
            config.name,
            config.edge,
            clock.name(),
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );
        let mut wave = Waveform {
            sampler: Sampler::new(config.edge),
            config,
            clock,
            registry,
            trace,
            trigger: None,
            samples: 0,
        };
        if wave.config.autostart {
            wave.start();
        }
        Ok(wave)
    }

    /// Start sampling. Has no effect if sampling already started or the
    /// waveform was stopped.
    pub fn start(&mut self) {
        if self.sampler.start() {
            info!("Waveform {} started", self.config.name);
        }
    }

    /// Watch a signal.
    pub fn add_signal<P: Probe + 'static>(&mut self, probe: P, options: SignalOptions) -> Result<()> {
        self.add_probes(vec![Rc::new(probe) as ProbeRef], options)
    }

    /// Watch a list of signals. Either all of them are added, or none.
    pub fn add_signals<P, I>(&mut self, probes: I, options: SignalOptions) -> Result<()>
    where
        P: Probe + 'static,
        I: IntoIterator<Item = P>,
    {
        let probes = probes
            .into_iter()
            .map(|p| Rc::new(p) as ProbeRef)
            .collect();
        self.add_probes(probes, options)
    }

    /// Watch a list of shared probes.
    pub fn add_probes(&mut self, probes: Vec<ProbeRef>, options: SignalOptions) -> Result<()> {
        if self.trace.is_finalized() {
            return Err(Error::Finalized(self.config.name.clone()));
        }
        if self.samples > 0 {
            warn!(
                "Signals added to {} after {} samples are drawn shifted",
                self.config.name, self.samples
            );
        }
        self.registry.register(&mut self.trace, probes, &options)
    }

    /// Only record cycles in which `probe` carries `value`. Replaces any
    /// previous trigger.
    pub fn add_trigger<P, V>(&mut self, probe: P, value: V)
    where
        P: Probe + 'static,
        V: Into<BigUint>,
    {
        let expected = value.into();
        debug!(
            "Waveform {} triggered on {} == {}",
            self.config.name,
            probe.name(),
            expected
        );
        self.trigger = Some(Trigger {
            probe: Rc::new(probe),
            expected,
        });
    }

    /// Record every cycle again.
    pub fn clear_trigger(&mut self) {
        self.trigger = None;
    }

    /// Replace the caption above the diagram.
    pub fn set_head(&mut self, text: impl Into<String>, tick: i64, every: u32) {
        self.config.head = Caption::new(text, tick, every);
    }

    /// Replace the caption below the diagram.
    pub fn set_foot(&mut self, text: impl Into<String>, tick: i64, every: u32) {
        self.config.foot = Caption::new(text, tick, every);
    }

    /// Feed a transition of the sampling clock.
    pub fn on_edge(&mut self, edge: Edge) {
        if self.sampler.on_edge(edge) {
            self.sample();
        }
    }

    /// Record one cycle, unless a trigger suppresses it.
    fn sample(&mut self) {
        if let Some(ref trigger) = self.trigger {
            if !trigger.holds() {
                trace!("Cycle {} skipped by trigger", self.sampler.cycles());
                return;
            }
        }
        trace!("Cycle {} sampled", self.sampler.cycles());
        for signal in self.registry.signals_mut() {
            let value = signal.probe.value();
            let symbol = encode(signal, &value);
            let entry = self.trace.entry_mut(signal.slot());
            if let (Symbol::Clock(_), Encoding::Clock { period, .. }) = (&symbol, signal.encoding()) {
                entry.set_period(period);
            }
            entry.push(&symbol);
        }
        self.samples += 1;
    }

    /// Drive the sampler from a scheduler until the simulation ends or the
    /// waveform is stopped.
    pub fn run(&mut self, scheduler: &mut dyn Scheduler) -> Result<()> {
        let mut last = self.clock.value();
        while !self.sampler.poll_stop() && scheduler.advance()? {
            let now = self.clock.value();
            if let Some(edge) = Edge::between(&last, &now) {
                self.on_edge(edge);
            }
            last = now;
        }
        Ok(())
    }

    /// A handle that stops sampling from outside the context driving it.
    pub fn stop_handle(&self) -> StopHandle {
        self.sampler.stop_handle()
    }

    /// Stop sampling and freeze the trace. Stopping twice has no effect.
    pub fn stop(&mut self) -> &Trace {
        self.sampler.halt();
        self.finalize()
    }

    fn finalize(&mut self) -> &Trace {
        let config = Config {
            hscale: self.config.hscale,
        };
        if self
            .trace
            .finalize(config, self.config.head.clone(), self.config.foot.clone())
        {
            info!(
                "Waveform {} stopped after {} samples",
                self.config.name, self.samples
            );
        }
        &self.trace
    }

    /// Stop sampling and render the diagram to `<name>.svg`.
    pub fn save_svg(&mut self, renderer: &dyn Renderer) -> Result<PathBuf> {
        let path = self.artifact_path("svg");
        let trace = self.stop();
        export::render_image(trace, renderer, &path)?;
        Ok(path)
    }

    /// Stop sampling and write the WaveJSON to `<name>.txt`. Failures are
    /// logged and yield `None`.
    pub fn save_txt(&mut self) -> Option<PathBuf> {
        let path = self.artifact_path("txt");
        let trace = self.stop();
        export::dump_text(trace, &path)
    }

    fn artifact_path(&self, extension: &str) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{}.{}", self.config.name, extension))
    }

    /// The name of the diagram.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The settings of the waveform.
    pub fn config(&self) -> &WaveformConfig {
        &self.config
    }

    /// The recording so far.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// The watched signals.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The state of the sampler.
    pub fn state(&self) -> SamplerState {
        self.sampler.state()
    }

    /// The number of recorded cycles.
    pub fn samples(&self) -> usize {
        self.samples
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.trace, f)
    }
}

impl fmt::Debug for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Waveform {} {:?} {:?} ({} samples)",
            self.config.name,
            self.sampler.state(),
            self.registry,
            self.samples
        )
    }
}
