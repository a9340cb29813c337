// Copyright (c) 2017-2021 Fabian Schuiki

//! Draws WaveDrom timing diagrams from value change dumps.

#![deny(missing_docs)]

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use anyhow::{anyhow, Context, Result};
use clap::Arg;
use num::BigUint;
use std::{fs::File, io::BufReader, path::Path};
use wavetap::{
    export::WavedromCli, signal::Edge, SignalOptions, VcdReplay, Waveform, WaveformConfig,
};

fn main() -> Result<()> {
    // Configure the logger.
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("WAVETAP_LOG", "warn"))
        .init();

    // Parse the command line arguments.
    let matches = app_from_crate!()
        .about("Samples signals of a value change dump into a WaveDrom timing diagram.")
        .arg(
            Arg::with_name("INPUT")
                .help("The value change dump to replay")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("clock")
                .short("c")
                .long("clock")
                .takes_value(true)
                .required(true)
                .help("Hierarchical name of the sampling clock, e.g. `top.clk`"),
        )
        .arg(
            Arg::with_name("signal")
                .short("s")
                .long("signal")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Hierarchical name of a signal to draw"),
        )
        .arg(
            Arg::with_name("group")
                .short("g")
                .long("group")
                .takes_value(true)
                .help("Nest the signals under a group with this label"),
        )
        .arg(
            Arg::with_name("trigger")
                .short("t")
                .long("trigger")
                .takes_value(true)
                .help("Only record cycles where `<signal>=<value>` holds"),
        )
        .arg(
            Arg::with_name("negedge")
                .long("negedge")
                .help("Open cycles on the falling clock edge"),
        )
        .arg(
            Arg::with_name("hscale")
                .long("hscale")
                .takes_value(true)
                .default_value("2")
                .help("Horizontal scale of each cycle"),
        )
        .arg(
            Arg::with_name("name")
                .short("n")
                .long("name")
                .takes_value(true)
                .help("Name of the diagram and output files [default: input file stem]"),
        )
        .arg(
            Arg::with_name("output-dir")
                .short("o")
                .long("output-dir")
                .takes_value(true)
                .default_value(".")
                .help("Directory to write output files to"),
        )
        .arg(
            Arg::with_name("svg")
                .long("svg")
                .help("Render the diagram to <name>.svg"),
        )
        .arg(
            Arg::with_name("txt")
                .long("txt")
                .help("Write the WaveJSON to <name>.txt"),
        )
        .arg(
            Arg::with_name("renderer")
                .long("renderer")
                .takes_value(true)
                .default_value("wavedrom-cli")
                .help("WaveDrom renderer executable used for --svg"),
        )
        .get_matches();

    // Open the input file.
    let path = matches
        .value_of("INPUT")
        .ok_or_else(|| anyhow!("no input file given"))?;
    let file = File::open(path).with_context(|| format!("failed to open input {}", path))?;
    let mut replay = VcdReplay::new(BufReader::new(file))
        .with_context(|| format!("failed to read header of {}", path))?;

    // Assemble the waveform configuration.
    let name = match matches.value_of("name") {
        Some(name) => name.to_string(),
        None => Path::new(path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "wave".to_string()),
    };
    let hscale = value_t!(matches, "hscale", u32).map_err(|e| anyhow!("{}", e))?;
    let edge = if matches.is_present("negedge") {
        Edge::Falling
    } else {
        Edge::Rising
    };
    let config = WaveformConfig::new(name)
        .hscale(hscale)
        .edge(edge)
        .output_dir(matches.value_of("output-dir").unwrap_or("."));

    // Hook the requested signals up to the replay.
    let clock_path = matches
        .value_of("clock")
        .ok_or_else(|| anyhow!("no clock given"))?;
    let clock = replay.probe(clock_path)?;
    let mut wave = Waveform::new(clock, config)?;
    let signals = matches
        .values_of("signal")
        .into_iter()
        .flatten()
        .map(|p| replay.probe(p))
        .collect::<wavetap::Result<Vec<_>>>()?;
    if !signals.is_empty() {
        let mut options = SignalOptions::data();
        if let Some(group) = matches.value_of("group") {
            options = options.group(group);
        }
        wave.add_signals(signals, options)
            .with_context(|| "failed to register signals")?;
    }
    if let Some(trigger) = matches.value_of("trigger") {
        let (signal, value) = parse_trigger(trigger)?;
        wave.add_trigger(replay.probe(signal)?, value);
    }

    // Replay the dump.
    wave.run(&mut replay)
        .with_context(|| format!("failed to replay {}", path))?;
    wave.stop();
    info!("Replayed {} up to time {}", path, replay.time());

    // Write the requested outputs.
    let svg = matches.is_present("svg");
    let txt = matches.is_present("txt");
    if svg {
        let renderer = WavedromCli::with_program(matches.value_of("renderer").unwrap_or("wavedrom-cli"));
        let out = wave.save_svg(&renderer)?;
        println!("{}", out.display());
    }
    if txt {
        match wave.save_txt() {
            Some(out) => println!("{}", out.display()),
            None => return Err(anyhow!("failed to write WaveJSON of {}", wave.name())),
        }
    }
    if !svg && !txt {
        println!("{}", wave);
    }

    Ok(())
}

/// Split a trigger of the form `<signal>=<value>`. The value is decimal, or
/// hexadecimal with a `0x` prefix.
fn parse_trigger(trigger: &str) -> Result<(&str, BigUint)> {
    let mut parts = trigger.splitn(2, '=');
    let signal = parts.next().unwrap_or("");
    let value = parts
        .next()
        .ok_or_else(|| anyhow!("trigger `{}` is not of the form <signal>=<value>", trigger))?
        .trim();
    let parsed = if value.starts_with("0x") {
        BigUint::parse_bytes(value[2..].as_bytes(), 16)
    } else {
        BigUint::parse_bytes(value.as_bytes(), 10)
    };
    let parsed = parsed.ok_or_else(|| anyhow!("invalid trigger value `{}`", value))?;
    Ok((signal.trim(), parsed))
}
