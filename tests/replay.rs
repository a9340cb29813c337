// Copyright (c) 2017-2021 Fabian Schuiki

#[macro_use]
extern crate indoc;

use wavetap::{Edge, Error, SignalOptions, VcdReplay, Waveform, WaveformConfig};

fn dump() -> &'static str {
    indoc! {"
        $timescale 1ns $end
        $scope module top $end
        $var wire 1 ! clk $end
        $var wire 1 % rstn $end
        $var wire 4 & data $end
        $var wire 1 ' valid $end
        $scope module dut $end
        $var wire 2 ( state $end
        $upscope $end
        $upscope $end
        $enddefinitions $end
        #0
        $dumpvars
        0!
        0%
        bx &
        0'
        bz (
        $end
        #5
        1!
        #10
        0!
        b1010 &
        1'
        b01 (
        #15
        1!
        #20
        0!
        1%
        #25
        1!
        #30
        0!
        b1011 &
        0'
        b10 (
        #35
        1!
        #40
        0!
    "}
}

#[test]
fn replay_into_waveform() {
    let mut replay = VcdReplay::new(dump().as_bytes()).unwrap();
    let clk = replay.probe("top.clk").unwrap();
    let mut wave = Waveform::new(clk, WaveformConfig::new("replay")).unwrap();
    wave.add_signals(
        vec![replay.probe("top.data").unwrap(), replay.probe("top.valid").unwrap()],
        SignalOptions::data(),
    )
    .unwrap();
    wave.run(&mut replay).unwrap();
    assert_eq!(replay.time(), 40);

    let trace = wave.stop();
    assert_eq!(trace.find("clk").unwrap().wave(), "P...");
    assert_eq!(trace.find("data[3:0]").unwrap().wave(), "3.3.");
    assert_eq!(trace.find("data[3:0]").unwrap().data(), Some("0xa 0xb "));
    assert_eq!(trace.find("valid").unwrap().wave(), "1.0.");
}

#[test]
fn replay_with_trigger_and_group() {
    let mut replay = VcdReplay::new(dump().as_bytes()).unwrap();
    let clk = replay.probe("top.clk").unwrap();
    let mut wave = Waveform::new(clk, WaveformConfig::new("gated")).unwrap();
    wave.add_signals(
        vec![replay.probe("top.data").unwrap(), replay.probe("top.dut.state").unwrap()],
        SignalOptions::data().group("dut"),
    )
    .unwrap();
    wave.add_trigger(replay.probe("top.rstn").unwrap(), 1u32);
    wave.run(&mut replay).unwrap();

    let v: serde_json::Value = serde_json::from_str(&wave.stop().to_json().unwrap()).unwrap();
    assert_eq!(
        v["signal"],
        serde_json::json!([
            {"name": "clk", "wave": "P..", "period": 1.0},
            ["dut",
                {"name": "data[3:0]", "wave": "33.", "data": "0xa 0xb "},
                {"name": "state[1:0]", "wave": "44.", "data": "0x1 0x2 "}
            ]
        ])
    );
}

#[test]
fn replay_on_falling_edge() {
    let mut replay = VcdReplay::new(dump().as_bytes()).unwrap();
    let clk = replay.probe("top.clk").unwrap();
    let config = WaveformConfig::new("neg").edge(Edge::Falling);
    let mut wave = Waveform::new(clk, config).unwrap();
    wave.add_signal(replay.probe("top.dut.state").unwrap(), SignalOptions::data())
        .unwrap();
    wave.run(&mut replay).unwrap();

    // The clock leaving `x` for `0` at time 0 already counts as a falling
    // edge. The cycle opened at 40 never closes.
    let trace = wave.stop();
    assert_eq!(trace.find("clk").unwrap().wave(), "N...");
    assert_eq!(trace.find("state[1:0]").unwrap().wave(), "z3.3");
    assert_eq!(trace.find("state[1:0]").unwrap().data(), Some("0x1 0x2 "));
}

#[test]
fn stopping_ends_the_replay_early() {
    let mut replay = VcdReplay::new(dump().as_bytes()).unwrap();
    let clk = replay.probe("top.clk").unwrap();
    let mut wave = Waveform::new(clk, WaveformConfig::new("early")).unwrap();
    wave.stop_handle().stop();
    wave.run(&mut replay).unwrap();
    assert_eq!(wave.samples(), 0);
    assert_eq!(replay.time(), 0);
    assert!(wave.stop().find("clk").unwrap().wave().is_empty());
}

#[test]
fn header_details() {
    let mut replay = VcdReplay::new(dump().as_bytes()).unwrap();
    assert_eq!(replay.timescale(), Some((1, vcd::TimescaleUnit::NS)));
    assert!(matches!(
        replay.probe("top.state"),
        Err(Error::UnknownVariable(ref p)) if p == "top.state"
    ));
    assert!(matches!(
        replay.probe("top.dut"),
        Err(Error::UnknownVariable(_))
    ));
}
