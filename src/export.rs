// Copyright (c) 2017-2021 Fabian Schuiki

//! Exporting finished traces.
//!
//! The structured WaveJSON form is written directly. Images are produced by an
//! external WaveDrom renderer behind the [`Renderer`] trait.

use crate::{
    error::{Error, Result},
    trace::Trace,
};
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Command,
};

/// Something that turns WaveJSON into an image.
pub trait Renderer {
    /// Render `wavejson` into the image file at `output`.
    fn render(&self, wavejson: &str, output: &Path) -> Result<()>;
}

/// Renders by invoking the `wavedrom-cli` command line tool.
///
/// The WaveJSON is written next to the image with a `.json` extension and
/// handed to the tool as `-i <json> -s <svg>`.
#[derive(Debug, Clone)]
pub struct WavedromCli {
    program: PathBuf,
}

impl WavedromCli {
    /// Use `wavedrom-cli` from the `PATH`.
    pub fn new() -> WavedromCli {
        WavedromCli::with_program("wavedrom-cli")
    }

    /// Use a specific renderer executable.
    pub fn with_program(program: impl Into<PathBuf>) -> WavedromCli {
        WavedromCli {
            program: program.into(),
        }
    }
}

impl Default for WavedromCli {
    fn default() -> WavedromCli {
        WavedromCli::new()
    }
}

impl Renderer for WavedromCli {
    fn render(&self, wavejson: &str, output: &Path) -> Result<()> {
        let input = output.with_extension("json");
        std::fs::write(&input, wavejson)?;
        debug!(
            "Running {} on {}",
            self.program.display(),
            input.display()
        );
        let result = Command::new(&self.program)
            .arg("-i")
            .arg(&input)
            .arg("-s")
            .arg(output)
            .output()
            .map_err(|e| Error::Render {
                path: output.to_owned(),
                message: format!("cannot run {}: {}", self.program.display(), e),
            })?;
        if !result.status.success() {
            return Err(Error::Render {
                path: output.to_owned(),
                message: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    result.status,
                    String::from_utf8_lossy(&result.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

/// Hand the trace to a renderer to produce the image at `path`.
pub fn render_image(trace: &Trace, renderer: &dyn Renderer, path: &Path) -> Result<()> {
    let json = trace.to_json()?;
    debug!("WaveJSON for {}: {}", path.display(), json);
    renderer.render(&json, path)?;
    info!("Wrote diagram {}", path.display());
    Ok(())
}

/// Write the indented WaveJSON of the trace to `path`.
pub fn write_text(trace: &Trace, path: &Path) -> Result<()> {
    let json = trace.to_json_pretty()?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Write the indented WaveJSON of the trace to `path`, logging rather than
/// returning any failure. Returns the path on success.
pub fn dump_text(trace: &Trace, path: &Path) -> Option<PathBuf> {
    match write_text(trace, path) {
        Ok(()) => {
            info!("Wrote WaveJSON {}", path.display());
            Some(path.to_owned())
        }
        Err(e) => {
            error!("Cannot write WaveJSON to {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Caption, Config, SignalEntry};
    use std::cell::RefCell;

    struct Capture(RefCell<Vec<(String, PathBuf)>>);

    impl Renderer for Capture {
        fn render(&self, wavejson: &str, output: &Path) -> Result<()> {
            self.0
                .borrow_mut()
                .push((wavejson.to_string(), output.to_owned()));
            Ok(())
        }
    }

    fn finished() -> Trace {
        let mut trace = Trace::new();
        trace.push(SignalEntry::new("clk", 1, false));
        trace.finalize(
            Config { hscale: 1 },
            Caption::new("h", 0, 1),
            Caption::new("f", 0, 1),
        );
        trace
    }

    #[test]
    fn renderer_receives_wavejson() {
        let capture = Capture(RefCell::new(vec![]));
        let path = Path::new("out.svg");
        render_image(&finished(), &capture, path).unwrap();
        let calls = capture.0.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, path);
        assert!(calls[0].0.starts_with("{\"signal\":[{\"name\":\"clk\""));
    }

    #[test]
    fn dump_failure_is_not_propagated() {
        let path = std::env::temp_dir()
            .join("wavetap-no-such-dir")
            .join("deeper")
            .join("t.txt");
        assert_eq!(dump_text(&finished(), &path), None);
    }

    #[test]
    fn missing_renderer_is_an_error() {
        let dir = std::env::temp_dir();
        let cli = WavedromCli::with_program("wavetap-renderer-that-does-not-exist");
        let err = cli
            .render("{}", &dir.join("wavetap-missing-renderer.svg"))
            .unwrap_err();
        assert!(matches!(err, Error::Render { .. }));
    }
}
