//! Headless run that writes one JSON snapshot per frame.
//!
//! Layout of the output directory:
//! - `polygon.json`: the scaled duct outline, written once.
//! - `frame_0000.json`, `frame_0001.json`, ...: one [`Frame`] per step.
//!
//! File numbers start at zero while [`Frame::index`] counts steps taken, so
//! `frame_0000.json` holds the frame with `index` 1.

use anyhow::{Context, Result};
use rand::Rng;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tunnel_core::Simulation;
use tunnel_core::frame::Frame;

/// Summary of a finished export.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub frames: usize,
    pub respawned: usize,
}

/// File name of the frame captured after `i + 1` steps, zero padded to four
/// digits.
pub fn frame_file_name(i: usize) -> String {
    format!("frame_{i:04}.json")
}

/// Steps `sim` `frames` times, writing a snapshot after every step.
///
/// Frames already written stay valid if a later write fails; the error is
/// returned with the failing path attached.
pub fn run(
    sim: &mut Simulation,
    frames: usize,
    out_dir: &Path,
    fps: f32,
    rng: &mut impl Rng,
) -> Result<ExportSummary> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let outline: Vec<[f32; 2]> = sim
        .polygon()
        .vertices
        .iter()
        .map(|v| [v.x, v.y])
        .collect();
    write_json(&out_dir.join("polygon.json"), &outline)?;

    let report_every = (fps.round() as usize).max(1);
    let mut summary = ExportSummary::default();

    for i in 0..frames {
        let stats = sim.step(rng)?;
        summary.respawned += stats.respawned;

        let frame: Frame = sim.snapshot();
        write_json(&out_dir.join(frame_file_name(frame.index - 1)), &frame)?;
        summary.frames += 1;

        if (i + 1) % report_every == 0 || i + 1 == frames {
            log::info!(
                "frame {}/{} (t = {:.2} s), {} respawned so far",
                i + 1,
                frames,
                sim.time(),
                summary.respawned
            );
        }
    }

    log::info!(
        "export finished: {} frames saved in '{}'",
        summary.frames,
        out_dir.display()
    );
    Ok(summary)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer(&mut w, value)
        .with_context(|| format!("writing {}", path.display()))?;
    w.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tunnel_core::Config;

    #[test]
    fn frame_names_are_zero_padded() {
        assert_eq!(frame_file_name(0), "frame_0000.json");
        assert_eq!(frame_file_name(42), "frame_0042.json");
        assert_eq!(frame_file_name(12345), "frame_12345.json");
    }

    #[test]
    fn run_writes_outline_and_every_frame() {
        let dir = std::env::temp_dir().join(format!("tunnel-export-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let cfg = Config {
            particle_count: 20,
            ..Config::default()
        };
        let mut rng = StdRng::seed_from_u64(6);
        let mut sim = Simulation::new(&cfg, &mut rng).unwrap();

        let summary = run(&mut sim, 3, &dir, cfg.fps, &mut rng).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(sim.frame_index(), 3);

        assert!(dir.join("polygon.json").is_file());
        for i in 0..3 {
            assert!(dir.join(frame_file_name(i)).is_file());
        }

        let first: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("frame_0000.json")).unwrap())
                .unwrap();
        assert_eq!(first["index"], 1);

        let last: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("frame_0002.json")).unwrap())
                .unwrap();
        assert_eq!(last["index"], 3);
        assert_eq!(last["particles"].as_array().unwrap().len(), 20);

        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn write_json_reports_failed_flush() {
        // Small payloads sit in the buffer until the final flush.
        let err = write_json(Path::new("/dev/full"), &vec![1u32; 10]).unwrap_err();
        assert!(format!("{err:#}").contains("/dev/full"));
    }
}
