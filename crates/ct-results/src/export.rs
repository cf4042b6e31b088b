//! CSV export of a stored run.
//!
//! Layout: `#`-prefixed header lines carrying the run metadata and the
//! saturation verdict, one column-name line, then one row per state.
//! Floats use Rust's shortest round-trip formatting, so every value
//! parses back to the identical `f64`.

use std::io::Write;

use ct_sim::SaturationVerdict;

use crate::ResultsResult;
use crate::types::{RunManifest, TimeseriesRecord};

pub const CSV_COLUMNS: [&str; 9] = [
    "step",
    "time_s",
    "flux_wb_turns",
    "i_ideal_a",
    "i_exc_a",
    "i_real_a",
    "rms_a",
    "rms_provisional",
    "v_req_v",
];

pub fn write_csv<W: Write>(
    out: &mut W,
    manifest: &RunManifest,
    records: &[TimeseriesRecord],
) -> ResultsResult<()> {
    writeln!(out, "# run_id={}", manifest.run_id)?;
    writeln!(out, "# case_id={}", manifest.case_id)?;
    writeln!(out, "# v_sat_v={}", manifest.v_sat_v)?;
    match manifest.verdict {
        SaturationVerdict::NotSaturated => writeln!(out, "# verdict=not_saturated")?,
        SaturationVerdict::SaturatedAt {
            step,
            time_s,
            cause,
        } => writeln!(
            out,
            "# verdict=saturated step={} time_s={} cause={}",
            step, time_s, cause
        )?,
    }
    writeln!(out, "{}", CSV_COLUMNS.join(","))?;

    for r in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            r.step,
            r.t_s,
            r.flux_wb_turns,
            r.i_ideal_a,
            r.i_exc_a,
            r.i_real_a,
            r.rms_a,
            r.rms_provisional,
            r.v_req_v
        )?;
    }
    Ok(())
}

pub fn to_csv_string(manifest: &RunManifest, records: &[TimeseriesRecord]) -> ResultsResult<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, manifest, records)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
