//! Runs `Wgrib2Decoder` against a stand-in shell script.
//!
//! Kept in its own test binary: executing a freshly written script from a
//! multi-threaded test process can race with other forks.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use point_extract::{DecodeError, PointDecoder, Wgrib2Decoder};
use tempfile::TempDir;
use test_utils::{test_coordinate, wgrib2_output, REFERENCE_SAMPLE};

fn write_script(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("wgrib2");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_wgrib2_script_decoding() {
    let tmp = TempDir::new().unwrap();

    // Echo arguments to stderr on failure so assertions can inspect them
    let output = wgrib2_output(&REFERENCE_SAMPLE);
    let ok = write_script(
        tmp.path(),
        &format!(
            "[ \"$2\" = \"-match\" ] && [ \"$4\" = \"-lon\" ] && [ \"$5\" = \"262.500\" ] && [ \"$6\" = \"35.250\" ] || {{ echo \"bad args: $*\" >&2; exit 2; }}\ncat <<'OUT'\n{}OUT",
            output
        ),
    );
    let decoder = Wgrib2Decoder::new(&ok);
    decoder.check_available().unwrap();
    let sample = decoder
        .extract(Path::new("gfs.t00z.pgrb2.0p25.f000"), test_coordinate())
        .unwrap();
    assert_eq!(sample, REFERENCE_SAMPLE);

    let failing = tmp.path().join("failing");
    fs::create_dir(&failing).unwrap();
    let failing = write_script(&failing, "echo 'corrupt file' >&2\nexit 8");
    let err = Wgrib2Decoder::new(&failing)
        .extract(Path::new("gfs.t00z.pgrb2.0p25.f000"), test_coordinate())
        .unwrap_err();
    match err {
        DecodeError::Exit { stderr, .. } => assert_eq!(stderr, "corrupt file"),
        other => panic!("unexpected error: {}", other),
    }
}
