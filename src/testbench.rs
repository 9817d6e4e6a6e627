//! Scenarios run against the simulated volume.
//!
//! Each scenario gets a fresh [`Volume`] and a sentinel-filled image buffer,
//! drives the loader once and records its checks in a [`Report`].

use loader::{ImageBuffer, ImageLoader, ImageSpec};
use storage::fs::sim::Volume;

pub const SENTINEL: u8 = 0xAA;

const IMAGE: ImageSpec = ImageSpec::VGA_RGB565;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    passed: usize,
    failed: usize,
}

impl Report {
    #[must_use]
    pub const fn passed(&self) -> usize {
        self.passed
    }

    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn check(&mut self, cond: bool, name: &str) {
        if cond {
            self.passed += 1;
            println!("[PASS] {name}");
        } else {
            self.failed += 1;
            println!("[FAIL] {name}");
        }
    }
}

/// A volume and an image buffer, as every scenario starts with.
struct Bench {
    volume: Volume,
    buffer: ImageBuffer,
}

impl Bench {
    fn new() -> Self {
        Self {
            volume: Volume::new(),
            buffer: ImageBuffer::filled(IMAGE, SENTINEL),
        }
    }

    fn insert_pattern(&mut self, name: &str, len: usize, step: usize) -> Vec<u8> {
        let data: Vec<u8> = (0..len).map(|i| ((i * step) & 0xFF) as u8).collect();
        self.volume.insert(name, data.clone());
        data
    }

    fn load(&mut self, name: &str) -> bool {
        self.describe(name);
        ImageLoader::new(self.volume.backend())
            .load_file(name, &mut self.buffer)
            .is_ok()
    }

    /// Logs what the volume holds before a load.
    fn describe(&self, name: &str) {
        log::debug!("volume holds {} file(s)", self.volume.file_count());
        match self.volume.file_size(name) {
            Some(size) => log::debug!("{name}: {size} bytes"),
            None => log::debug!("{name}: absent"),
        }
    }

    fn untouched(&self, range: core::ops::Range<usize>) -> bool {
        self.buffer[range].iter().all(|&b| b == SENTINEL)
    }
}

fn mount_success(report: &mut Report) {
    let bench = Bench::new();
    let ok = ImageLoader::new(bench.volume.backend()).mount_volume().is_ok();
    report.check(ok, "Mount success returns success");
}

fn mount_failure(report: &mut Report) {
    let mut bench = Bench::new();
    bench.volume.set_mount_failure(true);
    let ok = ImageLoader::new(bench.volume.backend()).mount_volume().is_ok();
    report.check(!ok, "Mount failure returns failure");
}

fn load_missing_file(report: &mut Report) {
    let mut bench = Bench::new();
    debug_assert!(!bench.volume.contains("missing.raw"));
    let ok = bench.load("missing.raw");
    report.check(!ok, "Load missing file returns failure");
    report.check(
        bench.untouched(0..IMAGE.size()),
        "Buffer unchanged when file open fails",
    );
}

fn load_exact_size(report: &mut Report) {
    let mut bench = Bench::new();
    let golden = bench.insert_pattern("img0.raw", IMAGE.size(), 1);
    let ok = bench.load("img0.raw");
    report.check(ok, "Load exact-size file returns success");
    report.check(
        bench.buffer[..] == golden[..],
        "Buffer matches file data for exact-size file",
    );
}

fn load_short_file(report: &mut Report) {
    let file_size = IMAGE.size() / 2;
    let mut bench = Bench::new();
    let golden = bench.insert_pattern("img0.raw", file_size, 3);
    let ok = bench.load("img0.raw");
    report.check(ok, "Load short file returns success");
    report.check(
        bench.buffer[..file_size] == golden[..],
        "Short file: prefix of buffer matches file data",
    );
    report.check(
        bench.untouched(file_size..IMAGE.size()),
        "Short file: tail of buffer unchanged",
    );
}

fn load_large_file_truncated(report: &mut Report) {
    let mut bench = Bench::new();
    let golden = bench.insert_pattern("img0.raw", IMAGE.size() + 100, 7);
    let ok = bench.load("img0.raw");
    report.check(ok, "Load large file returns success");
    report.check(
        bench.buffer[..] == golden[..IMAGE.size()],
        "Large file: buffer matches first image-size bytes",
    );
}

fn load_read_failure(report: &mut Report) {
    let mut bench = Bench::new();
    bench.insert_pattern("img0.raw", IMAGE.size(), 5);
    bench.volume.set_read_failure(true);
    let ok = bench.load("img0.raw");
    report.check(!ok, "Read failure returns failure");
    report.check(
        bench.untouched(0..IMAGE.size()),
        "Buffer unchanged when read fails",
    );
}

/// Runs every scenario, in order.
pub fn run() -> Report {
    let scenarios: [fn(&mut Report); 7] = [
        mount_success,
        mount_failure,
        load_missing_file,
        load_exact_size,
        load_short_file,
        load_large_file_truncated,
        load_read_failure,
    ];

    let mut report = Report::default();
    for scenario in scenarios {
        scenario(&mut report);
    }
    report
}
