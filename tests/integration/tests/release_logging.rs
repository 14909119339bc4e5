// Licensed under the Apache-2.0 license

use bridge_error::LastError;
use bridge_rom::{efuse_init, EfuseConfig};
use emulator_periph::EmulatedEfuse;
use log::{LevelFilter, Log, Metadata, Record};
use romtime::SoftSha256;
use std::sync::Mutex;
use tests_integration::load_fixture;

/// Keeps every formatted log line.
struct CaptureLogger {
    lines: Mutex<Vec<String>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.lines.lock().unwrap().push(record.args().to_string());
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    lines: Mutex::new(Vec::new()),
};

fn boot_captured(log_endpoint_id: bool) -> Vec<String> {
    LOGGER.lines.lock().unwrap().clear();
    let mut efuse = EmulatedEfuse::new(load_fixture("provisioned.toml"));
    let config = EfuseConfig {
        log_endpoint_id,
        ..Default::default()
    };
    let result = efuse_init(
        &mut efuse,
        &mut SoftSha256::new(),
        config,
        &mut LastError::new(),
    );
    assert!(result.unwrap().endpoint_id.is_some());
    std::mem::take(&mut *LOGGER.lines.lock().unwrap())
}

fn endpoint_id_lines(lines: &[String]) -> usize {
    lines
        .iter()
        .filter(|line| line.starts_with("[efuse] Endpoint ID"))
        .count()
}

// One test per binary: the logger is process-wide.
#[test]
fn test_endpoint_id_logging_follows_build_mode() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let quiet = boot_captured(false);
    assert_eq!(endpoint_id_lines(&quiet), 0);

    let requested = boot_captured(true);
    if cfg!(debug_assertions) {
        assert_eq!(endpoint_id_lines(&requested), 1);
        assert!(requested.iter().any(|line| line == "[efuse] OK"));
    } else {
        // release ROM builds never print the ID and drop debug output
        assert_eq!(endpoint_id_lines(&requested), 0);
        assert!(!requested.iter().any(|line| line == "[efuse] OK"));
        assert!(log::STATIC_MAX_LEVEL <= LevelFilter::Info);
    }
}
