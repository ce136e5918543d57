use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use togglink_device::{DeviceLink, TelemetryRecord};
use tracing::{debug, warn};

use crate::cmd::{parse_duration, LinkArgs, MonitorArgs};
use crate::exit::{device_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_record, OutputFormat};

pub fn run(args: MonitorArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = args
        .refresh_interval
        .as_deref()
        .map(parse_duration)
        .transpose()?;
    let schedule = RefreshSchedule::new(args.refresh, interval, Instant::now());

    let mut device = link.open()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    monitor(&mut device, &args, schedule, &running, |record| {
        print_record(record, format)
    })?;
    Ok(SUCCESS)
}

/// When the monitor loop sends `Refresh` commands.
///
/// The first refresh goes out immediately when requested or when an
/// interval is set. Checks happen between reads, so the effective period is
/// rounded up to the link's read timeout.
#[derive(Debug, Clone, Copy)]
pub struct RefreshSchedule {
    interval: Option<Duration>,
    next: Option<Instant>,
}

impl RefreshSchedule {
    pub fn new(initial: bool, interval: Option<Duration>, now: Instant) -> Self {
        let next = (initial || interval.is_some()).then_some(now);
        Self { interval, next }
    }

    /// True when a refresh is due at `now`. Advances the schedule.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.next {
            Some(at) if now >= at => {
                self.next = self.interval.map(|interval| now + interval);
                true
            }
            _ => false,
        }
    }
}

/// Receive telemetry until `running` clears or `--count` records were seen.
///
/// Read timeouts only re-check `running` and the refresh schedule. Corrupt
/// frames are logged and skipped unless `strict` is set.
pub fn monitor<R, W, F>(
    device: &mut DeviceLink<R, W>,
    args: &MonitorArgs,
    mut schedule: RefreshSchedule,
    running: &AtomicBool,
    mut emit: F,
) -> CliResult<usize>
where
    R: Read,
    W: Write,
    F: FnMut(&TelemetryRecord),
{
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }

        if schedule.take_due(Instant::now()) {
            device
                .request_refresh()
                .map_err(|err| device_error("refresh failed", err))?;
            debug!("refresh requested");
        }

        let record = match device.recv_telemetry() {
            Ok(record) => record,
            Err(err) if err.is_timeout() => {
                debug!("no telemetry within timeout");
                continue;
            }
            Err(err) if err.is_recoverable() && !args.strict => {
                warn!(error = %err, "dropping bad frame");
                continue;
            }
            Err(err) => return Err(device_error("receive failed", err)),
        };

        emit(&record);
        printed = printed.saturating_add(1);
    }

    Ok(printed)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
