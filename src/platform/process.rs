// TabRescue - platform/process.rs
//
// Browser quiescing. A running browser holds its session files open and
// rewrites them continuously; reading them mid-write risks torn records, so
// the export path offers to terminate the browser first and waits a bounded
// time for its processes to exit.

use crate::core::model::Browser;
use crate::util::constants;
use std::time::{Duration, Instant};
use sysinfo::{ProcessesToUpdate, System};

fn matching_pids(sys: &System, browser: Browser) -> Vec<sysinfo::Pid> {
    sys.processes()
        .iter()
        .filter(|(_, process)| {
            let name = process.name().to_string_lossy().to_ascii_lowercase();
            browser.process_names().contains(&name.as_str())
        })
        .map(|(pid, _)| *pid)
        .collect()
}

/// Whether any process of `browser` is currently running.
pub fn is_running(browser: Browser) -> bool {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);
    !matching_pids(&sys, browser).is_empty()
}

/// Terminate every process of `browser` and wait for them to exit.
///
/// Returns the number of processes signalled. Waiting is bounded; a process
/// that survives the wait is logged and left alone (the subsequent file
/// reads then see whatever state the browser last flushed).
pub fn terminate_and_wait(browser: Browser) -> usize {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    let pids = matching_pids(&sys, browser);
    let mut signalled = 0;
    for pid in &pids {
        if let Some(process) = sys.process(*pid) {
            if process.kill() {
                signalled += 1;
            } else {
                tracing::warn!(browser = %browser, pid = pid.as_u32(), "Failed to signal process");
            }
        }
    }
    if signalled == 0 {
        return 0;
    }

    tracing::info!(browser = %browser, processes = signalled, "Terminated browser processes");

    let deadline = Instant::now() + Duration::from_millis(constants::PROCESS_EXIT_WAIT_MS);
    loop {
        std::thread::sleep(Duration::from_millis(constants::PROCESS_EXIT_POLL_MS));
        sys.refresh_processes(ProcessesToUpdate::All, true);
        if matching_pids(&sys, browser).is_empty() {
            break;
        }
        if Instant::now() >= deadline {
            tracing::warn!(
                browser = %browser,
                "Browser processes still present after termination wait"
            );
            break;
        }
    }

    signalled
}
