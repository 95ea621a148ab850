use std::path::Path;
use std::process::ExitCode;

use mockstore::MockStore;
use safetalk_harness::recorder::CheckRecorder;
use safetalk_harness::report::{Report, REPORT_PATH};
use safetalk_harness::scan::{self, APP_SOURCE_ROOT};
use safetalk_harness::suites;

fn run() -> anyhow::Result<bool> {
    log::info!("SafeTalk backend audit starting");

    let store = MockStore::new();
    let mut rec = CheckRecorder::new();

    suites::run_all(&store, &mut rec);

    let rules = scan::default_rules(Path::new(APP_SOURCE_ROOT));
    scan::run_scan(&rules, &mut rec);

    let summary = rec.summary();
    log::info!(
        "Checks: {} total, {} passed, {} failed ({:.1}% pass rate)",
        summary.total,
        summary.passed,
        summary.failed,
        summary.pass_rate
    );
    for (system, working) in &summary.subsystems {
        log::info!(
            "{}: {}",
            system,
            if *working { "WORKING" } else { "BROKEN" }
        );
    }

    let report = Report::new(&rec);
    report.write(Path::new(REPORT_PATH))?;
    log::info!("Report written to {}", REPORT_PATH);

    Ok(rec.all_passed())
}

fn main() -> ExitCode {
    colog::init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("Audit run aborted: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
