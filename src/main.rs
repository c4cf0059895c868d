//! Binary entrypoint that launches the study assistant server.

use std::process::ExitCode;

use studydesk_agent::start_study_assistant;

fn main() -> ExitCode {
    start_study_assistant::run()
}
