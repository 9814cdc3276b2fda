//! `check-constants` subcommand.

use std::io::Write;

use census21api_data::{RecordedConstants, check_constants};

use crate::{CliError, Client};

pub(crate) fn run_check_constants(client: &Client, writer: &mut dyn Write) -> Result<(), CliError> {
    let report = check_constants(client, &RecordedConstants::current());
    for entry in &report.entries {
        writeln!(writer, "{entry}")?;
    }
    if report.is_up_to_date() {
        return Ok(());
    }
    Err(CliError::ConstantsOutOfDate {
        drifted: report.drifted().count(),
        unreachable: report.unreachable().count(),
    })
}
