//! Stub transport wiring and canned API bodies for CLI tests.

use super::*;
use census21api_core::constants::API_ROOT;
use census21api_data::test_support::StubTransport;
use std::cell::RefCell;

/// Hands out a prepared [`StubTransport`] and records the settings it was
/// asked to honour.
pub(super) struct StubTransportBuilder {
    transport: RefCell<Option<StubTransport>>,
    seen: RefCell<Option<HttpTransportConfig>>,
}

impl StubTransportBuilder {
    pub(super) fn new(transport: StubTransport) -> Self {
        Self {
            transport: RefCell::new(Some(transport)),
            seen: RefCell::new(None),
        }
    }

    pub(super) fn seen(&self) -> Option<HttpTransportConfig> {
        self.seen.borrow().clone()
    }
}

impl TransportBuilder for StubTransportBuilder {
    fn build(&self, config: &HttpTransportConfig) -> Result<Box<dyn Transport>, CliError> {
        *self.seen.borrow_mut() = Some(config.clone());
        let transport = self
            .transport
            .borrow_mut()
            .take()
            .expect("transport is built once per invocation");
        Ok(Box::new(transport))
    }
}

/// Parse `args` (without the binary name) and run them against `transport`.
pub(super) fn run_args(
    args: &[&str],
    transport: StubTransport,
) -> (Result<(), CliError>, String) {
    let cli = Cli::try_parse_from(std::iter::once("census21").chain(args.iter().copied()))
        .expect("arguments should parse");
    let builder = StubTransportBuilder::new(transport);
    let mut output = Vec::new();
    let result = run_with(cli, &builder, &mut output);
    let text = String::from_utf8(output).expect("output is UTF-8");
    (result, text)
}

pub(super) fn url(suffix: &str) -> String {
    format!("{API_ROOT}{suffix}")
}

pub(super) fn sex_by_nation_url() -> String {
    url("/UR/census-observations?area-type=nat&dimensions=sex")
}
