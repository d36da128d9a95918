// ABOUTME: Command module aggregator for the skiff CLI.
// ABOUTME: Re-exports the init, push, rollback, status, and logs command handlers.

mod connection;
mod init;
mod logs;
mod push;
mod rollback;
mod status;

pub use init::init;
pub use logs::logs;
pub use push::push;
pub use rollback::rollback;
pub use status::status;

use serde::Serialize;
use skiff::deploy::{DeployResult, Failure, InitResult, RollbackResult, StatusResult};
use skiff::diagnostics::Warning;
use skiff::error::{Error, Result};
use skiff::output::Output;
use std::fmt::Debug;

/// Common view over the pipeline result records.
trait Record: Serialize + Debug {
    fn message(&self) -> &str;

    fn warnings(&self) -> &[Warning] {
        &[]
    }
}

impl Record for InitResult {
    fn message(&self) -> &str {
        &self.message
    }
}

impl Record for DeployResult {
    fn message(&self) -> &str {
        &self.message
    }

    fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

impl Record for RollbackResult {
    fn message(&self) -> &str {
        &self.message
    }

    fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

impl Record for StatusResult {
    fn message(&self) -> &str {
        &self.message
    }
}

/// Emit a pipeline outcome and turn a failure into an application error.
fn report<R: Record>(output: &Output, outcome: std::result::Result<R, Failure<R>>) -> Result<R> {
    match outcome {
        Ok(record) => {
            for warning in record.warnings() {
                output.warning(&warning.message);
            }
            output.record(&record);
            Ok(record)
        }
        Err(Failure { result, error }) => {
            for warning in result.warnings() {
                output.warning(&warning.message);
            }
            output.record(&result);
            Err(Error::pipeline(result.message(), error))
        }
    }
}
