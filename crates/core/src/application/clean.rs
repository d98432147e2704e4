// `clean` action: stop everything, then dump packet-filter state to the log

use super::catalog::ComponentSet;
use super::constants::{FILTER_TABLE_DUMP, NAT_TABLE_DUMP};
use super::orchestrator::Orchestrator;
use crate::port::{argv, CommandExecutor};
use tracing::{error, info};

/// Outcome of one table dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableDump {
    Dumped(String),
    Failed { exit_code: Option<i32>, output: String },
}

/// Report of a clean run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub filter: TableDump,
    pub nat: TableDump,
}

pub struct CleanService<'a> {
    orchestrator: &'a Orchestrator,
    executor: &'a dyn CommandExecutor,
}

impl<'a> CleanService<'a> {
    pub fn new(orchestrator: &'a Orchestrator, executor: &'a dyn CommandExecutor) -> Self {
        Self {
            orchestrator,
            executor,
        }
    }

    /// Stop every known component, then dump filter and nat tables.
    ///
    /// Each dump is isolated: a missing table never suppresses the other.
    pub async fn clean(&self, components: &ComponentSet) -> CleanReport {
        info!("clean...");
        self.orchestrator.stop_components(&components.all()).await;

        CleanReport {
            filter: self.dump("filter", &FILTER_TABLE_DUMP).await,
            nat: self.dump("nat", &NAT_TABLE_DUMP).await,
        }
    }

    async fn dump(&self, table: &str, command: &[&str]) -> TableDump {
        let args = argv(command.iter().copied());
        info!("{}", args.join(" "));

        match self.executor.check_output(&args).await {
            Ok(output) => {
                info!(table = %table, "{}", output);
                TableDump::Dumped(output)
            }
            Err(e) => {
                error!(table = %table, error = %e, "failed to dump {} table", table);
                let output = e.output().unwrap_or_default().to_string();
                if !output.is_empty() {
                    error!(table = %table, "{}", output);
                }
                TableDump::Failed {
                    exit_code: e.exit_code(),
                    output,
                }
            }
        }
    }
}
