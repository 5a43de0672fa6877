mod import_orchestrator;
mod import_service;
mod recovery_sweep;
pub mod talk_csv_reader;
mod worker_pool;

pub use import_orchestrator::{ImportOrchestrator, ImportSummary, ImportWorkerError};
pub use import_service::{ImportError, ImportService};
pub use recovery_sweep::{RecoveryReport, RecoverySweep};
pub use worker_pool::{ImportWorkerPool, PoolRejected, PoolSlot, WorkerPoolConfig};
