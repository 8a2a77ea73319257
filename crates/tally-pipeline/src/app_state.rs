//! Shared process state for the metrics pipeline.
//!
//! Built once at startup from the config and the resolved role:
//! - every role gets an `IpcClient` and an `Emitter` sized for that role;
//! - the coordinator additionally owns the `Aggregator` and binds the socket.
//!
//! `new` only constructs. Nothing runs until `start`.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;

use tally_core::error::Result;

use crate::aggregator::{Aggregator, DeltaSink};
use crate::bootstrap::ProcessRole;
use crate::config::PipelineConfig;
use crate::emitter::{Emitter, EmitterSettings, MetricsSink};
use crate::transport::{DeltaTransport, IpcClient, IpcServer};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    emitter: Arc<Emitter>,
    aggregator: Option<Arc<Aggregator>>,
}

struct AppStateInner {
    cfg: PipelineConfig,
    role: ProcessRole,
}

/// What `start` brought up.
pub struct Started {
    /// Accept loop of the IPC server (coordinator only).
    pub ipc_server: Option<JoinHandle<()>>,
    /// Socket file to remove on shutdown (coordinator only).
    pub socket_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(cfg: PipelineConfig, role: ProcessRole) -> Result<Self> {
        let transport: Arc<dyn DeltaTransport> = Arc::new(IpcClient::new(&cfg.ipc.socket_path));
        let settings = EmitterSettings::for_role(&cfg.buffers, role);
        let emitter = Arc::new(Emitter::new(settings, transport)?);

        let aggregator = role.runs_collector().then(|| Arc::new(Aggregator::new()));

        tracing::debug!(
            role = role.as_str(),
            priority = settings.capacities.priority,
            important = settings.capacities.important,
            workers = settings.workers,
            "pipeline state built"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, role }),
            emitter,
            aggregator,
        })
    }

    /// Bind the collector half (coordinator), then start the emitter.
    ///
    /// Binding first lets the emitter's warm-up connect on the first try.
    /// Must be called inside a tokio runtime. A bind error is fatal.
    pub fn start(&self) -> Result<Started> {
        let mut started = Started {
            ipc_server: None,
            socket_path: None,
        };

        if let Some(aggregator) = &self.aggregator {
            let sink: Arc<dyn DeltaSink> = Arc::clone(aggregator) as Arc<dyn DeltaSink>;
            let server = IpcServer::bind(&self.inner.cfg.ipc.socket_path, sink)?;
            started.socket_path = Some(server.local_path().to_path_buf());
            started.ipc_server = Some(server.spawn());
        }

        self.emitter.start()?;

        tracing::info!(role = self.inner.role.as_str(), "metrics pipeline started");
        Ok(started)
    }

    pub fn cfg(&self) -> &PipelineConfig {
        &self.inner.cfg
    }

    /// Capability handed to request-handling code.
    pub fn sink(&self) -> Arc<dyn MetricsSink> {
        Arc::clone(&self.emitter) as Arc<dyn MetricsSink>
    }

    pub fn emitter(&self) -> Arc<Emitter> {
        Arc::clone(&self.emitter)
    }

    pub fn aggregator(&self) -> Option<Arc<Aggregator>> {
        self.aggregator.clone()
    }
}
