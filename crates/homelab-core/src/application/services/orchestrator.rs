//! Provisioner - the run loop.
//!
//! One run:
//! 1. Detect the host platform
//! 2. Validate the configuration
//! 3. Build and order the service descriptors
//! 4. Ensure the container network exists
//! 5. Install services one at a time, checking for cancellation in between
//!
//! Any failure or cancellation goes through
//! [`ErrorHandler::graceful_shutdown`], which unwinds what completed.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{CommandRunner, CommandSpec, ConfigWriter, PlatformProbe, TemplateLoader},
        services::{
            error_handler::{ErrorHandler, ShutdownReason, ShutdownReport},
            lifecycle::{InstalledService, ServiceInstaller},
            recovery::{RecoveryManager, RollbackAction, RollbackReport},
            registry::ServiceRegistry,
            template_engine::TemplateEngine,
        },
    },
    domain::{Distribution, HomelabConfig, ServiceDescriptor, ServiceType},
    error::{HomelabError, HomelabResult},
};

// ── Run context ──────────────────────────────────────────────────────────────

/// Cooperative cancellation shared with a signal handler.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-run state: pending rollbacks, the error handler and the cancellation
/// flag. Create one per run and pass it down.
#[derive(Debug, Default)]
pub struct RunContext {
    recovery: RecoveryManager,
    handler: ErrorHandler,
    cancellation: CancellationFlag,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing flag, typically one already wired to a signal handler.
    pub fn with_cancellation(cancellation: CancellationFlag) -> Self {
        Self {
            cancellation,
            ..Self::default()
        }
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }

    pub fn recovery(&self) -> &RecoveryManager {
        &self.recovery
    }

    pub fn recovery_mut(&mut self) -> &mut RecoveryManager {
        &mut self.recovery
    }

    pub fn error_handler(&self) -> &ErrorHandler {
        &self.handler
    }

    fn shutdown(&mut self, reason: ShutdownReason<'_>) -> ShutdownReport {
        self.handler.graceful_shutdown(reason, &mut self.recovery)
    }
}

// ── Results ──────────────────────────────────────────────────────────────────

/// One service as it would be installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedService {
    pub service_type: ServiceType,
    pub display_name: &'static str,
    pub is_core: bool,
    pub dependencies: Vec<ServiceType>,
    pub access_url: String,
    pub files: Vec<PathBuf>,
}

/// What a run would do, computed without touching the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallPlan {
    pub network: String,
    pub install_root: PathBuf,
    pub services: Vec<PlannedService>,
}

/// A completed run.
#[derive(Debug, Clone, Serialize)]
pub struct InstallSummary {
    pub distribution: Distribution,
    pub installed: Vec<InstalledService>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl InstallSummary {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(InstallSummary),
    /// Stopped by the user. Services listed were installed and then rolled back.
    Cancelled {
        rolled_back: Vec<ServiceType>,
        rollback: Option<RollbackReport>,
    },
}

impl RunOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

enum Progress {
    Completed {
        distribution: Distribution,
        installed: Vec<InstalledService>,
    },
    Cancelled {
        installed: Vec<InstalledService>,
    },
}

// ── Provisioner ──────────────────────────────────────────────────────────────

/// Drives a whole run over the injected ports.
pub struct Provisioner {
    runner: Arc<dyn CommandRunner>,
    probe: Arc<dyn PlatformProbe>,
    engine: Arc<TemplateEngine>,
    registry: ServiceRegistry,
    installer: ServiceInstaller,
}

impl Provisioner {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        loader: Arc<dyn TemplateLoader>,
        writer: Arc<dyn ConfigWriter>,
        probe: Arc<dyn PlatformProbe>,
    ) -> Self {
        let engine = Arc::new(TemplateEngine::new(loader));
        let installer = ServiceInstaller::new(Arc::clone(&runner), writer, Arc::clone(&engine));
        Self {
            runner,
            probe,
            engine,
            registry: ServiceRegistry::new(),
            installer,
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// Validate, build and order services. No side effects.
    pub fn plan(&self, config: &HomelabConfig) -> HomelabResult<InstallPlan> {
        let ordered = self.prepare(config)?;

        let services = ordered
            .iter()
            .map(|d| PlannedService {
                service_type: d.service_type(),
                display_name: d.display_name(),
                is_core: d.is_core(),
                dependencies: d.dependencies().to_vec(),
                access_url: d.access_url(),
                files: d
                    .def()
                    .config_files
                    .iter()
                    .map(|f| d.install_dir().join(f.path))
                    .collect(),
            })
            .collect();

        Ok(InstallPlan {
            network: config.network().to_string(),
            install_root: config.install_root().to_path_buf(),
            services,
        })
    }

    /// Render one service's config files without writing them.
    pub fn preview(
        &self,
        config: &HomelabConfig,
        service_type: ServiceType,
    ) -> HomelabResult<Vec<(PathBuf, String)>> {
        self.registry.clear_cache()?;
        let descriptor = self
            .registry
            .create_service(service_type, &Arc::new(config.clone()))?;
        let context = descriptor.template_context()?;

        descriptor
            .def()
            .config_files
            .iter()
            .map(|file| {
                let content = self.engine.render_named(file.template, &context)?;
                Ok((descriptor.install_dir().join(file.path), content))
            })
            .collect()
    }

    /// Execute a full run.
    ///
    /// Errors are returned after rollback. Cancellation is not an error: it
    /// yields [`RunOutcome::Cancelled`], also after rollback. On success
    /// the pending actions are discarded.
    #[instrument(skip_all, fields(domain = %config.domain()))]
    pub fn run(&self, config: &HomelabConfig, ctx: &mut RunContext) -> HomelabResult<RunOutcome> {
        let started_at = Utc::now();

        match self.execute(config, ctx) {
            Ok(Progress::Completed {
                distribution,
                installed,
            }) => {
                ctx.recovery_mut().clear();
                info!(services = installed.len(), "Installation complete");
                Ok(RunOutcome::Completed(InstallSummary {
                    distribution,
                    installed,
                    started_at,
                    finished_at: Utc::now(),
                }))
            }
            Ok(Progress::Cancelled { installed }) => {
                let report = ctx.shutdown(ShutdownReason::Cancelled);
                Ok(RunOutcome::Cancelled {
                    rolled_back: installed.iter().map(|s| s.service_type).collect(),
                    rollback: report.rollback,
                })
            }
            Err(e) => {
                ctx.shutdown(ShutdownReason::Failure(&e));
                Err(e)
            }
        }
    }

    fn execute(&self, config: &HomelabConfig, ctx: &mut RunContext) -> HomelabResult<Progress> {
        let distribution = self.probe.detect()?;
        info!(distribution = %distribution, "Detected platform");

        let ordered = self.prepare(config)?;

        let mut installed = Vec::with_capacity(ordered.len());
        if ctx.cancellation().is_cancelled() {
            return Ok(Progress::Cancelled { installed });
        }

        self.ensure_network(config.network(), ctx.recovery_mut())?;

        for descriptor in ordered {
            if ctx.cancellation().is_cancelled() {
                info!(next = %descriptor.service_type(), "Cancellation requested");
                return Ok(Progress::Cancelled { installed });
            }
            info!(service = %descriptor.service_type(), "Installing");
            installed.push(self.installer.install(descriptor, ctx.recovery_mut())?);
        }

        Ok(Progress::Completed {
            distribution,
            installed,
        })
    }

    fn prepare(&self, config: &HomelabConfig) -> HomelabResult<Vec<Arc<ServiceDescriptor>>> {
        self.registry.validate_configuration(config)?;
        self.registry.clear_cache()?;

        let config = Arc::new(config.clone());
        let services = self.registry.create_services(&config)?;
        Ok(self.registry.installation_order(&services))
    }

    /// Create the shared network unless it already exists.
    fn ensure_network(&self, network: &str, recovery: &mut RecoveryManager) -> HomelabResult<()> {
        let inspect = CommandSpec::new("docker").args(["network", "inspect", network]);
        if self.runner.run(&inspect)?.is_success() {
            debug!(network, "Network already exists");
            return Ok(());
        }

        let create = CommandSpec::new("docker").args(["network", "create", network]);
        let output = self.runner.run(&create)?;
        if !output.is_success() {
            return Err(command_failed(&create, output.failure_reason()));
        }
        info!(network, "Created network");

        let runner = Arc::clone(&self.runner);
        let remove = CommandSpec::new("docker").args(["network", "rm", network]);
        recovery.register_action(RollbackAction::new(
            format!("remove network {network}"),
            move || {
                let output = runner.run(&remove)?;
                if output.is_success() {
                    Ok(())
                } else {
                    Err(command_failed(&remove, output.failure_reason()))
                }
            },
        ));
        Ok(())
    }
}

fn command_failed(command: &CommandSpec, reason: String) -> HomelabError {
    ApplicationError::CommandFailed {
        command: command.to_string(),
        reason,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        CommandOutput, MockCommandRunner, MockConfigWriter, MockPlatformProbe, MockTemplateLoader,
    };
    use crate::domain::DomainError;
    use crate::error::ErrorKind;
    use serde_json::json;
    use std::sync::Mutex;

    fn config(services: &[ServiceType]) -> HomelabConfig {
        HomelabConfig::builder()
            .ip("192.168.1.10")
            .domain("home.lan")
            .services(services.iter().copied())
            .postgres_password("pw")
            .install_root("/srv/homelab")
            .build()
    }

    fn loader() -> MockTemplateLoader {
        let mut loader = MockTemplateLoader::new();
        loader
            .expect_load()
            .returning(|_| Ok(json!({ "content": "name: {{container_name}}" })));
        loader
    }

    fn probe() -> MockPlatformProbe {
        let mut probe = MockPlatformProbe::new();
        probe.expect_detect().returning(|| Ok(Distribution::Debian));
        probe
    }

    fn writer() -> MockConfigWriter {
        let mut writer = MockConfigWriter::new();
        writer.expect_write_config().returning(|_, _| Ok(()));
        writer.expect_remove_config().returning(|_| Ok(()));
        writer
    }

    /// Runner that records commands and answers with `respond`.
    fn recording_runner(
        log: Arc<Mutex<Vec<String>>>,
        respond: impl Fn(&CommandSpec) -> CommandOutput + Send + Sync + 'static,
    ) -> MockCommandRunner {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(move |cmd| {
            log.lock().unwrap().push(cmd.to_string());
            Ok(respond(cmd))
        });
        runner
    }

    fn provisioner(runner: MockCommandRunner, probe: MockPlatformProbe) -> Provisioner {
        Provisioner::new(
            Arc::new(runner),
            Arc::new(loader()),
            Arc::new(writer()),
            Arc::new(probe),
        )
    }

    #[test]
    fn successful_run_installs_in_order_and_commits() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let runner = recording_runner(Arc::clone(&log), |cmd| {
            if cmd.get_args().starts_with(&["network".to_string(), "inspect".to_string()]) {
                CommandOutput::failure(1, "not found")
            } else {
                CommandOutput::success()
            }
        });
        let p = provisioner(runner, probe());
        let mut ctx = RunContext::new();

        let outcome = p.run(&config(&[ServiceType::Redis]), &mut ctx).unwrap();

        let RunOutcome::Completed(summary) = outcome else {
            panic!("expected completion");
        };
        let order: Vec<_> = summary.installed.iter().map(|s| s.service_type).collect();
        assert_eq!(
            order,
            vec![
                ServiceType::Caddy,
                ServiceType::Portainer,
                ServiceType::Copyparty,
                ServiceType::Redis
            ]
        );
        assert_eq!(summary.distribution, Distribution::Debian);
        assert!(!ctx.recovery().has_pending());

        let log = log.lock().unwrap();
        assert_eq!(log[0], "docker network inspect homelab");
        assert_eq!(log[1], "docker network create homelab");
        assert!(log.iter().all(|c| !c.ends_with(" down")));
    }

    #[test]
    fn unsupported_platform_aborts_before_any_command() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        let mut probe = MockPlatformProbe::new();
        probe
            .expect_detect()
            .returning(|| Err(DomainError::UnsupportedDistribution("gentoo".into()).into()));

        let err = provisioner(runner, probe)
            .run(&config(&[]), &mut RunContext::new())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DistributionNotSupported);
    }

    #[test]
    fn failure_rolls_back_completed_services() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let runner = recording_runner(Arc::clone(&log), |cmd| {
            let args = cmd.get_args().join(" ");
            if args.contains("homelab-copyparty up") {
                CommandOutput::failure(1, "image pull failed")
            } else {
                CommandOutput::success()
            }
        });
        let p = provisioner(runner, probe());
        let mut ctx = RunContext::new();

        let err = p.run(&config(&[]), &mut ctx).unwrap_err();

        assert_eq!(err.service(), Some(ServiceType::Copyparty));
        assert!(!ctx.recovery().has_pending());

        let log = log.lock().unwrap();
        let downs: Vec<_> = log.iter().filter(|c| c.ends_with(" down")).collect();
        assert_eq!(downs.len(), 2);
        assert!(downs[0].contains("homelab-portainer"));
        assert!(downs[1].contains("homelab-caddy"));
    }

    #[test]
    fn cancellation_stops_between_services_and_rolls_back() {
        let flag = CancellationFlag::new();
        let trigger = flag.clone();
        let log = Arc::new(Mutex::new(Vec::new()));
        let runner = recording_runner(Arc::clone(&log), move |cmd| {
            if cmd.get_args().join(" ").contains("homelab-caddy up") {
                trigger.cancel();
            }
            CommandOutput::success()
        });
        let p = provisioner(runner, probe());
        let mut ctx = RunContext::with_cancellation(flag);

        let outcome = p.run(&config(&[]), &mut ctx).unwrap();

        let RunOutcome::Cancelled {
            rolled_back,
            rollback,
        } = outcome
        else {
            panic!("expected cancellation");
        };
        assert_eq!(rolled_back, vec![ServiceType::Caddy]);
        assert!(rollback.unwrap().is_clean());

        let log = log.lock().unwrap();
        assert!(log.iter().all(|c| !c.contains("homelab-portainer")));
        assert!(log.last().unwrap().ends_with(" down"));
    }

    #[test]
    fn plan_has_no_side_effects() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        let mut probe = MockPlatformProbe::new();
        probe.expect_detect().never();

        let plan = provisioner(runner, probe)
            .plan(&config(&[ServiceType::Outline]))
            .unwrap();

        assert_eq!(plan.services.len(), 4);
        assert_eq!(plan.services[3].service_type, ServiceType::Outline);
        assert_eq!(
            plan.services[3].files,
            vec![PathBuf::from("/srv/homelab/outline/docker-compose.yml")]
        );
    }

    #[test]
    fn preview_renders_without_writing() {
        let mut writer = MockConfigWriter::new();
        writer.expect_write_config().never();
        let p = Provisioner::new(
            Arc::new(MockCommandRunner::new()),
            Arc::new(loader()),
            Arc::new(writer),
            Arc::new(MockPlatformProbe::new()),
        );

        let files = p.preview(&config(&[]), ServiceType::Redis).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].1, "name: homelab-redis");
    }

    #[test]
    fn preview_uses_its_own_config_after_plan() {
        let p = Provisioner::new(
            Arc::new(MockCommandRunner::new()),
            Arc::new(loader()),
            Arc::new(writer()),
            Arc::new(MockPlatformProbe::new()),
        );
        p.plan(&config(&[ServiceType::Redis])).unwrap();

        let other = HomelabConfig::builder()
            .ip("10.0.0.2")
            .domain("other.lan")
            .install_root("/data/lab")
            .build();
        let files = p.preview(&other, ServiceType::Caddy).unwrap();

        assert_eq!(
            files[0].0,
            PathBuf::from("/data/lab/caddy/docker-compose.yml")
        );
    }
}
