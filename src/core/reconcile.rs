//! Dependency reconciliation
//!
//! Brings the lock document into agreement with an add, remove or
//! install-all request. Every package moves through
//! `Idle → Resolving → Verifying → Persisting → Done`, or ends in `Failed`
//! after resolution or verification.
//!
//! Packages are independent: resolution and integrity checks run
//! concurrently, every outcome is awaited, and one failure never blocks or
//! rolls back the others. Lock edits are then applied sequentially in request
//! order and written once. The package manager runs last; if it fails the
//! lock change stays on disk and the failure is reported as a warning.

use std::fmt;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use indexmap::IndexMap;

use crate::core::lock::{DependencyKind, LockDocument, LockEntry};
use crate::core::manifest::{DependencySpec, Manifest};
use crate::core::package_spec::PackageSpec;
use crate::core::progress::Progress;
use crate::error::{LockError, ManifestError, PackageError, ReconcileError, SubprocessError};
use crate::infra::integrity::IntegrityResolver;
use crate::infra::package_manager::{InstallFlags, PackageManagerAdapter, Verb};
use crate::registry::client::RegistryClient;

/// Per-package reconciliation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    Verifying,
    Persisting,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Verifying => "verifying",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Flags shared by add and remove
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Target `devDependencies`
    pub dev: bool,
    /// Operate on the global package set
    pub global: bool,
}

impl ReconcileOptions {
    fn kind(self) -> DependencyKind {
        DependencyKind::from_dev(self.dev)
    }

    fn install_flags(self) -> InstallFlags {
        InstallFlags {
            global: self.global,
            dev: self.dev,
            silent: true,
        }
    }
}

/// What happened to one package in the lock document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageChange {
    /// Entry written (or already present for install-all)
    Locked {
        kind: DependencyKind,
        entry: LockEntry,
    },
    /// Entry deleted; `None` if it was not in the lock document
    Removed {
        kind: DependencyKind,
        entry: Option<LockEntry>,
    },
}

/// Result for one requested package
#[derive(Debug)]
pub struct PackageOutcome {
    /// The spec as the user typed it
    pub requested: String,
    /// Package name, or the raw request if it did not parse
    pub name: String,
    /// Lock change on success
    pub result: Result<PackageChange, PackageError>,
}

impl PackageOutcome {
    /// Whether the package reconciled successfully
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// What happened at the package manager step
#[derive(Debug)]
pub enum InstallStatus {
    /// Package manager invocation disabled by the caller
    Skipped,
    /// No package left to hand to the package manager
    NothingToDo,
    /// One result per invocation, command line on success
    Ran(Vec<Result<String, SubprocessError>>),
}

impl InstallStatus {
    /// Failed invocations
    pub fn failures(&self) -> Vec<&SubprocessError> {
        match self {
            Self::Ran(results) => results.iter().filter_map(|r| r.as_ref().err()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Summary of one reconciliation
#[derive(Debug)]
pub struct ReconcileReport {
    /// One entry per requested package, in request order
    pub outcomes: Vec<PackageOutcome>,
    /// Set when the existing lock document was unusable and reset
    pub lock_warning: Option<LockError>,
    /// Whether the lock document was rewritten
    pub lock_written: bool,
    /// Package manager step
    pub install: InstallStatus,
}

impl ReconcileReport {
    /// Names that reconciled successfully
    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.succeeded())
            .map(|o| o.name.as_str())
            .collect()
    }

    /// Names that failed, with their errors
    pub fn failed(&self) -> Vec<(&str, &PackageError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
            .collect()
    }
}

/// Keeps `deps.neko` consistent with add, remove and install-all requests
pub struct Reconciler<'a> {
    project_dir: PathBuf,
    registry: &'a RegistryClient,
    integrity: &'a IntegrityResolver,
    package_manager: Option<&'a dyn PackageManagerAdapter>,
    progress: &'a dyn Progress,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler for `project_dir`
    ///
    /// With `package_manager` set to `None` only the lock document is
    /// touched.
    pub fn new(
        project_dir: &Path,
        registry: &'a RegistryClient,
        integrity: &'a IntegrityResolver,
        package_manager: Option<&'a dyn PackageManagerAdapter>,
        progress: &'a dyn Progress,
    ) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            registry,
            integrity,
            package_manager,
            progress,
        }
    }

    fn lock_path(&self) -> PathBuf {
        LockDocument::path_in(&self.project_dir)
    }

    /// Local operations need a manifest; global ones do not
    fn require_manifest(&self, options: ReconcileOptions) -> Result<(), ReconcileError> {
        let path = Manifest::path_in(&self.project_dir);
        if !options.global && !path.exists() {
            return Err(ManifestError::Missing {
                path: self.project_dir.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn load_lock(&self) -> (LockDocument, bool, Option<LockError>) {
        let loaded = LockDocument::load(&self.lock_path());
        if let Some(warning) = &loaded.warning {
            self.progress.warn(&format!("{warning}. Reinitializing."));
        }
        (loaded.document, loaded.existed, loaded.warning)
    }

    /// Add packages: resolve, verify, lock, then install
    pub async fn add(
        &self,
        specs: &[String],
        options: ReconcileOptions,
    ) -> Result<ReconcileReport, ReconcileError> {
        if options.global && options.dev {
            return Err(ReconcileError::GlobalWithDev);
        }
        self.require_manifest(options)?;

        let (mut document, _, lock_warning) = self.load_lock();
        let kind = options.kind();

        let requests: Vec<(String, Result<PackageSpec, PackageError>)> = specs
            .iter()
            .map(|raw| (raw.clone(), PackageSpec::parse(raw)))
            .collect();
        let outcomes = self.lock_all(requests, |_| kind).await;

        let lock_written = self.persist(&mut document, &outcomes)?;

        let tokens = install_tokens(&outcomes, None);
        let install = self.run_package_manager(&[(Verb::Install, tokens, options.install_flags())]);
        self.finish(&outcomes);

        Ok(ReconcileReport {
            outcomes,
            lock_warning,
            lock_written,
            install,
        })
    }

    /// Remove packages from the lock document, then uninstall
    pub async fn remove(
        &self,
        names: &[String],
        options: ReconcileOptions,
    ) -> Result<ReconcileReport, ReconcileError> {
        if options.global && options.dev {
            return Err(ReconcileError::GlobalWithDev);
        }
        self.require_manifest(options)?;

        let (mut document, existed, lock_warning) = self.load_lock();
        let kind = options.kind();
        let mut changed = false;

        let outcomes: Vec<PackageOutcome> = names
            .iter()
            .map(|raw| match PackageSpec::parse(raw) {
                Ok(spec) => {
                    self.progress.phase(&spec.name, Phase::Persisting);
                    let entry = document.remove(&spec.name, kind);
                    if entry.is_some() {
                        tracing::info!("Removed {} from {kind}", spec.name);
                        changed = true;
                    } else {
                        tracing::info!("{} not in {kind}, lock unchanged", spec.name);
                    }
                    PackageOutcome {
                        requested: raw.clone(),
                        name: spec.name,
                        result: Ok(PackageChange::Removed { kind, entry }),
                    }
                }
                Err(error) => self.fail(raw, raw, error),
            })
            .collect();

        let lock_written = existed && changed;
        if lock_written {
            document.save(&self.lock_path())?;
        }

        let names: Vec<String> = outcomes
            .iter()
            .filter(|o| o.succeeded())
            .map(|o| o.name.clone())
            .collect();
        let install =
            self.run_package_manager(&[(Verb::Uninstall, names, options.install_flags())]);
        self.finish(&outcomes);

        Ok(ReconcileReport {
            outcomes,
            lock_warning,
            lock_written,
            install,
        })
    }

    /// Install everything the lock document lists
    ///
    /// The lock document is authoritative. Only when it has no entries is the
    /// manifest consulted, and its dependencies are resolved and locked
    /// first.
    pub async fn install_all(&self) -> Result<ReconcileReport, ReconcileError> {
        let (mut document, _, lock_warning) = self.load_lock();

        let (outcomes, lock_written) = if document.is_empty() {
            let manifest = Manifest::load(&Manifest::path_in(&self.project_dir))?;
            let declared = self.merge_declarations(manifest.dependency_specs());
            if declared.is_empty() {
                self.progress.message("No dependencies found to install");
            }
            let requests = declared
                .iter()
                .map(|d| {
                    let raw = format!("{}@{}", d.name, d.version_range);
                    let spec = PackageSpec::from_manifest(&d.name, &d.version_range);
                    (raw, spec)
                })
                .collect();
            let kinds: Vec<DependencyKind> = declared.iter().map(|d| d.kind).collect();
            let outcomes = self.lock_all(requests, |index| kinds[index]).await;
            let written = self.persist(&mut document, &outcomes)?;
            (outcomes, written)
        } else {
            self.progress
                .message(&format!("Installing {} locked packages", document.len()));
            let outcomes = document
                .entries()
                .map(|(kind, name, entry)| PackageOutcome {
                    requested: format!("{name}@{}", entry.version),
                    name: name.to_string(),
                    result: Ok(PackageChange::Locked {
                        kind,
                        entry: entry.clone(),
                    }),
                })
                .collect();
            (outcomes, false)
        };

        let runtime = install_tokens(&outcomes, Some(DependencyKind::Runtime));
        let dev = install_tokens(&outcomes, Some(DependencyKind::Dev));
        let install = self.run_package_manager(&[
            (
                Verb::Install,
                runtime,
                ReconcileOptions::default().install_flags(),
            ),
            (
                Verb::Install,
                dev,
                ReconcileOptions {
                    dev: true,
                    global: false,
                }
                .install_flags(),
            ),
        ]);
        self.finish(&outcomes);

        Ok(ReconcileReport {
            outcomes,
            lock_warning,
            lock_written,
            install,
        })
    }

    /// One declaration per name; the later section wins
    fn merge_declarations(&self, declared: Vec<DependencySpec>) -> Vec<DependencySpec> {
        let mut merged: IndexMap<String, DependencySpec> = IndexMap::new();
        for spec in declared {
            if let Some(previous) = merged.shift_remove(&spec.name) {
                tracing::warn!(
                    "{} declared in both {} and {}",
                    spec.name,
                    previous.kind,
                    spec.kind
                );
                self.progress.warn(&format!(
                    "{} is declared in both {} and {}; using {} {}",
                    spec.name, previous.kind, spec.kind, spec.kind, spec.version_range
                ));
            }
            merged.insert(spec.name.clone(), spec);
        }
        merged.into_values().collect()
    }

    /// Resolve and verify every request concurrently, awaiting all of them
    async fn lock_all<F>(
        &self,
        requests: Vec<(String, Result<PackageSpec, PackageError>)>,
        kind_of: F,
    ) -> Vec<PackageOutcome>
    where
        F: Fn(usize) -> DependencyKind,
    {
        let tasks = requests
            .into_iter()
            .enumerate()
            .map(|(index, (raw, spec))| {
                let kind = kind_of(index);
                async move {
                    let spec = match spec {
                        Ok(spec) => spec,
                        Err(error) => return self.fail(&raw, &raw, error),
                    };
                    match self.lock_one(&spec).await {
                        Ok(entry) => PackageOutcome {
                            requested: raw,
                            name: spec.name,
                            result: Ok(PackageChange::Locked { kind, entry }),
                        },
                        Err(error) => self.fail(&raw, &spec.name, error),
                    }
                }
            });
        join_all(tasks).await
    }

    async fn lock_one(&self, spec: &PackageSpec) -> Result<LockEntry, PackageError> {
        self.progress.phase(&spec.name, Phase::Resolving);
        let resolved = self.registry.resolve(spec).await?;
        tracing::debug!("Resolved {spec} to {}", resolved.version);

        self.progress.phase(&spec.name, Phase::Verifying);
        let integrity = self
            .integrity
            .compute_integrity(&resolved.tarball_url)
            .await?;

        Ok(LockEntry::new(
            resolved.version,
            resolved.tarball_url,
            integrity,
        ))
    }

    fn fail(&self, requested: &str, name: &str, error: PackageError) -> PackageOutcome {
        tracing::warn!("{requested}: {error}");
        self.progress.phase(name, Phase::Failed);
        self.progress
            .warn(&format!("An error occurred with {requested}: {error}"));
        PackageOutcome {
            requested: requested.to_string(),
            name: name.to_string(),
            result: Err(error),
        }
    }

    /// Apply successful entries in request order and write once
    fn persist(
        &self,
        document: &mut LockDocument,
        outcomes: &[PackageOutcome],
    ) -> Result<bool, LockError> {
        let mut changed = false;
        for outcome in outcomes {
            if let Ok(PackageChange::Locked { kind, entry }) = &outcome.result {
                self.progress.phase(&outcome.name, Phase::Persisting);
                document.upsert(&outcome.name, entry.clone(), *kind);
                tracing::info!("Added/Updated {} in {kind}", outcome.name);
                changed = true;
            }
        }
        if changed {
            document.save(&self.lock_path())?;
        }
        Ok(changed)
    }

    fn run_package_manager(&self, batches: &[(Verb, Vec<String>, InstallFlags)]) -> InstallStatus {
        let Some(package_manager) = self.package_manager else {
            return InstallStatus::Skipped;
        };

        let results: Vec<Result<String, SubprocessError>> = batches
            .iter()
            .filter(|(_, packages, _)| !packages.is_empty())
            .map(|(verb, packages, flags)| {
                self.progress.message(&format!(
                    "Running {} for {} package(s)",
                    package_manager.name(),
                    packages.len()
                ));
                let result = package_manager.run(*verb, packages, *flags).map(|output| {
                    for line in output.stdout.lines().chain(output.stderr.lines()) {
                        if !line.trim().is_empty() {
                            tracing::debug!("{}: {line}", package_manager.name());
                        }
                    }
                    output.command
                });
                if let Err(error) = &result {
                    tracing::warn!("{error}");
                }
                result
            })
            .collect();

        if results.is_empty() {
            InstallStatus::NothingToDo
        } else {
            InstallStatus::Ran(results)
        }
    }

    fn finish(&self, outcomes: &[PackageOutcome]) {
        for outcome in outcomes.iter().filter(|o| o.succeeded()) {
            self.progress.phase(&outcome.name, Phase::Done);
        }
    }
}

/// `name@version` for every locked outcome, optionally of one kind
fn install_tokens(outcomes: &[PackageOutcome], only: Option<DependencyKind>) -> Vec<String> {
    outcomes
        .iter()
        .filter_map(|o| match &o.result {
            Ok(PackageChange::Locked { kind, entry }) if only.map_or(true, |k| k == *kind) => {
                Some(format!("{}@{}", o.name, entry.version))
            }
            _ => None,
        })
        .collect()
}
