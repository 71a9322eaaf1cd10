//! Queue-driven resolution and installation.
//!
//! Specifiers become [`Query`] entries on a FIFO queue. Each entry is looked
//! up in the repository, checked against what is installed and what earlier
//! requesters asked for, and installed. The dependencies of every fresh
//! install go back onto the same queue, so the walk is breadth first and
//! single pass: a conflict between two requesters is detected and recorded,
//! never solved by backtracking.

use std::collections::{HashSet, VecDeque};

use pipette_core::condition::{format_conditions, normalize_name, parse_extra_names, satisfies_all};
use pipette_core::dependency::Dependency;
use pipette_core::environment::MarkerEnvironment;
use pipette_core::metadata::InstalledPackage;
use pipette_core::source::{PackageRepository, PackageStore};
use pipette_util::errors::PipetteError;

use crate::query::{Query, Request};
use crate::registry::LocalRegistry;
use crate::report::{InstallSummary, Reporter, VersionConflict};

/// Switches that change how the queue is processed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Install only what was asked for, not its requirements.
    pub no_dependencies: bool,
    /// Do not report successful installs.
    pub quiet: bool,
}

pub struct Installer<'a> {
    repository: &'a dyn PackageRepository,
    store: &'a dyn PackageStore,
    environment: &'a MarkerEnvironment,
    reporter: &'a dyn Reporter,
    options: Options,
    queue: VecDeque<Query>,
    registry: LocalRegistry,
    /// `(package, extra)` pairs already expanded this run, both normalized.
    expanded: HashSet<(String, String)>,
    summary: InstallSummary,
}

impl<'a> Installer<'a> {
    pub fn new(
        repository: &'a dyn PackageRepository,
        store: &'a dyn PackageStore,
        environment: &'a MarkerEnvironment,
        reporter: &'a dyn Reporter,
        options: Options,
    ) -> Self {
        Self {
            repository,
            store,
            environment,
            reporter,
            options,
            queue: VecDeque::new(),
            registry: LocalRegistry::new(),
            expanded: HashSet::new(),
            summary: InstallSummary::default(),
        }
    }

    /// Queue user specifiers. A malformed extras list aborts with
    /// [`PipetteError::Syntax`] before anything is installed.
    pub fn initialize_packages<S: AsRef<str>>(&mut self, specifiers: &[S]) -> Result<(), PipetteError> {
        let requests = specifiers
            .iter()
            .map(|spec| Request::parse(spec.as_ref(), false))
            .collect();
        self.supply(requests)
    }

    /// Number of queries waiting to be processed.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Process the queue to completion.
    pub fn install(mut self) -> InstallSummary {
        self.process();
        self.summary
    }

    fn fail(&mut self, name: &str, error: &PipetteError) {
        self.reporter.failure(name, error);
        self.summary.failed.push((name.to_string(), error.to_string()));
    }

    /// Split extras off each request and queue the work.
    ///
    /// Only a syntax error in a top-level request is returned; everything else
    /// is reported against the request and skipped.
    fn supply(&mut self, requests: Vec<Request>) -> Result<(), PipetteError> {
        let mut pending: VecDeque<Request> = requests.into();

        while let Some(request) = pending.pop_front() {
            let (clean, extras) = match parse_extra_names(&request.package_name) {
                Ok(split) => split,
                Err(e) if !request.is_dependency => return Err(e),
                Err(e) => {
                    self.fail(&request.package_name, &e);
                    continue;
                }
            };

            if extras.is_empty() {
                self.queue.push_back(Query::Direct(request));
                continue;
            }

            let base = Request {
                package_name: clean,
                conditions: request.conditions.clone(),
                is_dependency: request.is_dependency,
            };
            match self.store.load(&base.package_name) {
                Ok(package) => {
                    self.queue.push_back(Query::Direct(base));
                    let expanded = self.expand_extras(&package, &request.package_name, &extras);
                    pending.extend(expanded);
                }
                Err(PipetteError::PackageDirectoryMissing { .. }) => {
                    tracing::debug!("deferring extras of {} until it is installed", base.package_name);
                    let deferred = Request {
                        package_name: request.package_name,
                        conditions: Vec::new(),
                        is_dependency: request.is_dependency,
                    };
                    self.queue.push_back(Query::AwaitingBase { base, deferred });
                }
                Err(e) => self.fail(&request.package_name, &e),
            }
        }
        Ok(())
    }

    /// Expand the extras of a deferred request whose base has just been
    /// installed. The base itself is not queued again.
    fn supply_deferred(&mut self, deferred: Request) {
        let (clean, extras) = match parse_extra_names(&deferred.package_name) {
            Ok(split) => split,
            Err(e) => {
                self.fail(&deferred.package_name, &e);
                return;
            }
        };
        let package = match self.store.load(&clean) {
            Ok(package) => package,
            Err(e) => {
                self.fail(&deferred.package_name, &e);
                return;
            }
        };
        let expanded = self.expand_extras(&package, &deferred.package_name, &extras);
        if let Err(e) = self.supply(expanded) {
            self.fail(&deferred.package_name, &e);
        }
    }

    /// Requests for the requirements of each extra that apply here. An extra
    /// is expanded at most once per package, so extras that name each other
    /// terminate.
    fn expand_extras(&mut self, package: &InstalledPackage, label: &str, extras: &[String]) -> Vec<Request> {
        let base = normalize_name(package.name());
        let mut requests = Vec::new();
        for extra in extras {
            if !self.expanded.insert((base.clone(), normalize_name(extra))) {
                tracing::debug!("extra {extra} of {base} already expanded");
                continue;
            }
            match package.extra_dependencies(extra) {
                Ok(deps) => requests.extend(self.applicable(&deps)),
                Err(e) => self.fail(label, &e),
            }
        }
        requests
    }

    /// Filter requirement lines through the marker environment. A line whose
    /// markers cannot be evaluated is reported and dropped.
    fn applicable(&mut self, dependencies: &[Dependency]) -> Vec<Request> {
        let mut requests = Vec::new();
        for dep in dependencies {
            match dep.applies_to(self.environment) {
                Ok(true) => requests.push(Request::parse(&dep.raw_value, true)),
                Ok(false) => tracing::debug!("skipping `{dep}`: markers do not apply"),
                Err(e) => self.fail(&dep.to_string(), &e),
            }
        }
        requests
    }

    /// Resolve and install a single request.
    fn install_request(&mut self, request: &Request) -> Result<InstalledPackage, PipetteError> {
        let name = &request.package_name;
        let candidate = self.repository.find_package(name, &request.conditions)?;

        match self.store.load(name) {
            Ok(installed) => {
                match self.registry.conditions(name) {
                    Some(recorded) => {
                        let mut all = recorded.to_vec();
                        all.extend(request.conditions.iter().cloned());
                        if satisfies_all(installed.version(), &all)? {
                            return Err(PipetteError::PackageInLocalList { name: name.clone() });
                        }
                        tracing::debug!(
                            "{} {} does not satisfy {}",
                            installed.name(),
                            installed.version(),
                            format_conditions(&all)
                        );
                        self.summary.conflicts.add(VersionConflict {
                            package: installed.name().to_string(),
                            installed: installed.version().to_string(),
                            requested: format_conditions(&all),
                            reason: format!("replaced by {}", candidate.version),
                        });
                    }
                    None if candidate.version == installed.version() => {
                        return Err(PipetteError::PackageAlreadyInstalled { name: name.clone() });
                    }
                    None => {}
                }
                self.store.uninstall(&installed)?;
            }
            Err(PipetteError::PackageDirectoryMissing { .. }) => {}
            Err(e) => return Err(e),
        }

        let archive = self.repository.download_package(&candidate)?;
        let extracted = self.store.extract(&archive);
        if let Err(e) = std::fs::remove_file(&archive) {
            tracing::warn!("failed to remove {}: {e}", archive.display());
        }
        extracted?;

        self.store.load(name)
    }

    fn process(&mut self) {
        while let Some(query) = self.queue.pop_front() {
            tracing::debug!("processing {}", query.request().describe());
            let (request, deferred) = query.into_parts();
            let name = request.package_name.clone();

            let outcome = self.install_request(&request);
            self.registry.record(&name, &request.conditions);

            match outcome {
                Ok(package) => {
                    self.summary
                        .installed
                        .push((package.name().to_string(), package.version().to_string()));
                    if !self.options.quiet {
                        self.reporter.success(package.name(), package.version());
                    }
                    if !self.options.no_dependencies {
                        let requests = self.applicable(&package.dependencies());
                        if let Err(e) = self.supply(requests) {
                            self.fail(&name, &e);
                        }
                    }
                    if let Some(deferred) = deferred {
                        self.supply_deferred(deferred);
                    }
                }
                Err(e) if e.is_informational() => {
                    let suppressed = matches!(e, PipetteError::PackageInLocalList { .. })
                        || request.is_dependency;
                    if !suppressed {
                        self.reporter.failure(&name, &e);
                    }
                    // the base is present, so its extras can still be expanded
                    if let Some(deferred) = deferred {
                        self.supply_deferred(deferred);
                    }
                }
                Err(e) => self.fail(&name, &e),
            }
        }
    }
}
