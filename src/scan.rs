//! Scan pipeline
//!
//! Drives every type of one or more scan units through
//! `resolve → validate → evaluate conditions` and then emits the accepted
//! declarations. Planning finishes for all units before the first registration
//! reaches the container, so a failed scan leaves the container untouched.

use crate::condition::ConditionEvaluator;
use crate::config::{Configuration, ErrorPolicy, ScanConfig};
use crate::errors::{ResolveError, Result};
use crate::infrastructure::ContainerAdapter;
use crate::logging::OperationTimer;
use crate::metadata::{RegistrationDeclaration, TypeDescriptor, TypeKey};
use crate::registrar::{Registrar, RegistrationDescriptor};
use crate::resolver::AttributeResolver;
use crate::scanner::{ScanUnit, TypeScanner};
use crate::validator::CompatibilityValidator;

/// Terminal state of one scanned type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOutcome {
    /// The type carries no marker
    NoDeclaration,
    /// A condition returned `false`
    Dropped(RegistrationDeclaration),
    /// Valid and accepted; registered once the scan is applied
    Accepted(RegistrationDeclaration),
}

/// Outcome of a scan, one entry per type in scan order
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    outcomes: Vec<(TypeKey, TypeOutcome)>,
}

impl ScanReport {
    pub fn outcomes(&self) -> &[(TypeKey, TypeOutcome)] {
        &self.outcomes
    }

    /// Outcome of the first scanned occurrence of `T`
    pub fn outcome_of<T: 'static>(&self) -> Option<&TypeOutcome> {
        self.outcomes
            .iter()
            .find(|(key, _)| key.is::<T>())
            .map(|(_, outcome)| outcome)
    }

    pub fn scanned(&self) -> usize {
        self.outcomes.len()
    }

    pub fn undeclared(&self) -> usize {
        self.count(|outcome| matches!(outcome, TypeOutcome::NoDeclaration))
    }

    pub fn dropped(&self) -> usize {
        self.count(|outcome| matches!(outcome, TypeOutcome::Dropped(_)))
    }

    pub fn accepted(&self) -> usize {
        self.count(|outcome| matches!(outcome, TypeOutcome::Accepted(_)))
    }

    /// Accepted declarations in scan order
    pub fn declarations(&self) -> impl Iterator<Item = &RegistrationDeclaration> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            TypeOutcome::Accepted(declaration) => Some(declaration),
            _ => None,
        })
    }

    /// Descriptors of the accepted declarations in scan order
    pub fn descriptors(&self) -> Vec<RegistrationDescriptor> {
        self.declarations().map(RegistrationDescriptor::from).collect()
    }

    fn count(&self, predicate: impl Fn(&TypeOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, outcome)| predicate(outcome)).count()
    }

    fn extend(&mut self, other: ScanReport) {
        self.outcomes.extend(other.outcomes);
    }
}

/// Scan driver configured by [`ScanConfig`]
#[derive(Debug, Clone, Default)]
pub struct ServiceScan {
    config: ScanConfig,
}

impl ServiceScan {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Examines every type of `unit` without touching any container
    pub fn plan(&self, configuration: &Configuration, unit: &ScanUnit) -> Result<ScanReport> {
        self.plan_all(configuration, std::iter::once(unit))
    }

    /// Plans `unit` and registers every accepted declaration
    pub fn run(
        &self,
        container: &mut dyn ContainerAdapter,
        configuration: &Configuration,
        unit: &ScanUnit,
    ) -> Result<ScanReport> {
        self.run_all(container, configuration, std::iter::once(unit))
    }

    /// Scans several units in order.
    ///
    /// Every unit is planned before anything is registered.
    pub fn run_all<'a>(
        &self,
        container: &mut dyn ContainerAdapter,
        configuration: &Configuration,
        units: impl IntoIterator<Item = &'a ScanUnit>,
    ) -> Result<ScanReport> {
        let report = self.plan_all(configuration, units)?;

        for declaration in report.declarations() {
            Registrar::register(declaration, container);
        }

        Ok(report)
    }

    fn plan_all<'a>(
        &self,
        configuration: &Configuration,
        units: impl IntoIterator<Item = &'a ScanUnit>,
    ) -> Result<ScanReport> {
        let timer = OperationTimer::new("service_scan");
        let mut report = ScanReport::default();
        let mut errors = Vec::new();

        for unit in units {
            match self.plan_unit(configuration, unit, &mut errors) {
                Ok(unit_report) => report.extend(unit_report),
                Err(error) => {
                    tracing::error!(unit = unit.name(), error = %error, "Service scan aborted");
                    return Err(error);
                }
            }
        }

        if !errors.is_empty() {
            tracing::error!(errors = errors.len(), "Service scan failed");
            return Err(ResolveError::Aggregate(errors));
        }

        tracing::info!(
            scanned = report.scanned(),
            undeclared = report.undeclared(),
            dropped = report.dropped(),
            accepted = report.accepted(),
            elapsed_us = timer.finish().as_micros() as u64,
            "Service scan completed"
        );

        Ok(report)
    }

    // FailFast 时直接返回第一个错误；CollectAll 时把错误收集到 `errors`
    fn plan_unit(
        &self,
        configuration: &Configuration,
        unit: &ScanUnit,
        errors: &mut Vec<ResolveError>,
    ) -> Result<ScanReport> {
        let mut report = ScanReport::default();

        for ty in TypeScanner::scan(unit) {
            match Self::examine(ty, configuration) {
                Ok(outcome) => {
                    tracing::debug!(
                        unit = unit.name(),
                        type_name = ty.name(),
                        outcome = outcome_label(&outcome),
                        "Type scanned"
                    );
                    report.outcomes.push((ty.key(), outcome));
                }
                Err(error) => match self.config.error_policy {
                    ErrorPolicy::FailFast => return Err(error),
                    ErrorPolicy::CollectAll => {
                        tracing::warn!(unit = unit.name(), type_name = ty.name(), error = %error, "Type rejected");
                        errors.push(error);
                    }
                },
            }
        }

        Ok(report)
    }

    fn examine(ty: &TypeDescriptor, configuration: &Configuration) -> Result<TypeOutcome> {
        let Some(declaration) = AttributeResolver::resolve(ty)? else {
            return Ok(TypeOutcome::NoDeclaration);
        };
        tracing::trace!(
            type_name = ty.name(),
            marker = %declaration.marker,
            abstracted = declaration.is_abstracted(),
            conditional = declaration.is_conditional(),
            "Declaration resolved"
        );

        CompatibilityValidator::validate(ty, &declaration)?;

        if ConditionEvaluator::evaluate(ty, &declaration, configuration)? {
            Ok(TypeOutcome::Accepted(declaration))
        } else {
            Ok(TypeOutcome::Dropped(declaration))
        }
    }
}

fn outcome_label(outcome: &TypeOutcome) -> &'static str {
    match outcome {
        TypeOutcome::NoDeclaration => "no-declaration",
        TypeOutcome::Dropped(_) => "dropped",
        TypeOutcome::Accepted(_) => "accepted",
    }
}

/// Scanning entry points on any container adapter, with default settings.
///
/// ```rust,ignore
/// services
///     .add_attributed_services_of(&configuration, &app_unit)?
///     .add_attributed_services_of(&configuration, &plugin_unit)?;
/// ```
pub trait AddAttributedServices: ContainerAdapter {
    fn add_attributed_services_of(
        &mut self,
        configuration: &Configuration,
        unit: &ScanUnit,
    ) -> Result<&mut Self>;

    fn add_attributed_services_of_all<'a>(
        &mut self,
        configuration: &Configuration,
        units: impl IntoIterator<Item = &'a ScanUnit>,
    ) -> Result<&mut Self>;
}

impl<C: ContainerAdapter> AddAttributedServices for C {
    fn add_attributed_services_of(
        &mut self,
        configuration: &Configuration,
        unit: &ScanUnit,
    ) -> Result<&mut Self> {
        ServiceScan::default().run(&mut *self, configuration, unit)?;
        Ok(self)
    }

    fn add_attributed_services_of_all<'a>(
        &mut self,
        configuration: &Configuration,
        units: impl IntoIterator<Item = &'a ScanUnit>,
    ) -> Result<&mut Self> {
        ServiceScan::default().run_all(&mut *self, configuration, units)?;
        Ok(self)
    }
}
