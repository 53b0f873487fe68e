//! Type scanner
//!
//! A [`ScanUnit`] stands for everything declared in one deployable unit. The
//! scanner only enumerates it; deciding which types matter is the resolver's job.

use crate::metadata::TypeDescriptor;
use std::sync::Arc;

/// Named, ordered set of type descriptors
#[derive(Debug, Clone, Default)]
pub struct ScanUnit {
    name: String,
    types: Vec<Arc<TypeDescriptor>>,
}

impl ScanUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, descriptor: impl Into<Arc<TypeDescriptor>>) -> Self {
        self.add_type(descriptor);
        self
    }

    pub fn add_type(&mut self, descriptor: impl Into<Arc<TypeDescriptor>>) -> &mut Self {
        self.types.push(descriptor.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<Arc<TypeDescriptor>> for ScanUnit {
    fn from_iter<I: IntoIterator<Item = Arc<TypeDescriptor>>>(iter: I) -> Self {
        Self {
            name: String::new(),
            types: iter.into_iter().collect(),
        }
    }
}

/// Enumerates candidate types of a scan unit
pub struct TypeScanner;

impl TypeScanner {
    /// Yields every type of `unit` in insertion order, without filtering
    pub fn scan(unit: &ScanUnit) -> impl Iterator<Item = &TypeDescriptor> + '_ {
        unit.types.iter().map(Arc::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct First;
    struct Second;
    struct Third;

    #[test]
    fn test_scan_preserves_order_and_is_repeatable() {
        let shared = Arc::new(TypeDescriptor::builder::<Second>().singleton().build());
        let unit = ScanUnit::new("app")
            .with_type(TypeDescriptor::builder::<First>().build())
            .with_type(shared.clone())
            .with_type(TypeDescriptor::builder::<Third>().transient().build());

        let first: Vec<_> = TypeScanner::scan(&unit).map(|ty| ty.key()).collect();
        let second: Vec<_> = TypeScanner::scan(&unit).map(|ty| ty.key()).collect();

        assert_eq!(first.len(), 3);
        assert!(first[0].is::<First>());
        assert!(first[1].is::<Second>());
        assert!(first[2].is::<Third>());
        assert_eq!(first, second);
        assert_eq!(unit.name(), "app");
    }

    #[test]
    fn test_empty_unit() {
        let unit = ScanUnit::new("empty");
        assert!(unit.is_empty());
        assert_eq!(TypeScanner::scan(&unit).count(), 0);
    }

    #[test]
    fn test_collect_into_unit() {
        let unit: ScanUnit = vec![
            Arc::new(TypeDescriptor::builder::<First>().build()),
            Arc::new(TypeDescriptor::builder::<Second>().build()),
        ]
        .into_iter()
        .collect();
        assert_eq!(unit.len(), 2);
    }
}
