//! Object-oriented design metrics over a universe of class descriptors.
//!
//! Per class: depth of inheritance (DIT), number of children (NOC), the MOOD
//! hiding and inheritance factors (MHF, MIF, AHF, AIF) and the polymorphism
//! factor (POF). Descriptors come from a [`provider::ClassUniverseProvider`]:
//! a jar archive, a classpath directory or a JSON manifest.

// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod graph;
pub mod io;
pub mod metrics;
pub mod provider;
pub mod testkit;

// Re-export commonly used types
pub use crate::core::{
    ClassDescriptor, Error, FieldDescriptor, MethodDescriptor, Result, Universe, Visibility,
};

pub use crate::graph::InheritanceGraph;

pub use crate::metrics::{
    analyze_universe, evaluate_class, AggregateMetrics, AnalysisOptions, ClassMetrics,
    ClassOutcome, HidingScope, MetricsReport,
};

pub use crate::provider::{
    open_provider, ArchiveProvider, ClassUniverseProvider, DirectoryProvider, ManifestProvider,
    NamespaceProvider, ProviderError, ProviderOutput, ProviderWarning, SourceKind,
};

pub use crate::io::output::{create_writer, AnalysisReport, OutputFormat, OutputWriter};
