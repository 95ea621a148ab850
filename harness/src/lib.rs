//! Backend audit harness for the SafeTalk chat application.
//!
//! Two halves: scenario suites that replay the backend's business rules
//! against an in-memory [mockstore::MockStore], and a static scan that
//! checks the application source tree for required configuration,
//! dependencies, and service methods. Both feed a [recorder::CheckRecorder]
//! whose records become the JSON report artifact.

pub mod fixtures;
pub mod recorder;
pub mod report;
pub mod scan;
pub mod suites;
