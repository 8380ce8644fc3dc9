//! Report output port trait.

use crate::domain::error::PerfscopeError;
use crate::domain::metrics::MetricsBundle;
use crate::domain::session::SessionResult;

/// Port for writing an analysis report.
pub trait ReportPort {
    fn write(
        &self,
        session: &SessionResult,
        metrics: &MetricsBundle,
        output_path: &str,
    ) -> Result<(), PerfscopeError>;
}
