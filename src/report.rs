//! Rendering the final statistics snapshot.

use std::fmt;

use crate::stats::{Bucket, StatsSnapshot};

/// Human-readable report over a finished run's snapshot.
pub struct Report<'a> {
    snapshot: &'a StatsSnapshot,
}

impl<'a> Report<'a> {
    /// Wrap a snapshot for display.
    pub fn new(snapshot: &'a StatsSnapshot) -> Self {
        Self { snapshot }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "stations:")?;
        for (kind, bucket) in &self.snapshot.stations {
            writeln!(f, "  {kind}:")?;
            write_bucket(f, "    ", bucket)?;
        }
        writeln!(f, "registers:")?;
        write_bucket(f, "  ", &self.snapshot.registers)
    }
}

fn write_bucket(f: &mut fmt::Formatter<'_>, indent: &str, bucket: &Bucket) -> fmt::Result {
    writeln!(f, "{indent}total_cars: {}", bucket.served)?;
    writeln!(f, "{indent}total_wait: {:?}", bucket.total_wait)?;
    match bucket.average_wait() {
        Some(avg) => writeln!(f, "{indent}avg_wait: {avg:?}")?,
        None => writeln!(f, "{indent}avg_wait: n/a")?,
    }
    writeln!(f, "{indent}max_wait: {:?}", bucket.max_wait)
}
