//! Access counters and the read-only snapshot handed to reporting code.

use core::fmt;

/// Monotonically increasing counters owned by a [`Vmm`](crate::vmm::Vmm).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct VmStats {
    pub page_faults: u32,
    pub reads: u32,
    pub writes: u32,
    /// Every failed translation, including the first attempt of an access
    /// that demand paging later resolved.
    pub translation_failures: u32,
}

/// Point-in-time view of the counters plus frame usage.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StatsSnapshot {
    pub page_faults: u32,
    pub reads: u32,
    pub writes: u32,
    pub translation_failures: u32,
    pub frames_used: u32,
    pub frames_total: u32,
}

impl VmStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page_faults: 0,
            reads: 0,
            writes: 0,
            translation_failures: 0,
        }
    }

    /// Combine the counters with the allocator's frame usage.
    #[must_use]
    pub const fn snapshot(&self, frames_used: u32, frames_total: u32) -> StatsSnapshot {
        StatsSnapshot {
            page_faults: self.page_faults,
            reads: self.reads,
            writes: self.writes,
            translation_failures: self.translation_failures,
            frames_used,
            frames_total,
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Virt Mem Stats ===")?;
        writeln!(f, "{:<12}:  {}", "Page faults", self.page_faults)?;
        writeln!(f, "{:<12}:  {}", "Reads", self.reads)?;
        writeln!(f, "{:<12}:  {}", "Writes", self.writes)?;
        writeln!(f, "{:<12}:  {}", "Trans fails", self.translation_failures)?;
        write!(
            f,
            "{:<12}:  {} / {}",
            "PHY used", self.frames_used, self.frames_total
        )
    }
}
