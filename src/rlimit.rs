use nix::sys::resource::{getrlimit, setrlimit, Resource};
use std::io;
use tracing::{debug, warn};

/// File descriptors kept free above the number the merge itself needs.
pub const DESCRIPTOR_HEADROOM: u64 = 100;

/// Process resource-limit capability, injected so the budgeter stays
/// testable without mutating real process limits.
pub trait RlimitOps {
    /// Current (soft, hard) open-file-descriptor limits.
    fn get_nofile(&self) -> io::Result<(u64, u64)>;

    /// Set the open-file-descriptor limits.
    fn set_nofile(&self, soft: u64, hard: u64) -> io::Result<()>;
}

/// The real process limits, via getrlimit/setrlimit.
pub struct ProcessRlimit;

impl RlimitOps for ProcessRlimit {
    fn get_nofile(&self) -> io::Result<(u64, u64)> {
        getrlimit(Resource::RLIMIT_NOFILE).map_err(io::Error::from)
    }

    fn set_nofile(&self, soft: u64, hard: u64) -> io::Result<()> {
        setrlimit(Resource::RLIMIT_NOFILE, soft, hard).map_err(io::Error::from)
    }
}

/// Make sure the soft descriptor limit covers `file_count` plus headroom.
///
/// Failure to raise the limit is swallowed with a warning: the pipeline
/// proceeds and lets individual open calls fail if the budget really is
/// insufficient. Returns the soft limit believed to be in effect.
pub fn ensure_descriptor_budget(file_count: usize, ops: &dyn RlimitOps) -> u64 {
    let needed = file_count as u64 + DESCRIPTOR_HEADROOM;

    let (soft, hard) = match ops.get_nofile() {
        Ok(limits) => limits,
        Err(e) => {
            warn!(error = %e, "Could not query descriptor limit");
            return 0;
        }
    };

    if needed <= soft {
        return soft;
    }

    match ops.set_nofile(needed, hard.max(needed)) {
        Ok(()) => {
            debug!(from = soft, to = needed, "Raised descriptor soft limit");
            needed
        }
        Err(e) => {
            warn!(
                soft = soft,
                needed = needed,
                error = %e,
                "Could not raise descriptor limit, continuing anyway"
            );
            soft
        }
    }
}
