use tracing::warn;

pub type GfxResult<T, E = eyre::Report> = core::result::Result<T, E>;

/// Logs the failure of a cleanup step that runs after an earlier error, which
/// is the one handed back to the caller. Returns whether `result` failed.
pub fn warn_if_failed(step: &str, result: GfxResult<()>) -> bool {
    match result {
        Ok(()) => false,
        Err(e) => {
            warn!("{step} failed: {e:?}");
            true
        }
    }
}

/// Native API error carried inside an `eyre::Report`.
///
/// `windows::core::Error` prints its HRESULT through `Debug` only, so it is
/// wrapped to get a readable message in color-eyre reports.
#[cfg(windows)]
pub struct WrappedWindowsError {
    inner: windows::core::Error,
}

#[cfg(windows)]
impl From<windows::core::Error> for WrappedWindowsError {
    fn from(error: windows::core::Error) -> Self {
        Self { inner: error }
    }
}

#[cfg(windows)]
impl std::error::Error for WrappedWindowsError {}

#[cfg(windows)]
impl std::fmt::Display for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[cfg(windows)]
impl std::fmt::Debug for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// Attaches the name of the failed native call to a `windows::core::Result`.
#[cfg(windows)]
pub trait HResultExt<T> {
    fn or_fail(self, what: &'static str) -> GfxResult<T>;
}

#[cfg(windows)]
impl<T> HResultExt<T> for windows::core::Result<T> {
    fn or_fail(self, what: &'static str) -> GfxResult<T> {
        self.map_err(|e| eyre::Report::new(WrappedWindowsError::from(e)).wrap_err(what))
    }
}

/// Errors raised by the descriptor slot bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorError {
    HeapExhausted { capacity: u32 },
    NotAllocated { index: u32 },
    DoubleFree { index: u32 },
}

impl std::fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DescriptorError::HeapExhausted { capacity } => {
                write!(f, "descriptor heap exhausted ({capacity} descriptors)")
            }
            DescriptorError::NotAllocated { index } => {
                write!(f, "descriptor slot {index} was never allocated")
            }
            DescriptorError::DoubleFree { index } => {
                write!(f, "descriptor slot {index} freed twice")
            }
        }
    }
}

impl std::error::Error for DescriptorError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_failures_are_reported_not_propagated() {
        assert!(!warn_if_failed("shutdown", Ok(())));
        let failed: GfxResult<()> = Err(DescriptorError::DoubleFree { index: 4 }.into());
        assert!(warn_if_failed("shutdown", failed));
    }
}
