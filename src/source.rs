use crate::types::RawSample;
use crate::Result;

/// A source of raw traffic counter snapshots.
///
/// One call is one blocking round-trip to the device. Implementations do not
/// retry; a failed fetch is reported as-is and ends the sampling session.
#[cfg_attr(test, mockall::automock)]
pub trait SampleSource {
    /// Fetch the current counter snapshot from the device.
    ///
    /// # Errors
    /// Returns [`Error::DeviceUnreachable`](crate::Error::DeviceUnreachable)
    /// when the transport fails and
    /// [`Error::Protocol`](crate::Error::Protocol) when the response is
    /// malformed.
    fn fetch(&mut self) -> Result<RawSample>;
}
