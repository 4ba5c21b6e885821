//! The upload as handed over by the boundary layer.

use std::fmt;
use std::path::Path;

/// How the transfer of the payload itself went, as reported by whatever
/// received it (multipart parser, reverse proxy, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferStatus {
    #[default]
    Complete,
    /// The form carried no file field at all.
    NoFile,
    Failed(TransferFailure),
}

/// Why a transfer did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFailure {
    /// Rejected by a server-wide body size limit before reaching us.
    ExceedsServerLimit,
    /// Rejected by a size limit declared in the form.
    ExceedsFormLimit,
    /// The client aborted or the connection dropped mid-upload.
    Partial,
    /// No temporary directory to spool the upload into.
    NoTempDir,
    /// Spooling the upload to disk failed.
    CantWrite,
    /// A server extension/filter stopped the upload.
    BlockedByExtension,
    /// Any other receiver-specific code.
    Other(u16),
}

impl TransferFailure {
    /// Numeric code in the classic multipart upload-error numbering.
    pub fn code(self) -> u16 {
        match self {
            TransferFailure::ExceedsServerLimit => 1,
            TransferFailure::ExceedsFormLimit => 2,
            TransferFailure::Partial => 3,
            TransferFailure::NoTempDir => 6,
            TransferFailure::CantWrite => 7,
            TransferFailure::BlockedByExtension => 8,
            TransferFailure::Other(code) => code,
        }
    }

    /// Inverse of [`code`](Self::code). `0` (success) and `4` (no file) are
    /// not failures and map to `None`.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 | 4 => None,
            1 => Some(TransferFailure::ExceedsServerLimit),
            2 => Some(TransferFailure::ExceedsFormLimit),
            3 => Some(TransferFailure::Partial),
            6 => Some(TransferFailure::NoTempDir),
            7 => Some(TransferFailure::CantWrite),
            8 => Some(TransferFailure::BlockedByExtension),
            other => Some(TransferFailure::Other(other)),
        }
    }
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferFailure::ExceedsServerLimit => f.write_str("file exceeds the server upload limit"),
            TransferFailure::ExceedsFormLimit => f.write_str("file exceeds the form upload limit"),
            TransferFailure::Partial => f.write_str("file was only partially uploaded"),
            TransferFailure::NoTempDir => f.write_str("temporary upload directory is missing"),
            TransferFailure::CantWrite => f.write_str("failed to write the upload to disk"),
            TransferFailure::BlockedByExtension => f.write_str("upload stopped by a server extension"),
            TransferFailure::Other(code) => write!(f, "unknown upload error (code {code})"),
        }
    }
}

/// One submitted file: raw bytes plus what the client claimed about them.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub payload: Vec<u8>,
    /// Filename as sent by the client. Only its extension is ever used.
    pub filename: String,
    /// Content-Type as sent by the client.
    pub content_type: String,
    pub transfer: TransferStatus,
}

impl UploadRequest {
    pub fn new(
        payload: impl Into<Vec<u8>>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            payload: payload.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            transfer: TransferStatus::Complete,
        }
    }

    /// A request whose form carried no file.
    pub fn empty() -> Self {
        Self {
            transfer: TransferStatus::NoFile,
            ..Self::default()
        }
    }

    pub fn with_transfer(mut self, transfer: TransferStatus) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn byte_len(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Lower-cased extension of the declared filename, if it has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}
