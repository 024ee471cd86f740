//! Conversion pipeline: intake validation, the WebP codec seam, the per-file
//! conversion worker, batch orchestration, and archive packaging.

pub mod archive;
pub mod batch;
pub mod codec;
pub mod convert;
pub mod intake;
pub mod validator;

pub use archive::{build_archive, ArchiveError};
pub use batch::{BatchEntry, BatchOrchestrator};
pub use codec::WebpCodec;
pub use convert::{ConversionError, ConversionWorker};
pub use intake::{IncomingFile, IntakeError, UploadIntake};
pub use validator::{UploadValidator, ValidationError};
