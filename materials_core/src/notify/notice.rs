use std::fmt;
use std::path::PathBuf;

use crate::types::types::{FailureReason, MaterialMetadata};

/// What the visitor is told once a request settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Metadata(MaterialMetadata),
    Saved { display_name: String, path: PathBuf },
    Failure(FailureReason),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Metadata(meta) => {
                write!(f, "📥 {}\n\nРазмер: {}\n\n{}", meta.name, meta.size, meta.message)
            }
            Notice::Saved { display_name, path } => {
                write!(f, "📥 {} → {}", display_name, path.display())
            }
            Notice::Failure(reason) => f.write_str(reason.user_message()),
        }
    }
}
