use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("cannot open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{0}' is empty")]
    EmptyFile(PathBuf),

    #[error("invalid offset '{0}': expected hex (0x...) or decimal, 0-65535")]
    InvalidOffset(String),

    #[error("'{path}' is {size} bytes; at offset {offset:#06x} that runs past the top of the 64 KiB address space")]
    ProgramTooLarge {
        path: PathBuf,
        size: usize,
        offset: u16,
    },

    #[error(transparent)]
    UnknownOpcode(#[from] cpu_6502::UnknownOpcode),
}
