use std::path::PathBuf;

/// Structural errors raised while reading an `.asc` file.
///
/// Every variant carries the 1-based line number of the offending record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: unsupported version: {version}")]
    UnsupportedVersion { line: usize, version: String },

    #[error("line {line}: primitive not supported for ASC file: \"{record}\"")]
    UnsupportedPrimitive { line: usize, record: String },

    #[error("line {line}: malformed {keyword} record: {reason}")]
    Malformed {
        line: usize,
        keyword: &'static str,
        reason: String,
    },

    #[error("line {line}: invalid rotation value: {token}")]
    InvalidRotation { line: usize, token: String },

    #[error("line {line}: {keyword} clause without SYMBOL")]
    OutsideSymbol { line: usize, keyword: &'static str },

    #[error("line {line}: component InstName was not given")]
    MissingInstName { line: usize },

    #[error("line {line}: duplicate component reference {reference}")]
    DuplicateReference { line: usize, reference: String },
}

/// Errors surfaced by the mutation API and the file lifecycle.
///
/// Lookup failures are separate variants so callers can branch on them.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Component {0} not found")]
    ComponentNotFound(String),

    #[error("Component {0} does not have a Value attribute")]
    MissingValue(String),

    #[error("Component {reference} does not have a {attribute} attribute")]
    AttributeNotFound { reference: String, attribute: String },

    #[error("Component {0} cannot be renamed; remove it and add it again")]
    RenameNotSupported(String),

    #[error("Invalid component reference \"{0}\"")]
    InvalidReference(String),

    #[error("Parameter \"{0}\" not found")]
    ParameterNotFound(String),

    #[error("Instruction \"{0}\" not found")]
    InstructionNotFound(String),

    #[error("The .PARAM instruction should be added using set_parameter: {0}")]
    ParamInstruction(String),

    #[error("Instruction text is empty")]
    EmptyInstruction,

    #[error("{0} must fit on a single line")]
    MultiLine(String),

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to read {}: {1}", .0.display())]
    Read(PathBuf, std::io::Error),

    #[error("Failed to write {}: {1}", .0.display())]
    Write(PathBuf, std::io::Error),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
