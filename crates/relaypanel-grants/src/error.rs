//! Operation result codes shared between the backend and the console.


/// Numeric result code carried in operation responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum OpCode {
    Success = 0,
    ParamError = 1,
    UserExists = 2,
    UserNotFound = 3,
    SaveError = 4,
    UserFormat = 5,
    TokenFormat = 6,
    CommentFormat = 7,
    PortsFormat = 8,
    DomainsFormat = 9,
    SubdomainsFormat = 10,
    ExpireDateFormat = 11,
}

impl OpCode {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => OpCode::Success,
            1 => OpCode::ParamError,
            2 => OpCode::UserExists,
            3 => OpCode::UserNotFound,
            4 => OpCode::SaveError,
            5 => OpCode::UserFormat,
            6 => OpCode::TokenFormat,
            7 => OpCode::CommentFormat,
            8 => OpCode::PortsFormat,
            9 => OpCode::DomainsFormat,
            10 => OpCode::SubdomainsFormat,
            11 => OpCode::ExpireDateFormat,
            _ => return None,
        })
    }

    /// Operator-facing reason for this code. `SaveError` reads as a parameter
    /// error, which is how the console has always presented code 4.
    pub fn message(self) -> &'static str {
        match self {
            OpCode::Success => "operate success",
            OpCode::ParamError | OpCode::SaveError => "param error",
            OpCode::UserExists => "user exists",
            OpCode::UserNotFound => "user not found",
            OpCode::UserFormat => "user format error",
            OpCode::TokenFormat => "token format error",
            OpCode::CommentFormat => "comment is invalid",
            OpCode::PortsFormat => "ports is invalid",
            OpCode::DomainsFormat => "domains is invalid",
            OpCode::SubdomainsFormat => "subdomains is invalid",
            OpCode::ExpireDateFormat => "expire date is invalid",
        }
    }
}

/// A backend rejection as seen by the console: either a known code or an
/// unmapped one, which renders as a generic failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectKind {
    Known(OpCode),
    Unknown(u32),
}

impl RejectKind {
    pub fn from_code(code: u32) -> Self {
        match OpCode::from_code(code) {
            Some(op) => RejectKind::Known(op),
            None => RejectKind::Unknown(code),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RejectKind::Known(op) => op.message(),
            RejectKind::Unknown(_) => "other error",
        }
    }
}

impl std::fmt::Display for RejectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A grant field that failed validation, with its result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("user format error")]
    User,
    #[error("token format error")]
    Token,
    #[error("comment is invalid")]
    Comment,
    #[error("ports is invalid")]
    Ports,
    #[error("domains is invalid")]
    Domains,
    #[error("subdomains is invalid")]
    Subdomains,
    #[error("expire date is invalid")]
    ExpireDate,
    #[error("no server selected")]
    Server,
}

impl ValidationError {
    pub fn op_code(self) -> OpCode {
        match self {
            ValidationError::User => OpCode::UserFormat,
            ValidationError::Token => OpCode::TokenFormat,
            ValidationError::Comment => OpCode::CommentFormat,
            ValidationError::Ports => OpCode::PortsFormat,
            ValidationError::Domains => OpCode::DomainsFormat,
            ValidationError::Subdomains => OpCode::SubdomainsFormat,
            ValidationError::ExpireDate => OpCode::ExpireDateFormat,
            ValidationError::Server => OpCode::ParamError,
        }
    }
}
