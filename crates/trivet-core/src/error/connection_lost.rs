use crate::Error;

#[derive(Debug)]
pub(super) struct ConnectionLostError {
    pub(super) message: Box<str>,
}

impl Error {
    pub fn connection_lost(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::ConnectionLost(ConnectionLostError {
            message: message.into().into(),
        }))
    }

    pub fn is_connection_lost(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ConnectionLost(_))
    }
}

impl std::fmt::Display for ConnectionLostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "connection lost: {}", self.message)
    }
}
