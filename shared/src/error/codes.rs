//! Unified error codes for Mesa
//!
//! Error codes are organized by range:
//! - 0xxx: General errors
//! - 1xxx: Table session errors
//! - 4xxx: Order errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 8xxx: Staff errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

use super::kind::ErrorKind;

/// Unified error code enum
///
/// All error codes are represented as u16 values for compact serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Session ====================
    /// QR code does not match the table
    QrCodeMismatch = 1001,
    /// Session is unknown
    SessionInvalid = 1002,
    /// Session has expired
    SessionExpired = 1005,
    /// Session belongs to another table
    SessionTableMismatch = 1008,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order item not found
    OrderItemNotFound = 4006,
    /// Order is empty
    OrderEmpty = 4007,
    /// Unknown order status
    InvalidOrderStatus = 4010,
    /// Status transition not allowed
    InvalidStatusTransition = 4011,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item has invalid price
    MenuItemInvalidPrice = 6002,
    /// Menu item is referenced by order history
    MenuItemInUse = 6004,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category has menu items
    CategoryHasMenuItems = 6102,
    /// Category name already exists
    CategoryNameExists = 6103,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table number already exists
    TableNumberExists = 7005,
    /// Table has active orders
    TableHasOrders = 7104,
    /// Table assignment not found
    AssignmentNotFound = 7201,

    // ==================== 8xxx: Staff ====================
    /// Staff member not found
    StaffNotFound = 8001,
    /// Staff username already exists
    StaffUsernameExists = 8002,
    /// Notification not found
    NotificationNotFound = 8201,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Session
            ErrorCode::QrCodeMismatch => "Invalid QR code for table",
            ErrorCode::SessionInvalid => "Invalid or expired session",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::SessionTableMismatch => "Session does not match table",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::InvalidOrderStatus => "Unknown order status",
            ErrorCode::InvalidStatusTransition => "Status transition is not allowed",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemInvalidPrice => "Menu item has invalid price",
            ErrorCode::MenuItemInUse => "Menu item is referenced by orders",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasMenuItems => "Category has associated menu items",
            ErrorCode::CategoryNameExists => "Category name already exists",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNumberExists => "Table number already exists",
            ErrorCode::TableHasOrders => "Table has active orders",
            ErrorCode::AssignmentNotFound => "Table assignment not found",

            // Staff
            ErrorCode::StaffNotFound => "Staff member not found",
            ErrorCode::StaffUsernameExists => "Staff username already exists",
            ErrorCode::NotificationNotFound => "Notification not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }

    /// Map this code onto the caller-facing failure taxonomy
    pub const fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::NotFound
            | ErrorCode::OrderNotFound
            | ErrorCode::OrderItemNotFound
            | ErrorCode::MenuItemNotFound
            | ErrorCode::CategoryNotFound
            | ErrorCode::TableNotFound
            | ErrorCode::AssignmentNotFound
            | ErrorCode::StaffNotFound
            | ErrorCode::NotificationNotFound => ErrorKind::NotFound,

            ErrorCode::AlreadyExists
            | ErrorCode::MenuItemInUse
            | ErrorCode::CategoryHasMenuItems
            | ErrorCode::CategoryNameExists
            | ErrorCode::TableNumberExists
            | ErrorCode::TableHasOrders
            | ErrorCode::StaffUsernameExists => ErrorKind::Conflict,

            ErrorCode::Success
            | ErrorCode::Unknown
            | ErrorCode::InternalError
            | ErrorCode::DatabaseError
            | ErrorCode::ConfigError => ErrorKind::Internal,

            ErrorCode::ValidationFailed
            | ErrorCode::InvalidRequest
            | ErrorCode::InvalidFormat
            | ErrorCode::ValueOutOfRange
            | ErrorCode::QrCodeMismatch
            | ErrorCode::SessionInvalid
            | ErrorCode::SessionExpired
            | ErrorCode::SessionTableMismatch
            | ErrorCode::OrderEmpty
            | ErrorCode::InvalidOrderStatus
            | ErrorCode::InvalidStatusTransition
            | ErrorCode::MenuItemInvalidPrice => ErrorKind::InvalidArgument,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Session
            1001 => Ok(ErrorCode::QrCodeMismatch),
            1002 => Ok(ErrorCode::SessionInvalid),
            1005 => Ok(ErrorCode::SessionExpired),
            1008 => Ok(ErrorCode::SessionTableMismatch),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4006 => Ok(ErrorCode::OrderItemNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4010 => Ok(ErrorCode::InvalidOrderStatus),
            4011 => Ok(ErrorCode::InvalidStatusTransition),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemInvalidPrice),
            6004 => Ok(ErrorCode::MenuItemInUse),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasMenuItems),
            6103 => Ok(ErrorCode::CategoryNameExists),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7005 => Ok(ErrorCode::TableNumberExists),
            7104 => Ok(ErrorCode::TableHasOrders),
            7201 => Ok(ErrorCode::AssignmentNotFound),

            // Staff
            8001 => Ok(ErrorCode::StaffNotFound),
            8002 => Ok(ErrorCode::StaffUsernameExists),
            8201 => Ok(ErrorCode::NotificationNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::SessionExpired.code(), 1005);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::TableHasOrders.code(), 7104);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_roundtrips_every_known_code() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::QrCodeMismatch,
            ErrorCode::SessionTableMismatch,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::CategoryHasMenuItems,
            ErrorCode::AssignmentNotFound,
            ErrorCode::NotificationNotFound,
            ErrorCode::ConfigError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ErrorCode::TableNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ErrorCode::MenuItemNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ErrorCode::QrCodeMismatch.kind(), ErrorKind::InvalidArgument);
        assert_eq!(ErrorCode::SessionExpired.kind(), ErrorKind::InvalidArgument);
        assert_eq!(ErrorCode::InvalidOrderStatus.kind(), ErrorKind::InvalidArgument);
        assert_eq!(ErrorCode::TableHasOrders.kind(), ErrorKind::Conflict);
        assert_eq!(ErrorCode::CategoryHasMenuItems.kind(), ErrorKind::Conflict);
        assert_eq!(ErrorCode::StaffUsernameExists.kind(), ErrorKind::Conflict);
        assert_eq!(ErrorCode::DatabaseError.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(ErrorCode::OrderNotFound.to_string(), "E4001");
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");

        let json = serde_json::to_string(&ErrorCode::TableNotFound).unwrap();
        assert_eq!(json, "7001");
        let code: ErrorCode = serde_json::from_str("1005").unwrap();
        assert_eq!(code, ErrorCode::SessionExpired);
        assert!(serde_json::from_str::<ErrorCode>("1234").is_err());
    }
}
