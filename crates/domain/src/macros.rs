//! Macro for implementing Display and FromStr for status enums
//!
//! Appointment statuses, time-off reasons and policy enums all travel as
//! lowercase snake_case strings between the engine and its collaborators. This
//! macro provides both conversions from a single variant table and handles
//! case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use carebook_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum RoomState {
//!     Free,
//!     Occupied,
//!     Cleaning,
//! }
//!
//! impl_domain_status_conversions!(RoomState {
//!     Free => "free",
//!     Occupied => "occupied",
//!     Cleaning => "cleaning",
//! });
//!
//! assert_eq!(RoomState::Cleaning.to_string(), "cleaning");
//! assert_eq!("OCCUPIED".parse::<RoomState>(), Ok(RoomState::Occupied));
//! ```

/// Implements Display and FromStr traits for status enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations (lowercase)
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => ::core::result::Result::Ok(Self::$variant),)+
                    _ => ::core::result::Result::Err(::std::format!(
                        "Invalid {}: {}",
                        stringify!($enum_name),
                        s
                    )),
                }
            }
        }
    };
}
