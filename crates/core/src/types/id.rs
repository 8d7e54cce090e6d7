//! Integer identifiers for users and organizations.
//!
//! Each entity gets its own newtype so a `UserId` can never be passed where
//! an `OrganizationId` is expected. Database rows carry plain `i32` columns
//! and are wrapped at the repository boundary.

/// Declare an `i32`-backed identifier newtype.
///
/// The generated type is `Copy`, ordered (directory listings sort by id),
/// serializes as a bare number, and converts to and from `i32`.
///
/// ```rust
/// # use compliance_nexus_core::define_id;
/// define_id!(TeamId);
/// define_id!(DeviceId);
///
/// assert_eq!(TeamId::new(4).as_i32(), 4);
/// assert_eq!(TeamId::from(4).to_string(), "4");
/// // let _: TeamId = DeviceId::new(4); // mismatched types
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::convert::From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl ::core::convert::From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);
define_id!(OrganizationId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_numbers() {
        assert_eq!(serde_json::to_string(&UserId::new(7)).unwrap(), "7");
        let id: OrganizationId = serde_json::from_str("3").unwrap();
        assert_eq!(id, OrganizationId::new(3));
    }

    #[test]
    fn test_ids_order_numerically() {
        let mut ids: Vec<_> = [3, 1, 2].into_iter().map(OrganizationId::new).collect();
        ids.sort();
        assert_eq!(ids, [1, 2, 3].map(OrganizationId::new));
    }
}
