//! String identities of the S2 entities.
//!
//! S2 ids are opaque strings (UUIDs in practice). Separate newtypes keep a timer id from ever
//! being compared against an operation mode id.

macro_rules! id {
    ($name:ident) => {
        #[must_use]
        #[derive(
            ::derive_more::Display,
            ::derive_more::From,
            ::serde::Deserialize,
            ::serde::Serialize,
            ::std::clone::Clone,
            ::std::cmp::Eq,
            ::std::cmp::Ord,
            ::std::cmp::PartialEq,
            ::std::cmp::PartialOrd,
            ::std::fmt::Debug,
            ::std::hash::Hash,
        )]
        pub struct $name(pub String);

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

id!(ActuatorId);
id!(OperationModeId);
id!(TransitionId);
id!(TimerId);
