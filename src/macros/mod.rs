// `#[macro_export]` puts the macros at the crate root, the `pub(crate) use`
// below lets modules refer to them as `macros::<macro>!` as well
#![allow(unused_imports)]

/// Parse a checksummed (or lowercase) hex literal into an `Address`,
/// only meant for compile time constants
#[macro_export]
macro_rules! parse_address {
    ($addr:tt) => {
        $addr.parse::<alloy::primitives::Address>().unwrap()
    };
}

pub(crate) use parse_address;
