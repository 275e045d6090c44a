//! Helper macro for declaring port error enums.
//!
//! Every variant carries named fields and gets a snake_case constructor whose
//! arguments accept anything convertible into the field type, so adapters can
//! write `StoreError::query(err.to_string())` or `StoreError::query("literal")`.
//! The generated `kind()` names the variant for structured logs.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),* },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!(
                        "Construct [`", stringify!($name), "::", stringify!($variant), "`]."
                    )]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                        Self::$variant { $($field: $field.into()),* }
                    }
                }
            )*

            /// Snake-case name of the variant, for log fields.
            pub fn kind(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant { .. } => ::paste::paste!(stringify!([<$variant:snake>])),
                    )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;
