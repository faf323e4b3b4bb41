/// Closed, totally ordered identifier enum with a stable wire id and a
/// human-readable name.
///
/// Variant order is the sort order, so sets of these stay deterministic.
#[macro_export]
macro_rules! define_id_enum {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $id:literal : $display_name:literal
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.id())
            }
        }

        impl $enum_name {
            pub fn id(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $id,
                    )*
                }
            }

            pub fn display_name(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $display_name,
                    )*
                }
            }

            pub fn from_id(id: &str) -> Option<Self> {
                match id {
                    $(
                        $id => Some(Self::$variant),
                    )*
                    _ => None,
                }
            }

            pub fn all_variants() -> &'static [Self] {
                &[
                    $(
                        Self::$variant,
                    )*
                ]
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.display_name())
            }
        }
    };
}
