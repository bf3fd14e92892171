//! Declarative helper for ordered step enums.

/// Declare an ordered step enum and implement [`State`](crate::core::State) for it.
///
/// Each variant carries its 1-based position and the wire name used by
/// serde and [`State::name`](crate::core::State::name). Besides the trait,
/// the macro generates `ALL`, `index`, `from_index`, `next` and `previous`.
///
/// # Example
///
/// ```
/// use enrollment_funnel::step_enum;
/// use enrollment_funnel::core::State;
///
/// step_enum! {
///     pub enum Checkout {
///         Review = 1 => "REVIEW",
///         Pay = 2 => "PAY",
///         Done = 3 => "DONE",
///     }
///     final: [Done]
/// }
///
/// assert_eq!(Checkout::Review.next(), Some(Checkout::Pay));
/// assert_eq!(Checkout::Done.next(), None);
/// assert_eq!(Checkout::Pay.name(), "PAY");
/// assert!(Checkout::Done.is_final());
/// ```
#[macro_export]
macro_rules! step_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $index:literal => $label:literal
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Debug,
            serde::Serialize,
            serde::Deserialize,
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $label)]
                $variant = $index
            ),*
        }

        impl $name {
            /// Every step in order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),*];

            /// 1-based position of the step.
            pub const fn index(self) -> u8 {
                self as u8
            }

            pub fn from_index(index: u8) -> Option<Self> {
                Self::ALL.iter().copied().find(|step| step.index() == index)
            }

            /// The step one position further, if any.
            pub fn next(self) -> Option<Self> {
                self.index().checked_add(1).and_then(Self::from_index)
            }

            /// The step one position back, if any.
            pub fn previous(self) -> Option<Self> {
                self.index().checked_sub(1).and_then(Self::from_index)
            }
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $label),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }
    };
}
