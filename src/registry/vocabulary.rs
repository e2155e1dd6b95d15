//! Built-in action, validation, state, browser and output-source names
//!
//! Each category is a closed set of built-in variants plus an `Extension`
//! variant that plugins produce through name-resolution hooks. Built-in names
//! match ignoring case, `_` and `-`, so `NavigateTo` and `NAVIGATE_TO` are the
//! same action.

use std::fmt;

use super::hooks::{HookChain, NameHook};
use super::Hooks;

/// A vocabulary category, used in resolution errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ActionType,
    ValidationType,
    ValidationState,
    BrowserTarget,
    OutputSource,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::ActionType => write!(f, "action type"),
            Category::ValidationType => write!(f, "validation type"),
            Category::ValidationState => write!(f, "validation state"),
            Category::BrowserTarget => write!(f, "browser target"),
            Category::OutputSource => write!(f, "output source"),
        }
    }
}

/// A name-resolvable enumeration
pub trait Vocabulary: Sized + Clone + fmt::Debug + Send + Sync + 'static {
    /// Category reported when resolution fails
    const CATEGORY: Category;

    /// Look the name up in the built-in table only
    fn builtin(name: &str) -> Option<Self>;

    /// Canonical name of this variant
    fn name(&self) -> &str;

    /// Whether the variant came from a plugin
    fn is_extension(&self) -> bool;

    /// Every built-in variant, in declaration order
    fn builtins() -> Vec<Self>;

    /// Hook chain consulted when the built-in table has no entry
    fn resolvers(hooks: &Hooks) -> &HookChain<NameHook<Self>>;

    /// Mutable access for registration
    fn resolvers_mut(hooks: &mut Hooks) -> &mut HookChain<NameHook<Self>>;
}

/// Normalize a name for built-in matching
pub(crate) fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($category:ident, $chain:ident) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Vocabulary contributed by a plugin
            Extension(String),
        }

        impl Vocabulary for $name {
            const CATEGORY: Category = Category::$category;

            fn builtin(name: &str) -> Option<Self> {
                let key = normalize(name);
                $(
                    if key == normalize($text) {
                        return Some(Self::$variant);
                    }
                )+
                None
            }

            fn name(&self) -> &str {
                match self {
                    $( Self::$variant => $text, )+
                    Self::Extension(name) => name,
                }
            }

            fn is_extension(&self) -> bool {
                matches!(self, Self::Extension(_))
            }

            fn builtins() -> Vec<Self> {
                vec![$( Self::$variant ),+]
            }

            fn resolvers(hooks: &Hooks) -> &HookChain<NameHook<Self>> {
                &hooks.$chain
            }

            fn resolvers_mut(hooks: &mut Hooks) -> &mut HookChain<NameHook<Self>> {
                &mut hooks.$chain
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

vocabulary! {
    /// Setup actions
    pub enum ActionType (ActionType, action_names) {
        Click => "Click",
        Clear => "Clear",
        SendKeys => "SendKeys",
        WaitForExistence => "WaitForExistence",
        WaitForVisibility => "WaitForVisibility",
        NavigateTo => "NavigateTo",
        Refresh => "Refresh",
        AddCookies => "AddCookies",
        SetCookies => "SetCookies",
        RemoveCookie => "RemoveCookie",
        ClearCookies => "ClearCookies",
        NavigateForward => "NavigateForward",
        NavigateBack => "NavigateBack",
        SetBrowserSize => "SetBrowserSize",
        Hover => "Hover",
        OutputValue => "OutputValue",
        SetAttribute => "SetAttribute",
    }
}

vocabulary! {
    /// Kinds of validation
    pub enum ValidationType (ValidationType, validation_type_names) {
        XPath => "XPath",
        Url => "URL",
    }
}

vocabulary! {
    /// Desired end states checked by a validation
    pub enum ValidationState (ValidationState, state_names) {
        Exists => "Exists",
        NotExists => "NotExists",
        Visible => "Visible",
        NotVisible => "NotVisible",
        TextMatches => "TextMatches",
        NotTextMatches => "NotTextMatches",
        HasProperty => "HasProperty",
        NotHasProperty => "NotHasProperty",
        PropertyHasValue => "PropertyHasValue",
        NotPropertyHasValue => "NotPropertyHasValue",
        HasAttribute => "HasAttribute",
        NotHasAttribute => "NotHasAttribute",
        AttributeHasValue => "AttributeHasValue",
        NotAttributeHasValue => "NotAttributeHasValue",
        Equals => "Equals",
        NotEquals => "NotEquals",
        Contains => "Contains",
        NotContains => "NotContains",
        Matches => "Matches",
        NotMatches => "NotMatches",
    }
}

vocabulary! {
    /// Browsers a validation file can target
    pub enum BrowserTarget (BrowserTarget, browser_names) {
        Firefox => "Firefox",
        Chrome => "Chrome",
        Edge => "Edge",
    }
}

vocabulary! {
    /// Where an `OutputValue` step reads its value from
    pub enum OutputSource (OutputSource, output_source_names) {
        Literal => "Literal",
        XPathText => "XPathText",
        XPathProperty => "XPathProperty",
        XPathAttribute => "XPathAttribute",
        Url => "URL",
    }
}
