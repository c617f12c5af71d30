//! Languages the site is written in.

use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lang {
    #[default]
    English,
    French,
}

impl Lang {
    /// ISO 639-1 code, used in the `lang` attribute.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A text available in every [`Lang`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Localized {
    pub en: &'static str,
    pub fr: &'static str,
}

impl Localized {
    #[must_use]
    pub const fn new(en: &'static str, fr: &'static str) -> Self {
        Self { en, fr }
    }

    /// Same text in every language.
    #[must_use]
    pub const fn same(text: &'static str) -> Self {
        Self { en: text, fr: text }
    }

    #[must_use]
    pub const fn get(&self, lang: Lang) -> &'static str {
        match lang {
            Lang::English => self.en,
            Lang::French => self.fr,
        }
    }
}
