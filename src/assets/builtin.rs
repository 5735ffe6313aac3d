#![allow(missing_docs)] // Derive macros generate undocumented methods.

cfg_if::cfg_if!(
    if #[cfg(feature = "assets")] {
        use std::borrow::Cow;

        use gpui::Result;
        use rust_embed::RustEmbed;

        use crate::assets::AssetProvider;

        /// The glyphs of [`ControlIcon`], embedded into the binary.
        #[derive(RustEmbed)]
        #[folder = "assets/"]
        #[include = "icons/**/*.svg"]
        #[exclude = "*.DS_Store"]
        pub struct ControlAssets;

        impl AssetProvider for ControlAssets {
            fn get(&self, path: &str) -> Option<Cow<'static, [u8]>> {
                <Self as RustEmbed>::get(path).map(|file| file.data)
            }

            fn list(&self, path: &str) -> Result<Vec<SharedString>> {
                Ok(ControlAssets::iter()
                    .filter(|asset| asset.starts_with(path))
                    .map(SharedString::from)
                    .collect())
            }
        }
    }
);

use enum_assoc::Assoc;
use gpui::SharedString;

/// Glyphs the components render on their own. Served by `ControlAssets`
/// with the `assets` feature, or by any provider with the same paths.
#[derive(Assoc, Clone, Copy, Debug, PartialEq, Eq)]
#[func(pub fn path(&self) -> &'static str)]
pub enum ControlIcon {
    /// Closed-state indicator of a select, rotated while open.
    #[assoc(path = "icons/chevron-down.svg")]
    ChevronDown,

    /// Removes a selected value chip.
    #[assoc(path = "icons/close.svg")]
    Close,

    #[assoc(path = "icons/search.svg")]
    Search,
}

impl ControlIcon {
    pub const ALL: [ControlIcon; 3] = [Self::ChevronDown, Self::Close, Self::Search];
}

impl From<ControlIcon> for SharedString {
    fn from(icon: ControlIcon) -> Self {
        SharedString::new_static(icon.path())
    }
}

#[cfg(all(test, feature = "assets"))]
mod tests {
    use super::*;
    use crate::{AssetProvider, Assets};
    use gpui::{AssetSource, Result};
    use std::borrow::Cow;

    struct Overrides;

    impl AssetProvider for Overrides {
        fn get(&self, path: &str) -> Option<Cow<'static, [u8]>> {
            (path == "icons/close.svg").then_some(Cow::Borrowed(b"<svg/>".as_slice()))
        }

        fn list(&self, _path: &str) -> Result<Vec<SharedString>> {
            Ok(vec!["icons/close.svg".into()])
        }
    }

    #[test]
    fn test_every_icon_is_embedded() {
        for icon in ControlIcon::ALL {
            let bytes = ControlAssets.get(icon.path()).unwrap();
            assert!(bytes.starts_with(b"<svg"), "{icon:?}");
        }
    }

    #[test]
    fn test_earlier_provider_shadows_later() {
        let assets = crate::assets![Overrides, ControlAssets];

        let close = assets.load("icons/close.svg").unwrap().unwrap();
        assert_eq!(&*close, b"<svg/>");

        let chevron = assets.load(ControlIcon::ChevronDown.path()).unwrap();
        assert!(chevron.is_some());
    }

    #[test]
    fn test_missing_and_empty_paths() {
        let assets: Assets<1> = Assets::new([Box::new(ControlAssets)]);

        assert!(assets.load("").unwrap().is_none());
        assert!(assets.load("icons/missing.svg").is_err());
        assert_eq!(assets.list("icons/").unwrap().len(), ControlIcon::ALL.len());
    }
}
