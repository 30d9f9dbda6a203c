//! Virtualization-aware visibility classification.

use crate::types::ElementBox;

/// True only for elements with non-zero rendered area that are not hidden
/// by `display: none` or `visibility: hidden`.
pub fn is_interactable(element: &ElementBox) -> bool {
    element.width > 0.0
        && element.height > 0.0
        && !element.display.trim().eq_ignore_ascii_case("none")
        && !element.visibility.trim().eq_ignore_ascii_case("hidden")
}
