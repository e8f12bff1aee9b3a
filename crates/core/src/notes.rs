//! Note bounding-box rescaling and the translation-tag copy policy.
//!
//! When an annotation set is copied between posts of different pixel
//! dimensions, each bounding box is scaled linearly and independently per
//! axis. Tag policy: translation-state tags are copied, `translation_request`
//! is dropped once the destination is translated, and dimension tags are
//! recomputed from the destination's size rather than copied.

use crate::tags::recompute_dimension_tags;

// ---------------------------------------------------------------------------
// Bounding boxes
// ---------------------------------------------------------------------------

/// A note's bounding box in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Pixel dimensions of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

/// Scale one coordinate by a dimension ratio, rounding to the nearest pixel.
fn scale(value: i32, src: i32, dst: i32) -> i32 {
    (f64::from(value) * f64::from(dst) / f64::from(src)).round() as i32
}

/// Rescale a bounding box from a source post's dimensions to a
/// destination's. The x axis scales by the width ratio and the y axis by
/// the height ratio, independently.
pub fn rescale_box(src_box: NoteBox, src: Dimensions, dst: Dimensions) -> NoteBox {
    NoteBox {
        x: scale(src_box.x, src.width, dst.width),
        y: scale(src_box.y, src.height, dst.height),
        width: scale(src_box.width, src.width, dst.width),
        height: scale(src_box.height, src.height, dst.height),
    }
}

// ---------------------------------------------------------------------------
// Translation-tag policy
// ---------------------------------------------------------------------------

/// Translation-state tags carried over when notes are copied.
const COPIED_TRANSLATION_TAGS: &[&str] = &["translated", "partially_translated", "check_translation"];

/// Compute the destination post's tag list after a note copy.
///
/// The destination keeps its own tags, gains the source's translation-state
/// tags, loses `translation_request` when the result is translated, and has
/// its dimension tags recomputed for its own size. Returns a sorted,
/// deduplicated list.
pub fn merge_copied_tags(
    src_tags: &[String],
    dst_tags: &[String],
    dst: Dimensions,
) -> Vec<String> {
    let mut tags: Vec<String> = dst_tags.to_vec();
    for tag in COPIED_TRANSLATION_TAGS {
        if src_tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    if tags.iter().any(|t| t == "translated") {
        tags.retain(|t| t != "translation_request");
    }
    recompute_dimension_tags(&tags, dst.width, dst.height)
}

/// Flags for the mark-as-translated operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslationFlags {
    pub check_translation: bool,
    pub partially_translated: bool,
}

/// Compute a post's tag list after being marked translated.
///
/// Adds `translated`, drops `translation_request`, and sets or clears
/// `check_translation` / `partially_translated` per the flags. Returns a
/// sorted, deduplicated list.
pub fn mark_translated_tags(tags: &[String], flags: TranslationFlags) -> Vec<String> {
    let mut out: Vec<String> = tags
        .iter()
        .filter(|t| {
            t.as_str() != "translation_request"
                && t.as_str() != "check_translation"
                && t.as_str() != "partially_translated"
        })
        .cloned()
        .collect();
    out.push("translated".to_string());
    if flags.check_translation {
        out.push("check_translation".to_string());
    }
    if flags.partially_translated {
        out.push("partially_translated".to_string());
    }
    out.sort();
    out.dedup();
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
