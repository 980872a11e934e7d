//! Attribute metadata tables.
//!
//! Static per-namespace and per-tag tables consumed by the attribute
//! classifier. Canonical names are the DOM property names the emitted code
//! writes to; raw names are matched lower-cased.
//!
//! Based on: <https://developer.mozilla.org/en-US/docs/Web/API>

use crate::classify::Category;

/// Fixed (tag, attribute) special cases that win over every other table.
///
/// These resolve collisions where the generic precedence would pick the
/// wrong category, e.g. `<meta content>` is not the CSS `content` property.
pub(crate) static SPECIAL_CASES: &[(&str, &str, Category, &str)] = &[
	("meta", "content", Category::Attribute, "content"),
	("img", "width", Category::Attribute, "width"),
	("img", "height", Category::Attribute, "height"),
	("canvas", "width", Category::Attribute, "width"),
	("canvas", "height", Category::Attribute, "height"),
	("video", "width", Category::Attribute, "width"),
	("video", "height", Category::Attribute, "height"),
	("iframe", "width", Category::Attribute, "width"),
	("iframe", "height", Category::Attribute, "height"),
	("embed", "width", Category::Attribute, "width"),
	("embed", "height", Category::Attribute, "height"),
	("object", "width", Category::Attribute, "width"),
	("object", "height", Category::Attribute, "height"),
	("svg", "width", Category::Attribute, "width"),
	("svg", "height", Category::Attribute, "height"),
	("input", "list", Category::Attribute, "list"),
	("input", "form", Category::Attribute, "form"),
	("button", "form", Category::Attribute, "form"),
	("td", "width", Category::Attribute, "width"),
	("th", "width", Category::Attribute, "width"),
	("col", "width", Category::Attribute, "width"),
];

/// CSS properties, camel-cased as on `CSSStyleDeclaration`.
pub(crate) static CSS_PROPERTIES: &[&str] = &[
	// Box model
	"width",
	"height",
	"minWidth",
	"minHeight",
	"maxWidth",
	"maxHeight",
	"margin",
	"marginTop",
	"marginRight",
	"marginBottom",
	"marginLeft",
	"padding",
	"paddingTop",
	"paddingRight",
	"paddingBottom",
	"paddingLeft",
	"boxSizing",
	// Borders
	"border",
	"borderTop",
	"borderRight",
	"borderBottom",
	"borderLeft",
	"borderWidth",
	"borderStyle",
	"borderColor",
	"borderRadius",
	"borderTopLeftRadius",
	"borderTopRightRadius",
	"borderBottomLeftRadius",
	"borderBottomRightRadius",
	"borderImageOutset",
	"borderImageSlice",
	"borderImageWidth",
	"outline",
	"outlineWidth",
	"outlineColor",
	"outlineOffset",
	// Positioning
	"position",
	"top",
	"right",
	"bottom",
	"left",
	"inset",
	"zIndex",
	"float",
	"clear",
	// Display and layout
	"display",
	"visibility",
	"overflow",
	"overflowX",
	"overflowY",
	"flex",
	"flexGrow",
	"flexShrink",
	"flexBasis",
	"flexDirection",
	"flexWrap",
	"flexFlow",
	"order",
	"justifyContent",
	"justifyItems",
	"justifySelf",
	"alignContent",
	"alignItems",
	"alignSelf",
	"gap",
	"rowGap",
	"columnGap",
	"grid",
	"gridArea",
	"gridTemplate",
	"gridTemplateColumns",
	"gridTemplateRows",
	"gridTemplateAreas",
	"gridColumn",
	"gridColumnStart",
	"gridColumnEnd",
	"gridRow",
	"gridRowStart",
	"gridRowEnd",
	"gridAutoFlow",
	"columns",
	"columnCount",
	"aspectRatio",
	// Typography
	"color",
	"font",
	"fontFamily",
	"fontSize",
	"fontWeight",
	"fontStyle",
	"lineHeight",
	"letterSpacing",
	"wordSpacing",
	"textAlign",
	"textDecoration",
	"textTransform",
	"textIndent",
	"textOverflow",
	"textShadow",
	"whiteSpace",
	"wordBreak",
	"lineClamp",
	"tabSize",
	"orphans",
	"widows",
	"content",
	// Backgrounds and effects
	"background",
	"backgroundColor",
	"backgroundImage",
	"backgroundSize",
	"backgroundPosition",
	"backgroundRepeat",
	"boxShadow",
	"opacity",
	"filter",
	"backdropFilter",
	"mixBlendMode",
	"clipPath",
	"zoom",
	// Transforms and motion
	"transform",
	"transformOrigin",
	"transition",
	"transitionDuration",
	"transitionDelay",
	"animation",
	"animationDuration",
	"animationDelay",
	"animationIterationCount",
	// Interaction
	"cursor",
	"pointerEvents",
	"userSelect",
	"resize",
	"objectFit",
	"objectPosition",
	// Paint (also usable from HTML via style:)
	"fill",
	"fillOpacity",
	"floodOpacity",
	"stopOpacity",
	"stroke",
	"strokeDasharray",
	"strokeDashoffset",
	"strokeMiterlimit",
	"strokeOpacity",
	"strokeWidth",
];

/// Properties whose numeric values never receive a `px` unit.
pub(crate) static UNITLESS_PROPERTIES: &[&str] = &[
	"animationIterationCount",
	"aspectRatio",
	"borderImageOutset",
	"borderImageSlice",
	"borderImageWidth",
	"columnCount",
	"columns",
	"fillOpacity",
	"flex",
	"flexGrow",
	"flexShrink",
	"floodOpacity",
	"fontWeight",
	"gridArea",
	"gridColumn",
	"gridColumnEnd",
	"gridColumnStart",
	"gridRow",
	"gridRowEnd",
	"gridRowStart",
	"lineClamp",
	"lineHeight",
	"opacity",
	"order",
	"orphans",
	"stopOpacity",
	"strokeDasharray",
	"strokeDashoffset",
	"strokeMiterlimit",
	"strokeOpacity",
	"strokeWidth",
	"tabSize",
	"widows",
	"zIndex",
	"zoom",
];

/// Event names, without the `on` prefix.
pub(crate) static EVENTS: &[&str] = &[
	// Lifecycle (compiler-handled)
	"create",
	"destroy",
	// Mouse
	"click",
	"dblclick",
	"mousedown",
	"mouseup",
	"mousemove",
	"mouseenter",
	"mouseleave",
	"mouseover",
	"mouseout",
	"contextmenu",
	"wheel",
	// Pointer and touch
	"pointerdown",
	"pointerup",
	"pointermove",
	"pointerenter",
	"pointerleave",
	"pointercancel",
	"touchstart",
	"touchend",
	"touchmove",
	"touchcancel",
	// Keyboard and focus
	"keydown",
	"keyup",
	"keypress",
	"focus",
	"blur",
	"focusin",
	"focusout",
	// Forms
	"input",
	"change",
	"submit",
	"reset",
	"invalid",
	"select",
	// Drag and clipboard
	"drag",
	"dragstart",
	"dragend",
	"dragenter",
	"dragleave",
	"dragover",
	"drop",
	"copy",
	"cut",
	"paste",
	// Media
	"play",
	"pause",
	"ended",
	"seeked",
	"seeking",
	"timeupdate",
	"volumechange",
	"ratechange",
	"durationchange",
	"loadedmetadata",
	"canplay",
	// Resources and misc
	"load",
	"error",
	"scroll",
	"resize",
	"toggle",
	"animationstart",
	"animationend",
	"transitionend",
];

/// Element-specific DOM properties as (tag, raw, canonical).
pub(crate) static ELEMENT_PROPS: &[(&str, &str, &str)] = &[
	("input", "value", "value"),
	("input", "checked", "checked"),
	("input", "disabled", "disabled"),
	("input", "placeholder", "placeholder"),
	("input", "readonly", "readOnly"),
	("input", "required", "required"),
	("input", "multiple", "multiple"),
	("input", "min", "min"),
	("input", "max", "max"),
	("input", "step", "step"),
	("input", "files", "files"),
	("input", "indeterminate", "indeterminate"),
	("input", "autofocus", "autofocus"),
	("input", "name", "name"),
	("input", "type", "type"),
	("textarea", "value", "value"),
	("textarea", "disabled", "disabled"),
	("textarea", "placeholder", "placeholder"),
	("textarea", "readonly", "readOnly"),
	("textarea", "rows", "rows"),
	("textarea", "cols", "cols"),
	("textarea", "name", "name"),
	("select", "value", "value"),
	("select", "disabled", "disabled"),
	("select", "multiple", "multiple"),
	("select", "selectedindex", "selectedIndex"),
	("select", "name", "name"),
	("option", "value", "value"),
	("option", "selected", "selected"),
	("option", "disabled", "disabled"),
	("button", "disabled", "disabled"),
	("button", "type", "type"),
	("button", "value", "value"),
	("fieldset", "disabled", "disabled"),
	("video", "src", "src"),
	("video", "currenttime", "currentTime"),
	("video", "volume", "volume"),
	("video", "muted", "muted"),
	("video", "paused", "paused"),
	("video", "playbackrate", "playbackRate"),
	("video", "autoplay", "autoplay"),
	("video", "controls", "controls"),
	("video", "loop", "loop"),
	("video", "poster", "poster"),
	("audio", "src", "src"),
	("audio", "currenttime", "currentTime"),
	("audio", "volume", "volume"),
	("audio", "muted", "muted"),
	("audio", "paused", "paused"),
	("audio", "playbackrate", "playbackRate"),
	("audio", "autoplay", "autoplay"),
	("audio", "controls", "controls"),
	("audio", "loop", "loop"),
	("img", "src", "src"),
	("img", "alt", "alt"),
	("iframe", "src", "src"),
	("script", "src", "src"),
	("source", "src", "src"),
	("a", "href", "href"),
	("a", "target", "target"),
	("form", "action", "action"),
	("form", "method", "method"),
	("form", "novalidate", "noValidate"),
	("label", "for", "htmlFor"),
	("output", "for", "htmlFor"),
	("details", "open", "open"),
	("dialog", "open", "open"),
];

/// DOM properties shared by every HTML element as (raw, canonical).
pub(crate) static GLOBAL_PROPS: &[(&str, &str)] = &[
	("class", "className"),
	("classname", "className"),
	("id", "id"),
	("title", "title"),
	("hidden", "hidden"),
	("tabindex", "tabIndex"),
	("innerhtml", "innerHTML"),
	("textcontent", "textContent"),
	("innertext", "innerText"),
	("dir", "dir"),
	("lang", "lang"),
	("draggable", "draggable"),
	("contenteditable", "contentEditable"),
	("spellcheck", "spellcheck"),
	("accesskey", "accessKey"),
	("inert", "inert"),
];

/// Attributes shared by every HTML element, written with `setAttribute`.
///
/// `aria-*` and `data-*` are matched by prefix.
pub(crate) static GLOBAL_ATTRS: &[&str] = &[
	"role",
	"slot",
	"part",
	"style",
	"is",
	"itemprop",
	"itemscope",
	"itemtype",
	"autocapitalize",
	"enterkeyhint",
	"inputmode",
	"nonce",
	"popover",
	"translate",
];

/// Element-specific attributes as (tag, name).
pub(crate) static ELEMENT_ATTRS: &[(&str, &str)] = &[
	("meta", "name"),
	("meta", "charset"),
	("meta", "property"),
	("meta", "http-equiv"),
	("link", "rel"),
	("link", "href"),
	("link", "as"),
	("link", "type"),
	("link", "crossorigin"),
	("link", "media"),
	("script", "type"),
	("script", "defer"),
	("script", "async"),
	("a", "rel"),
	("a", "download"),
	("img", "srcset"),
	("img", "sizes"),
	("img", "loading"),
	("img", "decoding"),
	("input", "autocomplete"),
	("input", "pattern"),
	("input", "maxlength"),
	("input", "minlength"),
	("input", "accept"),
	("td", "colspan"),
	("td", "rowspan"),
	("th", "colspan"),
	("th", "rowspan"),
	("th", "scope"),
	("ol", "start"),
	("ol", "reversed"),
	("time", "datetime"),
	("iframe", "allow"),
	("iframe", "sandbox"),
];

/// Attributes shared by every SVG element.
///
/// SVG geometry and presentation live in attributes, so in the SVG namespace
/// these take precedence over the CSS table.
pub(crate) static SVG_ATTRS: &[&str] = &[
	// Core
	"id",
	"class",
	"style",
	"lang",
	"tabindex",
	// Geometry
	"x",
	"y",
	"x1",
	"y1",
	"x2",
	"y2",
	"cx",
	"cy",
	"r",
	"rx",
	"ry",
	"d",
	"points",
	"width",
	"height",
	"viewBox",
	"preserveAspectRatio",
	"transform",
	"pathLength",
	// Presentation
	"fill",
	"fill-opacity",
	"fill-rule",
	"stroke",
	"stroke-width",
	"stroke-linecap",
	"stroke-linejoin",
	"stroke-dasharray",
	"stroke-dashoffset",
	"stroke-opacity",
	"opacity",
	"color",
	"clip-path",
	"mask",
	"filter",
	"font-family",
	"font-size",
	"text-anchor",
	"dominant-baseline",
	"visibility",
	"display",
	// Linking and gradients
	"href",
	"offset",
	"stop-color",
	"stop-opacity",
	"gradientUnits",
	"gradientTransform",
	"xmlns",
];

/// Attributes shared by every MathML element.
pub(crate) static MATHML_ATTRS: &[&str] = &[
	"id",
	"class",
	"style",
	"dir",
	"display",
	"displaystyle",
	"mathvariant",
	"mathsize",
	"mathcolor",
	"mathbackground",
	"scriptlevel",
	"xmlns",
];

/// Bound fields on native elements: (field, node property, change events).
///
/// `value` on inputs is refined per input type by the element codegen.
pub(crate) static BOUND_FIELDS: &[(&str, &str, &[&str])] = &[
	("value", "value", &["input"]),
	("checked", "checked", &["click"]),
	("files", "files", &["input"]),
	("currentTime", "currentTime", &["play", "pause", "seeked"]),
	("paused", "paused", &["play", "pause"]),
	("volume", "volume", &["volumechange"]),
	("muted", "muted", &["volumechange"]),
	("playbackRate", "playbackRate", &["ratechange"]),
];

/// Returns true if `property` is a unitless CSS property.
pub(crate) fn is_unitless(property: &str) -> bool {
	UNITLESS_PROPERTIES.contains(&property)
}

/// Returns the bound field spec for `field`.
pub(crate) fn bound_field(field: &str) -> Option<(&'static str, &'static [&'static str])> {
	BOUND_FIELDS
		.iter()
		.find(|(name, _, _)| *name == field)
		.map(|(_, property, events)| (*property, *events))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unitless_properties_are_css_properties() {
		for property in UNITLESS_PROPERTIES {
			assert!(
				CSS_PROPERTIES.contains(property),
				"{} missing from CSS_PROPERTIES",
				property
			);
		}
	}

	#[test]
	fn test_media_bindings_listen_to_their_events() {
		assert_eq!(bound_field("volume"), Some(("volume", &["volumechange"][..])));
		assert_eq!(bound_field("playbackRate").unwrap().1, &["ratechange"]);
		assert!(bound_field("innerHTML").is_none());
	}
}
