use crate::constants::*;
use crate::core::{EditorMode, FrameOutput, MessageView, SessionPhase};
use web_sys as web;

#[inline]
fn set_shown(document: &web::Document, id: &str, shown: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let cl = el.class_list();
        if shown {
            _ = cl.remove_1(HIDDEN_CLASS);
        } else {
            _ = cl.add_1(HIDDEN_CLASS);
        }
    }
}

#[inline]
fn set_class(el: &web::Element, class: &str, on: bool) {
    let cl = el.class_list();
    if on {
        _ = cl.add_1(class);
    } else {
        _ = cl.remove_1(class);
    }
}

/// Last state written to the DOM, so unchanged frames touch nothing.
#[derive(Default)]
pub struct OverlayView {
    message: Option<MessageView>,
    hint: Option<bool>,
    mode: Option<EditorMode>,
    phase: Option<SessionPhase>,
    flashlight: Option<bool>,
}

impl OverlayView {
    pub fn sync(&mut self, document: &web::Document, out: &FrameOutput) {
        if self.message != out.message {
            update_message(document, out.message.as_ref());
            self.message = out.message.clone();
        }
        if self.hint != Some(out.controls_hint) {
            set_shown(document, CONTROLS_HINT_ID, out.controls_hint);
            self.hint = Some(out.controls_hint);
        }
        if self.phase != Some(out.phase) {
            set_shown(document, SCROLL_HINT_ID, out.phase == SessionPhase::Scrolling);
            self.phase = Some(out.phase);
        }
        if self.mode != Some(out.editor_mode) {
            update_editor_badge(document, out.editor_mode);
            self.mode = Some(out.editor_mode);
        }
        let flashlight = out.flashlight.is_some();
        if self.flashlight != Some(flashlight) {
            if let Some(root) = document.document_element() {
                set_class(&root, FLASHLIGHT_CLASS, flashlight);
            }
            self.flashlight = Some(flashlight);
        }
    }

    /// Strip everything the viewer added.
    pub fn clear(&mut self, document: &web::Document) {
        update_message(document, None);
        set_shown(document, CONTROLS_HINT_ID, false);
        update_editor_badge(document, EditorMode::None);
        if let Some(root) = document.document_element() {
            set_class(&root, FLASHLIGHT_CLASS, false);
        }
        *self = Self::default();
    }
}

fn update_message(document: &web::Document, view: Option<&MessageView>) {
    let Some(el) = document.get_element_by_id(MESSAGE_ID) else {
        return;
    };
    match view {
        Some(v) => {
            el.set_text_content(Some(&v.text));
            set_class(&el, VISIBLE_CLASS, v.visible);
        }
        None => {
            set_class(&el, VISIBLE_CLASS, false);
            el.set_text_content(None);
        }
    }
}

fn update_editor_badge(document: &web::Document, mode: EditorMode) {
    if let Some(root) = document.document_element() {
        set_class(&root, EDIT_HOTSPOT_CLASS, mode == EditorMode::Hotspot);
        set_class(&root, EDIT_ATMOSPHERE_CLASS, mode == EditorMode::Atmosphere);
    }
    if let Some(el) = document.get_element_by_id(EDITOR_BADGE_ID) {
        let label = match mode {
            EditorMode::None => "",
            EditorMode::Hotspot => "HOTSPOT EDITOR",
            EditorMode::Atmosphere => "ATMOSPHERE EDITOR",
        };
        el.set_text_content(Some(label));
    }
    set_shown(document, EDITOR_BADGE_ID, mode != EditorMode::None);
}
